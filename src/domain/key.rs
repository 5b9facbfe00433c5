// ============================================================================
// Key Model
// External key events and the typed keys the engine dispatches on
// ============================================================================

use super::entry::EntryBuffer;
use super::state::Modifier;
use crate::finance::FinRegister;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Key id used for literal number input (paste)
pub const PASTE_INPUT_ID: &str = "PASTE_INPUT";

// ============================================================================
// External Key Events
// ============================================================================

/// Coarse key category carried by every external key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum KeyAction {
    Num,
    Enter,
    Op,
    Fin,
    Clr,
    Mod,
    Pwr,
    Dot,
    Chs,
    Func,
}

/// Optional payload of a key event
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum KeyValue {
    Number(f64),
    Text(String),
}

/// Key event as produced by a keypad, keyboard listener or paste handler
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyEvent {
    pub id: String,
    pub action: KeyAction,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub value: Option<KeyValue>,
}

impl KeyEvent {
    pub fn new(id: impl Into<String>, action: KeyAction) -> Self {
        Self {
            id: id.into(),
            action,
            value: None,
        }
    }

    pub fn with_value(mut self, value: KeyValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Literal number input, e.g. from a clipboard
    pub fn paste(literal: impl Into<String>) -> Self {
        Self::new(PASTE_INPUT_ID, KeyAction::Num).with_value(KeyValue::Text(literal.into()))
    }

    fn text(&self) -> Option<&str> {
        match &self.value {
            Some(KeyValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// Typed Keys
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(&self) -> char {
        match self {
            ArithOp::Add => '+',
            ArithOp::Sub => '-',
            ArithOp::Mul => '*',
            ArithOp::Div => '/',
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(ArithOp::Add),
            "-" => Some(ArithOp::Sub),
            "*" | "×" => Some(ArithOp::Mul),
            "/" | "÷" => Some(ArithOp::Div),
            _ => None,
        }
    }

    /// `y op x`; division by zero yields 0
    pub fn apply(&self, y: f64, x: f64) -> f64 {
        match self {
            ArithOp::Add => y + x,
            ArithOp::Sub => y - x,
            ArithOp::Mul => y * x,
            ArithOp::Div => {
                if x == 0.0 {
                    0.0
                } else {
                    y / x
                }
            }
        }
    }

    fn key_id(&self) -> &'static str {
        match self {
            ArithOp::Add => "ADD",
            ArithOp::Sub => "SUB",
            ArithOp::Mul => "MUL",
            ArithOp::Div => "DIV",
        }
    }

    fn from_key_id(id: &str) -> Option<Self> {
        match id {
            "ADD" => Some(ArithOp::Add),
            "SUB" => Some(ArithOp::Sub),
            "MUL" => Some(ArithOp::Mul),
            "DIV" => Some(ArithOp::Div),
            _ => None,
        }
    }
}

/// Keys of the FUNC row and the register/stack keys, by their primary legend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuncKey {
    /// y^x
    Power,
    /// 1/x
    Reciprocal,
    /// %T
    PercentTotal,
    /// Δ%
    DeltaPercent,
    /// %
    Percent,
    Eex,
    /// R/S
    RunStop,
    Sst,
    /// R↓
    RollDown,
    /// x≷y
    Swap,
    Sto,
    Rcl,
    /// Σ+
    SigmaPlus,
}

impl FuncKey {
    const TABLE: [(FuncKey, &'static str, &'static str); 13] = [
        (FuncKey::Power, "yx", "pow"),
        (FuncKey::Reciprocal, "inv", "inv"),
        (FuncKey::PercentTotal, "pctT", "pctT"),
        (FuncKey::DeltaPercent, "dPct", "dPct"),
        (FuncKey::Percent, "pct", "pct"),
        (FuncKey::Eex, "EEX", "EEX"),
        (FuncKey::RunStop, "RS", "RS"),
        (FuncKey::Sst, "SST", "SST"),
        (FuncKey::RollDown, "Rdn", "rdn"),
        (FuncKey::Swap, "xy", "swap"),
        (FuncKey::Sto, "STO", "STO"),
        (FuncKey::Rcl, "RCL", "RCL"),
        (FuncKey::SigmaPlus, "SIGMA", "sigma"),
    ];

    /// Keypad id
    pub fn key_id(&self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(key, _, _)| key == self)
            .map_or("", |(_, id, _)| *id)
    }

    /// Match a keypad id or a value token
    pub fn lookup(token: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, id, value)| *id == token || *value == token)
            .map(|(key, _, _)| *key)
    }
}

/// Typed key the transition function dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Dot,
    Enter,
    Arith(ArithOp),
    Fin(FinRegister),
    Chs,
    Clx,
    Shift(Modifier),
    Power,
    Func(FuncKey),
    /// A complete number to place in the entry buffer
    Literal(EntryBuffer),
    /// Anything unrecognized; only cancels a pending shift
    Unmapped,
}

impl Key {
    pub fn is_digit_entry(&self) -> bool {
        matches!(
            self,
            Key::Digit(_) | Key::Dot | Key::Func(FuncKey::Eex) | Key::Literal(_)
        )
    }
}

fn digit_of(event: &KeyEvent) -> Option<u8> {
    match &event.value {
        Some(KeyValue::Number(n)) if n.fract() == 0.0 && (0.0..=9.0).contains(n) => Some(*n as u8),
        Some(KeyValue::Text(text)) => single_digit(text),
        _ => single_digit(&event.id),
    }
}

fn single_digit(text: &str) -> Option<u8> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_digit(10).map(|d| d as u8),
        _ => None,
    }
}

impl From<&KeyEvent> for Key {
    fn from(event: &KeyEvent) -> Self {
        let token = event.text().unwrap_or(event.id.as_str());
        match event.action {
            KeyAction::Pwr => Key::Power,
            KeyAction::Enter => Key::Enter,
            KeyAction::Dot => Key::Dot,
            KeyAction::Chs => Key::Chs,
            KeyAction::Clr => Key::Clx,
            KeyAction::Mod => match token {
                "f" | "F" => Key::Shift(Modifier::F),
                "g" | "G" => Key::Shift(Modifier::G),
                _ => Key::Unmapped,
            },
            KeyAction::Num => {
                if let Some(digit) = digit_of(event) {
                    return Key::Digit(digit);
                }
                event
                    .text()
                    .and_then(EntryBuffer::from_literal)
                    .map_or(Key::Unmapped, Key::Literal)
            }
            KeyAction::Op => ArithOp::from_symbol(token)
                .or_else(|| ArithOp::from_key_id(&event.id))
                .map_or(Key::Unmapped, Key::Arith),
            KeyAction::Fin => FinRegister::from_legend(token)
                .or_else(|| FinRegister::from_legend(&event.id))
                .map_or(Key::Unmapped, Key::Fin),
            KeyAction::Func => FuncKey::lookup(token)
                .or_else(|| FuncKey::lookup(&event.id))
                .map_or(Key::Unmapped, Key::Func),
        }
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        match key {
            Key::Digit(d) => KeyEvent::new(d.to_string(), KeyAction::Num)
                .with_value(KeyValue::Number(f64::from(d))),
            Key::Dot => KeyEvent::new("DOT", KeyAction::Dot),
            Key::Enter => KeyEvent::new("ENTER", KeyAction::Enter),
            Key::Arith(op) => KeyEvent::new(op.key_id(), KeyAction::Op)
                .with_value(KeyValue::Text(op.symbol().to_string())),
            Key::Fin(reg) => KeyEvent::new(reg.legend(), KeyAction::Fin),
            Key::Chs => KeyEvent::new("CHS", KeyAction::Chs),
            Key::Clx => KeyEvent::new("CLX", KeyAction::Clr),
            Key::Shift(Modifier::G) => KeyEvent::new("g", KeyAction::Mod),
            Key::Shift(_) => KeyEvent::new("f", KeyAction::Mod),
            Key::Power => KeyEvent::new("ON", KeyAction::Pwr),
            Key::Func(func) => KeyEvent::new(func.key_id(), KeyAction::Func),
            Key::Literal(buffer) => KeyEvent::paste(buffer.as_str()),
            Key::Unmapped => KeyEvent::new("", KeyAction::Func),
        }
    }
}

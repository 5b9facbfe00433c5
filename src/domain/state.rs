// ============================================================================
// Calculator State
// Stack, registers, modes and the read-only snapshot handed to displays
// ============================================================================

use super::entry::EntryBuffer;
use super::key::ArithOp;
use crate::finance::{CashFlowLedger, FinancialRegisters};
use crate::numeric::{format, CalcError, DateFormat, DisplayFormat};
use crate::stats::StatsAccumulator;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Storage registers: R0–R9 at 0–9, R.0–R.9 at 10–19
pub const MEMORY_REGISTERS: usize = 20;

/// Decimals shown on a fresh calculator
pub const DEFAULT_DECIMALS: u8 = 2;

// ============================================================================
// Modifier & Pending Sequences
// ============================================================================

/// Shift state set by the f and g keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum Modifier {
    #[default]
    None,
    F,
    G,
}

/// A STO or RCL waiting for its register address.
///
/// Persisted as a compact token (`"STO"`, `"STO+."`, `"RCL."`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum PendingOp {
    Store { op: Option<ArithOp>, indirect: bool },
    Recall { indirect: bool },
}

impl PendingOp {
    pub fn is_indirect(&self) -> bool {
        match self {
            PendingOp::Store { indirect, .. } | PendingOp::Recall { indirect } => *indirect,
        }
    }

    /// The same sequence with the `.` register bank selected
    pub fn indirect(self) -> Self {
        match self {
            PendingOp::Store { op, .. } => PendingOp::Store { op, indirect: true },
            PendingOp::Recall { .. } => PendingOp::Recall { indirect: true },
        }
    }

    /// Register index addressed by `digit`
    pub fn register(&self, digit: u8) -> usize {
        let bank = if self.is_indirect() { 10 } else { 0 };
        bank + usize::from(digit.min(9))
    }

    pub fn token(&self) -> String {
        let (name, op) = match self {
            PendingOp::Store { op, .. } => ("STO", *op),
            PendingOp::Recall { .. } => ("RCL", None),
        };
        let mut token = String::from(name);
        if let Some(op) = op {
            token.push(op.symbol());
        }
        if self.is_indirect() {
            token.push('.');
        }
        token
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let (body, indirect) = match token.strip_suffix('.') {
            Some(body) => (body, true),
            None => (token, false),
        };
        if body == "RCL" {
            return Some(PendingOp::Recall { indirect });
        }
        let rest = body.strip_prefix("STO")?;
        let op = if rest.is_empty() {
            None
        } else {
            Some(ArithOp::from_symbol(rest)?)
        };
        Some(PendingOp::Store { op, indirect })
    }
}

/// Prompt shown while the sequence waits for a register
impl fmt::Display for PendingOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingOp::Store { op, .. } => {
                f.write_str("STO")?;
                if let Some(op) = op {
                    write!(f, " {}", op.symbol())?;
                }
            }
            PendingOp::Recall { .. } => f.write_str("RCL")?,
        }
        if self.is_indirect() {
            f.write_str(" .")?;
        }
        f.write_str(" _")
    }
}

impl TryFrom<String> for PendingOp {
    type Error = String;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        PendingOp::from_token(&token).ok_or_else(|| format!("unknown pending operation: {token}"))
    }
}

impl From<PendingOp> for String {
    fn from(op: PendingOp) -> Self {
        op.token()
    }
}

// ============================================================================
// Stack
// ============================================================================

/// The four-level operand stack, X at index 0
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Stack([f64; 4]);

impl Stack {
    pub const DEPTH: usize = 4;

    pub fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self([x, y, z, t])
    }

    pub fn from_array(values: [f64; 4]) -> Self {
        Self(values)
    }

    pub fn as_array(&self) -> [f64; 4] {
        self.0
    }

    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    pub fn z(&self) -> f64 {
        self.0[2]
    }

    pub fn t(&self) -> f64 {
        self.0[3]
    }

    pub fn set_x(&mut self, value: f64) {
        self.0[0] = value;
    }

    /// Lift: T is lost, `value` lands in X
    pub fn push(&mut self, value: f64) {
        let [x, y, z, _] = self.0;
        self.0 = [value, x, y, z];
    }

    /// Binary-operation drop: X and Y are replaced by `result`, T duplicates
    pub fn drop_with(&mut self, result: f64) {
        let [_, _, z, t] = self.0;
        self.0 = [result, z, t, t];
    }

    /// Two results at once: `y` in Y, `x` in X, old Y and Z lifted
    pub fn replace_xy_lift(&mut self, x: f64, y: f64) {
        let [_, old_y, old_z, _] = self.0;
        self.0 = [x, y, old_y, old_z];
    }

    pub fn roll_down(&mut self) {
        self.0.rotate_left(1);
    }

    pub fn swap_xy(&mut self) {
        self.0.swap(0, 1);
    }

    pub fn clear(&mut self) {
        self.0 = [0.0; 4];
    }
}

// ============================================================================
// Calculator State
// ============================================================================

/// Everything the calculator remembers between keystrokes
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct CalculatorState {
    pub stack: Stack,
    pub display: String,
    pub last_x: f64,
    pub input_buffer: Option<EntryBuffer>,
    #[cfg_attr(feature = "serde", serde(rename = "modifiers"))]
    pub modifier: Modifier,
    pub power_on: bool,
    pub financial: FinancialRegisters,
    pub error: Option<CalcError>,
    pub memory: [f64; MEMORY_REGISTERS],
    pub stats: StatsAccumulator,
    pub cash_flows: CashFlowLedger,
    #[cfg_attr(feature = "serde", serde(rename = "pendingOp"))]
    pub pending: Option<PendingOp>,
    pub beg_mode: bool,
    pub date_format: DateFormat,
    pub decimals: u8,
    pub display_format: DisplayFormat,
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self {
            stack: Stack::default(),
            display: format(0.0, DEFAULT_DECIMALS, DisplayFormat::Fix),
            last_x: 0.0,
            input_buffer: None,
            modifier: Modifier::None,
            power_on: true,
            financial: FinancialRegisters::default(),
            error: None,
            memory: [0.0; MEMORY_REGISTERS],
            stats: StatsAccumulator::default(),
            cash_flows: CashFlowLedger::default(),
            pending: None,
            beg_mode: false,
            date_format: DateFormat::default(),
            decimals: DEFAULT_DECIMALS,
            display_format: DisplayFormat::default(),
        }
    }
}

impl CalculatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// X as the next operation sees it: the entry being typed, or the stack top
    pub fn x_value(&self) -> f64 {
        self.input_buffer
            .as_ref()
            .map_or(self.stack.x(), EntryBuffer::value)
    }

    pub fn is_entry_active(&self) -> bool {
        self.input_buffer.is_some()
    }

    /// Text on the display: the error label while an error is shown
    pub fn display_text(&self) -> String {
        match self.error {
            Some(error) => error.label(),
            None => self.display.clone(),
        }
    }

    pub fn memory_register(&self, index: usize) -> Option<f64> {
        self.memory.get(index).copied()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            stack: self.stack.as_array(),
            display: self.display_text(),
            error: self.error,
            modifier: self.modifier,
            financial: self.financial,
            beg_mode: self.beg_mode,
            date_format: self.date_format,
            power_on: self.power_on,
            entry_active: self.is_entry_active(),
            pending: self.pending,
        }
    }
}

/// Read-only view of the fields a display or status line needs
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct StateSnapshot {
    pub stack: [f64; 4],
    pub display: String,
    pub error: Option<CalcError>,
    pub modifier: Modifier,
    pub financial: FinancialRegisters,
    pub beg_mode: bool,
    pub date_format: DateFormat,
    pub power_on: bool,
    pub entry_active: bool,
    pub pending: Option<PendingOp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = CalculatorState::new();
        assert_eq!(state.stack.as_array(), [0.0; 4]);
        assert_eq!(state.display, "0.00");
        assert!(state.power_on);
        assert_eq!(state.modifier, Modifier::None);
        assert_eq!(state.memory.len(), MEMORY_REGISTERS);
        assert!(state.cash_flows.is_empty());
    }

    #[test]
    fn test_stack_moves() {
        let mut stack = Stack::new(1.0, 2.0, 3.0, 4.0);
        stack.push(9.0);
        assert_eq!(stack.as_array(), [9.0, 1.0, 2.0, 3.0]);
        stack.drop_with(10.0);
        assert_eq!(stack.as_array(), [10.0, 2.0, 3.0, 3.0]);
        stack.roll_down();
        assert_eq!(stack.as_array(), [2.0, 3.0, 3.0, 10.0]);
        stack.swap_xy();
        assert_eq!(stack.as_array(), [3.0, 2.0, 3.0, 10.0]);
        stack.replace_xy_lift(7.0, 8.0);
        assert_eq!(stack.as_array(), [7.0, 8.0, 2.0, 3.0]);
    }

    #[test]
    fn test_pending_tokens() {
        let cases = [
            (PendingOp::Store { op: None, indirect: false }, "STO", "STO _"),
            (
                PendingOp::Store { op: Some(ArithOp::Add), indirect: true },
                "STO+.",
                "STO + . _",
            ),
            (PendingOp::Recall { indirect: true }, "RCL.", "RCL . _"),
        ];
        for (op, token, prompt) in cases {
            assert_eq!(op.token(), token);
            assert_eq!(PendingOp::from_token(token), Some(op));
            assert_eq!(op.to_string(), prompt);
        }
        assert_eq!(PendingOp::from_token("GTO"), None);
        assert_eq!(PendingOp::from_token("STO%"), None);
    }

    #[test]
    fn test_register_addressing() {
        let direct = PendingOp::Recall { indirect: false };
        assert_eq!(direct.register(4), 4);
        assert_eq!(direct.indirect().register(4), 14);
    }

    #[test]
    fn test_display_text_prefers_error() {
        let mut state = CalculatorState::new();
        state.error = Some(CalcError::InvalidDate);
        assert_eq!(state.display_text(), "Error 8");
        assert_eq!(state.snapshot().display, "Error 8");
    }

    #[test]
    fn test_x_value_reads_entry() {
        let mut state = CalculatorState::new();
        state.stack.set_x(3.0);
        assert_eq!(state.x_value(), 3.0);
        state.input_buffer = EntryBuffer::from_literal("42");
        assert_eq!(state.x_value(), 42.0);
    }
}

// ============================================================================
// Entry Buffer
// Text of a number while it is being keyed in
// ============================================================================

use arrayvec::ArrayString;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of characters in the entry buffer
pub const MAX_ENTRY_LEN: usize = 15;

/// Digits, at most one decimal point, an optional `e` exponent marker and
/// optional signs, capped at [`MAX_ENTRY_LEN`] characters.
///
/// Every mutator reports whether the keystroke was accepted; rejected
/// keystrokes leave the buffer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct EntryBuffer(ArrayString<MAX_ENTRY_LEN>);

impl EntryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a complete numeric literal (e.g. pasted text) if it fits.
    ///
    /// `E` is read as `e` and explicit `+` signs are dropped, so the stored
    /// text stays in the form keystrokes produce.
    pub fn from_literal(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_prefix('+').unwrap_or(text);
        let normalized = text.replace('E', "e").replace("e+", "e");
        if !normalized.parse::<f64>().is_ok_and(f64::is_finite) {
            return None;
        }
        Self::from_partial(&normalized)
    }

    /// Accept text that keystrokes could have produced, including unfinished
    /// forms such as `"1e"` or `"-"`; used when restoring saved state
    pub fn from_partial(text: &str) -> Option<Self> {
        let well_formed = !text.is_empty()
            && text.matches('.').count() <= 1
            && text.matches('e').count() <= 1
            && text
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | '-'));
        if !well_formed {
            return None;
        }
        ArrayString::from(text).ok().map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_exponent(&self) -> bool {
        self.0.contains('e')
    }

    pub fn push_digit(&mut self, digit: u8) -> bool {
        if digit > 9 {
            return false;
        }
        self.0.try_push(char::from(b'0' + digit)).is_ok()
    }

    /// Decimal point; refused when one is present or inside the exponent
    pub fn push_dot(&mut self) -> bool {
        if self.0.contains('.') || self.has_exponent() {
            return false;
        }
        self.0.try_push('.').is_ok()
    }

    /// EEX: start the exponent, with an implied mantissa of 1 when empty
    pub fn start_exponent(&mut self) -> bool {
        if self.has_exponent() {
            return false;
        }
        if self.0.is_empty() {
            return self.0.try_push_str("1e").is_ok();
        }
        self.0.try_push('e').is_ok()
    }

    /// CHS while typing: flips the exponent sign once an exponent is started,
    /// otherwise the mantissa sign
    pub fn toggle_sign(&mut self) -> bool {
        let text = self.0.as_str();
        let flipped = match text.find('e') {
            Some(pos) => {
                let (mantissa, exponent) = text.split_at(pos + 1);
                match exponent.strip_prefix('-') {
                    Some(rest) => format!("{mantissa}{rest}"),
                    None => format!("{mantissa}-{exponent}"),
                }
            }
            None => match text.strip_prefix('-') {
                Some(rest) => rest.to_string(),
                None => format!("-{text}"),
            }
        };

        match ArrayString::from(&flipped) {
            Ok(buffer) => {
                self.0 = buffer;
                true
            }
            Err(_) => false,
        }
    }

    /// Numeric value of the text so far.
    ///
    /// An unfinished tail (`"1e"`, `"1e-"`, a lone `"-"` or `"."`) is
    /// ignored; text with no digits reads as zero.
    pub fn value(&self) -> f64 {
        let text = self.0.as_str();
        if let Ok(value) = text.parse::<f64>() {
            return value;
        }
        text.trim_end_matches(['e', '-'])
            .parse::<f64>()
            .unwrap_or(0.0)
    }
}

impl fmt::Display for EntryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(keys: &str) -> EntryBuffer {
        let mut buffer = EntryBuffer::new();
        for key in keys.chars() {
            match key {
                '.' => buffer.push_dot(),
                'E' => buffer.start_exponent(),
                '~' => buffer.toggle_sign(),
                d => buffer.push_digit(d.to_digit(10).unwrap() as u8),
            };
        }
        buffer
    }

    #[test]
    fn test_digits_and_dot() {
        let buffer = typed("12.50");
        assert_eq!(buffer.as_str(), "12.50");
        assert_eq!(buffer.value(), 12.5);
    }

    #[test]
    fn test_second_dot_is_ignored() {
        assert_eq!(typed("1.2.3").as_str(), "1.23");
    }

    #[test]
    fn test_length_cap() {
        let buffer = typed("12345678901234567890");
        assert_eq!(buffer.len(), MAX_ENTRY_LEN);
        assert_eq!(buffer.as_str(), "123456789012345");
    }

    #[test]
    fn test_exponent_entry() {
        assert_eq!(typed("E3").as_str(), "1e3");
        assert_eq!(typed("E3").value(), 1000.0);
        assert_eq!(typed("25E").value(), 25.0);
        assert_eq!(typed("2E~3").as_str(), "2e-3");
        assert_eq!(typed("2E~3").value(), 0.002);
        assert_eq!(typed("2E~").value(), 2.0);
        assert_eq!(typed("2E.").as_str(), "2e");
    }

    #[test]
    fn test_sign_toggle() {
        assert_eq!(typed("5~").as_str(), "-5");
        assert_eq!(typed("5~~").as_str(), "5");
        assert_eq!(typed("~").value(), 0.0);
        assert_eq!(typed(".").value(), 0.0);
    }

    #[test]
    fn test_literal() {
        assert_eq!(EntryBuffer::from_literal(" -12.75 ").unwrap().value(), -12.75);
        assert!(EntryBuffer::from_literal("abc").is_none());
        assert!(EntryBuffer::from_literal("1234567890.1234567").is_none());
        assert!(EntryBuffer::from_literal("").is_none());
        assert!(EntryBuffer::from_literal("inf").is_none());
    }

    #[test]
    fn test_literal_is_stored_in_keyed_form() {
        let mut upper = EntryBuffer::from_literal("1E5").unwrap();
        assert_eq!(upper.as_str(), "1e5");
        assert!(upper.has_exponent());
        assert!(!upper.push_dot());
        assert!(!upper.start_exponent());
        assert!(upper.toggle_sign());
        assert_eq!(upper.as_str(), "1e-5");

        let mut plus = EntryBuffer::from_literal("+5").unwrap();
        assert_eq!(plus.as_str(), "5");
        assert!(plus.toggle_sign());
        assert_eq!(plus.as_str(), "-5");
        assert_eq!(plus.value(), -5.0);

        assert_eq!(EntryBuffer::from_literal("2.5E+3").unwrap().as_str(), "2.5e3");
    }

    #[test]
    fn test_partial_text() {
        assert_eq!(EntryBuffer::from_partial("1e-").unwrap().value(), 1.0);
        assert!(EntryBuffer::from_partial("").is_none());
        assert!(EntryBuffer::from_partial("1.2.3").is_none());
        assert!(EntryBuffer::from_partial("12,5").is_none());
    }
}

// ============================================================================
// Display Formatter
// Renders register values the way the calculator display shows them
// ============================================================================

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest display precision accepted by `f <digit>`
pub const MAX_DECIMALS: u8 = 9;

/// Text shown for NaN and infinities
pub const ERROR_TEXT: &str = "Error";

/// Cursor marker appended to a number that is still being typed
pub const ENTRY_CURSOR: char = '_';

/// Magnitudes at or above this switch FIX to exponential form
const SCI_UPPER: f64 = 1e10;

/// Non-zero magnitudes below this switch FIX to exponential form
const SCI_LOWER: f64 = 1e-9;

/// Display notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum DisplayFormat {
    /// Fixed number of fractional digits with thousands grouping
    #[default]
    Fix,
    /// Exponential notation
    Sci,
}

/// Separator convention for rendered numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NumberLocale {
    /// `1,234.50`
    #[default]
    Standard,
    /// `1.234,50`
    Brazilian,
}

impl NumberLocale {
    pub fn decimal_separator(&self) -> char {
        match self {
            NumberLocale::Standard => '.',
            NumberLocale::Brazilian => ',',
        }
    }

    pub fn grouping_separator(&self) -> char {
        match self {
            NumberLocale::Standard => ',',
            NumberLocale::Brazilian => '.',
        }
    }
}

/// Format a value with the standard locale.
///
/// # Example
/// ```
/// use rpn_financial::numeric::{format, DisplayFormat};
///
/// assert_eq!(format(1234.5, 2, DisplayFormat::Fix), "1,234.50");
/// assert_eq!(format(1e11, 2, DisplayFormat::Fix), "1.00e11");
/// assert_eq!(format(f64::NAN, 2, DisplayFormat::Fix), "Error");
/// ```
pub fn format(value: f64, decimals: u8, mode: DisplayFormat) -> String {
    format_with(value, decimals, mode, NumberLocale::Standard)
}

/// Format a value for the display.
///
/// Total over `f64`: NaN and infinities render as `"Error"`, magnitudes the
/// fixed layout cannot show fall back to exponential form.
pub fn format_with(value: f64, decimals: u8, mode: DisplayFormat, locale: NumberLocale) -> String {
    if !value.is_finite() {
        return ERROR_TEXT.to_string();
    }

    let decimals = decimals.min(MAX_DECIMALS);
    let abs = value.abs();

    if mode == DisplayFormat::Sci || abs >= SCI_UPPER || (abs > 0.0 && abs < SCI_LOWER) {
        scientific(value, decimals, locale)
    } else {
        fixed(value, decimals, locale)
    }
}

/// Render a live entry buffer with the locale separator and the cursor marker
pub fn format_entry(buffer: &str, locale: NumberLocale) -> String {
    let mut out: String = buffer
        .chars()
        .map(|c| if c == '.' { locale.decimal_separator() } else { c })
        .collect();
    out.push(ENTRY_CURSOR);
    out
}

// ============================================================================
// Layouts
// ============================================================================

fn scientific(value: f64, decimals: u8, locale: NumberLocale) -> String {
    // `{:e}` never emits a '+' on positive exponents
    let text = format!("{:.*e}", decimals as usize, value);
    text.replace('.', &locale.decimal_separator().to_string())
}

fn fixed(value: f64, decimals: u8, locale: NumberLocale) -> String {
    let Some(decimal) = Decimal::from_f64(value) else {
        return format!("{:.*}", decimals as usize, value);
    };

    let mut rounded =
        decimal.round_dp_with_strategy(decimals as u32, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals as u32);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + text.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part, locale.grouping_separator()));
    if let Some(frac_part) = frac_part {
        out.push(locale.decimal_separator());
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

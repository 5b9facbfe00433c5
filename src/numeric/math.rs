// ============================================================================
// Math Helpers
// Scalar functions behind the shifted math keys
// ============================================================================

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// n! over the integer part of `n`; NaN for negative input.
///
/// Overflows to infinity past 170!, which the display renders as "Error".
pub fn factorial(n: f64) -> f64 {
    if n.is_nan() || n < 0.0 {
        return f64::NAN;
    }
    let top = n.floor();
    let mut result = 1.0;
    let mut k = 2.0;
    while k <= top {
        result *= k;
        if result.is_infinite() {
            break;
        }
        k += 1.0;
    }
    result
}

/// Fractional part, keeping the sign of the input
pub fn frac(x: f64) -> f64 {
    x - x.trunc()
}

/// Integer part, truncated toward zero
pub fn intg(x: f64) -> f64 {
    x.trunc()
}

/// Round to `decimals` fractional digits, half away from zero.
///
/// Values that do not fit a `Decimal` are returned unchanged.
pub fn round_to_decimals(x: f64, decimals: u8) -> f64 {
    Decimal::from_f64(x)
        .map(|d| d.round_dp_with_strategy(decimals as u32, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(x)
}

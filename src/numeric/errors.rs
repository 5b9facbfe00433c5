// ============================================================================
// Calculator Errors
// Soft, state-carried error labels shown in place of the display value
// ============================================================================

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Domain failures raised by calculator operations.
///
/// None of these abort processing: the engine stores the error on the state,
/// the display shows [`CalcError::label`], and every register keeps its
/// pre-error value until the next key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum CalcError {
    /// Reciprocal of zero, or a zero base for %T / Δ%
    #[error("Error 0")]
    DivisionByZero,
    /// Not enough accumulated samples for the requested statistic
    #[error("Error 2")]
    InsufficientStatistics,
    /// Depreciation year outside `1..=n`, or TVM n/i without a real solution
    #[error("Error 5")]
    InvalidFinancialInput,
    /// IRR search did not converge
    #[error("Error 7")]
    IrrNotFound,
    /// Value does not encode a valid calendar date
    #[error("Error 8")]
    InvalidDate,
}

impl CalcError {
    /// Numeric code shown after "Error"
    pub fn code(&self) -> u8 {
        match self {
            CalcError::DivisionByZero => 0,
            CalcError::InsufficientStatistics => 2,
            CalcError::InvalidFinancialInput => 5,
            CalcError::IrrNotFound => 7,
            CalcError::InvalidDate => 8,
        }
    }

    /// Display label, e.g. `"Error 7"`
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Parse a display label back into an error
    pub fn from_label(label: &str) -> Option<Self> {
        let code = label.trim().strip_prefix("Error")?.trim().parse::<u8>().ok()?;
        match code {
            0 => Some(CalcError::DivisionByZero),
            2 => Some(CalcError::InsufficientStatistics),
            5 => Some(CalcError::InvalidFinancialInput),
            7 => Some(CalcError::IrrNotFound),
            8 => Some(CalcError::InvalidDate),
            _ => None,
        }
    }
}

impl TryFrom<String> for CalcError {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        CalcError::from_label(&label).ok_or_else(|| format!("unknown error label: {label}"))
    }
}

impl From<CalcError> for String {
    fn from(error: CalcError) -> Self {
        error.label()
    }
}

/// Result type alias for calculator operations
pub type CalcResult<T> = Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_labels() {
        assert_eq!(CalcError::DivisionByZero.to_string(), "Error 0");
        assert_eq!(CalcError::InsufficientStatistics.to_string(), "Error 2");
        assert_eq!(CalcError::InvalidFinancialInput.to_string(), "Error 5");
        assert_eq!(CalcError::IrrNotFound.to_string(), "Error 7");
        assert_eq!(CalcError::InvalidDate.label(), "Error 8");
    }

    #[test]
    fn test_label_parsing() {
        for error in [
            CalcError::DivisionByZero,
            CalcError::InsufficientStatistics,
            CalcError::InvalidFinancialInput,
            CalcError::IrrNotFound,
            CalcError::InvalidDate,
        ] {
            assert_eq!(CalcError::from_label(&error.label()), Some(error));
            assert_eq!(error.label(), format!("Error {}", error.code()));
        }
        assert_eq!(CalcError::from_label("Error 9"), None);
        assert_eq!(CalcError::from_label("oops"), None);
    }
}

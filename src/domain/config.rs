// ============================================================================
// Calculator Configuration
// Start-up modes and rendering conventions for a calculator instance
// ============================================================================

use super::state::CalculatorState;
use crate::numeric::{format_with, DateFormat, DisplayFormat, MAX_DECIMALS};

pub use crate::numeric::NumberLocale;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration applied when a calculator is created.
///
/// `locale` stays fixed for the life of the calculator; the remaining fields
/// only seed the initial state and can be changed from the keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalculatorConfig {
    /// Decimal and grouping separators used on the display
    pub locale: NumberLocale,

    /// Fractional digits shown in FIX mode (0-9)
    pub decimals: u8,

    pub display_format: DisplayFormat,

    pub date_format: DateFormat,

    /// Payments at the beginning of each period
    pub begin_mode: bool,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            locale: NumberLocale::Standard,
            decimals: 2,
            display_format: DisplayFormat::Fix,
            date_format: DateFormat::Mdy,
            begin_mode: false,
        }
    }
}

impl CalculatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: Set display locale
    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Builder method: Set FIX decimals
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_display_format(mut self, display_format: DisplayFormat) -> Self {
        self.display_format = display_format;
        self
    }

    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    pub fn with_begin_mode(mut self, begin_mode: bool) -> Self {
        self.begin_mode = begin_mode;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.decimals > MAX_DECIMALS {
            return Err(format!(
                "Decimals must be between 0 and {MAX_DECIMALS}, got {}",
                self.decimals
            ));
        }
        Ok(())
    }

    /// Render a value with this configuration's locale
    pub fn render(&self, value: f64, decimals: u8, mode: DisplayFormat) -> String {
        format_with(value, decimals, mode, self.locale)
    }

    /// Power-on state for this configuration
    pub fn initial_state(&self) -> CalculatorState {
        let decimals = self.decimals.min(MAX_DECIMALS);
        CalculatorState {
            display: self.render(0.0, decimals, self.display_format),
            beg_mode: self.begin_mode,
            date_format: self.date_format,
            decimals,
            display_format: self.display_format,
            ..CalculatorState::default()
        }
    }
}

// ============================================================================
// Preset Configurations
// ============================================================================

impl CalculatorConfig {
    /// Brazilian conventions
    /// - `1.234,50` number rendering
    /// - D.MY dates
    pub fn brazilian() -> Self {
        Self::new()
            .with_locale(NumberLocale::Brazilian)
            .with_date_format(DateFormat::Dmy)
    }

    /// Annuity-due setup: BEG mode with four decimals
    pub fn annuity_due() -> Self {
        Self::new().with_begin_mode(true).with_decimals(4)
    }
}

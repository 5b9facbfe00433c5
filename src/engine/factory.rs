// ============================================================================
// Calculator Factory
// Creates calculators with validated configuration
// ============================================================================

use super::calculator::Calculator;
use crate::domain::config::{CalculatorConfig, NumberLocale};
use crate::interfaces::EventHandler;
use crate::numeric::{DateFormat, DisplayFormat};
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a calculator from configuration
///
/// # Arguments
/// * `config` - Calculator configuration
/// * `event_handler` - Event handler for keystroke events
///
/// # Returns
/// * `Result<Calculator, String>` - Configured calculator or error
///
/// # Example
/// ```
/// use rpn_financial::prelude::*;
/// use rpn_financial::engine::factory::create_from_config;
/// use std::sync::Arc;
///
/// let config = CalculatorConfig::brazilian();
/// let calc = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(calc.display(), "0,00");
/// ```
pub fn create_from_config(
    config: CalculatorConfig,
    event_handler: Arc<dyn EventHandler>,
) -> Result<Calculator, String> {
    config.validate()?;
    Ok(Calculator::new(config, event_handler))
}

// ============================================================================
// Builder Pattern
// ============================================================================

/// Builder for creating calculators with fluent API
///
/// # Example
/// ```
/// use rpn_financial::prelude::*;
/// use rpn_financial::engine::factory::CalculatorBuilder;
/// use std::sync::Arc;
///
/// let calc = CalculatorBuilder::new()
///     .fix(4)
///     .begin_mode()
///     .day_month_year()
///     .build(Arc::new(NoOpEventHandler))
///     .unwrap();
/// assert_eq!(calc.display(), "0.0000");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CalculatorBuilder {
    config: CalculatorConfig,
}

impl CalculatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Display
    // ========================================================================

    /// Fixed notation with `decimals` fractional digits
    pub fn fix(mut self, decimals: u8) -> Self {
        self.config.decimals = decimals;
        self.config.display_format = DisplayFormat::Fix;
        self
    }

    /// Scientific notation
    pub fn scientific(mut self) -> Self {
        self.config.display_format = DisplayFormat::Sci;
        self
    }

    pub fn locale(mut self, locale: NumberLocale) -> Self {
        self.config.locale = locale;
        self
    }

    // ========================================================================
    // Modes
    // ========================================================================

    /// Payments at the start of each period
    pub fn begin_mode(mut self) -> Self {
        self.config.begin_mode = true;
        self
    }

    /// Payments at the end of each period (default)
    pub fn end_mode(mut self) -> Self {
        self.config.begin_mode = false;
        self
    }

    /// D.MY dates
    pub fn day_month_year(mut self) -> Self {
        self.config.date_format = DateFormat::Dmy;
        self
    }

    /// M.DY dates (default)
    pub fn month_day_year(mut self) -> Self {
        self.config.date_format = DateFormat::Mdy;
        self
    }

    // ========================================================================
    // Preset Configurations
    // ========================================================================

    pub fn brazilian() -> Self {
        Self {
            config: CalculatorConfig::brazilian(),
        }
    }

    pub fn annuity_due() -> Self {
        Self {
            config: CalculatorConfig::annuity_due(),
        }
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the calculator
    pub fn build(self, event_handler: Arc<dyn EventHandler>) -> Result<Calculator, String> {
        create_from_config(self.config, event_handler)
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &CalculatorConfig {
        &self.config
    }
}

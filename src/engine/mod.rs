// ============================================================================
// Engine Module
// Contains the calculator state machine and the objects that drive it
// ============================================================================

mod calculator;
mod shared;
mod transition;

pub mod factory;

pub use calculator::Calculator;
pub use factory::{create_from_config, CalculatorBuilder};
pub use shared::SharedCalculator;
pub use transition::transition;

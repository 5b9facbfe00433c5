// ============================================================================
// Statistics Module
// Two-variable accumulator behind Σ+, Σ- and the g-shifted summary keys
// ============================================================================

mod accumulator;

pub use accumulator::{Regression, StatsAccumulator};

// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod event_handler;
#[cfg(feature = "serde")]
mod state_store;

pub use event_handler::{CalculatorEvent, EventHandler, LoggingEventHandler, NoOpEventHandler};
#[cfg(feature = "serde")]
pub use state_store::{state_from_json, state_to_json, MemoryStateStore, StateStore, StoreError};

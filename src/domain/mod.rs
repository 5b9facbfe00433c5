// ============================================================================
// Domain Models Module
// Keys, entry buffer, calculator state and configuration
// ============================================================================

pub mod config;
pub mod entry;
pub mod key;
pub mod state;

pub use config::{CalculatorConfig, NumberLocale};
pub use entry::{EntryBuffer, MAX_ENTRY_LEN};
pub use key::{ArithOp, FuncKey, Key, KeyAction, KeyEvent, KeyValue, PASTE_INPUT_ID};
pub use state::{
    CalculatorState, Modifier, PendingOp, Stack, StateSnapshot, DEFAULT_DECIMALS,
    MEMORY_REGISTERS,
};

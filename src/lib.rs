// ============================================================================
// Financial RPN Calculator Library
// Deterministic keystroke engine for a four-level RPN financial calculator
// ============================================================================

//! # RPN Financial
//!
//! A deterministic state machine emulating a financial RPN calculator.
//!
//! ## Features
//!
//! - **Four-level RPN stack** with last-x, twenty storage registers and
//!   STO/RCL register arithmetic
//! - **Time value of money**: solve any of n, i, PV, PMT, FV in BEG or END mode
//! - **Cash flows**: CF0/CFj/Nj ledger with NPV and IRR
//! - **Amortization, simple interest, depreciation** (SL, SOYD, DB)
//! - **Bonds**: price and yield to maturity
//! - **Statistics**: Σ+/Σ-, means, standard deviation, linear estimates
//! - **Calendar arithmetic** in M.DY and D.MY encodings
//! - **Lenient JSON persistence** of the whole state
//!
//! ## Example
//!
//! ```rust
//! use rpn_financial::prelude::*;
//! use std::sync::Arc;
//!
//! let mut calc = Calculator::new(CalculatorConfig::default(), Arc::new(NoOpEventHandler));
//!
//! // 12 n  1 i  1000 CHS PV  0 FV  PMT
//! calc.press_all([Key::Digit(1), Key::Digit(2), Key::Fin(FinRegister::N)]);
//! calc.press_all([Key::Digit(1), Key::Fin(FinRegister::I)]);
//! calc.press_all([Key::Digit(1), Key::Digit(0), Key::Digit(0), Key::Digit(0)]);
//! calc.press_all([Key::Chs, Key::Fin(FinRegister::Pv)]);
//! calc.press_all([Key::Digit(0), Key::Fin(FinRegister::Fv)]);
//! calc.press(Key::Fin(FinRegister::Pmt));
//!
//! assert_eq!(calc.display(), "88.85");
//! ```

pub mod domain;
pub mod engine;
pub mod finance;
pub mod interfaces;
pub mod numeric;
pub mod stats;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        ArithOp, CalculatorConfig, CalculatorState, EntryBuffer, FuncKey, Key, KeyAction,
        KeyEvent, KeyValue, Modifier, NumberLocale, PendingOp, Stack, StateSnapshot,
    };
    pub use crate::engine::{
        create_from_config, transition, Calculator, CalculatorBuilder, SharedCalculator,
    };
    pub use crate::finance::{CashFlow, CashFlowLedger, FinRegister, FinancialRegisters};
    pub use crate::interfaces::{
        CalculatorEvent, EventHandler, LoggingEventHandler, NoOpEventHandler,
    };
    #[cfg(feature = "serde")]
    pub use crate::interfaces::{
        state_from_json, state_to_json, MemoryStateStore, StateStore, StoreError,
    };
    pub use crate::numeric::{CalcError, DateFormat, DisplayFormat};
    pub use crate::stats::StatsAccumulator;
}

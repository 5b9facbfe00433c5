// ============================================================================
// Finance Module
// Financial solvers behind the n, i, PV, PMT, FV row and its shifted legends
// ============================================================================

pub mod amortization;
pub mod bond;
pub mod cash_flow;
pub mod depreciation;
pub mod tvm;

pub use amortization::{amortize, simple_interest, AmortizationResult, MAX_SCHEDULE_PERIODS};
pub use bond::{bond_price, yield_to_maturity};
pub use cash_flow::{irr, npv, CashFlow, CashFlowLedger, MAX_REPEAT, MIN_REPEAT};
pub use depreciation::{
    depreciate, DepreciationMethod, DepreciationResult, DDB_DEFAULT_MULTIPLIER,
};
pub use tvm::{solve_tvm, tvm_residual, FinRegister, FinancialRegisters};

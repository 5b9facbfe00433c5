// ============================================================================
// Amortization & Simple Interest
// ============================================================================

use super::tvm::FinancialRegisters;
use crate::numeric::{CalcError, CalcResult};

/// Largest period count AMORT and DB depreciation will iterate over
pub const MAX_SCHEDULE_PERIODS: u32 = 100_000;

/// Outcome of amortizing a block of payments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmortizationResult {
    /// Interest portion of the amortized payments
    pub interest: f64,
    /// Principal portion of the amortized payments
    pub principal: f64,
    /// Remaining balance, the new PV register
    pub balance: f64,
    /// Periods amortized so far, the new n register
    pub periods: f64,
}

/// Amortize `payments` periods starting from the current PV balance.
///
/// Each period accrues `-(balance · i/100)` interest and applies the rest of
/// PMT to principal. A fractional count runs a whole extra period; zero or
/// negative counts amortize nothing.
///
/// # Errors
/// [`CalcError::InvalidFinancialInput`] when `payments` is not a number or
/// exceeds [`MAX_SCHEDULE_PERIODS`].
pub fn amortize(regs: &FinancialRegisters, payments: f64) -> CalcResult<AmortizationResult> {
    if payments.is_nan() || payments > f64::from(MAX_SCHEDULE_PERIODS) {
        return Err(CalcError::InvalidFinancialInput);
    }
    let rate = regs.i / 100.0;
    let mut balance = regs.pv;
    let mut interest = 0.0;
    let mut principal = 0.0;

    let periods = payments.max(0.0).ceil() as u32;
    for _ in 0..periods {
        let period_interest = -(balance * rate);
        let period_principal = regs.pmt - period_interest;
        balance += period_principal;
        interest += period_interest;
        principal += period_principal;
    }

    Ok(AmortizationResult {
        interest,
        principal,
        balance,
        periods: regs.n + payments,
    })
}

/// Simple interest on PV for n days at i % per year, 360-day basis
pub fn simple_interest(regs: &FinancialRegisters) -> f64 {
    -(regs.pv * regs.n * regs.i) / 36000.0
}

// ============================================================================
// Depreciation Schedules
// Straight-line, sum-of-the-years'-digits and declining-balance
// ============================================================================

use super::amortization::MAX_SCHEDULE_PERIODS;
use super::tvm::FinancialRegisters;
use crate::numeric::{CalcError, CalcResult};

/// DDB factor in percent, used when the i register holds no factor
pub const DDB_DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepreciationMethod {
    /// f %T
    StraightLine,
    /// f Δ%
    SumOfYearsDigits,
    /// f %
    DecliningBalance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepreciationResult {
    /// Depreciation charged in the requested year
    pub depreciation: f64,
    /// Book value at the end of the requested year
    pub book_value: f64,
}

/// Depreciation for year `year` of an asset costing PV with salvage FV over
/// n years.
///
/// SL and SOYD report the book value as `PV - depreciation · year`. The
/// declining-balance rate is `(i / 100) / n`, with [`DDB_DEFAULT_MULTIPLIER`]
/// standing in for i when it is zero, applied once per whole year.
///
/// # Errors
/// [`CalcError::InvalidFinancialInput`] when `year <= 0`, `year > n`, or the
/// year exceeds [`MAX_SCHEDULE_PERIODS`].
pub fn depreciate(
    method: DepreciationMethod,
    regs: &FinancialRegisters,
    year: f64,
) -> CalcResult<DepreciationResult> {
    let FinancialRegisters { n, pv, fv, .. } = *regs;
    if year.is_nan() || year > n || year <= 0.0 || year > f64::from(MAX_SCHEDULE_PERIODS) {
        return Err(CalcError::InvalidFinancialInput);
    }
    let basis = pv - fv;

    let result = match method {
        DepreciationMethod::StraightLine => {
            let depreciation = basis / n;
            DepreciationResult {
                depreciation,
                book_value: pv - depreciation * year,
            }
        }
        DepreciationMethod::SumOfYearsDigits => {
            let depreciation = basis * (n - year + 1.0) / (n * (n + 1.0) / 2.0);
            DepreciationResult {
                depreciation,
                book_value: pv - depreciation * year,
            }
        }
        DepreciationMethod::DecliningBalance => {
            let factor = if regs.i != 0.0 {
                regs.i
            } else {
                DDB_DEFAULT_MULTIPLIER
            };
            let rate = factor / 100.0 / n;
            let mut book_value = pv;
            let mut depreciation = 0.0;
            // Bounded by MAX_SCHEDULE_PERIODS above
            for _ in 0..year.floor() as u32 {
                depreciation = book_value * rate;
                book_value -= depreciation;
            }
            DepreciationResult {
                depreciation,
                book_value,
            }
        }
    };

    Ok(result)
}

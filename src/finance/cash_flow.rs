// ============================================================================
// Cash-Flow Ledger
// Compressed cash-flow timeline feeding NPV and IRR
// ============================================================================

use crate::numeric::{CalcError, CalcResult};
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const MIN_REPEAT: u8 = 1;
pub const MAX_REPEAT: u8 = 99;

const IRR_GUESS: f64 = 0.10;
const IRR_MAX_ITERATIONS: usize = 50;
const IRR_NPV_TOLERANCE: f64 = 1e-6;
const IRR_FLAT_DERIVATIVE: f64 = 1e-9;

/// One ledger entry: `amount` repeated `count` consecutive periods
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CashFlow {
    pub amount: f64,
    #[cfg_attr(feature = "serde", serde(alias = "repeatCount"))]
    pub count: u8,
}

impl CashFlow {
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            count: MIN_REPEAT,
        }
    }
}

/// Ordered cash-flow entries; the first entry is CF0 at period 0
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct CashFlowLedger {
    entries: SmallVec<[CashFlow; 21]>,
}

impl CashFlowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// CF0: start a new ledger with a single initial flow
    pub fn reset_with(&mut self, amount: f64) {
        self.entries.clear();
        self.entries.push(CashFlow::new(amount));
    }

    /// CFj: append a flow, returning its index j
    pub fn push(&mut self, amount: f64) -> usize {
        self.entries.push(CashFlow::new(amount));
        self.entries.len() - 1
    }

    /// Nj: set the repeat count of the last flow, clamped to 1..=99.
    ///
    /// Returns the stored count, or `None` on an empty ledger.
    pub fn set_last_count(&mut self, count: f64) -> Option<u8> {
        let last = self.entries.last_mut()?;
        let clamped = if count.is_nan() {
            MIN_REPEAT
        } else {
            count.floor().clamp(MIN_REPEAT as f64, MAX_REPEAT as f64) as u8
        };
        last.count = clamped;
        Some(clamped)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CashFlow] {
        &self.entries
    }

    /// Flat per-period sequence, each amount repeated `count` times
    pub fn expand(&self) -> Vec<f64> {
        self.entries
            .iter()
            .flat_map(|cf| std::iter::repeat(cf.amount).take(cf.count as usize))
            .collect()
    }

    /// Net present value at `rate_percent` per period
    pub fn npv(&self, rate_percent: f64) -> f64 {
        npv(&self.expand(), rate_percent / 100.0)
    }

    /// Internal rate of return in percent per period
    pub fn irr(&self) -> CalcResult<f64> {
        irr(&self.expand()).map(|rate| rate * 100.0)
    }
}

impl FromIterator<CashFlow> for CashFlowLedger {
    fn from_iter<T: IntoIterator<Item = CashFlow>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Σ cf[t] / (1+r)^t over a flat sequence, `rate` as a fraction
pub fn npv(flows: &[f64], rate: f64) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Newton-Raphson IRR over a flat sequence, returned as a fraction.
///
/// Starts at 10 % and stops after 50 iterations; a flat derivative, a
/// non-finite rate or an exhausted budget all report
/// [`CalcError::IrrNotFound`].
pub fn irr(flows: &[f64]) -> CalcResult<f64> {
    if flows.is_empty() {
        return Err(CalcError::IrrNotFound);
    }

    let mut rate = IRR_GUESS;
    for _ in 0..IRR_MAX_ITERATIONS {
        let mut value = 0.0;
        let mut slope = 0.0;
        for (t, cf) in flows.iter().enumerate() {
            let denom = (1.0 + rate).powi(t as i32);
            value += cf / denom;
            slope -= (t as f64 * cf) / (denom * (1.0 + rate));
        }

        if value.abs() < IRR_NPV_TOLERANCE {
            return Ok(rate);
        }
        if slope.abs() < IRR_FLAT_DERIVATIVE {
            tracing::trace!(rate, "IRR derivative vanished");
            return Err(CalcError::IrrNotFound);
        }

        rate -= value / slope;
        if !rate.is_finite() {
            tracing::trace!("IRR rate diverged");
            return Err(CalcError::IrrNotFound);
        }
    }

    tracing::trace!(rate, "IRR iteration budget exhausted");
    Err(CalcError::IrrNotFound)
}

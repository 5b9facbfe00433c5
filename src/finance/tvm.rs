// ============================================================================
// Time Value of Money
// Five-register annuity equation: n, i, PV, PMT, FV
// ============================================================================

use crate::numeric::{CalcError, CalcResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interest rates below this magnitude use the zero-interest formulas
const ZERO_RATE: f64 = 1e-10;

/// Starting guess for the interest-rate search (10 % per period)
const RATE_GUESS: f64 = 0.10;

const RATE_MAX_ITERATIONS: usize = 100;
const RATE_TOLERANCE: f64 = 1e-12;
const RATE_STEP: f64 = 1e-7;

/// One of the five financial registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FinRegister {
    N,
    I,
    Pv,
    Pmt,
    Fv,
}

impl FinRegister {
    pub const ALL: [FinRegister; 5] = [
        FinRegister::N,
        FinRegister::I,
        FinRegister::Pv,
        FinRegister::Pmt,
        FinRegister::Fv,
    ];

    /// Key legend for the register
    pub fn legend(&self) -> &'static str {
        match self {
            FinRegister::N => "n",
            FinRegister::I => "i",
            FinRegister::Pv => "PV",
            FinRegister::Pmt => "PMT",
            FinRegister::Fv => "FV",
        }
    }

    pub fn from_legend(legend: &str) -> Option<Self> {
        FinRegister::ALL.into_iter().find(|reg| reg.legend() == legend)
    }
}

/// Financial register set, retained across ordinary arithmetic.
///
/// Cash-flow sign convention: money received is positive, money paid out is
/// negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct FinancialRegisters {
    /// Number of periods
    pub n: f64,
    /// Interest rate per period, in percent
    pub i: f64,
    /// Present value
    #[cfg_attr(feature = "serde", serde(rename = "PV"))]
    pub pv: f64,
    /// Periodic payment
    #[cfg_attr(feature = "serde", serde(rename = "PMT"))]
    pub pmt: f64,
    /// Future value
    #[cfg_attr(feature = "serde", serde(rename = "FV"))]
    pub fv: f64,
}

impl FinancialRegisters {
    pub fn get(&self, register: FinRegister) -> f64 {
        match register {
            FinRegister::N => self.n,
            FinRegister::I => self.i,
            FinRegister::Pv => self.pv,
            FinRegister::Pmt => self.pmt,
            FinRegister::Fv => self.fv,
        }
    }

    pub fn set(&mut self, register: FinRegister, value: f64) {
        match register {
            FinRegister::N => self.n = value,
            FinRegister::I => self.i = value,
            FinRegister::Pv => self.pv = value,
            FinRegister::Pmt => self.pmt = value,
            FinRegister::Fv => self.fv = value,
        }
    }

    /// Copy with one register replaced
    pub fn with(mut self, register: FinRegister, value: f64) -> Self {
        self.set(register, value);
        self
    }
}

/// Solve the annuity equation for `solve_for`, treating the other four
/// registers as known.
///
/// PV, PMT and FV use the closed forms; a zero denominator yields NaN or an
/// infinity rather than an error, which the display shows as "Error". n uses
/// the logarithmic closed form and i a Newton-Raphson search; both report
/// [`CalcError::InvalidFinancialInput`] when no real solution exists.
///
/// # Example
/// ```
/// use rpn_financial::finance::{solve_tvm, FinRegister, FinancialRegisters};
///
/// let loan = FinancialRegisters { n: 12.0, i: 1.0, pv: -1000.0, pmt: 0.0, fv: 0.0 };
/// let pmt = solve_tvm(&loan, false, FinRegister::Pmt).unwrap();
/// assert!((pmt - 88.8488).abs() < 1e-4);
/// ```
pub fn solve_tvm(
    regs: &FinancialRegisters,
    begin_mode: bool,
    solve_for: FinRegister,
) -> CalcResult<f64> {
    let FinancialRegisters { n, i, pv, pmt, fv } = *regs;
    let rate = i / 100.0;
    let kind = if begin_mode { 1.0 } else { 0.0 };

    match solve_for {
        FinRegister::Fv => Ok(solve_fv(n, rate, pv, pmt, kind)),
        FinRegister::Pv => Ok(solve_pv(n, rate, pmt, fv, kind)),
        FinRegister::Pmt => Ok(solve_pmt(n, rate, pv, fv, kind)),
        FinRegister::N => solve_n(rate, pv, pmt, fv, kind),
        FinRegister::I => solve_rate(n, pv, pmt, fv, kind).map(|r| r * 100.0),
    }
}

/// FV + PV·(1+i)^n + PMT·(1+i·type)·((1+i)^n − 1)/i, zero when balanced
pub fn tvm_residual(n: f64, rate: f64, pv: f64, pmt: f64, fv: f64, kind: f64) -> f64 {
    if rate.abs() < ZERO_RATE {
        return pv + pmt * n + fv;
    }
    let pow = (1.0 + rate).powf(n);
    pv * pow + pmt * annuity_factor(rate, pow, kind) + fv
}

fn annuity_factor(rate: f64, pow: f64, kind: f64) -> f64 {
    (1.0 + rate * kind) * (pow - 1.0) / rate
}

fn solve_fv(n: f64, rate: f64, pv: f64, pmt: f64, kind: f64) -> f64 {
    if rate.abs() < ZERO_RATE {
        return -(pv + pmt * n);
    }
    let pow = (1.0 + rate).powf(n);
    -(pv * pow + pmt * annuity_factor(rate, pow, kind))
}

fn solve_pv(n: f64, rate: f64, pmt: f64, fv: f64, kind: f64) -> f64 {
    if rate.abs() < ZERO_RATE {
        return -(fv + pmt * n);
    }
    let pow = (1.0 + rate).powf(n);
    -(fv + pmt * annuity_factor(rate, pow, kind)) / pow
}

fn solve_pmt(n: f64, rate: f64, pv: f64, fv: f64, kind: f64) -> f64 {
    if rate.abs() < ZERO_RATE {
        return -(fv + pv) / n;
    }
    let pow = (1.0 + rate).powf(n);
    -(fv + pv * pow) / annuity_factor(rate, pow, kind)
}

fn solve_n(rate: f64, pv: f64, pmt: f64, fv: f64, kind: f64) -> CalcResult<f64> {
    let n = if rate.abs() < ZERO_RATE {
        -(pv + fv) / pmt
    } else {
        let a = pmt * (1.0 + rate * kind) / rate;
        ((a - fv) / (pv + a)).ln() / (1.0 + rate).ln()
    };

    if n.is_finite() && n >= 0.0 {
        Ok(n)
    } else {
        Err(CalcError::InvalidFinancialInput)
    }
}

fn solve_rate(n: f64, pv: f64, pmt: f64, fv: f64, kind: f64) -> CalcResult<f64> {
    if n <= 0.0 || !n.is_finite() {
        return Err(CalcError::InvalidFinancialInput);
    }

    let residual = |rate: f64| tvm_residual(n, rate, pv, pmt, fv, kind);
    let mut rate = RATE_GUESS;

    for _ in 0..RATE_MAX_ITERATIONS {
        let value = residual(rate);
        let slope = (residual(rate + RATE_STEP) - value) / RATE_STEP;
        if !slope.is_finite() || slope == 0.0 {
            break;
        }

        let next = rate - value / slope;
        if !next.is_finite() || next <= -1.0 {
            break;
        }
        if (next - rate).abs() < RATE_TOLERANCE {
            let scale = 1.0 + pv.abs() + pmt.abs() * n + fv.abs();
            if residual(next).abs() < 1e-9 * scale {
                return Ok(next);
            }
            break;
        }
        rate = next;
    }

    tracing::trace!(n, pv, pmt, fv, "interest rate search did not converge");
    Err(CalcError::InvalidFinancialInput)
}

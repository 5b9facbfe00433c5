// ============================================================================
// Bond Pricing & Yield
// Semiannual-coupon bond price and yield to maturity
// ============================================================================

use crate::numeric::days_between;
use chrono::NaiveDate;

const DAYS_PER_YEAR: f64 = 365.25;
const PAR: f64 = 100.0;

const YIELD_GUESS: f64 = 0.05;
const YIELD_MAX_ITERATIONS: usize = 20;
/// 0.01 basis point, as a fraction
const YIELD_BUMP: f64 = 0.0001;
const PRICE_TOLERANCE: f64 = 0.0001;

/// Price per 100 of face value.
///
/// `coupon_rate` and `yield_rate` are annual percentages; coupons are paid
/// semiannually. Matured or same-day bonds price at par.
pub fn bond_price(
    settlement: NaiveDate,
    maturity: NaiveDate,
    coupon_rate: f64,
    yield_rate: f64,
) -> f64 {
    let years = days_between(settlement, maturity) as f64 / DAYS_PER_YEAR;
    let periods = years * 2.0;
    if periods <= 0.0 {
        return PAR;
    }

    let r = yield_rate / 100.0 / 2.0;
    let cpn = coupon_rate / 2.0;
    let discount = (1.0 + r).powf(-periods);
    PAR * discount + (cpn / r) * (1.0 - discount)
}

/// Annual yield to maturity (percent) matching `price`.
///
/// Newton-Raphson from 5 % with a finite-difference derivative, at most 20
/// steps. A vanishing derivative falls back to a unit slope.
pub fn yield_to_maturity(
    settlement: NaiveDate,
    maturity: NaiveDate,
    coupon_rate: f64,
    price: f64,
) -> f64 {
    let mut yield_rate = YIELD_GUESS;

    for _ in 0..YIELD_MAX_ITERATIONS {
        let p = bond_price(settlement, maturity, coupon_rate, yield_rate * 100.0);
        let bumped = bond_price(
            settlement,
            maturity,
            coupon_rate,
            (yield_rate + YIELD_BUMP) * 100.0,
        );
        let diff = p - price;
        if diff.abs() < PRICE_TOLERANCE {
            break;
        }

        let derivative = (bumped - p) / YIELD_BUMP;
        let slope = if derivative == 0.0 || !derivative.is_finite() {
            1.0
        } else {
            derivative
        };
        yield_rate -= diff / slope;
    }

    yield_rate * 100.0
}

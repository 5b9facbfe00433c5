// ============================================================================
// Statistics Accumulator
// Sufficient statistics for two-variable summaries; raw samples are not kept
// ============================================================================

use crate::numeric::{CalcError, CalcResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Running sums maintained by Σ+ and Σ-
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct StatsAccumulator {
    pub n: i64,
    #[cfg_attr(feature = "serde", serde(rename = "sumX"))]
    pub sum_x: f64,
    #[cfg_attr(feature = "serde", serde(rename = "sumX2"))]
    pub sum_x2: f64,
    #[cfg_attr(feature = "serde", serde(rename = "sumY"))]
    pub sum_y: f64,
    #[cfg_attr(feature = "serde", serde(rename = "sumY2"))]
    pub sum_y2: f64,
    #[cfg_attr(feature = "serde", serde(rename = "sumXY"))]
    pub sum_xy: f64,
}

/// Least-squares line `y = slope·x + intercept` with correlation `r`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r: f64,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Σ+: add the pair and return the new count
    pub fn accumulate(&mut self, x: f64, y: f64) -> i64 {
        self.apply(x, y, 1.0);
        self.n += 1;
        self.n
    }

    /// Σ-: subtract the pair and return the new count.
    ///
    /// Mirrors [`accumulate`](Self::accumulate) without checking that the pair
    /// was ever added, so `n` can go negative.
    pub fn remove(&mut self, x: f64, y: f64) -> i64 {
        self.apply(x, y, -1.0);
        self.n -= 1;
        self.n
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn apply(&mut self, x: f64, y: f64, sign: f64) {
        self.sum_x += sign * x;
        self.sum_x2 += sign * (x * x);
        self.sum_y += sign * y;
        self.sum_y2 += sign * (y * y);
        self.sum_xy += sign * (x * y);
    }

    /// (x̄, ȳ)
    pub fn mean(&self) -> CalcResult<(f64, f64)> {
        if self.n == 0 {
            return Err(CalcError::InsufficientStatistics);
        }
        let n = self.n as f64;
        Ok((self.sum_x / n, self.sum_y / n))
    }

    /// Sample standard deviations (sx, sy)
    pub fn std_dev(&self) -> CalcResult<(f64, f64)> {
        if self.n < 2 {
            return Err(CalcError::InsufficientStatistics);
        }
        let n = self.n as f64;
        let spread =
            |sum: f64, sum_sq: f64| ((sum_sq - sum * sum / n) / (n - 1.0)).max(0.0).sqrt();
        Ok((spread(self.sum_x, self.sum_x2), spread(self.sum_y, self.sum_y2)))
    }

    /// Linear regression of y on x.
    ///
    /// Fewer than two samples, or identical x values, give the zero line with
    /// r = 0; a zero correlation denominator otherwise counts as a perfect
    /// fit (r = 1).
    pub fn regression(&self) -> Regression {
        if self.n < 2 {
            return Regression::default();
        }
        let n = self.n as f64;
        let x_spread = n * self.sum_x2 - self.sum_x * self.sum_x;
        if x_spread == 0.0 {
            return Regression::default();
        }

        let covariance = n * self.sum_xy - self.sum_x * self.sum_y;
        let slope = covariance / x_spread;
        let intercept = (self.sum_y - slope * self.sum_x) / n;

        let y_spread = n * self.sum_y2 - self.sum_y * self.sum_y;
        let r_denom = (x_spread * y_spread).sqrt();
        let r = if r_denom == 0.0 {
            1.0
        } else {
            covariance / r_denom
        };

        Regression {
            slope,
            intercept,
            r,
        }
    }

    /// x̂ for a given y, with r; zero when the line is flat
    pub fn estimate_x(&self, y: f64) -> (f64, f64) {
        let line = self.regression();
        let x_hat = if line.slope == 0.0 {
            0.0
        } else {
            (y - line.intercept) / line.slope
        };
        (x_hat, line.r)
    }

    /// ŷ for a given x, with r
    pub fn estimate_y(&self, x: f64) -> (f64, f64) {
        let line = self.regression();
        (line.slope * x + line.intercept, line.r)
    }

    /// Mean of x weighted by y: Σxy / Σy
    pub fn weighted_mean(&self) -> CalcResult<f64> {
        if self.sum_y == 0.0 {
            return Err(CalcError::InsufficientStatistics);
        }
        Ok(self.sum_xy / self.sum_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn from_pairs(pairs: &[(f64, f64)]) -> StatsAccumulator {
        let mut stats = StatsAccumulator::new();
        for &(x, y) in pairs {
            stats.accumulate(x, y);
        }
        stats
    }

    #[test]
    fn test_mean() {
        let stats = from_pairs(&[(2.0, 10.0), (4.0, 20.0), (9.0, 30.0)]);
        assert_eq!(stats.mean(), Ok((5.0, 20.0)));
    }

    #[test]
    fn test_mean_requires_samples() {
        assert_eq!(
            StatsAccumulator::new().mean(),
            Err(CalcError::InsufficientStatistics)
        );
    }

    #[test]
    fn test_std_dev() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let pairs: Vec<(f64, f64)> = xs.iter().map(|&x| (x, 1.0)).collect();
        let stats = from_pairs(&pairs);
        let (sx, sy) = stats.std_dev().unwrap();
        assert!((sx - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(sy, 0.0);

        assert_eq!(
            from_pairs(&[(1.0, 1.0)]).std_dev(),
            Err(CalcError::InsufficientStatistics)
        );
    }

    #[test]
    fn test_regression_perfect_line() {
        let stats = from_pairs(&[(1.0, 3.0), (2.0, 5.0), (3.0, 7.0), (4.0, 9.0)]);
        let line = stats.regression();
        assert!((line.slope - 2.0).abs() < 1e-12);
        assert!((line.intercept - 1.0).abs() < 1e-12);
        assert!((line.r - 1.0).abs() < 1e-12);

        let (x_hat, _) = stats.estimate_x(11.0);
        assert!((x_hat - 5.0).abs() < 1e-12);
        let (y_hat, _) = stats.estimate_y(10.0);
        assert!((y_hat - 21.0).abs() < 1e-12);
    }

    #[test]
    fn test_regression_degenerate_cases() {
        assert_eq!(from_pairs(&[(1.0, 2.0)]).regression(), Regression::default());
        assert_eq!(
            from_pairs(&[(3.0, 2.0), (3.0, 8.0)]).regression(),
            Regression::default()
        );
        // Constant y: zero correlation denominator counts as a perfect fit
        let flat = from_pairs(&[(1.0, 4.0), (2.0, 4.0), (3.0, 4.0)]).regression();
        assert_eq!(flat.slope, 0.0);
        assert_eq!(flat.r, 1.0);
        assert_eq!(from_pairs(&[(1.0, 4.0), (2.0, 4.0)]).estimate_x(4.0).0, 0.0);
    }

    #[test]
    fn test_weighted_mean() {
        // Prices 10 and 20 bought in quantities 3 and 1
        let stats = from_pairs(&[(10.0, 3.0), (20.0, 1.0)]);
        assert_eq!(stats.weighted_mean(), Ok(12.5));
        assert_eq!(
            from_pairs(&[(10.0, 0.0)]).weighted_mean(),
            Err(CalcError::InsufficientStatistics)
        );
    }

    #[test]
    fn test_remove_is_unguarded() {
        // Known boundary: removing a pair that was never added drives n negative
        let mut stats = StatsAccumulator::new();
        assert_eq!(stats.remove(3.0, 4.0), -1);
        assert_eq!(stats.sum_x, -3.0);
        assert_eq!(stats.sum_xy, -12.0);
        assert_eq!(stats.accumulate(3.0, 4.0), 0);
        assert_eq!(stats, StatsAccumulator::new());
    }

    proptest! {
        #[test]
        fn prop_accumulate_then_remove_restores_sums(
            pairs in prop::collection::vec((-1000i32..1000, -1000i32..1000), 1..20),
        ) {
            let mut stats = from_pairs(&[(5.0, 7.0)]);
            let before = stats;
            for &(x, y) in &pairs {
                stats.accumulate(x as f64, y as f64);
            }
            for &(x, y) in pairs.iter().rev() {
                stats.remove(x as f64, y as f64);
            }
            prop_assert_eq!(stats, before);
        }
    }
}

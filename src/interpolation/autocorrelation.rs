//! Lag/lead autocorrelation profile of an hourly series

use std::cmp::Ordering;

/// Two weeks of hourly lags plus one.
pub const MAX_LAG: usize = 24 * 7 * 2 + 1;

/// Mirrored autocorrelation: offsets `-L..=-1` then `1..=L`, offset 0 excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct LagProfile {
    pub offsets: Vec<i64>,
    pub correlations: Vec<f64>,
}

impl LagProfile {
    /// Compute the profile over lags `1..=max_lag`.
    ///
    /// Mean and variance ignore missing entries; each lag sums products over
    /// pairs where both sides are present and divides by the full length.
    /// Returns `None` when the variance is degenerate (no values, or constant).
    pub fn compute(values: &[Option<f64>], max_lag: usize) -> Option<Self> {
        let n = values.len();
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }

        let mean = present.iter().sum::<f64>() / present.len() as f64;
        let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / present.len() as f64;
        if !var.is_finite() || var <= f64::EPSILON * mean * mean {
            return None;
        }

        let centered: Vec<Option<f64>> = values.iter().map(|v| v.map(|x| x - mean)).collect();

        let positive: Vec<f64> = (1..=max_lag)
            .map(|lag| {
                if lag >= n {
                    return 0.0;
                }
                let sum: f64 = centered[lag..]
                    .iter()
                    .zip(&centered[..n - lag])
                    .filter_map(|(a, b)| Some((*a)? * (*b)?))
                    .sum();
                sum / n as f64 / var
            })
            .collect();

        let mut offsets = Vec::with_capacity(2 * max_lag);
        let mut correlations = Vec::with_capacity(2 * max_lag);
        for (lag, corr) in positive.iter().enumerate().rev() {
            offsets.push(-(lag as i64 + 1));
            correlations.push(*corr);
        }
        for (lag, corr) in positive.iter().enumerate() {
            offsets.push(lag as i64 + 1);
            correlations.push(*corr);
        }

        Some(Self {
            offsets,
            correlations,
        })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// The `k` most correlated offsets, highest correlation first.
    ///
    /// Ties resolve toward the earlier entry of the mirrored profile so the
    /// choice is deterministic.
    pub fn strongest(&self, k: usize) -> Vec<(i64, f64)> {
        let order = |a: &usize, b: &usize| -> Ordering {
            self.correlations[*b]
                .total_cmp(&self.correlations[*a])
                .then(a.cmp(b))
        };

        let mut idx: Vec<usize> = (0..self.len()).collect();
        let k = k.min(idx.len());
        if k == 0 {
            return Vec::new();
        }
        if k < idx.len() {
            idx.select_nth_unstable_by(k - 1, order);
            idx.truncate(k);
        }
        idx.sort_by(order);

        idx.into_iter()
            .map(|i| (self.offsets[i], self.correlations[i]))
            .collect()
    }
}

/// Number of helper offsets used to fill a series.
///
/// The observed-usage series earns more helpers the sparser it is; every
/// other series uses a fixed six.
pub fn helper_count(is_observed: bool, missing_fraction: f64) -> usize {
    const FLOOR: usize = 6;
    if !is_observed || missing_fraction <= 0.0 {
        return FLOOR;
    }
    let heuristic = ((4.012 * missing_fraction.ln() + 24.38) / 2.0).round_ties_even() * 2.0;
    if heuristic.is_finite() && heuristic > FLOOR as f64 {
        heuristic as usize
    } else {
        FLOOR
    }
}

//! Autocorrelation-driven gap filling for a single hourly series
//!
//! Missing hours are replaced by the mean of the series' own values at the
//! most correlated lag/lead offsets. Several passes let freshly filled
//! neighbours unlock rows that had no usable helper the first time round.

use tracing::debug;

use super::autocorrelation::{helper_count, LagProfile, MAX_LAG};
use crate::domain::OBSERVED;

pub const MAX_PASSES: usize = 10;

/// Result of a gap-filling run.
#[derive(Debug, Clone, PartialEq)]
pub struct GapFillOutcome {
    pub values: Vec<Option<f64>>,
    /// Helper offsets used, most correlated first
    pub offsets: Vec<i64>,
    /// Fill passes executed
    pub passes: usize,
}

impl GapFillOutcome {
    fn unchanged(values: &[Option<f64>]) -> Self {
        Self {
            values: values.to_vec(),
            offsets: Vec::new(),
            passes: 0,
        }
    }

    /// Values still missing after the last pass
    pub fn remaining(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

#[derive(Debug, Clone)]
pub struct GapFiller {
    pub max_lag: usize,
    pub max_passes: usize,
}

impl Default for GapFiller {
    fn default() -> Self {
        Self {
            max_lag: MAX_LAG,
            max_passes: MAX_PASSES,
        }
    }
}

impl GapFiller {
    pub fn new(max_lag: usize, max_passes: usize) -> Self {
        Self {
            max_lag,
            max_passes,
        }
    }

    /// Fill missing values of `column`.
    ///
    /// The output may still contain `None` when no helper value was ever
    /// available for a row; callers apply their own fallback.
    pub fn fill(&self, column: &str, values: &[Option<f64>]) -> GapFillOutcome {
        let missing = values.iter().filter(|v| v.is_none()).count();
        if missing == 0 {
            return GapFillOutcome::unchanged(values);
        }

        let Some(profile) = LagProfile::compute(values, self.max_lag) else {
            debug!(column, missing, "degenerate variance, skipping correlation fill");
            return GapFillOutcome::unchanged(values);
        };

        let k = helper_count(column == OBSERVED, missing as f64 / values.len() as f64);
        let offsets: Vec<i64> = profile
            .strongest(k)
            .into_iter()
            .map(|(offset, _)| offset)
            .collect();

        let mut current = values.to_vec();
        let mut passes = 0;
        for _ in 0..self.max_passes {
            passes += 1;

            let helpers: Vec<Vec<Option<f64>>> = offsets
                .iter()
                .map(|&offset| shift_series(&current, offset))
                .collect();

            let mut next = current.clone();
            let mut filled = 0;
            for (i, slot) in next.iter_mut().enumerate() {
                if slot.is_some() {
                    continue;
                }
                let (sum, count) = helpers
                    .iter()
                    .filter_map(|column| column[i])
                    .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                if count > 0 {
                    *slot = Some(sum / count as f64);
                    filled += 1;
                }
            }
            current = next;

            let remaining = current.iter().filter(|v| v.is_none()).count();
            if remaining == 0 || filled == 0 {
                break;
            }
        }

        let outcome = GapFillOutcome {
            values: current,
            offsets,
            passes,
        };
        debug!(
            column,
            missing,
            helpers = outcome.offsets.len(),
            passes = outcome.passes,
            remaining = outcome.remaining(),
            "correlation gap fill complete"
        );
        outcome
    }
}

/// Shift a series by `offset` positions without wrapping.
///
/// Positive offsets look into the past (`out[i] = values[i - offset]`);
/// vacated cells are missing.
pub fn shift_series(values: &[Option<f64>], offset: i64) -> Vec<Option<f64>> {
    let n = values.len() as i64;
    (0..n)
        .map(|i| {
            let src = i - offset;
            if (0..n).contains(&src) {
                values[src as usize]
            } else {
                None
            }
        })
        .collect()
}

//! Day-flattened feature construction
//!
//! Each calendar day becomes one row: the 24 hourly values of every
//! continuous feature (feature names in descending lexicographic order)
//! followed by the day's 19 calendar indicators. The target row holds the
//! day's 24 scaled observations.

use chrono::NaiveDate;
use itertools::Itertools;
use ndarray::Array2;
use std::collections::BTreeMap;
use tracing::debug;

use super::calendar::{categorical_names, one_hot, CATEGORICAL_WIDTH};
use super::scaler::{FeatureScaler, ScalePair, Scalers};
use crate::config::HourlySettings;
use crate::domain::{AlignedTable, HOURS_PER_DAY, OBSERVED, SUPPLEMENTAL};
use crate::error::{ModelError, Result};
use crate::interpolation::fallback::{backward_fill, forward_fill};
use crate::interpolation::shift_series;

/// Per-day design matrix and target.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    /// days x (24 * continuous + 19)
    pub x: Array2<f64>,
    /// days x 24, present when the table carries observations
    pub y: Option<Array2<f64>>,
    pub dates: Vec<NaiveDate>,
    /// Continuous feature names in flattening order
    pub continuous: Vec<String>,
    pub categorical: Vec<String>,
    /// Leading days whose lag columns were back-filled rather than observed
    pub backfilled_days: usize,
}

impl FeatureFrame {
    pub fn n_days(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Continuous names followed by the categorical names.
    pub fn feature_names(&self) -> Vec<String> {
        self.continuous
            .iter()
            .chain(&self.categorical)
            .cloned()
            .collect()
    }

    /// Days whose lag features are all genuine prior-day values.
    pub fn usable_days(&self) -> usize {
        self.n_days().saturating_sub(self.backfilled_days)
    }
}

pub struct FeatureBuilder<'a> {
    settings: &'a HourlySettings,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(settings: &'a HourlySettings) -> Self {
        Self { settings }
    }

    /// Continuous feature names, sorted in descending lexicographic order.
    pub fn continuous_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .settings
            .train_features
            .iter()
            .map(|f| norm_name(f))
            .collect();
        for feature in &self.settings.lagged_features {
            for day in 1..=self.settings.window {
                names.push(lag_name(feature, day));
            }
        }
        if self.settings.supplemental_data {
            names.push(SUPPLEMENTAL.to_string());
        }
        names.sort_unstable_by(|a, b| b.cmp(a));
        names
    }

    /// Width of a day row.
    pub fn n_features(&self) -> usize {
        HOURS_PER_DAY * self.continuous_names().len() + CATEGORICAL_WIDTH
    }

    /// Fit the feature and target scalers on a training table.
    pub fn fit_scalers(&self, table: &AlignedTable) -> Result<Scalers> {
        let features = FeatureScaler::fit(&self.settings.train_features, |name| table.column(name))?;
        let target = table
            .column(OBSERVED)
            .and_then(ScalePair::fit)
            .ok_or_else(|| {
                ModelError::InsufficientData(format!("column '{}' has no values", OBSERVED))
            })?;
        Ok(Scalers { features, target })
    }

    /// Build the per-day matrices with already-fit scalers.
    pub fn build(&self, table: &AlignedTable, scalers: &Scalers) -> Result<FeatureFrame> {
        if table.is_empty() {
            return Err(ModelError::InsufficientData("no full day to build features from".into()));
        }

        let mut series: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
        for feature in &self.settings.train_features {
            let values = table.column(feature).ok_or_else(|| {
                ModelError::InsufficientData(format!("required column '{}' is missing", feature))
            })?;
            // lags carry the raw values; only the `_norm` column is scaled
            if self.settings.lagged_features.contains(feature) {
                for day in 1..=self.settings.window {
                    let shifted = shift_series(values, (HOURS_PER_DAY * day) as i64);
                    series.insert(lag_name(feature, day), shifted);
                }
            }
            series.insert(norm_name(feature), scalers.features.transform(feature, values)?);
        }
        if self.settings.supplemental_data {
            let values = table.column(SUPPLEMENTAL).ok_or_else(|| {
                ModelError::InsufficientData(format!("required column '{}' is missing", SUPPLEMENTAL))
            })?;
            series.insert(SUPPLEMENTAL.to_string(), values.to_vec());
        }

        let continuous = self.continuous_names();
        let mut filled: Vec<Vec<f64>> = Vec::with_capacity(continuous.len());
        for name in &continuous {
            let values = series.get(name).ok_or_else(|| {
                ModelError::InvalidSettings(format!("lagged feature '{}' is not a training feature", name))
            })?;
            filled.push(complete(name, values)?);
        }

        let target = match table.column(OBSERVED) {
            Some(observed) if observed.iter().any(Option::is_some) => {
                Some(complete(OBSERVED, &scalers.target.transform_all(observed))?)
            }
            _ => None,
        };

        let width = HOURS_PER_DAY * continuous.len() + CATEGORICAL_WIDTH;
        let mut x_flat = Vec::with_capacity(table.n_days() * width);
        let mut y_flat = Vec::with_capacity(table.n_days() * HOURS_PER_DAY);
        let mut dates = Vec::with_capacity(table.n_days());

        let days = table
            .datetime
            .iter()
            .enumerate()
            .chunk_by(|(_, dt)| dt.date_naive());
        for (date, hours) in &days {
            let rows: Vec<usize> = hours.map(|(i, _)| i).collect();
            if rows.len() != HOURS_PER_DAY {
                return Err(ModelError::InsufficientData(format!(
                    "day {} has {} hourly rows, expected {}",
                    date,
                    rows.len(),
                    HOURS_PER_DAY
                )));
            }
            let (first, last) = (rows[0], rows[0] + HOURS_PER_DAY);

            for values in &filled {
                x_flat.extend_from_slice(&values[first..last]);
            }
            x_flat.extend_from_slice(&one_hot(&table.datetime[first]));
            if let Some(y) = &target {
                y_flat.extend_from_slice(&y[first..last]);
            }
            dates.push(date);
        }

        let n_days = dates.len();
        let x = Array2::from_shape_vec((n_days, width), x_flat)
            .map_err(|e| ModelError::InvalidTable(e.to_string()))?;
        let y = match target {
            Some(_) => Some(
                Array2::from_shape_vec((n_days, HOURS_PER_DAY), y_flat)
                    .map_err(|e| ModelError::InvalidTable(e.to_string()))?,
            ),
            None => None,
        };

        let backfilled_days = if self.settings.lagged_features.is_empty() {
            0
        } else {
            self.settings.window.min(n_days)
        };

        debug!(days = n_days, features = width, backfilled_days, "built feature frame");

        Ok(FeatureFrame {
            x,
            y,
            dates,
            continuous,
            categorical: categorical_names(),
            backfilled_days,
        })
    }
}

pub fn norm_name(feature: &str) -> String {
    format!("{}_norm", feature)
}

pub fn lag_name(feature: &str, day: usize) -> String {
    format!("{}_shifted_{}", feature, day)
}

/// Back-fill leading gaps (lagged columns start empty), forward-fill any tail.
fn complete(name: &str, values: &[Option<f64>]) -> Result<Vec<f64>> {
    forward_fill(&backward_fill(values))
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| ModelError::InsufficientData(format!("column '{}' has no values", name)))
        })
        .collect()
}

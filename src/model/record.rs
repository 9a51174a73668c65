//! Persisted model record
//!
//! A fitted model serializes to a flat mapping with upper-case keys:
//!
//! ```json
//! {
//!   "SETTINGS": {"TRAIN_FEATURES": ["temperature", "ghi"], ...},
//!   "COEFFICIENTS": [[...], ...],
//!   "INTERCEPT": [...],
//!   "FEATURE_SCALER": {"ghi": [mean, scale], "temperature": [mean, scale]},
//!   "Y_SCALER": [mean, scale],
//!   "BASELINE_METRICS": {...}
//! }
//! ```
//!
//! Floats are written with round-trip precision, so a model restored from its
//! JSON text predicts bit for bit like the original.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::elastic_net::LinearFit;
use super::hourly::FittedModelState;
use super::metrics::BaselineMetrics;
use crate::config::HourlySettings;
use crate::domain::HOURS_PER_DAY;
use crate::error::{ModelError, Result};
use crate::features::{FeatureBuilder, FeatureScaler, ScalePair, Scalers};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SerializedModel {
    pub settings: HourlySettings,
    /// 24 rows, one per hour of day, each `n_features` wide
    pub coefficients: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    pub feature_scaler: BTreeMap<String, ScalePair>,
    pub y_scaler: ScalePair,
    #[serde(default)]
    pub baseline_metrics: Option<BaselineMetrics>,
}

impl SerializedModel {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<&FittedModelState> for SerializedModel {
    fn from(state: &FittedModelState) -> Self {
        Self {
            settings: state.settings.clone(),
            coefficients: state
                .fit
                .coefficients
                .rows()
                .into_iter()
                .map(|row| row.to_vec())
                .collect(),
            intercept: state.fit.intercept.to_vec(),
            feature_scaler: state.scalers.features.to_map(),
            y_scaler: state.scalers.target,
            baseline_metrics: state.baseline_metrics.clone(),
        }
    }
}

impl TryFrom<SerializedModel> for FittedModelState {
    type Error = ModelError;

    fn try_from(record: SerializedModel) -> Result<Self> {
        record
            .settings
            .check()
            .map_err(|e| ModelError::Serialization(format!("record settings: {}", e)))?;

        let n_features = FeatureBuilder::new(&record.settings).n_features();
        if record.coefficients.len() != HOURS_PER_DAY {
            return Err(ModelError::Serialization(format!(
                "expected {} coefficient rows, found {}",
                HOURS_PER_DAY,
                record.coefficients.len()
            )));
        }
        if let Some(row) = record.coefficients.iter().find(|r| r.len() != n_features) {
            return Err(ModelError::Serialization(format!(
                "coefficient row has {} entries, settings imply {}",
                row.len(),
                n_features
            )));
        }
        if record.intercept.len() != HOURS_PER_DAY {
            return Err(ModelError::Serialization(format!(
                "expected {} intercepts, found {}",
                HOURS_PER_DAY,
                record.intercept.len()
            )));
        }
        let finite = record
            .coefficients
            .iter()
            .flatten()
            .chain(&record.intercept)
            .all(|v| v.is_finite());
        if !finite {
            return Err(ModelError::Serialization("non-finite model parameter".into()));
        }
        if !record.y_scaler.is_valid() {
            return Err(ModelError::Serialization("invalid target scaler".into()));
        }

        let features = FeatureScaler::from_map(&record.settings.train_features, &record.feature_scaler)?;
        let flat: Vec<f64> = record.coefficients.into_iter().flatten().collect();
        let coefficients = Array2::from_shape_vec((HOURS_PER_DAY, n_features), flat)
            .map_err(|e| ModelError::Serialization(e.to_string()))?;

        Ok(FittedModelState {
            settings: record.settings,
            fit: LinearFit {
                coefficients,
                intercept: Array1::from(record.intercept),
            },
            scalers: Scalers {
                features,
                target: record.y_scaler,
            },
            baseline_metrics: record.baseline_metrics,
        })
    }
}

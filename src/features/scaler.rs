//! Standardization scalers
//!
//! Scalers are fit once on training data and reused verbatim afterwards; the
//! model owns them and persists them as `[mean, scale]` pairs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ModelError, Result};

/// Zero-mean, unit-scale transform for one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ScalePair {
    pub mean: f64,
    pub scale: f64,
}

impl ScalePair {
    pub fn new(mean: f64, scale: f64) -> Self {
        Self { mean, scale }
    }

    /// Mean and population standard deviation of the present values.
    /// A zero spread scales by one so constant columns map to zero.
    pub fn fit(values: &[Option<f64>]) -> Option<Self> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }
        let n = present.len() as f64;
        let mean = present.iter().sum::<f64>() / n;
        let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        let scale = if std < 10.0 * f64::EPSILON { 1.0 } else { std };
        Some(Self { mean, scale })
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }

    pub fn inverse_transform(&self, value: f64) -> f64 {
        value * self.scale + self.mean
    }

    pub fn transform_all(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        values.iter().map(|v| v.map(|x| self.transform(x))).collect()
    }

    pub fn is_valid(&self) -> bool {
        self.mean.is_finite() && self.scale.is_finite() && self.scale > 0.0
    }
}

impl From<[f64; 2]> for ScalePair {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<ScalePair> for [f64; 2] {
    fn from(pair: ScalePair) -> Self {
        [pair.mean, pair.scale]
    }
}

/// Per-feature scale pairs, kept in training-feature order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureScaler {
    features: Vec<String>,
    pairs: Vec<ScalePair>,
}

impl FeatureScaler {
    /// Fit one pair per feature from the named columns.
    pub fn fit<'a, F>(features: &[String], mut column: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<&'a [Option<f64>]>,
    {
        let pairs = features
            .iter()
            .map(|name| {
                column(name)
                    .and_then(ScalePair::fit)
                    .ok_or_else(|| {
                        ModelError::InsufficientData(format!("feature '{}' has no values", name))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            features: features.to_vec(),
            pairs,
        })
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn pair(&self, name: &str) -> Option<ScalePair> {
        self.features
            .iter()
            .position(|f| f == name)
            .map(|i| self.pairs[i])
    }

    pub fn transform(&self, name: &str, values: &[Option<f64>]) -> Result<Vec<Option<f64>>> {
        let pair = self.pair(name).ok_or_else(|| {
            ModelError::InvalidSettings(format!("feature '{}' was not fit by the scaler", name))
        })?;
        Ok(pair.transform_all(values))
    }

    /// Mapping form used by the persisted record: name -> `[mean, scale]`.
    pub fn to_map(&self) -> BTreeMap<String, ScalePair> {
        self.features
            .iter()
            .cloned()
            .zip(self.pairs.iter().copied())
            .collect()
    }

    /// Rebuild from the mapping form; every feature must be present.
    pub fn from_map(features: &[String], map: &BTreeMap<String, ScalePair>) -> Result<Self> {
        if map.len() != features.len() {
            return Err(ModelError::Serialization(format!(
                "feature scaler has {} entries, settings name {} features",
                map.len(),
                features.len()
            )));
        }
        let pairs = features
            .iter()
            .map(|name| {
                map.get(name)
                    .copied()
                    .filter(ScalePair::is_valid)
                    .ok_or_else(|| {
                        ModelError::Serialization(format!(
                            "feature scaler entry for '{}' is missing or invalid",
                            name
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            features: features.to_vec(),
            pairs,
        })
    }
}

/// The two scalers a fitted model owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Scalers {
    pub features: FeatureScaler,
    pub target: ScalePair,
}

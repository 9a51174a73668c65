use crate::error::{ModelError, Result};
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use validator::Validate;

/// Top-level configuration for the `hourly-model` runner.
///
/// Keys are upper case throughout, in the file (`[RUN]`, `[MODEL]`) and in
/// the environment (`HOURLY__MODEL__WINDOW=3`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    pub run: RunConfig,
    #[serde(default)]
    pub model: HourlySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RunConfig {
    /// Column-oriented JSON table used for training
    pub baseline_path: PathBuf,
    /// Where the serialized model is written
    pub model_path: PathBuf,
    /// Optional table to predict once the model is fit
    pub reporting_path: Option<PathBuf>,
    pub predictions_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("HOURLY__").lowercase(false).split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let cfg: Config = figment.extract()?;
        cfg.model.check()?;
        Ok(cfg)
    }
}

/// Coordinate update order for the elastic net solver.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Selection {
    Cyclic,
    Random,
}

/// Settings consumed by the feature pipeline and the estimator.
///
/// Keys serialize in SCREAMING_SNAKE_CASE so a persisted model record reads
/// `{"TRAIN_FEATURES": [...], "WINDOW": 1, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct HourlySettings {
    /// Columns standardized and used as continuous features
    #[validate(length(min = 1, message = "at least one training feature is required"))]
    pub train_features: Vec<String>,
    /// Subset of `train_features` expanded with day-offset lags
    pub lagged_features: Vec<String>,
    /// Number of prior days to lag
    #[validate(range(max = 365))]
    pub window: usize,
    /// Append the raw `supplemental_data` column as a feature
    pub supplemental_data: bool,
    #[validate(range(min = 0.0))]
    pub alpha: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub l1_ratio: f64,
    #[validate(range(min = 1))]
    pub max_iter: usize,
    #[validate(range(min = 0.0))]
    pub tol: f64,
    pub seed: u64,
    pub selection: Selection,
}

impl Default for HourlySettings {
    fn default() -> Self {
        Self {
            train_features: vec!["temperature".to_string(), "ghi".to_string()],
            lagged_features: vec!["temperature".to_string(), "ghi".to_string()],
            window: 1,
            supplemental_data: false,
            alpha: 0.1,
            l1_ratio: 0.1,
            max_iter: 1000,
            tol: 1e-4,
            seed: 42,
            selection: Selection::Cyclic,
        }
    }
}

impl HourlySettings {
    /// Field ranges plus the cross-field rules the derive cannot express.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        let mut seen = HashSet::new();
        for feature in &self.train_features {
            if feature.trim().is_empty() {
                return Err(ModelError::InvalidSettings("empty feature name".into()));
            }
            if !seen.insert(feature.as_str()) {
                return Err(ModelError::InvalidSettings(format!(
                    "duplicate training feature '{}'",
                    feature
                )));
            }
            if feature == "observed" {
                return Err(ModelError::InvalidSettings(
                    "'observed' is the target and cannot be a training feature".into(),
                ));
            }
        }

        let mut lagged = HashSet::new();
        for feature in &self.lagged_features {
            if !seen.contains(feature.as_str()) {
                return Err(ModelError::InvalidSettings(format!(
                    "lagged feature '{}' is not a training feature",
                    feature
                )));
            }
            if !lagged.insert(feature.as_str()) {
                return Err(ModelError::InvalidSettings(format!(
                    "duplicate lagged feature '{}'",
                    feature
                )));
            }
        }

        Ok(())
    }

    /// Columns a table must carry for this configuration, target excluded.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut cols: Vec<&str> = self.train_features.iter().map(String::as_str).collect();
        if self.supplemental_data {
            cols.push(crate::domain::SUPPLEMENTAL);
        }
        cols
    }
}

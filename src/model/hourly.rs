//! Hourly baseline model
//!
//! Ties alignment, feature construction and the estimator together. A model
//! starts unfit; `fit` produces a [`FittedModelState`] that is never mutated
//! afterwards, only replaced by `refit` or by restoring from a record.

use tracing::{debug, info, warn};

use super::elastic_net::{ElasticNet, LinearFit, Regressor};
use super::metrics::BaselineMetrics;
use super::record::SerializedModel;
use crate::alignment::align;
use crate::config::HourlySettings;
use crate::domain::{AlignedTable, MeterTable, PredictionTable, HOURS_PER_DAY, OBSERVED};
use crate::error::{ModelError, Result};
use crate::features::{FeatureBuilder, Scalers};

/// Everything a fitted model needs to predict.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModelState {
    pub settings: HourlySettings,
    pub fit: LinearFit,
    pub scalers: Scalers,
    pub baseline_metrics: Option<BaselineMetrics>,
}

impl FittedModelState {
    /// Hourly predictions in original units over an aligned table; `None`
    /// where the row was reconstructed.
    fn predict_aligned(&self, table: &AlignedTable) -> Result<Vec<Option<f64>>> {
        let frame = FeatureBuilder::new(&self.settings).build(table, &self.scalers)?;
        let scaled = self.fit.predict(&frame.x)?;

        let predicted = scaled
            .iter()
            .zip(&table.interpolated)
            .map(|(value, interpolated)| {
                (!interpolated).then(|| self.scalers.target.inverse_transform(*value))
            })
            .collect();
        Ok(predicted)
    }
}

#[derive(Debug, Clone)]
pub struct HourlyModel<R: Regressor = ElasticNet> {
    settings: HourlySettings,
    regressor: R,
    state: Option<FittedModelState>,
}

impl HourlyModel<ElasticNet> {
    /// Unfit model using the elastic net configured by `settings`.
    pub fn new(settings: HourlySettings) -> Result<Self> {
        let regressor = ElasticNet::from_settings(&settings);
        Self::with_regressor(settings, regressor)
    }

    /// Restore a fitted model from its record.
    pub fn from_record(record: SerializedModel) -> Result<Self> {
        let state = FittedModelState::try_from(record)?;
        let mut model = Self::new(state.settings.clone())?;
        model.state = Some(state);
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_record(SerializedModel::from_json(json)?)
    }
}

impl<R: Regressor> HourlyModel<R> {
    pub fn with_regressor(settings: HourlySettings, regressor: R) -> Result<Self> {
        settings.check()?;
        Ok(Self {
            settings,
            regressor,
            state: None,
        })
    }

    pub fn settings(&self) -> &HourlySettings {
        &self.settings
    }

    pub fn is_fit(&self) -> bool {
        self.state.is_some()
    }

    pub fn fitted_state(&self) -> Option<&FittedModelState> {
        self.state.as_ref()
    }

    pub fn baseline_metrics(&self) -> Option<&BaselineMetrics> {
        self.state.as_ref().and_then(|s| s.baseline_metrics.as_ref())
    }

    /// Fit on a baseline table. Fails with `AlreadyFitted` on a fit model.
    pub fn fit(&mut self, table: &MeterTable) -> Result<&mut Self> {
        if self.is_fit() {
            return Err(ModelError::AlreadyFitted);
        }
        self.refit(table)
    }

    /// Fit on a baseline table, discarding any previous state.
    pub fn refit(&mut self, table: &MeterTable) -> Result<&mut Self> {
        let alignment = align(table)?;
        let aligned = &alignment.table;
        self.require_columns(aligned, true)?;

        let builder = FeatureBuilder::new(&self.settings);
        let scalers = builder.fit_scalers(aligned)?;
        let frame = builder.build(aligned, &scalers)?;
        let y = frame.y.as_ref().ok_or_else(|| {
            ModelError::InsufficientData(format!("column '{}' has no values", OBSERVED))
        })?;
        if frame.usable_days() == 0 {
            warn!(
                days = frame.n_days(),
                window = self.settings.window,
                "every training day has back-filled lag features"
            );
        }

        let fit = self.regressor.fit(&frame.x, y)?;
        if fit.coefficients.dim() != (HOURS_PER_DAY, frame.n_features())
            || fit.intercept.len() != HOURS_PER_DAY
        {
            return Err(ModelError::InvalidTable(format!(
                "regressor returned {:?} coefficients and {} intercepts",
                fit.coefficients.dim(),
                fit.intercept.len()
            )));
        }
        let num_params = fit.n_params();

        let mut state = FittedModelState {
            settings: self.settings.clone(),
            fit,
            scalers,
            baseline_metrics: None,
        };
        let predicted = state.predict_aligned(aligned)?;
        let observed = aligned.column(OBSERVED).unwrap_or_default();
        let metrics = BaselineMetrics::calculate(observed, &predicted, num_params)?;

        info!(
            days = frame.n_days(),
            features = frame.n_features(),
            params = num_params,
            rmse = metrics.rmse,
            r_squared = metrics.r_squared,
            "fit hourly model"
        );

        state.baseline_metrics = Some(metrics);
        self.state = Some(state);
        Ok(self)
    }

    /// Predict hourly consumption for a table, indexed on its own timestamps.
    pub fn predict(&self, table: &MeterTable) -> Result<PredictionTable> {
        let state = self.state.as_ref().ok_or(ModelError::NotFitted)?;

        let alignment = align(table)?;
        self.require_columns(&alignment.table, false)?;
        let predicted = state.predict_aligned(&alignment.table)?;

        let columns = alignment
            .table
            .columns
            .iter()
            .map(|(name, values)| (name.clone(), alignment.reindex(values)))
            .collect();
        let output = PredictionTable {
            datetime: alignment.reindexed_datetime(),
            columns,
            predicted: alignment.reindex(&predicted),
        };

        debug!(
            rows = output.len(),
            missing = output.predicted.iter().filter(|p| p.is_none()).count(),
            "predicted hourly table"
        );
        Ok(output)
    }

    pub fn to_record(&self) -> Result<SerializedModel> {
        let state = self.state.as_ref().ok_or(ModelError::NotFitted)?;
        Ok(SerializedModel::from(state))
    }

    pub fn to_json(&self) -> Result<String> {
        self.to_record()?.to_json()
    }

    /// Every configured feature must be present with at least one value.
    fn require_columns(&self, table: &AlignedTable, training: bool) -> Result<()> {
        let mut required = self.settings.required_columns();
        if training {
            required.push(OBSERVED);
        }
        for name in required {
            let present = table
                .column(name)
                .map(|values| values.iter().any(Option::is_some))
                .unwrap_or(false);
            if !present {
                return Err(ModelError::InsufficientData(format!(
                    "required column '{}' is missing or empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

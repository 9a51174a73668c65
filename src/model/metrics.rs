//! Baseline fit metrics
//!
//! Computed from the training predictions over hours that carry both an
//! observation and a prediction (reconstructed hours are excluded).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, Result};

/// Goodness-of-fit summary stored with a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineMetrics {
    /// Hours with both an observation and a prediction
    pub sample_count: usize,
    /// Non-zero coefficients plus non-zero intercepts
    pub num_model_params: usize,
    pub observed_mean: f64,
    pub predicted_mean: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Square Error
    pub rmse: f64,
    /// RMSE with `n - num_model_params` degrees of freedom
    pub rmse_adj: Option<f64>,
    /// Coefficient of variation of the RMSE
    pub cvrmse: Option<f64>,
    pub cvrmse_adj: Option<f64>,
    /// Normalized Mean Bias Error
    pub nmbe: Option<f64>,
    /// R² (coefficient of determination)
    pub r_squared: f64,
    /// Largest absolute error
    pub max_error: f64,
}

impl BaselineMetrics {
    /// Metrics over paired hours; pairs with a missing side are skipped.
    pub fn calculate(
        observed: &[Option<f64>],
        predicted: &[Option<f64>],
        num_model_params: usize,
    ) -> Result<Self> {
        if observed.len() != predicted.len() {
            return Err(ModelError::InvalidTable(format!(
                "observed has {} rows, predicted has {}",
                observed.len(),
                predicted.len()
            )));
        }

        let pairs: Vec<(f64, f64)> = observed
            .iter()
            .zip(predicted)
            .filter_map(|(o, p)| Some(((*o)?, (*p)?)))
            .collect();
        if pairs.is_empty() {
            return Err(ModelError::InsufficientData(
                "no hours with both observed and predicted values".into(),
            ));
        }

        let n = pairs.len() as f64;
        let observed_mean = pairs.iter().map(|(o, _)| o).sum::<f64>() / n;
        let predicted_mean = pairs.iter().map(|(_, p)| p).sum::<f64>() / n;

        let residuals: Vec<f64> = pairs.iter().map(|(o, p)| p - o).collect();
        let sse: f64 = residuals.iter().map(|e| e * e).sum();
        let mae = residuals.iter().map(|e| e.abs()).sum::<f64>() / n;
        let rmse = (sse / n).sqrt();
        let max_error = residuals.iter().map(|e| e.abs()).fold(0.0f64, f64::max);

        let dof = pairs.len().saturating_sub(num_model_params);
        let rmse_adj = (dof > 0).then(|| (sse / dof as f64).sqrt());

        let relative = |value: f64| (observed_mean != 0.0).then(|| value / observed_mean);
        let cvrmse = relative(rmse);
        let cvrmse_adj = rmse_adj.and_then(relative);
        let nmbe = relative(residuals.iter().sum::<f64>() / n);

        let sst: f64 = pairs.iter().map(|(o, _)| (o - observed_mean).powi(2)).sum();
        let r_squared = if sst > 1e-10 { 1.0 - sse / sst } else { 0.0 };

        Ok(Self {
            sample_count: pairs.len(),
            num_model_params,
            observed_mean,
            predicted_mean,
            mae,
            rmse,
            rmse_adj,
            cvrmse,
            cvrmse_adj,
            nmbe,
            r_squared,
            max_error,
        })
    }
}

impl fmt::Display for BaselineMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Baseline: n={}, params={}, RMSE={:.3}, R²={:.3}",
            self.sample_count, self.num_model_params, self.rmse, self.r_squared
        )?;
        if let Some(cvrmse) = self.cvrmse {
            write!(f, ", CVRMSE={:.3}", cvrmse)?;
        }
        Ok(())
    }
}

//! Multi-output elastic net by coordinate descent
//!
//! Minimizes, independently for each target column,
//!
//! ```text
//! 1/(2n) ||y - Xw - b||² + alpha * l1_ratio * ||w||₁ + alpha * (1 - l1_ratio) / 2 * ||w||²
//! ```
//!
//! The intercept is recovered from the column means after fitting on centered
//! data. Convergence is judged on the duality gap once coordinate updates
//! become small relative to the largest weight.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::config::{HourlySettings, Selection};
use crate::error::{ModelError, Result};

/// Estimator seam: anything that produces a linear map from features to the
/// 24 hourly targets.
pub trait Regressor {
    fn fit(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<LinearFit>;
}

/// Fitted linear map, one coefficient row and intercept per target.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    /// targets x features
    pub coefficients: Array2<f64>,
    pub intercept: Array1<f64>,
}

impl LinearFit {
    pub fn n_targets(&self) -> usize {
        self.coefficients.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.ncols()
    }

    /// Rows of `x` mapped to targets.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(ModelError::InvalidTable(format!(
                "feature matrix has {} columns, model expects {}",
                x.ncols(),
                self.n_features()
            )));
        }
        Ok(x.dot(&self.coefficients.t()) + &self.intercept)
    }

    /// Non-zero coefficients plus non-zero intercepts.
    pub fn n_params(&self) -> usize {
        self.coefficients.iter().filter(|c| **c != 0.0).count()
            + self.intercept.iter().filter(|b| **b != 0.0).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElasticNet {
    pub alpha: f64,
    /// 0.0 = pure ridge, 1.0 = pure lasso
    pub l1_ratio: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub selection: Selection,
    pub seed: u64,
}

impl Default for ElasticNet {
    fn default() -> Self {
        Self::new(1.0, 0.5)
    }
}

impl ElasticNet {
    pub fn new(alpha: f64, l1_ratio: f64) -> Self {
        Self {
            alpha,
            l1_ratio: l1_ratio.clamp(0.0, 1.0),
            max_iter: 1000,
            tol: 1e-4,
            selection: Selection::Cyclic,
            seed: 0,
        }
    }

    pub fn from_settings(settings: &HourlySettings) -> Self {
        Self::new(settings.alpha, settings.l1_ratio)
            .with_max_iter(settings.max_iter)
            .with_tol(settings.tol)
            .with_selection(settings.selection, settings.seed)
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_selection(mut self, selection: Selection, seed: u64) -> Self {
        self.selection = selection;
        self.seed = seed;
        self
    }

    /// Coordinate descent for one centered target. Returns the weights and
    /// whether the duality gap fell below tolerance.
    fn descend(
        &self,
        x: &Array2<f64>,
        y: ArrayView1<f64>,
        col_norms: &[f64],
        rng: &mut StdRng,
    ) -> (Array1<f64>, bool) {
        let (n_samples, n_features) = x.dim();
        let n = n_samples as f64;
        let l1_reg = self.alpha * self.l1_ratio * n;
        let l2_reg = self.alpha * (1.0 - self.l1_ratio) * n;
        let tol = self.tol * y.dot(&y);

        let mut w = Array1::<f64>::zeros(n_features);
        let mut r = y.to_owned();

        for iter in 0..self.max_iter {
            let mut w_max = 0.0f64;
            let mut d_w_max = 0.0f64;

            for step in 0..n_features {
                let j = match self.selection {
                    Selection::Cyclic => step,
                    Selection::Random => rng.gen_range(0..n_features),
                };
                if col_norms[j] == 0.0 {
                    continue;
                }
                let column = x.column(j);
                let w_old = w[j];
                let rho = column.dot(&r) + col_norms[j] * w_old;
                w[j] = soft_threshold(rho, l1_reg) / (col_norms[j] + l2_reg);

                let delta = w_old - w[j];
                if delta != 0.0 {
                    r.scaled_add(delta, &column);
                }
                d_w_max = d_w_max.max(delta.abs());
                w_max = w_max.max(w[j].abs());
            }

            let last = iter + 1 == self.max_iter;
            if w_max == 0.0 || d_w_max / w_max < self.tol || last {
                let gap = duality_gap(x, y, &w, &r, l1_reg, l2_reg);
                if gap <= tol {
                    return (w, true);
                }
            }
        }
        (w, false)
    }
}

impl Regressor for ElasticNet {
    fn fit(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<LinearFit> {
        let (n_samples, n_features) = x.dim();
        if y.nrows() != n_samples {
            return Err(ModelError::InvalidTable(format!(
                "target has {} rows, features have {}",
                y.nrows(),
                n_samples
            )));
        }
        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| ModelError::InsufficientData("no rows to fit".into()))?;
        let y_mean = y
            .mean_axis(Axis(0))
            .ok_or_else(|| ModelError::InsufficientData("no rows to fit".into()))?;
        let x_c = x - &x_mean;
        let y_c = y - &y_mean;

        let col_norms: Vec<f64> = x_c.columns().into_iter().map(|c| c.dot(&c)).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let n_targets = y.ncols();
        let mut coefficients = Array2::<f64>::zeros((n_targets, n_features));
        let mut unconverged = 0usize;
        for (t, target) in y_c.columns().into_iter().enumerate() {
            let (w, converged) = self.descend(&x_c, target, &col_norms, &mut rng);
            if !converged {
                unconverged += 1;
            }
            coefficients.row_mut(t).assign(&w);
        }
        if unconverged > 0 {
            warn!(
                targets = unconverged,
                max_iter = self.max_iter,
                "coordinate descent did not converge"
            );
        }

        let intercept = &y_mean - &coefficients.dot(&x_mean);
        debug!(samples = n_samples, features = n_features, targets = n_targets, "fit elastic net");

        Ok(LinearFit {
            coefficients,
            intercept,
        })
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    value.signum() * (value.abs() - threshold).max(0.0)
}

fn duality_gap(
    x: &Array2<f64>,
    y: ArrayView1<f64>,
    w: &Array1<f64>,
    r: &Array1<f64>,
    l1_reg: f64,
    l2_reg: f64,
) -> f64 {
    let xt_a = x.t().dot(r) - l2_reg * w;
    let dual_norm = xt_a.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let r_norm2 = r.dot(r);
    let w_norm2 = w.dot(w);

    let (scale, mut gap) = if dual_norm > l1_reg {
        let scale = l1_reg / dual_norm;
        (scale, 0.5 * r_norm2 * (1.0 + scale * scale))
    } else {
        (1.0, r_norm2)
    };
    let l1_norm: f64 = w.iter().map(|v| v.abs()).sum();
    gap += l1_reg * l1_norm - scale * r.dot(&y) + 0.5 * l2_reg * (1.0 + scale * scale) * w_norm2;
    gap
}

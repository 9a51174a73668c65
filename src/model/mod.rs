//! Hourly model: estimator, fit metrics, persistence

pub mod elastic_net;
pub mod hourly;
pub mod metrics;
pub mod record;

pub use elastic_net::{ElasticNet, LinearFit, Regressor};
pub use hourly::{FittedModelState, HourlyModel};
pub use metrics::BaselineMetrics;
pub use record::SerializedModel;

//! Hourly energy baseline model
//!
//! Raw meter and weather readings are aligned onto a whole-day hourly grid,
//! their gaps reconstructed, flattened into one feature row per day and fit
//! with a 24-output elastic net.
//!
//! ```no_run
//! use hourly_energy_model::{HourlyModel, HourlySettings, MeterTable};
//!
//! # fn run(baseline: MeterTable, reporting: MeterTable) -> hourly_energy_model::Result<()> {
//! let mut model = HourlyModel::new(HourlySettings::default())?;
//! model.fit(&baseline)?;
//! let predictions = model.predict(&reporting)?;
//! let restored = HourlyModel::from_json(&model.to_json()?)?;
//! assert_eq!(restored.predict(&reporting)?, predictions);
//! # Ok(())
//! # }
//! ```

pub mod alignment;
pub mod config;
pub mod domain;
pub mod error;
pub mod features;
pub mod interpolation;
pub mod model;
pub mod telemetry;

pub use alignment::{align, Alignment};
pub use config::{HourlySettings, Selection};
pub use domain::{AlignedTable, MeterTable, PredictionTable};
pub use error::{ModelError, Result};
pub use model::{BaselineMetrics, ElasticNet, HourlyModel, LinearFit, Regressor, SerializedModel};

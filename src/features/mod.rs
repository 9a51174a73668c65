//! Feature construction: calendar indicators, scalers and the per-day matrix

pub mod builder;
pub mod calendar;
pub mod scaler;

pub use builder::{lag_name, norm_name, FeatureBuilder, FeatureFrame};
pub use calendar::{categorical_names, one_hot, CATEGORICAL_WIDTH};
pub use scaler::{FeatureScaler, ScalePair, Scalers};

pub mod table;

pub use table::*;

pub const TEMPERATURE: &str = "temperature";
pub const GHI: &str = "ghi";
pub const OBSERVED: &str = "observed";
pub const SUPPLEMENTAL: &str = "supplemental_data";
pub const PREDICTED: &str = "predicted";

/// Columns the aligner reconstructs when values are missing.
pub const INTERPOLATION_COLUMNS: [&str; 3] = [TEMPERATURE, GHI, OBSERVED];

pub const HOURS_PER_DAY: usize = 24;

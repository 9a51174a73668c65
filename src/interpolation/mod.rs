//! Missing-value reconstruction for aligned hourly tables
//!
//! Each target column goes through the correlation-based [`GapFiller`] first,
//! then the [`FallbackMethod`] chain (time interpolation, forward fill,
//! backward fill) until nothing is missing.

pub mod autocorrelation;
pub mod fallback;
pub mod gap_fill;

pub use autocorrelation::{helper_count, LagProfile, MAX_LAG};
pub use fallback::FallbackMethod;
pub use gap_fill::{shift_series, GapFillOutcome, GapFiller, MAX_PASSES};

use tracing::{debug, warn};

use crate::domain::{interpolated_key, AlignedTable};

/// Fill the listed columns of an aligned table.
///
/// Columns that are absent, entirely missing, or already carry an
/// `interpolated_<col>` flag column are left untouched. For every column that
/// is processed, `interpolated_<col>` marks the positions that were missing
/// before and hold a value afterwards.
pub fn interpolate_columns(mut table: AlignedTable, columns: &[&str]) -> AlignedTable {
    let filler = GapFiller::default();

    for &name in columns {
        let key = interpolated_key(name);
        if table.interpolated_columns.contains_key(&key) {
            continue;
        }
        let Some(original) = table.columns.get(name) else {
            continue;
        };

        let was_missing: Vec<bool> = original.iter().map(Option::is_none).collect();
        let missing = was_missing.iter().filter(|m| **m).count();
        if missing == original.len() {
            warn!(column = name, "column has no values, skipping interpolation");
            table.interpolated_columns.insert(key, vec![false; original.len()]);
            continue;
        }

        let mut values = filler.fill(name, original).values;
        for method in FallbackMethod::ORDER {
            let remaining = values.iter().filter(|v| v.is_none()).count();
            if remaining == 0 {
                break;
            }
            debug!(column = name, remaining, %method, "applying fallback fill");
            values = method.apply(&table.datetime, &values);
        }

        let flags: Vec<bool> = was_missing
            .iter()
            .zip(&values)
            .map(|(missing, v)| *missing && v.is_some())
            .collect();

        table.columns.insert(name.to_string(), values);
        table.interpolated_columns.insert(key, flags);
    }

    table
}

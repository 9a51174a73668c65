//! Tabular containers passed between pipeline stages
//!
//! Every stage consumes one table and returns a new one; nothing is mutated
//! across stage boundaries.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::HOURS_PER_DAY;
use crate::error::{ModelError, Result};

/// Raw meter/weather table as supplied by the caller.
///
/// Timestamps may be irregular, duplicated or unsorted. Serializes in column
/// form: `{"datetime": [...], "temperature": [...], "observed": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeterTable {
    pub datetime: Vec<DateTime<FixedOffset>>,
    #[serde(flatten)]
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl MeterTable {
    pub fn new(datetime: Vec<DateTime<FixedOffset>>) -> Self {
        Self {
            datetime,
            columns: BTreeMap::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.columns.insert(name.into(), values);
        self
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.datetime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datetime.is_empty()
    }

    /// Every column must line up with the timestamp column.
    pub fn check_shape(&self) -> Result<()> {
        for (name, values) in &self.columns {
            if values.len() != self.datetime.len() {
                return Err(ModelError::InvalidTable(format!(
                    "column '{}' has {} values, expected {}",
                    name,
                    values.len(),
                    self.datetime.len()
                )));
            }
        }
        Ok(())
    }
}

/// Contiguous, deduplicated hourly table covering whole calendar days.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    pub datetime: Vec<DateTime<FixedOffset>>,
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
    /// Row had a missing temperature or observed value before filling
    pub interpolated: Vec<bool>,
    /// `interpolated_<col>` flags: missing before alignment, filled after
    pub interpolated_columns: BTreeMap<String, Vec<bool>>,
}

impl AlignedTable {
    pub fn len(&self) -> usize {
        self.datetime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datetime.is_empty()
    }

    pub fn n_days(&self) -> usize {
        self.datetime.len() / HOURS_PER_DAY
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn missing_count(&self, name: &str) -> usize {
        self.column(name)
            .map(|values| values.iter().filter(|v| v.is_none()).count())
            .unwrap_or(0)
    }

    /// Flag column for a filled series, keyed as `interpolated_<col>`.
    pub fn interpolated_flags(&self, name: &str) -> Option<&[bool]> {
        self.interpolated_columns
            .get(&interpolated_key(name))
            .map(Vec::as_slice)
    }
}

pub fn interpolated_key(column: &str) -> String {
    format!("interpolated_{}", column)
}

/// Prediction output indexed by the caller's original timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionTable {
    pub datetime: Vec<DateTime<FixedOffset>>,
    #[serde(flatten)]
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
    /// `None` where the input row was reconstructed
    pub predicted: Vec<Option<f64>>,
}

impl PredictionTable {
    pub fn len(&self) -> usize {
        self.datetime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datetime.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}

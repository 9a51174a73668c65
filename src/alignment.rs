//! Series alignment
//!
//! Turns an irregular caller table into a contiguous hourly grid covering
//! whole days, removes duplicate timestamps, flags rows that had to be
//! reconstructed and fills them.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::domain::{AlignedTable, MeterTable, INTERPOLATION_COLUMNS, OBSERVED, TEMPERATURE};
use crate::error::{ModelError, Result};
use crate::interpolation::interpolate_columns;

/// Aligned table plus the mapping back to the caller's rows.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub table: AlignedTable,
    /// Caller timestamps in their original order
    pub original_datetime: Vec<DateTime<FixedOffset>>,
    /// Grid position of each caller row; `None` when it was off the hourly grid
    pub row_index: Vec<Option<usize>>,
}

impl Alignment {
    /// Project grid-indexed values back onto the caller's rows.
    ///
    /// Synthesized hours disappear, duplicated caller timestamps repeat the
    /// deduplicated value, off-grid rows are dropped.
    pub fn reindex<T: Clone>(&self, values: &[T]) -> Vec<T> {
        self.row_index
            .iter()
            .flatten()
            .map(|&pos| values[pos].clone())
            .collect()
    }

    pub fn reindexed_datetime(&self) -> Vec<DateTime<FixedOffset>> {
        self.original_datetime
            .iter()
            .zip(&self.row_index)
            .filter(|(_, pos)| pos.is_some())
            .map(|(dt, _)| *dt)
            .collect()
    }
}

/// Align a raw table onto a complete hourly grid and fill its gaps.
pub fn align(raw: &MeterTable) -> Result<Alignment> {
    raw.check_shape()?;
    if raw.is_empty() {
        return Err(ModelError::InsufficientData("table has no rows".into()));
    }

    let earliest = raw.datetime.iter().min().copied().ok_or_else(|| {
        ModelError::InsufficientData("table has no timestamps".into())
    })?;
    let offset = *earliest.offset();
    let local: Vec<DateTime<FixedOffset>> =
        raw.datetime.iter().map(|dt| dt.with_timezone(&offset)).collect();
    let latest = local.iter().max().copied().unwrap_or(earliest);

    let start = day_start(&offset, earliest.with_timezone(&offset))?;
    let end = day_start(&offset, latest)? + Duration::hours(23);
    let n_hours = ((end - start).num_hours() + 1) as usize;

    // raw rows landing on each grid hour, in caller order
    let mut candidates: Vec<Vec<usize>> = vec![Vec::new(); n_hours];
    let mut row_index = Vec::with_capacity(raw.len());
    let mut off_grid = 0usize;
    for (j, dt) in local.iter().enumerate() {
        let elapsed = *dt - start;
        let on_grid = elapsed.num_seconds() % 3600 == 0 && elapsed.subsec_nanos() == 0;
        if on_grid {
            let pos = elapsed.num_hours() as usize;
            candidates[pos].push(j);
            row_index.push(Some(pos));
        } else {
            off_grid += 1;
            row_index.push(None);
        }
    }
    if off_grid > 0 {
        warn!(rows = off_grid, "dropping rows not aligned to the hourly grid");
    }

    let observed = raw.column(OBSERVED);
    let chosen: Vec<Option<usize>> = candidates
        .iter()
        .map(|rows| pick_row(rows, observed))
        .collect();

    let columns: BTreeMap<String, Vec<Option<f64>>> = raw
        .columns
        .iter()
        .map(|(name, values)| {
            let aligned = chosen.iter().map(|row| row.and_then(|j| values[j])).collect();
            (name.clone(), aligned)
        })
        .collect();

    let datetime: Vec<DateTime<FixedOffset>> =
        (0..n_hours as i64).map(|h| start + Duration::hours(h)).collect();

    // only the columns the table carries decide the row flag
    let flag_sources: Vec<&Vec<Option<f64>>> = [TEMPERATURE, OBSERVED]
        .iter()
        .filter_map(|name| columns.get(*name))
        .collect();
    let interpolated: Vec<bool> = (0..n_hours)
        .map(|h| flag_sources.iter().any(|c| c[h].is_none()))
        .collect();

    debug!(
        raw_rows = raw.len(),
        hours = n_hours,
        flagged = interpolated.iter().filter(|f| **f).count(),
        "aligned table onto hourly grid"
    );

    let table = AlignedTable {
        datetime,
        columns,
        interpolated,
        interpolated_columns: BTreeMap::new(),
    };

    Ok(Alignment {
        table: interpolate_columns(table, &INTERPOLATION_COLUMNS),
        original_datetime: raw.datetime.clone(),
        row_index,
    })
}

/// Choose one raw row for a grid hour.
///
/// With an observed column, rows with a missing observation lose to rows
/// with one and the largest absolute observation wins, earliest row on ties.
/// Without it, or when every duplicate lacks an observation, the first row wins.
fn pick_row(rows: &[usize], observed: Option<&[Option<f64>]>) -> Option<usize> {
    let first = *rows.first()?;
    let Some(observed) = observed else {
        return Some(first);
    };
    if rows.len() == 1 {
        return Some(first);
    }

    let mut best: Option<(usize, f64)> = None;
    for &j in rows {
        if let Some(value) = observed[j] {
            match best {
                Some((_, top)) if value.abs() <= top => {}
                _ => best = Some((j, value.abs())),
            }
        }
    }
    Some(best.map(|(j, _)| j).unwrap_or(first))
}

fn day_start(offset: &FixedOffset, dt: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>> {
    let midnight = dt.date_naive().and_time(NaiveTime::MIN);
    offset
        .from_local_datetime(&midnight)
        .single()
        .ok_or_else(|| ModelError::InvalidTable(format!("cannot place {} on the grid", midnight)))
}

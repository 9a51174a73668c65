//! Calendar one-hot indicators

use chrono::{DateTime, Datelike, FixedOffset};

pub const DAYS_OF_WEEK: usize = 7;
pub const MONTHS: usize = 12;
pub const CATEGORICAL_WIDTH: usize = DAYS_OF_WEEK + MONTHS;

/// `day_1..day_7` (Monday = 1) followed by `month_1..month_12`.
pub fn categorical_names() -> Vec<String> {
    (1..=DAYS_OF_WEEK)
        .map(|d| format!("day_{}", d))
        .chain((1..=MONTHS).map(|m| format!("month_{}", m)))
        .collect()
}

/// ISO day of week, Monday = 1 through Sunday = 7
pub fn day_of_week(dt: &DateTime<FixedOffset>) -> u32 {
    dt.weekday().number_from_monday()
}

/// Indicators over the full category range, in [`categorical_names`] order.
pub fn one_hot(dt: &DateTime<FixedOffset>) -> [f64; CATEGORICAL_WIDTH] {
    let mut out = [0.0; CATEGORICAL_WIDTH];
    out[day_of_week(dt) as usize - 1] = 1.0;
    out[DAYS_OF_WEEK + dt.month() as usize - 1] = 1.0;
    out
}

mod errors;
mod features;
mod reindex;
mod roundtrip;

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use hourly_energy_model::domain::{GHI, OBSERVED, TEMPERATURE};
use hourly_energy_model::MeterTable;

pub fn start(offset_hours: i32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(offset_hours * 3600)
        .unwrap()
        .with_ymd_and_hms(2022, 10, 3, 0, 0, 0)
        .unwrap()
}

pub fn temperature_at(h: usize) -> f64 {
    let hour = (h % 24) as f64;
    let day = (h / 24) as f64;
    12.0 + 8.0 * ((hour - 9.0) / 24.0 * std::f64::consts::TAU).sin() - 0.2 * day
}

pub fn ghi_at(h: usize) -> f64 {
    let hour = (h % 24) as f64;
    if (7.0..19.0).contains(&hour) {
        600.0 * ((hour - 7.0) / 12.0 * std::f64::consts::PI).sin()
    } else {
        0.0
    }
}

pub fn load_at(h: usize) -> f64 {
    let heating = (16.0 - temperature_at(h)).max(0.0);
    1.2 + 0.15 * heating - 0.0005 * ghi_at(h) + if (h % 24) >= 17 { 0.8 } else { 0.0 }
}

/// Hourly weather plus consumption over whole days.
pub fn synthetic(days: usize, offset_hours: i32) -> MeterTable {
    let n = days * 24;
    let origin = start(offset_hours);
    MeterTable::new((0..n).map(|h| origin + Duration::hours(h as i64)).collect())
        .with_column(TEMPERATURE, (0..n).map(|h| Some(temperature_at(h))).collect())
        .with_column(GHI, (0..n).map(|h| Some(ghi_at(h))).collect())
        .with_column(OBSERVED, (0..n).map(|h| Some(load_at(h))).collect())
}

/// Same weather without the target column.
pub fn weather_only(days: usize, offset_hours: i32) -> MeterTable {
    let mut table = synthetic(days, offset_hours);
    table.columns.remove(OBSERVED);
    table
}

use chrono::Duration;
use hourly_energy_model::domain::{GHI, TEMPERATURE};
use hourly_energy_model::{HourlyModel, HourlySettings, MeterTable};

use super::{start, synthetic, weather_only};

fn fitted() -> HourlyModel {
    let mut model = HourlyModel::new(HourlySettings::default()).unwrap();
    model.fit(&synthetic(14, 0)).unwrap();
    model
}

#[test]
fn test_output_follows_caller_timestamps() {
    let model = fitted();
    let full = weather_only(3, 0);

    // drop some hours, duplicate one, add one off-grid reading
    let mut rows: Vec<usize> = (0..72).filter(|h| !(30..34).contains(h)).collect();
    rows.insert(10, 9);
    let mut datetime: Vec<_> = rows.iter().map(|&h| full.datetime[h]).collect();
    let mut temperature: Vec<_> = rows
        .iter()
        .map(|&h| full.column(TEMPERATURE).unwrap()[h])
        .collect();
    let mut ghi: Vec<_> = rows.iter().map(|&h| full.column(GHI).unwrap()[h]).collect();
    datetime.push(start(0) + Duration::minutes(90));
    temperature.push(Some(11.0));
    ghi.push(Some(0.0));

    let table = MeterTable::new(datetime.clone())
        .with_column(TEMPERATURE, temperature)
        .with_column(GHI, ghi);
    let out = model.predict(&table).unwrap();

    // off-grid row dropped, duplicate kept twice, synthesized hours absent
    assert_eq!(out.len(), rows.len());
    assert_eq!(out.datetime, datetime[..rows.len()].to_vec());
    assert_eq!(out.predicted[9], out.predicted[10]);
    assert_eq!(out.column(TEMPERATURE).unwrap().len(), rows.len());

    // rows whose temperature had to be reconstructed predict nothing; the
    // gap at hours 30..34 was synthesized, so no caller row maps onto it
    assert!(out.predicted.iter().all(Option::is_some));
}

#[test]
fn test_interpolated_inputs_predict_none() {
    let model = fitted();
    let mut table = weather_only(4, 0);
    if let Some(temps) = table.columns.get_mut(TEMPERATURE) {
        for h in [5, 6, 50] {
            temps[h] = None;
        }
    }
    let out = model.predict(&table).unwrap();
    let missing: Vec<usize> = (0..out.len()).filter(|&i| out.predicted[i].is_none()).collect();
    assert_eq!(missing, vec![5, 6, 50]);
    assert!(out.column(TEMPERATURE).unwrap().iter().all(Option::is_some));
}

#[test]
fn test_partial_days_are_padded_then_trimmed() {
    let model = fitted();
    let full = weather_only(2, 0);
    let keep = 6..40;
    let table = MeterTable::new(full.datetime[keep.clone()].to_vec())
        .with_column(TEMPERATURE, full.column(TEMPERATURE).unwrap()[keep.clone()].to_vec())
        .with_column(GHI, full.column(GHI).unwrap()[keep.clone()].to_vec());

    let out = model.predict(&table).unwrap();
    assert_eq!(out.len(), keep.len());
    assert_eq!(out.datetime[0], full.datetime[6]);
    assert!(out.predicted.iter().all(Option::is_some));
}

#[test]
fn test_predictions_track_the_load() {
    let model = fitted();
    let out = model.predict(&synthetic(7, 0)).unwrap();
    let metrics = model.baseline_metrics().unwrap();
    assert!(metrics.r_squared > 0.5, "{}", metrics);

    let observed = out.column("observed").unwrap();
    let mean_abs_error = observed
        .iter()
        .zip(&out.predicted)
        .filter_map(|(o, p)| Some((o.as_ref()? - p.as_ref()?).abs()))
        .sum::<f64>()
        / out.len() as f64;
    assert!(mean_abs_error < 1.0, "mean absolute error {}", mean_abs_error);
}

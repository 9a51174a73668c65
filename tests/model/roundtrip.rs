use hourly_energy_model::{HourlyModel, HourlySettings, SerializedModel};

use super::{synthetic, weather_only};

fn fitted() -> HourlyModel {
    let mut model = HourlyModel::new(HourlySettings::default()).unwrap();
    model.fit(&synthetic(21, 2)).unwrap();
    model
}

#[test]
fn test_json_roundtrip_predicts_identically() {
    let model = fitted();
    let reporting = weather_only(5, 2);

    let text = model.to_json().unwrap();
    let restored = HourlyModel::from_json(&text).unwrap();

    assert!(restored.is_fit());
    assert_eq!(restored.predict(&reporting).unwrap(), model.predict(&reporting).unwrap());
    assert_eq!(restored.to_json().unwrap(), text);
}

#[test]
fn test_record_roundtrip_preserves_state() {
    let model = fitted();
    let record = model.to_record().unwrap();
    let restored = HourlyModel::from_record(record.clone()).unwrap();
    assert_eq!(restored.fitted_state(), model.fitted_state());
    assert_eq!(restored.to_record().unwrap(), record);
}

#[test]
fn test_record_layout() {
    let model = fitted();
    let record = model.to_record().unwrap();

    let mut scaler_keys: Vec<&String> = record.feature_scaler.keys().collect();
    scaler_keys.sort();
    let mut features: Vec<&String> = record.settings.train_features.iter().collect();
    features.sort();
    assert_eq!(scaler_keys, features);

    assert_eq!(record.coefficients.len(), 24);
    assert_eq!(record.intercept.len(), 24);
    // 24 * (2 train + 2 lagged * WINDOW 1) + 19 calendar columns
    assert!(record.coefficients.iter().all(|row| row.len() == 24 * 4 + 19));
    assert!(record.baseline_metrics.is_some());

    let value: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
    assert_eq!(value["SETTINGS"]["WINDOW"], 1);
    assert_eq!(value["SETTINGS"]["SELECTION"], "cyclic");
}

#[test]
fn test_pretty_and_compact_json_agree() {
    let record = fitted().to_record().unwrap();
    let pretty = SerializedModel::from_json(&record.to_json_pretty().unwrap()).unwrap();
    assert_eq!(pretty, record);
}

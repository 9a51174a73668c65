use hourly_energy_model::domain::{GHI, OBSERVED, TEMPERATURE};
use hourly_energy_model::{HourlyModel, HourlySettings, ModelError};

use super::{synthetic, weather_only};

#[test]
fn test_predict_requires_fit() {
    let model = HourlyModel::new(HourlySettings::default()).unwrap();
    let err = model.predict(&weather_only(2, 0)).unwrap_err();
    assert!(matches!(err, ModelError::NotFitted));
    assert_eq!(err.to_string(), "Model must be fit before predictions can be made");
}

#[test]
fn test_second_fit_is_rejected() {
    let mut model = HourlyModel::new(HourlySettings::default()).unwrap();
    model.fit(&synthetic(4, 0)).unwrap();
    let before = model.to_json().unwrap();
    assert!(matches!(model.fit(&synthetic(6, 0)), Err(ModelError::AlreadyFitted)));
    assert_eq!(model.to_json().unwrap(), before);
}

#[test]
fn test_missing_feature_column() {
    let mut model = HourlyModel::new(HourlySettings::default()).unwrap();
    let mut table = synthetic(3, 0);
    table.columns.remove(GHI);
    assert!(matches!(model.fit(&table), Err(ModelError::InsufficientData(_))));

    let mut table = synthetic(3, 0);
    table.columns.remove(TEMPERATURE);
    assert!(matches!(model.fit(&table), Err(ModelError::InsufficientData(_))));
}

#[test]
fn test_empty_target_column() {
    let mut model = HourlyModel::new(HourlySettings::default()).unwrap();
    let mut table = synthetic(3, 0);
    table.columns.insert(OBSERVED.to_string(), vec![None; 72]);
    assert!(matches!(model.fit(&table), Err(ModelError::InsufficientData(_))));
}

#[test]
fn test_supplemental_column_required_when_enabled() {
    let settings = HourlySettings {
        supplemental_data: true,
        ..Default::default()
    };
    let mut model = HourlyModel::new(settings).unwrap();
    assert!(matches!(
        model.fit(&synthetic(3, 0)),
        Err(ModelError::InsufficientData(_))
    ));

    let table = synthetic(3, 0).with_column(
        "supplemental_data",
        (0..72).map(|h| Some((h % 5) as f64)).collect(),
    );
    model.fit(&table).unwrap();
    assert!(model.is_fit());
}

#[test]
fn test_ragged_table() {
    let mut model = HourlyModel::new(HourlySettings::default()).unwrap();
    let mut table = synthetic(2, 0);
    if let Some(values) = table.columns.get_mut(GHI) {
        values.pop();
    }
    assert!(matches!(model.fit(&table), Err(ModelError::InvalidTable(_))));
}

#[test]
fn test_malformed_records() {
    assert!(matches!(
        HourlyModel::from_json("{}"),
        Err(ModelError::Serialization(_))
    ));

    let mut model = HourlyModel::new(HourlySettings::default()).unwrap();
    model.fit(&synthetic(3, 0)).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
    value["INTERCEPT"] = serde_json::json!([1.0, 2.0]);
    assert!(matches!(
        HourlyModel::from_json(&value.to_string()),
        Err(ModelError::Serialization(_))
    ));

    let mut value: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
    value["FEATURE_SCALER"]
        .as_object_mut()
        .unwrap()
        .remove("ghi");
    assert!(matches!(
        HourlyModel::from_json(&value.to_string()),
        Err(ModelError::Serialization(_))
    ));
}

#[test]
fn test_invalid_settings() {
    let settings = HourlySettings {
        lagged_features: vec!["humidity".into()],
        ..Default::default()
    };
    assert!(matches!(
        HourlyModel::new(settings),
        Err(ModelError::InvalidSettings(_))
    ));
}

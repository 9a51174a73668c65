use hourly_energy_model::align;
use hourly_energy_model::domain::{GHI, OBSERVED, TEMPERATURE};
use hourly_energy_model::features::FeatureBuilder;
use hourly_energy_model::{HourlyModel, HourlySettings, MeterTable};
use proptest::prelude::*;
use rstest::rstest;

use super::synthetic;

#[rstest]
#[case(vec!["temperature", "ghi"], vec!["temperature", "ghi"], 1, false, 24 * 4 + 19)]
#[case(vec!["temperature", "ghi"], vec!["temperature"], 3, false, 24 * 5 + 19)]
#[case(vec!["temperature"], vec![], 7, false, 24 + 19)]
#[case(vec!["temperature", "ghi"], vec!["ghi"], 2, true, 24 * 5 + 19)]
fn test_feature_width(
    #[case] train: Vec<&str>,
    #[case] lagged: Vec<&str>,
    #[case] window: usize,
    #[case] supplemental: bool,
    #[case] expected: usize,
) {
    let settings = HourlySettings {
        train_features: train.into_iter().map(String::from).collect(),
        lagged_features: lagged.into_iter().map(String::from).collect(),
        window,
        supplemental_data: supplemental,
        ..Default::default()
    };
    assert_eq!(FeatureBuilder::new(&settings).n_features(), expected);
}

#[test]
fn test_thirty_days_with_three_day_window() {
    let settings = HourlySettings {
        window: 3,
        ..Default::default()
    };
    let aligned = align(&synthetic(30, 0)).unwrap().table;
    let builder = FeatureBuilder::new(&settings);
    let scalers = builder.fit_scalers(&aligned).unwrap();
    let frame = builder.build(&aligned, &scalers).unwrap();

    assert_eq!(frame.n_days(), 30);
    assert_eq!(frame.usable_days(), 27);
    assert_eq!(frame.n_features(), 24 * (2 + 2 * 3) + 19);
    assert_eq!(frame.continuous.len(), 8);
    assert_eq!(frame.feature_names().len(), 8 + 19);

    let mut model = HourlyModel::new(settings).unwrap();
    model.fit(&synthetic(30, 0)).unwrap();
    assert_eq!(model.baseline_metrics().unwrap().sample_count, 30 * 24);
}

#[test]
fn test_continuous_names_descend() {
    let settings = HourlySettings {
        window: 2,
        supplemental_data: true,
        ..Default::default()
    };
    let names = FeatureBuilder::new(&settings).continuous_names();
    let mut sorted = names.clone();
    sorted.sort();
    sorted.reverse();
    assert_eq!(names, sorted);
    assert_eq!(names.first().map(String::as_str), Some("temperature_shifted_2"));
    assert!(names.contains(&"supplemental_data".to_string()));
    assert!(names.contains(&"ghi_shifted_1".to_string()));
}

#[test]
fn test_six_hour_observed_gap_is_flagged() {
    let mut table = synthetic(14, 0);
    if let Some(observed) = table.columns.get_mut(OBSERVED) {
        for value in observed.iter_mut().skip(150).take(6) {
            *value = None;
        }
    }

    let aligned = align(&table).unwrap().table;
    assert_eq!(aligned.len(), 14 * 24);
    assert_eq!(aligned.missing_count(OBSERVED), 0);

    let flags = aligned.interpolated_flags(OBSERVED).unwrap();
    let flagged: Vec<usize> = (0..aligned.len()).filter(|&h| flags[h]).collect();
    assert_eq!(flagged, (150..156).collect::<Vec<_>>());
    let rows: Vec<usize> = (0..aligned.len()).filter(|&h| aligned.interpolated[h]).collect();
    assert_eq!(rows, flagged);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_aligned_columns_are_complete(
        holes in prop::collection::btree_set(0usize..24 * 6, 0..40),
        dropped in prop::collection::btree_set(0usize..24 * 6, 0..20),
    ) {
        let full = synthetic(6, 0);
        let keep: Vec<usize> = (0..24 * 6).filter(|h| !dropped.contains(h)).collect();
        let pick = |name: &str| -> Vec<Option<f64>> {
            keep.iter()
                .map(|&h| if holes.contains(&h) { None } else { full.column(name).unwrap()[h] })
                .collect()
        };
        let table = MeterTable::new(keep.iter().map(|&h| full.datetime[h]).collect())
            .with_column(TEMPERATURE, pick(TEMPERATURE))
            .with_column(GHI, pick(GHI))
            .with_column(OBSERVED, pick(OBSERVED));

        let aligned = align(&table).unwrap().table;
        prop_assert_eq!(aligned.len() % 24, 0);
        for name in [TEMPERATURE, GHI, OBSERVED] {
            prop_assert_eq!(aligned.missing_count(name), 0);
        }
        let flagged = aligned.interpolated.iter().filter(|f| **f).count();
        let expected = (0..aligned.len())
            .filter(|h| dropped.contains(h) || holes.contains(h))
            .count();
        prop_assert_eq!(flagged, expected);
    }
}

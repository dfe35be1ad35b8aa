//! Property-based tests for nutrient-doser
//!
//! These verify:
//! - Motor indices are exactly 0..n-1 in stage order for any chart
//! - Amount parsing accepts `<number><spaces><unit>` in any unit casing
//! - Inputs without a leading number are always rejected

use proptest::prelude::*;
use serde_json::{Map, Value};

use nutrient_doser::{ChartStore, DoserError, TargetAmount, VolumeUnit, build_payload};

// =============================================================================
// Motor assignment
// =============================================================================

/// Stage entries with unique nutrient names in arbitrary order
fn stage_strategy() -> impl Strategy<Value = Vec<(String, f64)>> {
    prop::collection::hash_set("[A-Za-z][A-Za-z0-9 ]{0,11}", 0..8).prop_flat_map(|names| {
        let names: Vec<String> = names.into_iter().collect();
        let len = names.len();
        (Just(names), prop::collection::vec(0.0f64..50.0, len))
            .prop_map(|(names, ratios)| names.into_iter().zip(ratios).collect::<Vec<(String, f64)>>())
    })
}

fn chart_json(entries: &[(String, f64)]) -> String {
    let stage: Map<String, Value> = entries
        .iter()
        .map(|(name, ratio)| (name.clone(), Value::from(*ratio)))
        .collect();

    let mut chart = Map::new();
    chart.insert("stage".to_string(), Value::Object(stage));
    let mut root = Map::new();
    root.insert("chart".to_string(), Value::Object(chart));
    Value::Object(root).to_string()
}

proptest! {
    /// Motor index is the nutrient's position within its stage, never anything else
    #[test]
    fn motor_indices_follow_declared_order(entries in stage_strategy()) {
        let store = ChartStore::from_json(&chart_json(&entries)).unwrap();
        let chart = store.chart("chart").unwrap();
        let payload = build_payload(chart, "stage", "1 gal").unwrap();

        prop_assert_eq!(payload.nutrients.len(), entries.len());
        for (i, (dose, (name, ratio))) in payload.nutrients.iter().zip(&entries).enumerate() {
            prop_assert_eq!(dose.motor_idx, i);
            prop_assert_eq!(&dose.name, name);
            prop_assert_eq!(dose.ml_per_gal, *ratio);
        }
    }
}

// =============================================================================
// Amount parsing
// =============================================================================

/// A unit token in random casing, with the unit it should normalize to
fn unit_strategy() -> impl Strategy<Value = (String, VolumeUnit)> {
    prop_oneof![
        Just(("ml", VolumeUnit::Ml)),
        Just(("l", VolumeUnit::L)),
        Just(("gal", VolumeUnit::Gal)),
    ]
    .prop_flat_map(|(token, unit)| {
        prop::collection::vec(any::<bool>(), token.len()).prop_map(move |upper| {
            let cased: String = token
                .chars()
                .zip(upper)
                .map(|(c, u)| if u { c.to_ascii_uppercase() } else { c })
                .collect();
            (cased, unit)
        })
    })
}

proptest! {
    /// Whole and decimal numbers parse to their float value with a normalized unit
    #[test]
    fn amount_parses_number_and_unit(
        whole in 0u32..100_000,
        frac in prop::option::of(0u32..1000),
        spaces in " {0,3}",
        (token, unit) in unit_strategy(),
    ) {
        let number = match frac {
            Some(f) => format!("{whole}.{f}"),
            None => whole.to_string(),
        };
        let input = format!("{number}{spaces}{token}");

        let parsed: TargetAmount = input.parse().unwrap();
        prop_assert_eq!(parsed.value, number.parse::<f64>().unwrap());
        prop_assert_eq!(parsed.unit, unit);
    }

    /// Unit output form is fixed regardless of input casing
    #[test]
    fn unit_display_is_fixed_form((token, unit) in unit_strategy()) {
        let parsed: TargetAmount = format!("3{token}").parse().unwrap();
        let expected = match unit {
            VolumeUnit::Ml => "Ml",
            VolumeUnit::L => "L",
            VolumeUnit::Gal => "Gal",
        };
        prop_assert_eq!(parsed.unit.to_string(), expected);
    }

    /// Anything that does not start with a digit is rejected
    #[test]
    fn amount_without_leading_digit_is_rejected(input in "[^0-9].{0,12}") {
        let result = input.parse::<TargetAmount>();
        prop_assert!(matches!(result, Err(DoserError::InvalidAmount(_))));
    }
}

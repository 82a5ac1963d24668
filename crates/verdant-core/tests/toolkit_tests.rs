//! Integration tests for configuration loading and the toolkit.
//!
//! The project's `verdant-config.yaml` documents the built-in values;
//! these tests keep the two in step and drive the toolkit end to end.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use verdant_core::{ClimateToolkit, VerdantConfig};
use verdant_types::{ActivityRecord, FactorSource, UserId};

fn project_config_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("verdant-config.yaml")
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_767_225_600 + secs, 0).unwrap()
}

#[test]
fn project_config_matches_builtins() {
    let path = project_config_path();
    if !path.exists() {
        return;
    }
    let loaded = VerdantConfig::from_file(&path).unwrap();
    let builtin = VerdantConfig::default();
    assert_eq!(loaded.factors, builtin.factors);
    assert_eq!(loaded.equivalence, builtin.equivalence);
    assert_eq!(loaded.aggregator, builtin.aggregator);
    assert_eq!(loaded.challenges, builtin.challenges);
    assert_eq!(loaded.offsets, builtin.offsets);
    assert_eq!(loaded.logging.format, builtin.logging.format);
}

#[test]
fn yaml_override_changes_estimates() {
    let config = VerdantConfig::parse(
        r#"
factors:
  table:
    train: { kind: transport, kg_co2e_per_unit: "0.05" }
"#,
    )
    .unwrap();
    let toolkit = ClimateToolkit::from_config(&config).unwrap();
    let estimate = toolkit
        .estimator()
        .estimate_transport("train", Decimal::new(100, 0), 1)
        .unwrap();
    assert_eq!(estimate.co2_kg, Decimal::new(5, 0));

    // Bus is absent from the replaced table.
    let bus = toolkit
        .estimator()
        .estimate_transport("bus", Decimal::new(100, 0), 1)
        .unwrap();
    assert_eq!(bus.factor_source, FactorSource::Default);
}

#[test]
fn activities_and_offsets_flow_into_report() {
    let toolkit = ClimateToolkit::from_config(&VerdantConfig::default()).unwrap();
    let u1 = UserId::from("u1");
    let u2 = UserId::from("u2");

    let commute = ActivityRecord::new("car_gasoline", Decimal::new(100, 0))
        .with_context("passengers", "2");
    toolkit.track_activity_at(&u1, &commute, at(0)).unwrap();

    let heating = ActivityRecord::new("electricity", Decimal::new(500, 0))
        .with_context("region", "germany");
    toolkit.track_activity_at(&u2, &heating, at(60)).unwrap();

    toolkit
        .purchase_offsets_at(&u2, "Solar Farm Development", Decimal::new(1, 1), at(120))
        .unwrap();

    let report = toolkit.aggregator().report_at(at(180)).unwrap();
    // 9.6 kg shared commute + 156 kg German grid electricity.
    assert_eq!(
        report.collective_impact.total_emissions_tracked_kg,
        Decimal::new(1656, 1)
    );
    assert_eq!(
        report.collective_impact.total_offsets_purchased_kg,
        Decimal::new(100, 0)
    );
    assert_eq!(report.total_users, 2);
    assert_eq!(report.collective_impact.total_sessions, 3);
    assert!(toolkit.aggregator().audit().unwrap().is_balanced());
}

#[test]
fn toolkit_is_shareable_across_threads() {
    let toolkit = Arc::new(ClimateToolkit::from_config(&VerdantConfig::default()).unwrap());
    let record = ActivityRecord::new("bus", Decimal::new(10, 0));

    thread::scope(|scope| {
        for i in 0..4 {
            let toolkit = Arc::clone(&toolkit);
            let record = record.clone();
            scope.spawn(move || {
                let user = UserId::new(format!("rider-{i}"));
                for _ in 0..10 {
                    toolkit.track_activity(&user, &record).unwrap();
                }
            });
        }
    });

    let report = toolkit.aggregator().report().unwrap();
    assert_eq!(report.total_users, 4);
    assert_eq!(report.collective_impact.total_sessions, 40);
    // 40 trips of 0.89 kg.
    assert_eq!(
        report.collective_impact.total_emissions_tracked_kg,
        Decimal::new(356, 1)
    );
}

#[test]
fn tree_year_override_reaches_estimates_and_report() {
    let config = VerdantConfig::parse(
        r#"
equivalence:
  kg_co2_per_tree_year: "42"
"#,
    )
    .unwrap();
    let toolkit = ClimateToolkit::from_config(&config).unwrap();

    // 218.75 km at 0.192 kg/km is 42 kg.
    let estimate = toolkit
        .estimator()
        .estimate_transport("car_gasoline", Decimal::new(21875, 2), 1)
        .unwrap();
    assert_eq!(estimate.co2_kg, Decimal::new(42, 0));
    assert_eq!(estimate.equivalences.trees, Decimal::ONE);

    toolkit
        .aggregator()
        .record_at(
            &UserId::from("u1"),
            &serde_json::json!({ "offsets_purchased": 42 }),
            at(0),
        )
        .unwrap();
    let report = toolkit.aggregator().report_at(at(60)).unwrap();
    assert_eq!(report.equivalent_impact.trees_planted, Decimal::ONE);
}

//! Integration tests for the impact aggregator.
//!
//! Replays batches of sessions in different orders and checks that the
//! stored totals, the collective report and the audit agree.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use verdant_aggregator::{AggregatorConfig, ImpactAggregator, SharedAggregator};
use verdant_types::UserId;

fn base() -> DateTime<Utc> {
    DateTime::from_timestamp(1_767_225_600, 0).unwrap()
}

fn batch() -> Vec<(UserId, Value, DateTime<Utc>)> {
    let users = ["alice", "bob", "carol"];
    (0_i64..12)
        .map(|i| {
            let user = UserId::from(users[usize::try_from(i).unwrap() % users.len()]);
            let session = match i % 4 {
                0 => json!({ "emissions_calculated": 12.5, "agents_used": ["carbon_calculator"] }),
                1 => json!({ "offsets_purchased": 100, "actions_taken": ["purchase_offsets"] }),
                2 => json!({ "policy_letters_sent": 1, "emissions_calculated": "0.75" }),
                _ => json!({ "community_challenges": 1, "emissions_calculated": null }),
            };
            (user, session, base() + TimeDelta::hours(i))
        })
        .collect()
}

fn replay(sessions: &[(UserId, Value, DateTime<Utc>)]) -> ImpactAggregator {
    let mut agg = ImpactAggregator::new(AggregatorConfig::default());
    for (user, session, at) in sessions {
        agg.record_at(user, session, *at);
    }
    agg
}

#[test]
fn replay_order_does_not_change_totals_or_report() {
    let forward = batch();
    let mut reversed = forward.clone();
    reversed.reverse();
    let mut rotated = forward.clone();
    rotated.rotate_left(5);

    let now = base() + TimeDelta::days(1);
    let expected = replay(&forward);
    for order in [&reversed, &rotated] {
        let agg = replay(order);
        for user in ["alice", "bob", "carol"] {
            let id = UserId::from(user);
            let a = expected.profile(&id);
            let b = agg.profile(&id);
            assert_eq!(a.totals(), b.totals(), "{user}");
            assert_eq!(a.sessions_completed, b.sessions_completed);
            assert_eq!(a.joined_at, b.joined_at);
            assert_eq!(a.last_active, b.last_active);
        }
        assert_eq!(expected.report_at(now), agg.report_at(now));
    }
}

#[test]
fn batch_totals() {
    let agg = replay(&batch());
    let report = agg.report_at(base() + TimeDelta::days(1));

    // Three sessions of 12.5 kg and three of 0.75 kg.
    assert_eq!(
        report.collective_impact.total_emissions_tracked_kg,
        Decimal::new(3975, 2)
    );
    assert_eq!(report.collective_impact.total_offsets_purchased_kg, Decimal::new(300, 0));
    assert_eq!(report.collective_impact.total_policy_letters_sent, 3);
    assert_eq!(report.collective_impact.total_community_challenges, 3);
    assert_eq!(report.collective_impact.total_sessions, 12);
    assert_eq!(report.total_users, 3);
    assert_eq!(report.active_users, 3);
    assert_eq!(report.engagement.average_sessions_per_user, Decimal::new(4, 0));
}

#[test]
fn null_field_is_an_anomaly_not_a_failure() {
    let agg = replay(&batch());
    let audit = agg.audit();
    assert!(audit.is_balanced());
    assert_eq!(audit.sessions_with_anomalies, 3);
}

#[test]
fn report_serializes_with_stable_keys() {
    let shared = SharedAggregator::new(AggregatorConfig::default());
    shared
        .record(&UserId::from("u1"), &json!({ "emissions_calculated": 10 }))
        .unwrap();
    shared
        .record(&UserId::from("u1"), &json!({ "emissions_calculated": 15 }))
        .unwrap();

    let report = shared.report().unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["collective_impact"]["total_emissions_tracked_kg"], "25");
    assert!(json["equivalent_impact"].get("cars_removed").is_some());
    assert!(json["engagement"].get("offset_coverage_percent").is_some());
    assert_eq!(json["total_users"], 1);
}

#[test]
fn profile_serializes_activity_log() {
    let mut agg = ImpactAggregator::default();
    let profile = agg.record_at(
        &UserId::from("u1"),
        &json!({ "emissions_calculated": 4, "actions_taken": ["calculate_footprint"] }),
        base(),
    );
    let json = serde_json::to_value(&profile).unwrap();
    let entry = &json["activity_log"][0];
    assert_eq!(entry["contribution"]["emissions_kg"], "4");
    assert_eq!(entry["session"]["actions_taken"][0], "calculate_footprint");
    assert_eq!(json["user_id"], "u1");
}

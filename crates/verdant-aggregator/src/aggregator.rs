//! The impact aggregator: an upsert store of per-user profiles.
//!
//! [`ImpactAggregator`] owns one [`UserImpactProfile`] per user. Each
//! recorded session adds its numeric contribution to the profile totals
//! and is inserted into the user's activity log. Profiles only grow;
//! nothing is evicted.
//!
//! # Ordering
//!
//! Totals are sums, `joined_at` is the earliest and `last_active` the
//! latest session timestamp, and the activity log is kept sorted by
//! `recorded_at`. A preference keeps the value from the session with the
//! latest `recorded_at` (on a tie, the later call). Replaying the same
//! sessions in any order therefore produces the same profile, except for
//! the generated session ids.
//!
//! The aggregator itself is single-writer (`&mut self`). Wrap it in a
//! [`SharedAggregator`](crate::SharedAggregator) for concurrent callers.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use verdant_estimator::EquivalenceConfig;
use verdant_types::{
    ActivityLogEntry, AuditReport, CollectiveImpact, CollectiveImpactSummary, EngagementMetrics,
    EquivalentImpact, SessionId, SessionTotals, UserId, UserImpactProfile,
};

use crate::audit::audit_profiles;
use crate::session::{parse_session, sets_preference};

/// Decimal places for report equivalents and ratios.
pub const REPORT_DECIMAL_PLACES: u32 = 1;

const ONE_HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Report constants (the `aggregator` config section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AggregatorConfig {
    /// A user counts as active when their last session is younger than this.
    #[serde(default = "default_active_window_days")]
    pub active_window_days: u32,
    /// Entries returned by [`ImpactAggregator::recent_history`].
    #[serde(default = "default_recent_activity_limit")]
    pub recent_activity_limit: usize,
    /// Yearly emissions of an average car, kg CO2e.
    #[serde(default = "default_kg_co2_per_car_year")]
    pub kg_co2_per_car_year: Decimal,
    /// Yearly emissions of an average home, kg CO2e.
    #[serde(default = "default_kg_co2_per_home_year")]
    pub kg_co2_per_home_year: Decimal,
    /// Goal reported for users with no stored profile.
    #[serde(default = "default_energy_goal_percent")]
    pub default_energy_goal_percent: Decimal,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            active_window_days: default_active_window_days(),
            recent_activity_limit: default_recent_activity_limit(),
            kg_co2_per_car_year: default_kg_co2_per_car_year(),
            kg_co2_per_home_year: default_kg_co2_per_home_year(),
            default_energy_goal_percent: default_energy_goal_percent(),
        }
    }
}

impl AggregatorConfig {
    /// Names of constants that are out of range.
    pub fn invalid_constants(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if self.active_window_days == 0 {
            invalid.push("active_window_days");
        }
        for (name, value) in [
            ("kg_co2_per_car_year", self.kg_co2_per_car_year),
            ("kg_co2_per_home_year", self.kg_co2_per_home_year),
        ] {
            if value <= Decimal::ZERO {
                invalid.push(name);
            }
        }
        if self.default_energy_goal_percent.is_sign_negative()
            || self.default_energy_goal_percent > ONE_HUNDRED
        {
            invalid.push("default_energy_goal_percent");
        }
        invalid
    }
}

const fn default_active_window_days() -> u32 {
    30
}

const fn default_recent_activity_limit() -> usize {
    5
}

const fn default_kg_co2_per_car_year() -> Decimal {
    Decimal::from_parts(4600, 0, 0, false, 0)
}

const fn default_kg_co2_per_home_year() -> Decimal {
    Decimal::from_parts(7300, 0, 0, false, 0)
}

const fn default_energy_goal_percent() -> Decimal {
    Decimal::from_parts(10, 0, 0, false, 0)
}

/// In-memory store of user impact profiles.
///
/// The tree-year constant behind `trees_planted` comes from the same
/// [`EquivalenceConfig`] the estimator uses.
#[derive(Debug, Clone, Default)]
pub struct ImpactAggregator {
    config: AggregatorConfig,
    equivalence: EquivalenceConfig,
    profiles: BTreeMap<UserId, UserImpactProfile>,
}

impl ImpactAggregator {
    /// Create an empty aggregator with the canonical equivalence constants.
    pub const fn new(config: AggregatorConfig) -> Self {
        Self::with_equivalence(config, EquivalenceConfig::canonical())
    }

    /// Create an empty aggregator sharing the estimator's equivalence constants.
    pub const fn with_equivalence(config: AggregatorConfig, equivalence: EquivalenceConfig) -> Self {
        Self {
            config,
            equivalence,
            profiles: BTreeMap::new(),
        }
    }

    /// Rebuild an aggregator from previously stored profiles.
    ///
    /// Storage is the caller's concern; this is the load half of it.
    /// Run [`audit`](Self::audit) afterwards to check the loaded totals.
    pub fn from_profiles(
        config: AggregatorConfig,
        equivalence: EquivalenceConfig,
        profiles: impl IntoIterator<Item = UserImpactProfile>,
    ) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();
        Self {
            config,
            equivalence,
            profiles,
        }
    }

    /// The report constants in use.
    pub const fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// The equivalence constants in use.
    pub const fn equivalence(&self) -> &EquivalenceConfig {
        &self.equivalence
    }

    /// Number of users with at least one recorded session.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no session has been recorded.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Every stored profile, ordered by user id.
    pub fn profiles(&self) -> impl Iterator<Item = &UserImpactProfile> {
        self.profiles.values()
    }

    /// Record a session stamped with the current time.
    pub fn record(&mut self, user_id: &UserId, session: &Value) -> UserImpactProfile {
        self.record_at(user_id, session, Utc::now())
    }

    /// Record a session at an explicit timestamp.
    ///
    /// Upserts the user's profile: an unseen user starts from a zeroed
    /// profile. Malformed numeric fields contribute zero. Returns the
    /// updated profile.
    pub fn record_at(
        &mut self,
        user_id: &UserId,
        session: &Value,
        recorded_at: DateTime<Utc>,
    ) -> UserImpactProfile {
        let parsed = parse_session(user_id, session);
        let goal = self.config.default_energy_goal_percent;
        let profile = self
            .profiles
            .entry(user_id.clone())
            .or_insert_with(|| UserImpactProfile::empty(user_id.clone(), goal));

        let totals = profile.totals().combine(parsed.totals);
        profile.total_emissions_tracked_kg = totals.emissions_kg;
        profile.offsets_purchased_kg = totals.offsets_kg;
        profile.policy_letters_sent = totals.policy_letters_sent;
        profile.community_challenges_completed = totals.community_challenges;
        profile.sessions_completed = profile.sessions_completed.saturating_add(1);

        profile.joined_at = Some(profile.joined_at.map_or(recorded_at, |j| j.min(recorded_at)));
        profile.last_active = Some(
            profile
                .last_active
                .map_or(recorded_at, |l| l.max(recorded_at)),
        );

        let at = profile
            .activity_log
            .partition_point(|e| e.recorded_at <= recorded_at);
        let later = profile.activity_log.get(at..).unwrap_or_default();
        for (key, value) in parsed.preferences {
            if !later.iter().any(|e| sets_preference(&e.session, &key)) {
                profile.preferences.insert(key, value);
            }
        }

        let entry = ActivityLogEntry {
            session_id: SessionId::new(),
            recorded_at,
            contribution: parsed.totals,
            agents_used: parsed.agents_used,
            actions_taken: parsed.actions_taken,
            anomalies: parsed.anomalies,
            session: session.clone(),
        };
        debug!(
            user_id = user_id.as_str(),
            session_id = %entry.session_id,
            emissions_kg = %entry.contribution.emissions_kg,
            anomalies = entry.anomalies.len(),
            "session recorded"
        );
        profile.activity_log.insert(at, entry);

        profile.clone()
    }

    /// The stored profile, or a zeroed default for an unseen user.
    pub fn profile(&self, user_id: &UserId) -> UserImpactProfile {
        self.profiles.get(user_id).cloned().unwrap_or_else(|| {
            UserImpactProfile::empty(user_id.clone(), self.config.default_energy_goal_percent)
        })
    }

    /// The user's most recent log entries, oldest first, at most `limit`.
    pub fn history(&self, user_id: &UserId, limit: usize) -> Vec<ActivityLogEntry> {
        self.profiles
            .get(user_id)
            .map(|p| {
                let skip = p.activity_log.len().saturating_sub(limit);
                p.activity_log.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    /// [`history`](Self::history) with the configured limit.
    pub fn recent_history(&self, user_id: &UserId) -> Vec<ActivityLogEntry> {
        self.history(user_id, self.config.recent_activity_limit)
    }

    /// The collective report as of now.
    pub fn report(&self) -> CollectiveImpactSummary {
        self.report_at(Utc::now())
    }

    /// The collective report as of `now`.
    ///
    /// Derived purely from the stored profiles; identical profiles and
    /// `now` give an identical report.
    pub fn report_at(&self, now: DateTime<Utc>) -> CollectiveImpactSummary {
        let window =
            TimeDelta::try_days(i64::from(self.config.active_window_days)).unwrap_or(TimeDelta::MAX);

        let mut totals = SessionTotals::default();
        let mut total_sessions: u64 = 0;
        let mut active_users: u64 = 0;
        for profile in self.profiles.values() {
            totals = totals.combine(profile.totals());
            total_sessions = total_sessions.saturating_add(profile.sessions_completed);
            let active = profile
                .last_active
                .is_some_and(|last| now.signed_duration_since(last) < window);
            if active {
                active_users = active_users.saturating_add(1);
            }
        }
        let total_users = u64::try_from(self.profiles.len()).unwrap_or(u64::MAX);

        let equivalent_impact = EquivalentImpact {
            cars_removed: ratio(totals.emissions_kg, self.config.kg_co2_per_car_year),
            trees_planted: ratio(totals.offsets_kg, self.equivalence.kg_co2_per_tree_year),
            homes_powered: ratio(totals.emissions_kg, self.config.kg_co2_per_home_year),
        };

        let engagement = EngagementMetrics {
            average_sessions_per_user: ratio(
                Decimal::from(total_sessions),
                Decimal::from(total_users),
            ),
            net_emissions_kg: totals.emissions_kg.saturating_sub(totals.offsets_kg),
            offset_coverage_percent: ratio(
                totals.offsets_kg.saturating_mul(ONE_HUNDRED),
                totals.emissions_kg,
            ),
        };

        info!(
            total_users,
            active_users,
            total_sessions,
            emissions_kg = %totals.emissions_kg,
            "collective report generated"
        );

        CollectiveImpactSummary {
            report_date: now,
            total_users,
            active_users,
            collective_impact: CollectiveImpact {
                total_emissions_tracked_kg: totals.emissions_kg,
                total_offsets_purchased_kg: totals.offsets_kg,
                total_policy_letters_sent: totals.policy_letters_sent,
                total_community_challenges: totals.community_challenges,
                total_sessions,
            },
            equivalent_impact,
            engagement,
        }
    }

    /// Recompute every profile's totals from its activity log.
    pub fn audit(&self) -> AuditReport {
        audit_profiles(self.profiles.values())
    }
}

/// `value / per`, rounded for reporting. Zero when `per` is zero.
fn ratio(value: Decimal, per: Decimal) -> Decimal {
    value
        .checked_div(per)
        .map_or(Decimal::ZERO, |r| r.round_dp(REPORT_DECIMAL_PLACES).normalize())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn u1() -> UserId {
        UserId::from("u1")
    }

    #[test]
    fn first_record_creates_profile() {
        let mut agg = ImpactAggregator::default();
        let profile = agg.record_at(&u1(), &json!({ "emissions_calculated": 10 }), at(1));
        assert_eq!(profile.sessions_completed, 1);
        assert_eq!(profile.total_emissions_tracked_kg, Decimal::TEN);
        assert_eq!(profile.joined_at, Some(at(1)));
        assert_eq!(profile.activity_log.len(), 1);
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn two_sessions_sum_in_report() {
        let mut agg = ImpactAggregator::default();
        agg.record_at(&u1(), &json!({ "emissions_calculated": 10 }), at(1));
        agg.record_at(&u1(), &json!({ "emissions_calculated": 15 }), at(2));
        let report = agg.report_at(at(3));
        assert_eq!(
            report.collective_impact.total_emissions_tracked_kg,
            Decimal::new(25, 0)
        );
        assert_eq!(report.total_users, 1);
        assert_eq!(report.collective_impact.total_sessions, 2);
    }

    #[test]
    fn record_order_does_not_change_totals() {
        let a = json!({ "emissions_calculated": 10.25, "policy_letters_sent": 1 });
        let b = json!({ "emissions_calculated": 4, "offsets_purchased": 7.5 });

        let mut ab = ImpactAggregator::default();
        ab.record_at(&u1(), &a, at(1));
        let ab = ab.record_at(&u1(), &b, at(2));

        let mut ba = ImpactAggregator::default();
        ba.record_at(&u1(), &b, at(2));
        let ba = ba.record_at(&u1(), &a, at(1));

        assert_eq!(ab.totals(), ba.totals());
        assert_eq!(ab.joined_at, ba.joined_at);
        assert_eq!(ab.last_active, ba.last_active);
        let ab_times: Vec<_> = ab.activity_log.iter().map(|e| e.recorded_at).collect();
        let ba_times: Vec<_> = ba.activity_log.iter().map(|e| e.recorded_at).collect();
        assert_eq!(ab_times, ba_times);
    }

    #[test]
    fn missing_emissions_field_contributes_zero() {
        let mut agg = ImpactAggregator::default();
        let profile = agg.record_at(&u1(), &json!({ "offsets_purchased": 3 }), at(1));
        assert_eq!(profile.total_emissions_tracked_kg, Decimal::ZERO);
        assert_eq!(profile.offsets_purchased_kg, Decimal::new(3, 0));
        assert_eq!(profile.sessions_completed, 1);
    }

    #[test]
    fn unseen_user_gets_default_profile() {
        let agg = ImpactAggregator::default();
        let profile = agg.profile(&UserId::from("nobody"));
        assert_eq!(profile.sessions_completed, 0);
        assert_eq!(profile.energy_reduction_goal_percent, Decimal::TEN);
        assert!(profile.joined_at.is_none());
        assert!(agg.is_empty());
    }

    #[test]
    fn history_returns_latest_entries() {
        let mut agg = ImpactAggregator::default();
        for day in 1..=7 {
            agg.record_at(
                &u1(),
                &json!({ "actions_taken": [format!("day_{day}")] }),
                at(day),
            );
        }
        agg.record_at(&UserId::from("u2"), &json!({}), at(8));

        let recent = agg.recent_history(&u1());
        assert_eq!(recent.len(), 5);
        assert_eq!(recent.first().map(ActivityLogEntry::main_action), Some("day_3"));
        assert_eq!(recent.last().map(ActivityLogEntry::main_action), Some("day_7"));
        assert_eq!(agg.history(&u1(), 100).len(), 7);
        assert!(agg.history(&UserId::from("nobody"), 5).is_empty());
    }

    #[test]
    fn active_users_respect_window() {
        let mut agg = ImpactAggregator::default();
        agg.record_at(&UserId::from("old"), &json!({}), at(1));
        agg.record_at(&UserId::from("new"), &json!({}), at(20));

        let now = at(1)
            .checked_add_signed(TimeDelta::days(30))
            .unwrap_or_default();
        let report = agg.report_at(now);
        assert_eq!(report.total_users, 2);
        assert_eq!(report.active_users, 1);
    }

    #[test]
    fn equivalents_and_engagement() {
        let mut agg = ImpactAggregator::default();
        agg.record_at(
            &u1(),
            &json!({ "emissions_calculated": 9200, "offsets_purchased": 2100 }),
            at(1),
        );
        agg.record_at(&UserId::from("u2"), &json!({ "emissions_calculated": 5400 }), at(2));
        agg.record_at(&UserId::from("u2"), &json!({}), at(3));

        let report = agg.report_at(at(4));
        // 14600 kg emitted, 2100 kg offset.
        assert_eq!(report.equivalent_impact.cars_removed, Decimal::new(32, 1));
        assert_eq!(report.equivalent_impact.trees_planted, Decimal::new(100, 0));
        assert_eq!(report.equivalent_impact.homes_powered, Decimal::new(2, 0));
        assert_eq!(report.engagement.average_sessions_per_user, Decimal::new(15, 1));
        assert_eq!(report.engagement.net_emissions_kg, Decimal::new(12500, 0));
        assert_eq!(report.engagement.offset_coverage_percent, Decimal::new(144, 1));
    }

    #[test]
    fn empty_report_is_zero() {
        let report = ImpactAggregator::default().report_at(at(1));
        assert_eq!(report.total_users, 0);
        assert_eq!(report.collective_impact, CollectiveImpact::default());
        assert_eq!(report.engagement, EngagementMetrics::default());
    }

    #[test]
    fn preferences_keep_latest_value() {
        let mut agg = ImpactAggregator::default();
        agg.record_at(&u1(), &json!({ "preferred_transportation": "car" }), at(1));
        let profile =
            agg.record_at(&u1(), &json!({ "preferred_transportation": "train" }), at(2));
        assert_eq!(
            profile.preferences.get("preferred_transportation"),
            Some(&json!("train"))
        );
    }

    #[test]
    fn trees_planted_follow_equivalence_constant() {
        let equivalence = EquivalenceConfig {
            kg_co2_per_tree_year: Decimal::new(42, 0),
            ..EquivalenceConfig::default()
        };
        let mut agg = ImpactAggregator::with_equivalence(AggregatorConfig::default(), equivalence);
        agg.record_at(&u1(), &json!({ "offsets_purchased": 42 }), at(1));
        assert_eq!(agg.report_at(at(2)).equivalent_impact.trees_planted, Decimal::ONE);
        assert_eq!(agg.equivalence().kg_co2_per_tree_year, Decimal::new(42, 0));

        let mut canonical = ImpactAggregator::default();
        canonical.record_at(&u1(), &json!({ "offsets_purchased": 42 }), at(1));
        assert_eq!(
            canonical.report_at(at(2)).equivalent_impact.trees_planted,
            Decimal::new(2, 0)
        );
    }

    #[test]
    fn preferences_follow_recorded_at_not_call_order() {
        let early = json!({ "preferred_transportation": "car", "home_type": "flat" });
        let late = json!({ "preferred_transportation": "train" });

        let mut live = ImpactAggregator::default();
        live.record_at(&u1(), &early, at(1));
        let live = live.record_at(&u1(), &late, at(2));

        let mut replayed = ImpactAggregator::default();
        replayed.record_at(&u1(), &late, at(2));
        let replayed = replayed.record_at(&u1(), &early, at(1));

        assert_eq!(live.preferences, replayed.preferences);
        assert_eq!(
            replayed.preferences.get("preferred_transportation"),
            Some(&json!("train"))
        );
        assert_eq!(replayed.preferences.get("home_type"), Some(&json!("flat")));
    }

    #[test]
    fn config_validation() {
        assert!(AggregatorConfig::default().invalid_constants().is_empty());
        let config = AggregatorConfig {
            active_window_days: 0,
            kg_co2_per_home_year: Decimal::ZERO,
            ..AggregatorConfig::default()
        };
        assert_eq!(
            config.invalid_constants(),
            vec!["active_window_days", "kg_co2_per_home_year"]
        );
    }
}

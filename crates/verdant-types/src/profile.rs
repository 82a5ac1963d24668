//! User impact profiles and the collective report built from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{SessionId, UserId};

/// Numeric contribution of one session, or the running sum of many.
///
/// Addition is exact (`Decimal`) and saturating (counters), so folding a
/// set of contributions gives the same result in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionTotals {
    /// Emissions calculated during the session, in kg CO2e.
    #[ts(as = "String")]
    pub emissions_kg: Decimal,
    /// Offsets purchased during the session, in kg CO2e.
    #[ts(as = "String")]
    pub offsets_kg: Decimal,
    /// Policy letters sent.
    pub policy_letters_sent: u64,
    /// Community challenges completed.
    pub community_challenges: u64,
}

impl SessionTotals {
    /// Sum two contributions field by field.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self {
            emissions_kg: self.emissions_kg.saturating_add(other.emissions_kg),
            offsets_kg: self.offsets_kg.saturating_add(other.offsets_kg),
            policy_letters_sent: self
                .policy_letters_sent
                .saturating_add(other.policy_letters_sent),
            community_challenges: self
                .community_challenges
                .saturating_add(other.community_challenges),
        }
    }
}

/// One entry in a user's activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActivityLogEntry {
    /// Identifier assigned when the session was recorded.
    pub session_id: SessionId,
    /// When the session was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Numeric contribution after zero-filling malformed fields.
    pub contribution: SessionTotals,
    /// Agents the session involved, if the caller reported them.
    pub agents_used: Vec<String>,
    /// Actions taken, if the caller reported them.
    pub actions_taken: Vec<String>,
    /// Names of numeric fields that were present but unusable.
    pub anomalies: Vec<String>,
    /// The session payload as received.
    pub session: serde_json::Value,
}

impl ActivityLogEntry {
    /// The first reported action, or `"consultation"` when none was given.
    pub fn main_action(&self) -> &str {
        self.actions_taken
            .first()
            .map_or("consultation", String::as_str)
    }
}

/// Cumulative impact of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserImpactProfile {
    /// The user this profile belongs to.
    pub user_id: UserId,
    /// When the first session was recorded. `None` for an unseen user.
    pub joined_at: Option<DateTime<Utc>>,
    /// When the latest session was recorded. `None` for an unseen user.
    pub last_active: Option<DateTime<Utc>>,
    /// Number of sessions recorded.
    pub sessions_completed: u64,
    /// Total emissions tracked, in kg CO2e.
    #[ts(as = "String")]
    pub total_emissions_tracked_kg: Decimal,
    /// Total offsets purchased, in kg CO2e.
    #[ts(as = "String")]
    pub offsets_purchased_kg: Decimal,
    /// Total policy letters sent.
    pub policy_letters_sent: u64,
    /// Total community challenges completed.
    pub community_challenges_completed: u64,
    /// Energy reduction the user is aiming for, in percent.
    #[ts(as = "String")]
    pub energy_reduction_goal_percent: Decimal,
    /// Non-numeric session fields, latest value wins.
    pub preferences: BTreeMap<String, serde_json::Value>,
    /// Every recorded session, oldest first.
    pub activity_log: Vec<ActivityLogEntry>,
}

impl UserImpactProfile {
    /// A zeroed profile for a user with no recorded sessions.
    pub fn empty(user_id: UserId, energy_reduction_goal_percent: Decimal) -> Self {
        Self {
            user_id,
            joined_at: None,
            last_active: None,
            sessions_completed: 0,
            total_emissions_tracked_kg: Decimal::ZERO,
            offsets_purchased_kg: Decimal::ZERO,
            policy_letters_sent: 0,
            community_challenges_completed: 0,
            energy_reduction_goal_percent,
            preferences: BTreeMap::new(),
            activity_log: Vec::new(),
        }
    }

    /// The running totals as a [`SessionTotals`].
    pub const fn totals(&self) -> SessionTotals {
        SessionTotals {
            emissions_kg: self.total_emissions_tracked_kg,
            offsets_kg: self.offsets_purchased_kg,
            policy_letters_sent: self.policy_letters_sent,
            community_challenges: self.community_challenges_completed,
        }
    }
}

/// Summed totals across every profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CollectiveImpact {
    /// Emissions tracked by all users, in kg CO2e.
    #[ts(as = "String")]
    pub total_emissions_tracked_kg: Decimal,
    /// Offsets purchased by all users, in kg CO2e.
    #[ts(as = "String")]
    pub total_offsets_purchased_kg: Decimal,
    /// Policy letters sent by all users.
    pub total_policy_letters_sent: u64,
    /// Community challenges completed by all users.
    pub total_community_challenges: u64,
    /// Sessions recorded by all users.
    pub total_sessions: u64,
}

/// Collective totals expressed as relatable equivalents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EquivalentImpact {
    /// Car-years of driving matching the tracked emissions.
    #[ts(as = "String")]
    pub cars_removed: Decimal,
    /// Tree-years of absorption matching the purchased offsets.
    #[ts(as = "String")]
    pub trees_planted: Decimal,
    /// Home-years of energy use matching the tracked emissions.
    #[ts(as = "String")]
    pub homes_powered: Decimal,
}

/// Participation ratios derived from the stored profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EngagementMetrics {
    /// Mean sessions per user, rounded to one decimal place.
    #[ts(as = "String")]
    pub average_sessions_per_user: Decimal,
    /// Tracked emissions minus purchased offsets, in kg CO2e.
    #[ts(as = "String")]
    pub net_emissions_kg: Decimal,
    /// Share of tracked emissions covered by offsets, in percent.
    #[ts(as = "String")]
    pub offset_coverage_percent: Decimal,
}

/// The collective report over every stored profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CollectiveImpactSummary {
    /// The instant the report describes.
    pub report_date: DateTime<Utc>,
    /// Number of users with at least one session.
    pub total_users: u64,
    /// Users active within the configured window before `report_date`.
    pub active_users: u64,
    /// Summed totals.
    pub collective_impact: CollectiveImpact,
    /// Relatable equivalents of the totals.
    pub equivalent_impact: EquivalentImpact,
    /// Participation ratios.
    pub engagement: EngagementMetrics,
}

/// A profile whose stored totals disagree with its activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TotalsMismatch {
    /// The profile at fault.
    pub user_id: UserId,
    /// Totals held on the profile.
    pub stored: SessionTotals,
    /// Totals recomputed from the activity log.
    pub recomputed: SessionTotals,
    /// Sessions counted on the profile.
    pub stored_sessions: u64,
    /// Entries present in the activity log.
    pub logged_sessions: u64,
}

/// Result of recomputing every profile from its activity log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AuditReport {
    /// Number of profiles checked.
    pub profiles_checked: u64,
    /// Log entries that carried zero-filled fields.
    pub sessions_with_anomalies: u64,
    /// Profiles whose totals do not match their log.
    pub mismatches: Vec<TotalsMismatch>,
}

impl AuditReport {
    /// Whether every profile matched its log.
    pub fn is_balanced(&self) -> bool {
        self.mismatches.is_empty()
    }
}

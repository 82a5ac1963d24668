//! Offset marketplace and community challenge records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{CarbonNeutralTimeline, ChallengeType, OffsetProjectType, VerificationStatus};
use crate::ids::{ChallengeId, PurchaseId, UserId};

// ---------------------------------------------------------------------------
// Offsets
// ---------------------------------------------------------------------------

/// A carbon offset project available for purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OffsetProject {
    /// Display name, unique within the catalog.
    pub name: String,
    /// Project category.
    pub project_type: OffsetProjectType,
    /// Country or region the project operates in.
    pub location: String,
    /// Price per metric ton of CO2e, in USD.
    #[ts(as = "String")]
    pub cost_per_ton: Decimal,
    /// Tons of CO2e the project can still absorb.
    #[ts(as = "String")]
    pub co2_capacity_tons: Decimal,
    /// Certifying standard (Verra, Gold Standard, ...).
    pub certification: String,
    /// Benefits beyond carbon removal.
    #[serde(default)]
    pub co_benefits: Vec<String>,
}

/// Result of browsing the offset catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProjectListing {
    /// Projects matching the filter.
    pub available_projects: Vec<OffsetProject>,
    /// Number of matching projects.
    pub total_projects: u32,
    /// Mean cost per ton of the matching projects (zero when none match).
    #[ts(as = "String")]
    pub average_cost_per_ton: Decimal,
    /// Suggested project type for this query.
    pub recommendation: OffsetProjectType,
}

/// How much a user would need to offset to reach neutrality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OffsetNeeds {
    /// Current emissions, in metric tons.
    #[ts(as = "String")]
    pub current_emissions_tons: Decimal,
    /// Reduction the user commits to before offsetting, in percent.
    #[ts(as = "String")]
    pub reduction_goal_percent: Decimal,
    /// Tons left to offset after the reduction.
    #[ts(as = "String")]
    pub recommended_offset_tons: Decimal,
    /// Cost of the recommended offsets at the average market price, in USD.
    #[ts(as = "String")]
    pub estimated_cost_usd: Decimal,
    /// How quickly the volume can be covered.
    pub carbon_neutral_timeline: CarbonNeutralTimeline,
}

/// A completed offset purchase awaiting registry verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OffsetPurchase {
    /// Unique purchase identifier.
    pub purchase_id: PurchaseId,
    /// Buyer.
    pub user_id: UserId,
    /// Project the offsets were bought from.
    pub project_name: String,
    /// Tons of CO2e offset.
    #[ts(as = "String")]
    pub tons_offset: Decimal,
    /// Total price, in USD.
    #[ts(as = "String")]
    pub total_cost_usd: Decimal,
    /// When the purchase was made.
    pub purchased_at: DateTime<Utc>,
    /// Registry verification state.
    pub verification_status: VerificationStatus,
}

// ---------------------------------------------------------------------------
// Community challenges
// ---------------------------------------------------------------------------

/// A time-boxed community challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Challenge {
    /// Unique challenge identifier.
    pub challenge_id: ChallengeId,
    /// Display name from the template.
    pub name: String,
    /// Template the challenge was created from.
    pub challenge_type: ChallengeType,
    /// What participants commit to.
    pub description: String,
    /// Suggested daily actions.
    pub daily_actions: Vec<String>,
    /// Metrics progress is measured by.
    pub success_metrics: Vec<String>,
    /// Length of the challenge.
    pub duration_days: u32,
    /// Participants the organizer hopes to recruit.
    pub target_participants: u32,
    /// Start instant.
    pub start_date: DateTime<Utc>,
    /// End instant (`start_date + duration_days`).
    pub end_date: DateTime<Utc>,
    /// CO2e reduction if every target participant takes part, in kg.
    #[ts(as = "String")]
    pub potential_reduction_kg: Decimal,
}

/// Progress snapshot of a running challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChallengeProgress {
    /// The challenge being tracked.
    pub challenge_id: ChallengeId,
    /// Participants enrolled so far.
    pub current_participants: u32,
    /// Enrollment relative to the participation baseline, capped at 100.
    #[ts(as = "String")]
    pub participation_rate_percent: Decimal,
    /// Expected share of participants who finish, in percent.
    #[ts(as = "String")]
    pub completion_rate_percent: Decimal,
    /// Estimated impact in `impact_unit`.
    #[ts(as = "String")]
    pub estimated_impact: Decimal,
    /// Unit of `estimated_impact` (`kg_plastic`, `kwh`, `kg_co2`).
    pub impact_unit: String,
    /// Engagement on a 0-10 scale.
    #[ts(as = "String")]
    pub engagement_score: Decimal,
    /// Suggested next steps for the organizer.
    pub recommendations: Vec<String>,
}

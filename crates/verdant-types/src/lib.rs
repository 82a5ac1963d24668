//! Shared type definitions for the Verdant climate impact toolkit.
//!
//! This crate is the single source of truth for every type that crosses
//! a crate boundary in the workspace. Types flow downstream to
//! `TypeScript` via `ts-rs` so dashboards parse the same stable keys the
//! Rust code produces.
//!
//! # Modules
//!
//! - [`ids`] -- UUID v7 identifiers and the caller-supplied [`UserId`]
//! - [`enums`] -- Activity kinds, factor provenance, offset and challenge enums
//! - [`estimate`] -- Estimator inputs and results
//! - [`profile`] -- User impact profiles and the collective report
//! - [`offsets`] -- Offset marketplace and community challenge records
//! - [`advocacy`] -- Drafted policy letters

pub mod advocacy;
pub mod enums;
pub mod estimate;
pub mod ids;
pub mod offsets;
pub mod profile;

// Re-export all public types at crate root for convenience.
pub use advocacy::PolicyLetter;
pub use enums::{
    ActivityKind, CarbonNeutralTimeline, ChallengeType, FactorSource, LetterUrgency,
    OffsetProjectType, PolicyIssue, VerificationStatus,
};
pub use estimate::{ActivityRecord, DietEstimate, EstimateResult, Equivalences, FactorEntry};
pub use ids::{ChallengeId, LetterId, PurchaseId, SessionId, UserId};
pub use offsets::{
    Challenge, ChallengeProgress, OffsetNeeds, OffsetProject, OffsetPurchase, ProjectListing,
};
pub use profile::{
    ActivityLogEntry, AuditReport, CollectiveImpact, CollectiveImpactSummary, EngagementMetrics,
    EquivalentImpact, SessionTotals, TotalsMismatch, UserImpactProfile,
};

#[cfg(test)]
mod tests {
    //! Type export and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::SessionId::export_all();
        let _ = crate::ids::PurchaseId::export_all();
        let _ = crate::ids::ChallengeId::export_all();
        let _ = crate::ids::LetterId::export_all();
        let _ = crate::ids::UserId::export_all();

        // Enums
        let _ = crate::enums::ActivityKind::export_all();
        let _ = crate::enums::FactorSource::export_all();
        let _ = crate::enums::OffsetProjectType::export_all();
        let _ = crate::enums::VerificationStatus::export_all();
        let _ = crate::enums::CarbonNeutralTimeline::export_all();
        let _ = crate::enums::ChallengeType::export_all();
        let _ = crate::enums::PolicyIssue::export_all();
        let _ = crate::enums::LetterUrgency::export_all();

        // Estimates
        let _ = crate::estimate::ActivityRecord::export_all();
        let _ = crate::estimate::Equivalences::export_all();
        let _ = crate::estimate::EstimateResult::export_all();
        let _ = crate::estimate::DietEstimate::export_all();
        let _ = crate::estimate::FactorEntry::export_all();

        // Profiles
        let _ = crate::profile::SessionTotals::export_all();
        let _ = crate::profile::ActivityLogEntry::export_all();
        let _ = crate::profile::UserImpactProfile::export_all();
        let _ = crate::profile::CollectiveImpact::export_all();
        let _ = crate::profile::EquivalentImpact::export_all();
        let _ = crate::profile::EngagementMetrics::export_all();
        let _ = crate::profile::CollectiveImpactSummary::export_all();
        let _ = crate::profile::TotalsMismatch::export_all();
        let _ = crate::profile::AuditReport::export_all();

        // Offsets and challenges
        let _ = crate::offsets::OffsetProject::export_all();
        let _ = crate::offsets::ProjectListing::export_all();
        let _ = crate::offsets::OffsetNeeds::export_all();
        let _ = crate::offsets::OffsetPurchase::export_all();
        let _ = crate::offsets::Challenge::export_all();
        let _ = crate::offsets::ChallengeProgress::export_all();

        // Advocacy
        let _ = crate::advocacy::PolicyLetter::export_all();
    }

    #[test]
    fn session_totals_combine_is_order_independent() {
        use rust_decimal::Decimal;

        use crate::SessionTotals;

        let a = SessionTotals {
            emissions_kg: Decimal::new(105, 1),
            offsets_kg: Decimal::ZERO,
            policy_letters_sent: 2,
            community_challenges: 0,
        };
        let b = SessionTotals {
            emissions_kg: Decimal::new(3, 2),
            offsets_kg: Decimal::new(500, 0),
            policy_letters_sent: 0,
            community_challenges: 1,
        };
        assert_eq!(a.combine(b), b.combine(a));
        assert_eq!(a.combine(b).emissions_kg, Decimal::new(1053, 2));
    }
}

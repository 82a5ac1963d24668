//! Impact aggregation for the Verdant climate impact toolkit.
//!
//! Folds per-user session records into cumulative [`UserImpactProfile`]s
//! and derives a collective report from the stored profiles.
//!
//! # Modules
//!
//! - [`aggregator`] -- [`ImpactAggregator`]: upsert, history and reporting
//! - [`session`] -- Lenient parsing of session payloads
//! - [`audit`] -- Recomputes profile totals from activity logs
//! - [`shared`] -- [`SharedAggregator`]: mutex-guarded wrapper for concurrent callers
//! - [`community`] -- Community challenge creation and progress tracking
//! - [`advocacy`] -- Policy letters drafted from issue templates
//!
//! # Accumulation
//!
//! Numeric session fields are summed with exact `Decimal` arithmetic and
//! saturating counters, so replaying a set of sessions in any order
//! yields identical totals. A malformed field contributes zero and is
//! logged; a bad session never aborts a batch.
//!
//! [`UserImpactProfile`]: verdant_types::UserImpactProfile

pub mod advocacy;
pub mod aggregator;
pub mod audit;
pub mod community;
pub mod session;
pub mod shared;

pub use advocacy::{draft_letter, draft_letter_named};
pub use aggregator::{AggregatorConfig, ImpactAggregator};
pub use audit::audit_profiles;
pub use community::{ChallengeBoard, ChallengeConfig};
pub use session::{ParsedSession, parse_session};
pub use shared::SharedAggregator;

use verdant_types::ChallengeId;

/// Errors that can occur in the aggregator crate.
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    /// The shared aggregator's mutex was poisoned by a panicking writer.
    #[error("aggregator lock poisoned")]
    LockPoisoned,

    /// No challenge with this identifier has been created.
    #[error("unknown challenge: {0}")]
    UnknownChallenge(ChallengeId),

    /// Challenge parameters are out of range.
    #[error("invalid challenge: {0}")]
    InvalidChallenge(&'static str),

    /// Letter parameters are unusable.
    #[error("invalid letter: {0}")]
    InvalidLetter(&'static str),
}

//! The service container.
//!
//! [`ClimateToolkit`] is built once at process start from a validated
//! [`VerdantConfig`] and handed to consumers by reference. It owns the
//! estimator, the shared aggregator, the offset marketplace and the
//! challenge board, and drafts policy letters. Nothing in the workspace
//! is a global.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use verdant_aggregator::{
    AggregatorError, ChallengeBoard, ImpactAggregator, SharedAggregator, draft_letter,
};
use verdant_estimator::{EmissionEstimator, EmissionFactorTable, EstimateError};
use verdant_offsets::marketplace::KG_PER_TON;
use verdant_offsets::{OffsetError, OffsetMarketplace};
use verdant_types::{
    ActivityRecord, Challenge, ChallengeId, ChallengeProgress, ChallengeType, EstimateResult,
    LetterUrgency, OffsetPurchase, PolicyIssue, PolicyLetter, UserId, UserImpactProfile,
};

use crate::config::{ConfigError, VerdantConfig};

/// Agent name recorded for sessions produced by [`ClimateToolkit::track_activity`].
pub const CARBON_CALCULATOR: &str = "carbon_calculator";
/// Agent name recorded for sessions produced by [`ClimateToolkit::purchase_offsets`].
pub const OFFSET_MANAGER: &str = "offset_manager";
/// Agent name recorded for sessions produced by [`ClimateToolkit::send_policy_letter`].
pub const POLICY_ADVOCATE: &str = "policy_advocate";

/// Errors from toolkit operations.
#[derive(Debug, thiserror::Error)]
pub enum ToolkitError {
    /// Estimation failed.
    #[error("estimate error: {source}")]
    Estimate {
        /// The underlying estimator error.
        #[from]
        source: EstimateError,
    },

    /// Recording or reporting failed.
    #[error("aggregator error: {source}")]
    Aggregator {
        /// The underlying aggregator error.
        #[from]
        source: AggregatorError,
    },

    /// An offset operation failed.
    #[error("offset error: {source}")]
    Offset {
        /// The underlying marketplace error.
        #[from]
        source: OffsetError,
    },

    /// Arithmetic overflow converting between units.
    #[error("arithmetic overflow converting {0}")]
    ArithmeticOverflow(&'static str),
}

/// An estimate and the profile it was recorded into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedActivity {
    /// The estimate.
    pub estimate: EstimateResult,
    /// The user's profile after recording.
    pub profile: UserImpactProfile,
}

/// A purchase and the profile it was recorded into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedPurchase {
    /// The purchase record.
    pub purchase: OffsetPurchase,
    /// The user's profile after recording.
    pub profile: UserImpactProfile,
}

/// A drafted letter and the profile its sending was recorded into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedLetter {
    /// The letter.
    pub letter: PolicyLetter,
    /// The user's profile after recording.
    pub profile: UserImpactProfile,
}

/// Estimator, aggregator, marketplace and challenge board, built once.
#[derive(Debug)]
pub struct ClimateToolkit {
    estimator: EmissionEstimator,
    aggregator: SharedAggregator,
    marketplace: OffsetMarketplace,
    challenges: Mutex<ChallengeBoard>,
}

impl ClimateToolkit {
    /// Build every component from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the factor table or offset
    /// catalog is unusable.
    pub fn from_config(config: &VerdantConfig) -> Result<Self, ConfigError> {
        let table =
            EmissionFactorTable::from_config(&config.factors).map_err(|e| ConfigError::Invalid {
                section: "factors",
                reason: e.to_string(),
            })?;
        let marketplace =
            OffsetMarketplace::new(config.offsets.clone()).map_err(|e| ConfigError::Invalid {
                section: "offsets",
                reason: e.to_string(),
            })?;

        info!(
            factors = table.len(),
            offset_projects = config.offsets.projects.len(),
            "climate toolkit ready"
        );

        Ok(Self {
            estimator: EmissionEstimator::new(table, config.equivalence),
            aggregator: SharedAggregator::from_aggregator(ImpactAggregator::with_equivalence(
                config.aggregator,
                config.equivalence,
            )),
            marketplace,
            challenges: Mutex::new(ChallengeBoard::new(config.challenges)),
        })
    }

    /// The emission estimator.
    pub const fn estimator(&self) -> &EmissionEstimator {
        &self.estimator
    }

    /// The shared impact aggregator.
    pub const fn aggregator(&self) -> &SharedAggregator {
        &self.aggregator
    }

    /// The offset marketplace.
    pub const fn marketplace(&self) -> &OffsetMarketplace {
        &self.marketplace
    }

    /// Estimate an activity and record it as a session for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError::Estimate`] for an invalid quantity; nothing
    /// is recorded in that case.
    pub fn track_activity(
        &self,
        user_id: &UserId,
        record: &ActivityRecord,
    ) -> Result<TrackedActivity, ToolkitError> {
        self.track_activity_at(user_id, record, Utc::now())
    }

    /// [`track_activity`](Self::track_activity) at an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Same as [`track_activity`](Self::track_activity).
    pub fn track_activity_at(
        &self,
        user_id: &UserId,
        record: &ActivityRecord,
        at: DateTime<Utc>,
    ) -> Result<TrackedActivity, ToolkitError> {
        let estimate = self.estimator.estimate_record(record)?;
        let session = json!({
            "emissions_calculated": estimate.co2_kg.to_string(),
            "agents_used": [CARBON_CALCULATOR],
            "actions_taken": [format!("track_{}", estimate.category)],
        });
        let profile = self.aggregator.record_at(user_id, &session, at)?;
        Ok(TrackedActivity { estimate, profile })
    }

    /// Purchase offsets and record the offset mass for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError::Offset`] if the marketplace rejects the
    /// purchase; nothing is recorded in that case.
    pub fn purchase_offsets(
        &self,
        user_id: &UserId,
        project_name: &str,
        tons: Decimal,
    ) -> Result<TrackedPurchase, ToolkitError> {
        self.purchase_offsets_at(user_id, project_name, tons, Utc::now())
    }

    /// [`purchase_offsets`](Self::purchase_offsets) at an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Same as [`purchase_offsets`](Self::purchase_offsets).
    pub fn purchase_offsets_at(
        &self,
        user_id: &UserId,
        project_name: &str,
        tons: Decimal,
        at: DateTime<Utc>,
    ) -> Result<TrackedPurchase, ToolkitError> {
        let purchase = self
            .marketplace
            .purchase_at(user_id, project_name, tons, at)?;
        let offsets_kg = purchase
            .tons_offset
            .checked_mul(KG_PER_TON)
            .ok_or(ToolkitError::ArithmeticOverflow("tons to kg"))?
            .normalize();
        let session = json!({
            "offsets_purchased": offsets_kg.to_string(),
            "agents_used": [OFFSET_MANAGER],
            "actions_taken": ["purchase_offsets"],
        });
        let profile = self.aggregator.record_at(user_id, &session, at)?;
        Ok(TrackedPurchase { purchase, profile })
    }

    /// Draft a policy letter for `user_id` and count it as sent.
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError::Aggregator`] for a blank recipient; nothing
    /// is recorded in that case.
    pub fn send_policy_letter(
        &self,
        user_id: &UserId,
        issue: PolicyIssue,
        recipient: &str,
        user_story: &str,
        urgency: LetterUrgency,
    ) -> Result<TrackedLetter, ToolkitError> {
        self.send_policy_letter_at(user_id, issue, recipient, user_story, urgency, Utc::now())
    }

    /// [`send_policy_letter`](Self::send_policy_letter) at an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Same as [`send_policy_letter`](Self::send_policy_letter).
    pub fn send_policy_letter_at(
        &self,
        user_id: &UserId,
        issue: PolicyIssue,
        recipient: &str,
        user_story: &str,
        urgency: LetterUrgency,
        at: DateTime<Utc>,
    ) -> Result<TrackedLetter, ToolkitError> {
        let letter = draft_letter(issue, recipient, user_story, urgency, at)?;
        let session = json!({
            "policy_letters_sent": 1,
            "agents_used": [POLICY_ADVOCATE],
            "actions_taken": ["send_policy_letter"],
        });
        let profile = self.aggregator.record_at(user_id, &session, at)?;
        info!(
            user_id = user_id.as_str(),
            letter_id = %letter.letter_id,
            "policy letter sent"
        );
        Ok(TrackedLetter { letter, profile })
    }

    /// Create a community challenge starting now.
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError::Aggregator`] for out-of-range parameters.
    pub fn create_challenge(
        &self,
        challenge_type: ChallengeType,
        duration_days: u32,
        target_participants: u32,
    ) -> Result<Challenge, ToolkitError> {
        let mut board = self.lock_challenges()?;
        Ok(board.create(challenge_type, duration_days, target_participants, Utc::now())?)
    }

    /// Progress of a challenge created by this toolkit.
    ///
    /// # Errors
    ///
    /// Returns [`ToolkitError::Aggregator`] for an unknown challenge.
    pub fn track_challenge(
        &self,
        challenge_id: ChallengeId,
        participants: u32,
    ) -> Result<ChallengeProgress, ToolkitError> {
        let board = self.lock_challenges()?;
        Ok(board.track_progress(challenge_id, participants)?)
    }

    fn lock_challenges(&self) -> Result<std::sync::MutexGuard<'_, ChallengeBoard>, ToolkitError> {
        self.challenges.lock().map_err(|poisoned| {
            error!(%poisoned, "challenge board lock poisoned");
            ToolkitError::Aggregator {
                source: AggregatorError::LockPoisoned,
            }
        })
    }
}

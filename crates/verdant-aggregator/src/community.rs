//! Community challenges.
//!
//! A [`ChallengeBoard`] creates challenges from three fixed templates and
//! tracks their progress. Each challenge gets a [`ChallengeId`]; progress
//! is looked up by id, so the impact figure always matches the type the
//! challenge was created with.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use verdant_types::{Challenge, ChallengeId, ChallengeProgress, ChallengeType};

use crate::AggregatorError;

const ONE_HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
const TEN: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
const HALF: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Challenge constants (the `challenges` config section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChallengeConfig {
    /// Potential reduction credited per target participant, kg CO2e.
    #[serde(default = "default_potential_kg_per_participant")]
    pub potential_kg_per_participant: Decimal,
    /// Participant count at which participation reaches 100%.
    #[serde(default = "default_full_participation")]
    pub full_participation: u32,
    /// Share of participants expected to complete, 0 to 1.
    #[serde(default = "default_completion_share")]
    pub completion_share: Decimal,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            potential_kg_per_participant: default_potential_kg_per_participant(),
            full_participation: default_full_participation(),
            completion_share: default_completion_share(),
        }
    }
}

impl ChallengeConfig {
    /// Names of constants that are out of range.
    pub fn invalid_constants(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if self.potential_kg_per_participant.is_sign_negative() {
            invalid.push("potential_kg_per_participant");
        }
        if self.full_participation == 0 {
            invalid.push("full_participation");
        }
        if self.completion_share.is_sign_negative() || self.completion_share > Decimal::ONE {
            invalid.push("completion_share");
        }
        invalid
    }
}

const fn default_potential_kg_per_participant() -> Decimal {
    Decimal::from_parts(10, 0, 0, false, 0)
}

const fn default_full_participation() -> u32 {
    100
}

const fn default_completion_share() -> Decimal {
    Decimal::from_parts(7, 0, 0, false, 1)
}

/// Fixed content of a challenge type.
struct Template {
    name: &'static str,
    description: &'static str,
    daily_actions: [&'static str; 4],
    success_metrics: [&'static str; 3],
    /// Impact per participant and its unit.
    impact_per_participant: Decimal,
    impact_unit: &'static str,
}

const fn template(challenge_type: ChallengeType) -> Template {
    match challenge_type {
        ChallengeType::PlasticReduction => Template {
            name: "Plastic-Free Month Challenge",
            description: "Reduce single-use plastic consumption",
            daily_actions: [
                "Use reusable bags for shopping",
                "Carry a reusable water bottle",
                "Avoid plastic straws and cutlery",
                "Choose products with minimal packaging",
            ],
            success_metrics: ["plastic_items_reduced", "money_saved", "waste_weight_reduced"],
            impact_per_participant: Decimal::from_parts(5, 0, 0, false, 0),
            impact_unit: "kg_plastic",
        },
        ChallengeType::EnergySavings => Template {
            name: "Energy Conservation Challenge",
            description: "Reduce household energy consumption",
            daily_actions: [
                "Turn off lights when leaving rooms",
                "Use smart power strips",
                "Lower thermostat by 2 degrees",
                "Air dry clothes instead of machine drying",
            ],
            success_metrics: ["kwh_saved", "co2_reduced_kg", "money_saved"],
            impact_per_participant: Decimal::from_parts(45, 0, 0, false, 0),
            impact_unit: "kWh",
        },
        ChallengeType::SustainableTransport => Template {
            name: "Car-Free Challenge",
            description: "Reduce car usage for daily commutes",
            daily_actions: [
                "Use public transportation",
                "Carpool with colleagues",
                "Walk or bike for short trips",
                "Combine errands to reduce trips",
            ],
            success_metrics: ["car_trips_reduced", "km_walked_biked", "co2_reduced_kg"],
            impact_per_participant: Decimal::from_parts(25, 0, 0, false, 0),
            impact_unit: "kg_co2",
        },
    }
}

/// Registry of created challenges.
#[derive(Debug, Clone, Default)]
pub struct ChallengeBoard {
    config: ChallengeConfig,
    challenges: BTreeMap<ChallengeId, Challenge>,
}

impl ChallengeBoard {
    /// Create an empty board.
    pub const fn new(config: ChallengeConfig) -> Self {
        Self {
            config,
            challenges: BTreeMap::new(),
        }
    }

    /// Number of challenges created.
    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    /// Whether no challenge has been created.
    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    /// Look up a challenge.
    pub fn get(&self, challenge_id: ChallengeId) -> Option<&Challenge> {
        self.challenges.get(&challenge_id)
    }

    /// Create a challenge from a type name.
    ///
    /// An unrecognized name falls back to plastic reduction.
    pub fn create_named(
        &mut self,
        challenge_type: &str,
        duration_days: u32,
        target_participants: u32,
        start_date: DateTime<Utc>,
    ) -> Result<Challenge, AggregatorError> {
        let parsed = ChallengeType::parse(challenge_type).unwrap_or_else(|| {
            warn!(
                challenge_type,
                "unknown challenge type; using plastic_reduction"
            );
            ChallengeType::PlasticReduction
        });
        self.create(parsed, duration_days, target_participants, start_date)
    }

    /// Create a challenge starting at `start_date`.
    pub fn create(
        &mut self,
        challenge_type: ChallengeType,
        duration_days: u32,
        target_participants: u32,
        start_date: DateTime<Utc>,
    ) -> Result<Challenge, AggregatorError> {
        if duration_days == 0 {
            return Err(AggregatorError::InvalidChallenge(
                "duration must be at least one day",
            ));
        }
        let end_date = TimeDelta::try_days(i64::from(duration_days))
            .and_then(|d| start_date.checked_add_signed(d))
            .ok_or(AggregatorError::InvalidChallenge(
                "end date out of range",
            ))?;

        let t = template(challenge_type);
        let challenge = Challenge {
            challenge_id: ChallengeId::new(),
            name: t.name.to_owned(),
            challenge_type,
            description: t.description.to_owned(),
            daily_actions: t.daily_actions.iter().map(|s| (*s).to_owned()).collect(),
            success_metrics: t.success_metrics.iter().map(|s| (*s).to_owned()).collect(),
            duration_days,
            target_participants,
            start_date,
            end_date,
            potential_reduction_kg: self
                .config
                .potential_kg_per_participant
                .saturating_mul(Decimal::from(target_participants)),
        };

        info!(
            challenge_id = %challenge.challenge_id,
            name = challenge.name.as_str(),
            duration_days,
            target_participants,
            "challenge created"
        );
        self.challenges
            .insert(challenge.challenge_id, challenge.clone());
        Ok(challenge)
    }

    /// Progress of a challenge with `participants` signed up.
    pub fn track_progress(
        &self,
        challenge_id: ChallengeId,
        participants: u32,
    ) -> Result<ChallengeProgress, AggregatorError> {
        let challenge = self
            .challenges
            .get(&challenge_id)
            .ok_or(AggregatorError::UnknownChallenge(challenge_id))?;
        let t = template(challenge.challenge_type);

        let participation = Decimal::from(participants)
            .checked_div(Decimal::from(self.config.full_participation))
            .unwrap_or(Decimal::ONE)
            .min(Decimal::ONE);
        let completion = participation.saturating_mul(self.config.completion_share);

        let first = if participation < HALF {
            "Share on social media to increase participation"
        } else {
            "Great engagement! Focus on completion"
        };

        Ok(ChallengeProgress {
            challenge_id,
            current_participants: participants,
            participation_rate_percent: percent(participation),
            completion_rate_percent: percent(completion),
            estimated_impact: t
                .impact_per_participant
                .saturating_mul(Decimal::from(participants)),
            impact_unit: t.impact_unit.to_owned(),
            engagement_score: participation.saturating_mul(TEN).round_dp(1).normalize(),
            recommendations: vec![
                first.to_owned(),
                "Send reminder emails to active participants".to_owned(),
                "Highlight top performers to motivate others".to_owned(),
            ],
        })
    }
}

fn percent(share: Decimal) -> Decimal {
    share.saturating_mul(ONE_HUNDRED).round_dp(1).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap_or_default()
    }

    #[test]
    fn create_fills_template() {
        let mut board = ChallengeBoard::default();
        let challenge = board.create(ChallengeType::EnergySavings, 30, 50, start()).ok();
        assert_eq!(
            challenge.as_ref().map(|c| c.name.as_str()),
            Some("Energy Conservation Challenge")
        );
        assert_eq!(
            challenge.as_ref().map(|c| c.potential_reduction_kg),
            Some(Decimal::new(500, 0))
        );
        assert_eq!(
            challenge.as_ref().map(|c| c.end_date.signed_duration_since(c.start_date)),
            Some(TimeDelta::days(30))
        );
        assert_eq!(challenge.map(|c| c.daily_actions.len()), Some(4));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn unknown_type_falls_back_to_plastic() {
        let mut board = ChallengeBoard::default();
        let challenge = board.create_named("knitting", 7, 10, start()).ok();
        assert_eq!(
            challenge.map(|c| c.challenge_type),
            Some(ChallengeType::PlasticReduction)
        );
    }

    #[test]
    fn zero_duration_rejected() {
        let mut board = ChallengeBoard::default();
        assert!(matches!(
            board.create(ChallengeType::PlasticReduction, 0, 10, start()),
            Err(AggregatorError::InvalidChallenge(_))
        ));
        assert!(board.is_empty());
    }

    #[test]
    fn progress_uses_challenge_type() {
        let mut board = ChallengeBoard::default();
        let id = board
            .create(ChallengeType::SustainableTransport, 14, 200, start())
            .map(|c| c.challenge_id);
        let progress = id.and_then(|id| board.track_progress(id, 40)).ok();

        assert_eq!(
            progress.as_ref().map(|p| p.participation_rate_percent),
            Some(Decimal::new(40, 0))
        );
        assert_eq!(
            progress.as_ref().map(|p| p.completion_rate_percent),
            Some(Decimal::new(28, 0))
        );
        assert_eq!(
            progress.as_ref().map(|p| p.estimated_impact),
            Some(Decimal::new(1000, 0))
        );
        assert_eq!(progress.as_ref().map(|p| p.impact_unit.as_str()), Some("kg_co2"));
        assert_eq!(
            progress.as_ref().map(|p| p.engagement_score),
            Some(Decimal::new(4, 0))
        );
        assert_eq!(
            progress.and_then(|p| p.recommendations.first().cloned()),
            Some("Share on social media to increase participation".to_owned())
        );
    }

    #[test]
    fn participation_caps_at_full() {
        let mut board = ChallengeBoard::default();
        let id = board
            .create(ChallengeType::PlasticReduction, 30, 100, start())
            .map(|c| c.challenge_id);
        let progress = id.and_then(|id| board.track_progress(id, 250)).ok();
        assert_eq!(
            progress.as_ref().map(|p| p.participation_rate_percent),
            Some(Decimal::new(100, 0))
        );
        assert_eq!(
            progress.as_ref().map(|p| p.completion_rate_percent),
            Some(Decimal::new(70, 0))
        );
        assert_eq!(
            progress.map(|p| p.engagement_score),
            Some(Decimal::new(10, 0))
        );
    }

    #[test]
    fn unknown_challenge_rejected() {
        let board = ChallengeBoard::default();
        assert!(matches!(
            board.track_progress(ChallengeId::new(), 5),
            Err(AggregatorError::UnknownChallenge(_))
        ));
    }

    #[test]
    fn config_validation() {
        assert!(ChallengeConfig::default().invalid_constants().is_empty());
        let config = ChallengeConfig {
            completion_share: Decimal::new(15, 1),
            ..ChallengeConfig::default()
        };
        assert_eq!(config.invalid_constants(), vec!["completion_share"]);
    }
}

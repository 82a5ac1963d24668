//! Command execution.
//!
//! Each command takes the toolkit by reference and returns the JSON
//! document `main` prints.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use verdant_aggregator::advocacy::{draft_letter, issue_from_name, urgency_from_name};
use verdant_core::ClimateToolkit;
use verdant_estimator::{EmissionEstimator, EstimateContext};
use verdant_offsets::ProjectFilter;
use verdant_types::{ActivityKind, ChallengeType, OffsetProjectType, UserId};

use crate::cli::Command;
use crate::error::CliError;

/// One line of a sessions file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionLine {
    /// The user the session belongs to.
    pub user_id: UserId,
    /// The session payload.
    #[serde(default)]
    pub session: Value,
    /// When the session happened. Defaults to the replay time.
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Run one command.
pub fn run(toolkit: &ClimateToolkit, command: Command) -> Result<Value, CliError> {
    match command {
        Command::Estimate {
            category,
            quantity,
            region,
            passengers,
            kind,
            unit,
        } => {
            let quantity = EmissionEstimator::parse_quantity(&quantity)?;
            let kind = kind
                .map(|raw| {
                    ActivityKind::parse(&raw)
                        .ok_or_else(|| CliError::InvalidArgument(format!("unknown kind {raw:?}")))
                })
                .transpose()?;
            let context = EstimateContext {
                region,
                passengers,
                kind,
                unit,
            };
            let result = toolkit.estimator().estimate(&category, quantity, &context)?;
            Ok(serde_json::to_value(result)?)
        }
        Command::Diet { diet, calories } => {
            let result = toolkit.estimator().estimate_diet(&diet, calories)?;
            Ok(serde_json::to_value(result)?)
        }
        Command::Factors => Ok(serde_json::to_value(toolkit.estimator().factors())?),
        Command::Projects {
            project_type,
            location,
        } => {
            let project_type = project_type
                .filter(|raw| !raw.eq_ignore_ascii_case("all"))
                .map(|raw| {
                    OffsetProjectType::parse(&raw).ok_or_else(|| {
                        CliError::InvalidArgument(format!("unknown project type {raw:?}"))
                    })
                })
                .transpose()?;
            let listing = toolkit.marketplace().projects(&ProjectFilter {
                project_type,
                location,
            });
            Ok(serde_json::to_value(listing)?)
        }
        Command::OffsetNeeds { emissions_kg, goal } => {
            let needs = toolkit.marketplace().offset_needs(emissions_kg, goal)?;
            Ok(serde_json::to_value(needs)?)
        }
        Command::Challenge {
            challenge_type,
            days,
            target,
            participants,
        } => challenge(toolkit, &challenge_type, days, target, participants),
        Command::Letter {
            issue,
            recipient,
            story,
            urgency,
            user,
        } => letter(toolkit, &issue, &recipient, &story, &urgency, user.map(UserId::new)),
        Command::Replay { sessions, user } => {
            let lines = read_sessions(&sessions)?;
            replay(toolkit, &lines, user.map(UserId::new), Utc::now())
        }
    }
}

fn challenge(
    toolkit: &ClimateToolkit,
    challenge_type: &str,
    days: u32,
    target: u32,
    participants: Option<u32>,
) -> Result<Value, CliError> {
    let parsed = ChallengeType::parse(challenge_type).ok_or_else(|| {
        CliError::InvalidArgument(format!("unknown challenge type {challenge_type:?}"))
    })?;
    let challenge = toolkit.create_challenge(parsed, days, target)?;
    let progress = participants
        .map(|p| toolkit.track_challenge(challenge.challenge_id, p))
        .transpose()?;
    Ok(json!({ "challenge": challenge, "progress": progress }))
}

fn letter(
    toolkit: &ClimateToolkit,
    issue: &str,
    recipient: &str,
    story: &str,
    urgency: &str,
    user: Option<UserId>,
) -> Result<Value, CliError> {
    let issue = issue_from_name(issue);
    let urgency = urgency_from_name(urgency);
    match user {
        Some(user) => {
            let tracked = toolkit.send_policy_letter(&user, issue, recipient, story, urgency)?;
            Ok(serde_json::to_value(tracked)?)
        }
        None => {
            let letter = draft_letter(issue, recipient, story, urgency, Utc::now())?;
            Ok(json!({ "letter": letter, "profile": null }))
        }
    }
}

/// Read a sessions file.
pub fn read_sessions(path: &Path) -> Result<Vec<SessionLine>, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Record every line, then report and audit.
///
/// Lines without a timestamp are stamped `now`.
pub fn replay(
    toolkit: &ClimateToolkit,
    lines: &[SessionLine],
    user: Option<UserId>,
    now: DateTime<Utc>,
) -> Result<Value, CliError> {
    let aggregator = toolkit.aggregator();
    let mut per_user: BTreeMap<&str, u64> = BTreeMap::new();
    for line in lines {
        aggregator.record_at(&line.user_id, &line.session, line.recorded_at.unwrap_or(now))?;
        let count = per_user.entry(line.user_id.as_str()).or_insert(0);
        *count = count.saturating_add(1);
    }
    info!(sessions = lines.len(), users = per_user.len(), "sessions replayed");

    let audit = aggregator.audit()?;
    if !audit.is_balanced() {
        warn!(mismatches = audit.mismatches.len(), "replay audit found mismatches");
    }
    let report = aggregator.report_at(now)?;
    let profile = user.map(|u| aggregator.profile(&u)).transpose()?;

    Ok(json!({
        "report": report,
        "audit": audit,
        "profile": profile,
    }))
}

#[cfg(test)]
mod tests {
    use verdant_core::VerdantConfig;

    use super::*;

    fn toolkit() -> Option<ClimateToolkit> {
        ClimateToolkit::from_config(&VerdantConfig::default()).ok()
    }

    fn run_ok(command: Command) -> Option<Value> {
        toolkit().and_then(|t| run(&t, command).ok())
    }

    #[test]
    fn estimate_outputs_stable_keys() {
        let out = run_ok(Command::Estimate {
            category: "train".to_owned(),
            quantity: "100".to_owned(),
            region: None,
            passengers: None,
            kind: None,
            unit: None,
        });
        assert_eq!(
            out.as_ref().and_then(|v| v.get("co2_kg")).and_then(Value::as_str),
            Some("4.1")
        );
        assert_eq!(
            out.as_ref()
                .and_then(|v| v.get("factor_source"))
                .and_then(Value::as_str),
            Some("table")
        );
    }

    #[test]
    fn estimate_rejects_text_quantity() {
        let result = toolkit().map(|t| {
            run(
                &t,
                Command::Estimate {
                    category: "train".to_owned(),
                    quantity: "far".to_owned(),
                    region: None,
                    passengers: None,
                    kind: None,
                    unit: None,
                },
            )
        });
        assert!(matches!(result, Some(Err(CliError::Estimate { .. }))));
    }

    #[test]
    fn projects_rejects_unknown_type() {
        let result = toolkit().map(|t| {
            run(
                &t,
                Command::Projects {
                    project_type: Some("vibes".to_owned()),
                    location: None,
                },
            )
        });
        assert!(matches!(result, Some(Err(CliError::InvalidArgument(_)))));
    }

    #[test]
    fn projects_all_lists_catalog() {
        let out = run_ok(Command::Projects {
            project_type: Some("all".to_owned()),
            location: None,
        });
        assert_eq!(
            out.as_ref()
                .and_then(|v| v.get("total_projects"))
                .and_then(Value::as_u64),
            Some(4)
        );
    }

    #[test]
    fn replay_reports_totals() {
        let lines: Vec<SessionLine> = serde_json::from_value(json!([
            { "user_id": "u1", "session": { "emissions_calculated": 10 } },
            { "user_id": "u1", "session": { "emissions_calculated": 15 } },
            { "user_id": "u2", "session": { "emissions_calculated": "oops" } },
        ]))
        .ok()
        .unwrap_or_default();
        assert_eq!(lines.len(), 3);

        let out =
            toolkit().and_then(|t| replay(&t, &lines, Some(UserId::from("u1")), Utc::now()).ok());
        let total = out
            .as_ref()
            .and_then(|v| v.pointer("/report/collective_impact/total_emissions_tracked_kg"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        assert_eq!(total.as_deref(), Some("25"));
        assert_eq!(
            out.as_ref()
                .and_then(|v| v.pointer("/audit/sessions_with_anomalies"))
                .and_then(Value::as_u64),
            Some(1)
        );
        assert_eq!(
            out.as_ref()
                .and_then(|v| v.pointer("/profile/sessions_completed"))
                .and_then(Value::as_u64),
            Some(2)
        );
    }

    #[test]
    fn challenge_with_progress() {
        let out =
            toolkit().and_then(|t| challenge(&t, "sustainable_transport", 14, 50, Some(20)).ok());
        assert_eq!(
            out.as_ref()
                .and_then(|v| v.pointer("/progress/impact_unit"))
                .and_then(Value::as_str),
            Some("kg_co2")
        );
    }

    #[test]
    fn letter_counts_only_for_a_user() {
        let toolkit = toolkit();
        let anonymous = toolkit
            .as_ref()
            .and_then(|t| letter(t, "transport", "Mayor Ortiz", "", "urgent", None).ok());
        assert_eq!(
            anonymous
                .as_ref()
                .and_then(|v| v.pointer("/letter/issue"))
                .and_then(Value::as_str),
            Some("transportation")
        );
        assert_eq!(
            anonymous
                .as_ref()
                .and_then(|v| v.pointer("/letter/urgency"))
                .and_then(Value::as_str),
            Some("medium")
        );

        let sent = toolkit.as_ref().and_then(|t| {
            letter(t, "carbon_pricing", "Senator Diaz", "", "high", Some(UserId::from("u1"))).ok()
        });
        assert_eq!(
            sent.as_ref()
                .and_then(|v| v.pointer("/profile/policy_letters_sent"))
                .and_then(Value::as_u64),
            Some(1)
        );
        let blank = toolkit
            .as_ref()
            .map(|t| letter(t, "carbon_pricing", "  ", "", "low", None));
        assert!(matches!(blank, Some(Err(CliError::Aggregator { .. }))));
    }

    #[test]
    fn demo_sessions_parse() {
        let lines: Vec<SessionLine> =
            serde_json::from_str(include_str!("../../../demos/sessions.json"))
                .ok()
                .unwrap_or_default();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().take(3).all(|l| l.recorded_at.is_some()));
        assert!(lines.last().is_some_and(|l| l.recorded_at.is_none()));
    }
}

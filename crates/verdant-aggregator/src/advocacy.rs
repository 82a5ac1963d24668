//! Policy advocacy letters.
//!
//! Letters are drafted from four fixed issue templates and three opening
//! lines, one per urgency level. Drafting is pure text assembly; the
//! caller decides whether a draft counts as sent (see
//! `policy_letters_sent` in the session fields).

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use verdant_types::{LetterId, LetterUrgency, PolicyIssue, PolicyLetter};

use crate::AggregatorError;

/// Fixed content of an issue.
struct IssueTemplate {
    subject: &'static str,
    key_points: [&'static str; 4],
}

const fn issue_template(issue: PolicyIssue) -> IssueTemplate {
    match issue {
        PolicyIssue::RenewableEnergy => IssueTemplate {
            subject: "Support for Renewable Energy Transition",
            key_points: [
                "Economic benefits of renewable energy",
                "Job creation in clean energy sectors",
                "Energy independence and security",
                "Public health improvements",
            ],
        },
        PolicyIssue::CarbonPricing => IssueTemplate {
            subject: "Carbon Pricing for Climate Action",
            key_points: [
                "Market-based solution for emissions reduction",
                "Revenue neutrality for citizens",
                "Support for low-income households",
                "Business innovation incentives",
            ],
        },
        PolicyIssue::Transportation => IssueTemplate {
            subject: "Sustainable Transportation Infrastructure",
            key_points: [
                "Public transit expansion",
                "EV charging infrastructure",
                "Bike and pedestrian pathways",
                "Clean public fleet vehicles",
            ],
        },
        PolicyIssue::BuildingEfficiency => IssueTemplate {
            subject: "Building Energy Efficiency Standards",
            key_points: [
                "Energy cost savings for residents",
                "Job creation in retrofitting",
                "Grid reliability improvements",
                "Public health benefits",
            ],
        },
    }
}

const fn opener(urgency: LetterUrgency) -> &'static str {
    match urgency {
        LetterUrgency::Low => "I am writing to express my support for",
        LetterUrgency::Medium => "I urgently request your attention to",
        LetterUrgency::High => "I demand immediate action on",
    }
}

/// Resolve an issue name. Unknown names fall back to renewable energy.
pub fn issue_from_name(raw: &str) -> PolicyIssue {
    PolicyIssue::parse(raw).unwrap_or_else(|| {
        warn!(issue = raw, "unknown policy issue; using renewable_energy");
        PolicyIssue::RenewableEnergy
    })
}

/// Resolve an urgency name. Unknown names fall back to medium.
pub fn urgency_from_name(raw: &str) -> LetterUrgency {
    LetterUrgency::parse(raw).unwrap_or_else(|| {
        warn!(urgency = raw, "unknown letter urgency; using medium");
        LetterUrgency::Medium
    })
}

/// Draft a letter to `recipient`.
///
/// `user_story` is included as a personal paragraph when non-blank.
/// A blank recipient is rejected.
pub fn draft_letter(
    issue: PolicyIssue,
    recipient: &str,
    user_story: &str,
    urgency: LetterUrgency,
    drafted_at: DateTime<Utc>,
) -> Result<PolicyLetter, AggregatorError> {
    let recipient = recipient.trim();
    if recipient.is_empty() {
        return Err(AggregatorError::InvalidLetter("recipient is empty"));
    }
    let template = issue_template(issue);

    let mut lines = vec![
        format!("{} {}.", opener(urgency), template.subject),
        String::new(),
        format!("Dear {recipient},"),
        String::new(),
        format!(
            "As a concerned constituent, I am writing about the critical issue of {}.",
            issue.label()
        ),
        String::new(),
    ];
    let story = user_story.trim();
    if !story.is_empty() {
        lines.push(format!("Personal story: {story}"));
        lines.push(String::new());
    }
    lines.push("Key points:".to_owned());
    lines.extend(template.key_points.iter().map(|p| format!("- {p}")));
    lines.extend(
        [
            "",
            "I strongly urge you to support policies that address this important issue.",
            "",
            "Sincerely,",
            "[Your Name]",
            "[Your Address]",
        ]
        .map(str::to_owned),
    );
    let body = lines.join("\n");
    let word_count = u64::try_from(body.split_whitespace().count()).unwrap_or(u64::MAX);

    let letter = PolicyLetter {
        letter_id: LetterId::new(),
        subject: template.subject.to_owned(),
        recipient: recipient.to_owned(),
        issue,
        urgency,
        body,
        word_count,
        key_arguments: Vec::from(template.key_points.map(str::to_owned)),
        drafted_at,
    };
    debug!(
        letter_id = %letter.letter_id,
        issue = issue.label(),
        word_count,
        "policy letter drafted"
    );
    Ok(letter)
}

/// [`draft_letter`] with issue and urgency given by name.
pub fn draft_letter_named(
    issue: &str,
    recipient: &str,
    user_story: &str,
    urgency: &str,
    drafted_at: DateTime<Utc>,
) -> Result<PolicyLetter, AggregatorError> {
    draft_letter(
        issue_from_name(issue),
        recipient,
        user_story,
        urgency_from_name(urgency),
        drafted_at,
    )
}

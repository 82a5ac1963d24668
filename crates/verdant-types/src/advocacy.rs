//! Policy advocacy letters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{LetterUrgency, PolicyIssue};
use crate::ids::LetterId;

/// A drafted letter to a policy maker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PolicyLetter {
    /// Unique letter identifier.
    pub letter_id: LetterId,
    /// Subject line from the issue template.
    pub subject: String,
    /// Who the letter is addressed to.
    pub recipient: String,
    /// Policy area addressed.
    pub issue: PolicyIssue,
    /// Tone of the opening line.
    pub urgency: LetterUrgency,
    /// Full letter text.
    pub body: String,
    /// Whitespace-separated words in `body`.
    pub word_count: u64,
    /// Arguments listed in the letter.
    pub key_arguments: Vec<String>,
    /// When the letter was drafted.
    pub drafted_at: DateTime<Utc>,
}

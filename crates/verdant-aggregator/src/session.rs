//! Lenient parsing of session payloads.
//!
//! A session is a JSON object reported by a caller at the end of an
//! interaction. Four numeric fields are recognized:
//!
//! | Field | Unit | Accumulates into |
//! |-------|------|------------------|
//! | `emissions_calculated` | kg CO2e | `total_emissions_tracked_kg` |
//! | `offsets_purchased` | kg CO2e | `offsets_purchased_kg` |
//! | `policy_letters_sent` | count | `policy_letters_sent` |
//! | `community_challenges` | count | `community_challenges_completed` |
//!
//! A missing field contributes zero. A field that is present but not a
//! non-negative number (or, for counts, not a whole number) also
//! contributes zero and is named in [`ParsedSession::anomalies`].
//! Numbers may arrive as JSON numbers or as decimal strings.
//!
//! `agents_used` and `actions_taken` are copied as string lists. Any
//! other scalar field is kept as a preference.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use verdant_types::{SessionTotals, UserId};

/// Session key for emissions calculated, in kg.
pub const EMISSIONS_CALCULATED: &str = "emissions_calculated";
/// Session key for offsets purchased, in kg.
pub const OFFSETS_PURCHASED: &str = "offsets_purchased";
/// Session key for policy letters sent.
pub const POLICY_LETTERS_SENT: &str = "policy_letters_sent";
/// Session key for community challenges completed.
pub const COMMUNITY_CHALLENGES: &str = "community_challenges";
/// Session key for the agents involved.
pub const AGENTS_USED: &str = "agents_used";
/// Session key for the actions taken.
pub const ACTIONS_TAKEN: &str = "actions_taken";

const RESERVED: [&str; 6] = [
    EMISSIONS_CALCULATED,
    OFFSETS_PURCHASED,
    POLICY_LETTERS_SENT,
    COMMUNITY_CHALLENGES,
    AGENTS_USED,
    ACTIONS_TAKEN,
];

/// A session payload reduced to what the aggregator stores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSession {
    /// Numeric contribution after zero-filling.
    pub totals: SessionTotals,
    /// Agents the session involved.
    pub agents_used: Vec<String>,
    /// Actions taken during the session.
    pub actions_taken: Vec<String>,
    /// Scalar fields outside the recognized set.
    pub preferences: BTreeMap<String, Value>,
    /// Fields that were present but unusable.
    pub anomalies: Vec<String>,
}

/// Parse a session payload. Never fails.
pub fn parse_session(user_id: &UserId, session: &Value) -> ParsedSession {
    let mut parsed = ParsedSession::default();

    let Some(fields) = session.as_object() else {
        warn!(
            user_id = user_id.as_str(),
            "session payload is not an object; recording zero contribution"
        );
        parsed.anomalies.push("session".to_owned());
        return parsed;
    };

    let anomalies = &mut parsed.anomalies;
    parsed.totals = SessionTotals {
        emissions_kg: mass_field(user_id, fields, EMISSIONS_CALCULATED, anomalies),
        offsets_kg: mass_field(user_id, fields, OFFSETS_PURCHASED, anomalies),
        policy_letters_sent: count_field(user_id, fields, POLICY_LETTERS_SENT, anomalies),
        community_challenges: count_field(user_id, fields, COMMUNITY_CHALLENGES, anomalies),
    };

    parsed.agents_used = string_list(user_id, fields.get(AGENTS_USED), AGENTS_USED);
    parsed.actions_taken = string_list(user_id, fields.get(ACTIONS_TAKEN), ACTIONS_TAKEN);

    for (key, value) in fields {
        if is_preference(key, value) {
            parsed.preferences.insert(key.clone(), value.clone());
        }
    }

    parsed
}

/// Whether `session` carries a preference under `key`.
pub fn sets_preference(session: &Value, key: &str) -> bool {
    session.get(key).is_some_and(|value| is_preference(key, value))
}

fn is_preference(key: &str, value: &Value) -> bool {
    !RESERVED.contains(&key)
        && matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// Read a JSON value as a `Decimal`. Accepts numbers and numeric strings.
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn mass_field(
    user_id: &UserId,
    fields: &Map<String, Value>,
    field: &'static str,
    anomalies: &mut Vec<String>,
) -> Decimal {
    let Some(value) = fields.get(field) else {
        debug!(user_id = user_id.as_str(), field, "field absent; contributes zero");
        return Decimal::ZERO;
    };
    match decimal_from_json(value) {
        Some(kg) if !kg.is_sign_negative() || kg.is_zero() => kg.normalize(),
        _ => {
            warn!(
                user_id = user_id.as_str(),
                field,
                value = %value,
                "malformed session field; contributes zero"
            );
            anomalies.push(field.to_owned());
            Decimal::ZERO
        }
    }
}

fn count_field(
    user_id: &UserId,
    fields: &Map<String, Value>,
    field: &'static str,
    anomalies: &mut Vec<String>,
) -> u64 {
    let Some(value) = fields.get(field) else {
        debug!(user_id = user_id.as_str(), field, "field absent; contributes zero");
        return 0;
    };
    let count = decimal_from_json(value)
        .filter(|n| n.fract().is_zero())
        .and_then(|n| n.to_u64());
    count.unwrap_or_else(|| {
        warn!(
            user_id = user_id.as_str(),
            field,
            value = %value,
            "malformed session count; contributes zero"
        );
        anomalies.push(field.to_owned());
        0
    })
}

fn string_list(user_id: &UserId, value: Option<&Value>, field: &'static str) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        Some(other) => {
            warn!(
                user_id = user_id.as_str(),
                field,
                value = %other,
                "expected a list of strings; ignoring"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user() -> UserId {
        UserId::from("u1")
    }

    #[test]
    fn reads_recognized_fields() {
        let parsed = parse_session(
            &user(),
            &json!({
                "emissions_calculated": 12.5,
                "offsets_purchased": "40",
                "policy_letters_sent": 2,
                "community_challenges": 1,
                "agents_used": ["carbon_calculator", "offset_manager"],
                "actions_taken": ["calculate_footprint"],
            }),
        );
        assert_eq!(parsed.totals.emissions_kg, Decimal::new(125, 1));
        assert_eq!(parsed.totals.offsets_kg, Decimal::new(40, 0));
        assert_eq!(parsed.totals.policy_letters_sent, 2);
        assert_eq!(parsed.totals.community_challenges, 1);
        assert_eq!(parsed.agents_used.len(), 2);
        assert_eq!(parsed.actions_taken, vec!["calculate_footprint".to_owned()]);
        assert!(parsed.anomalies.is_empty());
        assert!(parsed.preferences.is_empty());
    }

    #[test]
    fn missing_fields_contribute_zero_without_anomaly() {
        let parsed = parse_session(&user(), &json!({ "offsets_purchased": 5 }));
        assert_eq!(parsed.totals.emissions_kg, Decimal::ZERO);
        assert_eq!(parsed.totals.offsets_kg, Decimal::new(5, 0));
        assert!(parsed.anomalies.is_empty());
    }

    #[test]
    fn malformed_fields_zero_filled_and_named() {
        let parsed = parse_session(
            &user(),
            &json!({
                "emissions_calculated": "a lot",
                "offsets_purchased": -3,
                "policy_letters_sent": 1.5,
                "community_challenges": [1],
            }),
        );
        assert_eq!(parsed.totals, SessionTotals::default());
        assert_eq!(
            parsed.anomalies,
            vec![
                EMISSIONS_CALCULATED.to_owned(),
                OFFSETS_PURCHASED.to_owned(),
                POLICY_LETTERS_SENT.to_owned(),
                COMMUNITY_CHALLENGES.to_owned(),
            ]
        );
    }

    #[test]
    fn non_object_payload_is_zero() {
        let parsed = parse_session(&user(), &json!([1, 2, 3]));
        assert_eq!(parsed.totals, SessionTotals::default());
        assert_eq!(parsed.anomalies, vec!["session".to_owned()]);
    }

    #[test]
    fn other_scalars_become_preferences() {
        let parsed = parse_session(
            &user(),
            &json!({
                "preferred_transportation": "bicycle",
                "newsletter": true,
                "nested": { "ignored": 1 },
            }),
        );
        assert_eq!(
            parsed.preferences.get("preferred_transportation"),
            Some(&json!("bicycle"))
        );
        assert_eq!(parsed.preferences.get("newsletter"), Some(&json!(true)));
        assert!(!parsed.preferences.contains_key("nested"));
    }

    #[test]
    fn whole_float_counts_accepted() {
        let parsed = parse_session(&user(), &json!({ "policy_letters_sent": 3.0 }));
        assert_eq!(parsed.totals.policy_letters_sent, 3);
    }
}

//! Totals audit.
//!
//! Every profile carries running totals and the activity log they were
//! built from. The audit folds each log from scratch and compares. A
//! mismatch means a profile was edited or loaded inconsistently; the
//! aggregator's own recording path cannot produce one.

use tracing::{info, warn};

use verdant_types::{AuditReport, SessionTotals, TotalsMismatch, UserImpactProfile};

/// Recompute totals for every profile from its activity log.
pub fn audit_profiles<'a>(profiles: impl IntoIterator<Item = &'a UserImpactProfile>) -> AuditReport {
    let mut report = AuditReport::default();

    for profile in profiles {
        report.profiles_checked = report.profiles_checked.saturating_add(1);

        let recomputed = profile
            .activity_log
            .iter()
            .fold(SessionTotals::default(), |acc, entry| acc.combine(entry.contribution));
        let logged_sessions = u64::try_from(profile.activity_log.len()).unwrap_or(u64::MAX);
        let with_anomalies = profile
            .activity_log
            .iter()
            .filter(|entry| !entry.anomalies.is_empty())
            .count();
        report.sessions_with_anomalies = report
            .sessions_with_anomalies
            .saturating_add(u64::try_from(with_anomalies).unwrap_or(u64::MAX));

        let stored = profile.totals();
        if stored != recomputed || profile.sessions_completed != logged_sessions {
            warn!(
                user_id = profile.user_id.as_str(),
                stored_emissions_kg = %stored.emissions_kg,
                recomputed_emissions_kg = %recomputed.emissions_kg,
                stored_sessions = profile.sessions_completed,
                logged_sessions,
                "profile totals disagree with activity log"
            );
            report.mismatches.push(TotalsMismatch {
                user_id: profile.user_id.clone(),
                stored,
                recomputed,
                stored_sessions: profile.sessions_completed,
                logged_sessions,
            });
        }
    }

    info!(
        profiles_checked = report.profiles_checked,
        mismatches = report.mismatches.len(),
        "audit complete"
    );
    report
}

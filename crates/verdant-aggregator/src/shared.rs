//! Thread-safe aggregator wrapper.
//!
//! [`SharedAggregator`] guards an [`ImpactAggregator`] with one mutex.
//! Each `record` runs the whole upsert under the lock, so concurrent
//! sessions for the same user never lose an update. Safe to share via
//! `Arc<SharedAggregator>`.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::error;

use verdant_types::{
    ActivityLogEntry, AuditReport, CollectiveImpactSummary, UserId, UserImpactProfile,
};

use crate::AggregatorError;
use crate::aggregator::{AggregatorConfig, ImpactAggregator};

/// Mutex-guarded [`ImpactAggregator`].
#[derive(Debug, Default)]
pub struct SharedAggregator {
    /// The single writer, behind the lock.
    inner: Mutex<ImpactAggregator>,
}

impl SharedAggregator {
    /// Create an empty shared aggregator.
    pub const fn new(config: AggregatorConfig) -> Self {
        Self::from_aggregator(ImpactAggregator::new(config))
    }

    /// Wrap an existing aggregator.
    pub const fn from_aggregator(aggregator: ImpactAggregator) -> Self {
        Self {
            inner: Mutex::new(aggregator),
        }
    }

    /// Record a session stamped with the current time.
    pub fn record(
        &self,
        user_id: &UserId,
        session: &Value,
    ) -> Result<UserImpactProfile, AggregatorError> {
        self.record_at(user_id, session, Utc::now())
    }

    /// Record a session at an explicit timestamp.
    pub fn record_at(
        &self,
        user_id: &UserId,
        session: &Value,
        recorded_at: DateTime<Utc>,
    ) -> Result<UserImpactProfile, AggregatorError> {
        Ok(self.lock()?.record_at(user_id, session, recorded_at))
    }

    /// The stored profile, or a zeroed default.
    pub fn profile(&self, user_id: &UserId) -> Result<UserImpactProfile, AggregatorError> {
        Ok(self.lock()?.profile(user_id))
    }

    /// The user's most recent log entries.
    pub fn history(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, AggregatorError> {
        Ok(self.lock()?.history(user_id, limit))
    }

    /// The collective report as of now.
    pub fn report(&self) -> Result<CollectiveImpactSummary, AggregatorError> {
        Ok(self.lock()?.report())
    }

    /// The collective report as of `now`.
    pub fn report_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<CollectiveImpactSummary, AggregatorError> {
        Ok(self.lock()?.report_at(now))
    }

    /// Recompute every profile's totals from its activity log.
    pub fn audit(&self) -> Result<AuditReport, AggregatorError> {
        Ok(self.lock()?.audit())
    }

    /// Copy out every stored profile, for persistence by the caller.
    pub fn snapshot(&self) -> Result<Vec<UserImpactProfile>, AggregatorError> {
        Ok(self.lock()?.profiles().cloned().collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ImpactAggregator>, AggregatorError> {
        self.inner.lock().map_err(|poisoned| {
            error!(%poisoned, "aggregator lock poisoned");
            AggregatorError::LockPoisoned
        })
    }
}

//! Transient staging of computed breakdowns.
//!
//! A breakdown is computed before the user decides to keep it. Until then it
//! is held here, keyed by the user it was computed for, so that a later "save"
//! can pick it up and persist it. Staged breakdowns live in memory only and
//! expire after a fixed time to live.

use crate::core::breakdown::{BreakdownItem, CostInput, total_cost};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Default time to live of a staged breakdown.
pub const DEFAULT_TTL_MINUTES: i64 = 30;

/// A computed breakdown waiting to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingIntent {
    /// The answers the breakdown was computed from
    pub input: CostInput,
    /// The computed lines
    pub breakdown: Vec<BreakdownItem>,
    /// When the breakdown was staged
    pub staged_at: DateTime<Utc>,
}

impl PendingIntent {
    /// Sum of the staged lines.
    #[must_use]
    pub fn total(&self) -> f64 {
        total_cost(&self.breakdown)
    }

    fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.staged_at > ttl
    }
}

/// In-memory store of pending breakdowns, one per key.
#[derive(Debug)]
pub struct StagingArea {
    pending: RwLock<HashMap<String, PendingIntent>>,
    ttl: Duration,
}

impl Default for StagingArea {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_TTL_MINUTES))
    }
}

impl StagingArea {
    /// Creates an empty staging area whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Stages a breakdown for `key`, replacing whatever was staged before.
    pub async fn stage(&self, key: &str, input: CostInput, breakdown: Vec<BreakdownItem>) {
        let intent = PendingIntent {
            input,
            breakdown,
            staged_at: Utc::now(),
        };
        debug!(key, lines = intent.breakdown.len(), "Staged breakdown");
        self.pending.write().await.insert(key.to_string(), intent);
    }

    /// Removes and returns the breakdown staged for `key`, if it has not
    /// expired. Each staged breakdown can be taken once.
    pub async fn take(&self, key: &str) -> Option<PendingIntent> {
        let intent = self.pending.write().await.remove(key)?;
        if intent.is_expired(self.ttl, Utc::now()) {
            debug!(key, "Staged breakdown expired");
            return None;
        }
        Some(intent)
    }

    /// Returns a copy of the breakdown staged for `key` without removing it.
    pub async fn peek(&self, key: &str) -> Option<PendingIntent> {
        let now = Utc::now();
        self.pending
            .read()
            .await
            .get(key)
            .filter(|intent| !intent.is_expired(self.ttl, now))
            .cloned()
    }

    /// Drops every expired entry and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut pending = self.pending.write().await;
        let before = pending.len();
        pending.retain(|_, intent| !intent.is_expired(self.ttl, now));
        before - pending.len()
    }
}

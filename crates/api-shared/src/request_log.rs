//! Bounded in-memory log of recent inbound requests.
//!
//! The log keeps at most [`REQUEST_LOG_CAPACITY`] entries. Appending to a full log evicts the
//! oldest entry first, so the log always holds the most recent requests in arrival order.
//! Appends and snapshots are serialised through one lock; a snapshot is a consistent copy
//! that later appends cannot tear.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::ToSchema;

/// Maximum number of entries retained.
pub const REQUEST_LOG_CAPACITY: usize = 1000;

/// Recorded when a request carries no usable `User-Agent` header.
pub const UNKNOWN_USER_AGENT: &str = "unknown";

/// One observed inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestLogEntry {
    /// When the request arrived
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub path: String,
    pub user_agent: String,
}

impl RequestLogEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        user_agent: Option<&str>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            method: method.into(),
            path: path.into(),
            user_agent: user_agent.unwrap_or(UNKNOWN_USER_AGENT).to_owned(),
        }
    }
}

/// Fixed-capacity ring buffer of [`RequestLogEntry`] values.
///
/// Cloning yields another handle to the same buffer.
#[derive(Debug, Clone)]
pub struct RequestLog {
    /// Entries, oldest first
    entries: Arc<RwLock<VecDeque<RequestLogEntry>>>,
}

impl RequestLog {
    /// Creates an empty log holding at most [`REQUEST_LOG_CAPACITY`] entries.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(REQUEST_LOG_CAPACITY))),
        }
    }

    /// Appends an entry, evicting the oldest one if the log is full.
    pub async fn append(&self, entry: RequestLogEntry) {
        let mut entries = self.entries.write().await;
        if entries.len() == REQUEST_LOG_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Returns a point-in-time copy of the log, oldest first.
    pub async fn snapshot(&self) -> Vec<RequestLogEntry> {
        let entries = self.entries.read().await;
        entries.iter().cloned().collect()
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::new()
    }
}

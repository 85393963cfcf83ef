//! Workspace activity feed.
//!
//! A bounded, most-recent-first log of human-readable event descriptions.
//! Each entry snapshots the actor's display name and avatar at write time so
//! later profile edits never rewrite history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::employee::Employee;

/// Maximum number of retained entries; insertion past the cap silently
/// evicts the oldest.
pub const ACTIVITY_CAP: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// Snapshot fields, copied by value from the actor at write time.
    pub actor_name: String,
    #[serde(default)]
    pub actor_avatar_url: String,
}

/// Bounded most-recent-first activity log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a log from persisted entries, enforcing the cap.
    pub fn from_entries(mut entries: Vec<ActivityEntry>) -> Self {
        entries.truncate(ACTIVITY_CAP);
        Self { entries }
    }

    /// Record a message attributed to `actor`, snapshotting name and avatar.
    /// Prepends, then truncates to the most recent `ACTIVITY_CAP` entries.
    pub fn record(&mut self, actor: &Employee, message: impl Into<String>, now: DateTime<Utc>) {
        let entry = ActivityEntry {
            id: Ulid::new().to_string(),
            timestamp: now,
            message: message.into(),
            actor_name: actor.name.clone(),
            actor_avatar_url: actor.avatar_url.clone(),
        };
        self.entries.insert(0, entry);
        self.entries.truncate(ACTIVITY_CAP);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<ActivityEntry> {
        self.entries
    }
}

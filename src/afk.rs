//! # Feature: AFK Tracking
//!
//! Keeps track of members who marked themselves away with `/afk`. Uses DashMap
//! so the message observer and the command handler can touch the map from
//! different gateway tasks without a global lock.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! Entries live for the process lifetime only.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::duration::format_duration;

pub const DEFAULT_AFK_REASON: &str = "AFK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AfkEntry {
    pub reason: String,
    pub since: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AfkNotice {
    /// The author was away and has just posted again.
    Returned { user_id: u64, away_for_ms: u64 },
    /// A mentioned user is still away.
    Away {
        user_id: u64,
        reason: String,
        since: DateTime<Utc>,
    },
}

impl AfkNotice {
    pub fn message(&self) -> String {
        match self {
            AfkNotice::Returned {
                user_id,
                away_for_ms,
            } => format!(
                "👋 Welcome back <@{}>! You were AFK for {}.",
                user_id,
                format_duration(*away_for_ms)
            ),
            AfkNotice::Away {
                user_id,
                reason,
                since,
            } => format!(
                "💤 <@{}> is AFK: {} (since <t:{}:R>)",
                user_id,
                reason,
                since.timestamp()
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct AfkTracker {
    entries: DashMap<u64, AfkEntry>,
}

impl AfkTracker {
    pub fn new() -> Self {
        AfkTracker {
            entries: DashMap::new(),
        }
    }

    /// Marks a user away. A missing or blank reason becomes `AFK`.
    pub fn set(&self, user_id: u64, reason: Option<&str>) -> AfkEntry {
        self.set_at(user_id, reason, Utc::now())
    }

    fn set_at(&self, user_id: u64, reason: Option<&str>, since: DateTime<Utc>) -> AfkEntry {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_AFK_REASON)
            .to_string();

        let entry = AfkEntry { reason, since };
        self.entries.insert(user_id, entry.clone());
        entry
    }

    pub fn get(&self, user_id: u64) -> Option<AfkEntry> {
        self.entries.get(&user_id).map(|entry| entry.clone())
    }

    pub fn clear(&self, user_id: u64) -> Option<AfkEntry> {
        self.entries.remove(&user_id).map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Feeds one plain message through the tracker.
    ///
    /// The author's own entry is removed (they are back). Mentioned users who
    /// are away produce a notice but keep their entry.
    pub fn observe(&self, author_id: u64, mentioned: &[u64]) -> Vec<AfkNotice> {
        self.observe_at(author_id, mentioned, Utc::now())
    }

    fn observe_at(&self, author_id: u64, mentioned: &[u64], now: DateTime<Utc>) -> Vec<AfkNotice> {
        let mut notices = Vec::new();

        if let Some(entry) = self.clear(author_id) {
            let away_for_ms = (now - entry.since).num_milliseconds().max(0) as u64;
            notices.push(AfkNotice::Returned {
                user_id: author_id,
                away_for_ms,
            });
        }

        let mut seen = Vec::with_capacity(mentioned.len());
        for &user_id in mentioned {
            if user_id == author_id || seen.contains(&user_id) {
                continue;
            }
            seen.push(user_id);

            if let Some(entry) = self.get(user_id) {
                notices.push(AfkNotice::Away {
                    user_id,
                    reason: entry.reason,
                    since: entry.since,
                });
            }
        }

        notices
    }
}

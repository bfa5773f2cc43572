//! In-Memory Backend
//!
//! A complete wall server living inside the process. Used for demo mode and
//! as a realistic backend in tests. It applies the same rules as the real
//! server:
//!
//! - names and texts are trimmed, internal whitespace collapsed, and
//!   truncated (500 / 1000 characters)
//! - empty name or text is rejected
//! - ids are assigned sequentially from 1
//! - deferred entries are revealed the next day at the configured hour
//! - list-since only returns entries whose reveal time has come

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::traits::{BackendError, WallBackend};
use crate::clock::{Calendar, LocalCalendar};
use crate::entry::{Entry, EntryId, SubmitRequest};

/// Maximum stored name length, in characters
pub const MAX_NAME_CHARS: usize = 500;

/// Maximum stored text length, in characters
pub const MAX_TEXT_CHARS: usize = 1000;

const DEMO_ENTRIES: &[(&str, &str)] = &[
    ("Ivan", "Love each other and dance until morning!"),
    ("Maria", "May every day feel like today, full of sparkle!"),
    ("Dima", "Travel, laughter, and patience with each other!"),
    ("Anya", "Home is wherever you are together. Be happy!"),
    ("Lena", "A million kisses and zero quarrels!"),
];

/// When deferred entries become visible
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealPolicy {
    /// Local hour of the day after submission at which deferred entries appear
    pub hour: u32,
    /// Visible when `visible_at <= now` (true) or only when `visible_at < now`
    pub inclusive: bool,
}

impl Default for RevealPolicy {
    fn default() -> Self {
        Self {
            hour: 10,
            inclusive: true,
        }
    }
}

impl RevealPolicy {
    /// Reveal time for an entry submitted at `submitted` with deferral
    #[must_use]
    pub fn deferred_until(&self, submitted: NaiveDateTime) -> NaiveDateTime {
        let day = submitted.date().succ_opt().unwrap_or(submitted.date());
        let time = NaiveTime::from_hms_opt(self.hour, 0, 0).unwrap_or(NaiveTime::MIN);
        day.and_time(time)
    }

    /// Whether an entry revealed at `visible_at` is visible at `now`
    #[must_use]
    pub fn is_visible(&self, visible_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        if self.inclusive {
            visible_at <= now
        } else {
            visible_at < now
        }
    }
}

/// Trim, collapse whitespace runs to one space, and cap the length
///
/// Only ASCII whitespace (including vertical tab) separates words, so a
/// non-breaking space stays part of the text as the wall server keeps it.
#[must_use]
pub fn sanitize(raw: &str, max_chars: usize) -> String {
    raw.split(|c: char| c.is_ascii_whitespace() || c == '\x0B')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(max_chars)
        .collect()
}

#[derive(Debug, Clone)]
struct StoredEntry {
    entry: Entry,
    visible_at: NaiveDateTime,
}

/// In-process wall server
pub struct MemoryBackend {
    calendar: Arc<dyn Calendar>,
    policy: RevealPolicy,
    rows: RwLock<Vec<StoredEntry>>,
}

impl MemoryBackend {
    /// Create an empty backend on the local calendar
    #[must_use]
    pub fn new(policy: RevealPolicy) -> Self {
        Self::with_calendar(policy, Arc::new(LocalCalendar))
    }

    /// Create an empty backend on an explicit calendar
    #[must_use]
    pub fn with_calendar(policy: RevealPolicy, calendar: Arc<dyn Calendar>) -> Self {
        Self {
            calendar,
            policy,
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Insert the demo entries, visible immediately
    pub fn seed_demo(&self) {
        let now = self.calendar.now();
        let mut rows = self.rows.write();
        for (name, text) in DEMO_ENTRIES {
            let id = EntryId::new(rows.len() as u64 + 1);
            rows.push(StoredEntry {
                entry: Entry::new(id, *name, *text, now),
                visible_at: now,
            });
        }
        tracing::info!(count = DEMO_ENTRIES.len(), "Seeded demo entries");
    }

    /// Total stored entries, visible or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether nothing has been stored yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Accept a submission synchronously
    pub fn insert(&self, request: &SubmitRequest) -> Result<EntryId, BackendError> {
        let name = sanitize(&request.name, MAX_NAME_CHARS);
        let text = sanitize(&request.text, MAX_TEXT_CHARS);
        if name.is_empty() || text.is_empty() {
            return Err(BackendError::Rejected(
                "Name and text are required".to_string(),
            ));
        }

        let now = self.calendar.now();
        let visible_at = if request.defer {
            self.policy.deferred_until(now)
        } else {
            now
        };

        let mut rows = self.rows.write();
        let id = EntryId::new(rows.len() as u64 + 1);
        rows.push(StoredEntry {
            entry: Entry::new(id, name, text, now),
            visible_at,
        });

        tracing::debug!(%id, deferred = request.defer, %visible_at, "Stored entry");
        Ok(id)
    }

    /// Visible entries past the cursor, synchronously
    #[must_use]
    pub fn visible_since(&self, cursor: u64) -> Vec<Entry> {
        let now = self.calendar.now();
        self.rows
            .read()
            .iter()
            .filter(|row| row.entry.id.as_u64() > cursor)
            .filter(|row| self.policy.is_visible(row.visible_at, now))
            .map(|row| row.entry.clone())
            .collect()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(RevealPolicy::default())
    }
}

#[async_trait]
impl WallBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn list_since(&self, cursor: u64) -> Result<Vec<Entry>, BackendError> {
        Ok(self.visible_since(cursor))
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<EntryId, BackendError> {
        self.insert(request)
    }
}

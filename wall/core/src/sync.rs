//! Sync Client - Incremental Polling
//!
//! Pulls new entries from the wall server and feeds them to the registry.
//!
//! # Design
//!
//! ```text
//! begin() ──► PollTicket ──► (network, possibly on another task) ──► finish()
//!    │                                                                 │
//!    └─ None while a poll is in flight or after close()                └─ sort, ingest, advance cursor
//! ```
//!
//! - The cursor only moves forward: `cursor = max(cursor, highest id seen)`.
//!   Duplicates still count toward the highest id.
//! - A failed poll leaves the cursor where it was; the next interval retries
//!   from the same point.
//! - At most one poll is in flight. The ticket is the proof.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::backend::{BackendError, WallBackend};
use crate::entry::{Entry, EntryId};
use crate::registry::RegisterResult;

/// Why a poll produced nothing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The request never completed
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with `ok: false`
    #[error("server rejected poll: {0}")]
    Rejected(String),

    /// The response could not be understood
    #[error("malformed response: {0}")]
    Decode(String),

    /// Another poll is still in flight
    #[error("a poll is already in flight")]
    Busy,

    /// The client has been closed
    #[error("sync client closed")]
    Closed,
}

impl From<BackendError> for SyncError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Transport(msg) => Self::Network(msg),
            BackendError::Decode(msg) => Self::Decode(msg),
            BackendError::Server(msg) | BackendError::Rejected(msg) => Self::Rejected(msg),
        }
    }
}

/// Proof that a poll is in flight
///
/// Obtained from [`SyncClient::begin`] and consumed by [`SyncClient::finish`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a poll ticket must be finished or the client stays busy"]
pub struct PollTicket {
    seq: u64,
    cursor: u64,
}

impl PollTicket {
    /// Cursor to send with the request
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }
}

/// Result of one successful poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Newly registered ids, ascending
    pub inserted: Vec<EntryId>,
    /// Entries that were already on the wall
    pub duplicates: usize,
    /// Cursor after the poll
    pub cursor: u64,
    /// Whether this was the first successful poll
    pub initial: bool,
}

/// When the next poll is due
#[derive(Debug, Clone)]
pub struct PollCadence {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PollCadence {
    /// A cadence whose first poll is due immediately
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Poll interval
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a poll should start at `now`
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.map_or(true, |due| now >= due)
    }

    /// Record that a poll started at `now`
    pub fn mark(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Time left until the next poll, zero when overdue
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_due
            .map_or(Duration::ZERO, |due| due.saturating_duration_since(now))
    }
}

/// Tracks the cursor and serializes polls
#[derive(Debug)]
pub struct SyncClient {
    cursor: u64,
    next_seq: u64,
    in_flight: Option<u64>,
    synced_once: bool,
    closed: bool,
    cadence: PollCadence,
}

impl SyncClient {
    /// Create a client at cursor 0
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            cursor: 0,
            next_seq: 0,
            in_flight: None,
            synced_once: false,
            closed: false,
            cadence: PollCadence::new(interval),
        }
    }

    /// Highest id ever observed
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Whether a poll is in flight
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether [`close`](Self::close) has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The poll cadence
    #[must_use]
    pub fn cadence(&self) -> &PollCadence {
        &self.cadence
    }

    /// Whether a poll may start at `now`
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        !self.closed && self.in_flight.is_none() && self.cadence.is_due(now)
    }

    /// Start a poll at `now`
    ///
    /// Returns `None` while another poll is in flight or after close.
    pub fn begin(&mut self, now: Instant) -> Option<PollTicket> {
        if self.closed || self.in_flight.is_some() {
            return None;
        }

        self.next_seq += 1;
        self.in_flight = Some(self.next_seq);
        self.cadence.mark(now);
        tracing::trace!(cursor = self.cursor, seq = self.next_seq, "Poll started");
        Some(PollTicket {
            seq: self.next_seq,
            cursor: self.cursor,
        })
    }

    /// Complete a poll with the backend's answer
    ///
    /// Entries are handed to `ingest` in ascending id order. On failure the
    /// cursor is unchanged and the error is logged.
    pub fn finish<F>(
        &mut self,
        ticket: PollTicket,
        result: Result<Vec<Entry>, BackendError>,
        mut ingest: F,
    ) -> Result<PollOutcome, SyncError>
    where
        F: FnMut(Entry) -> RegisterResult,
    {
        if self.in_flight == Some(ticket.seq) {
            self.in_flight = None;
        }
        if self.closed {
            return Err(SyncError::Closed);
        }

        let mut entries = match result {
            Ok(entries) => entries,
            Err(err) => {
                let err = SyncError::from(err);
                tracing::warn!(cursor = self.cursor, error = %err, "Poll failed");
                return Err(err);
            }
        };
        entries.sort_by_key(|entry| entry.id);

        let mut outcome = PollOutcome {
            initial: !self.synced_once,
            ..PollOutcome::default()
        };
        for entry in entries {
            let id = entry.id;
            if id.as_u64() <= ticket.cursor {
                tracing::debug!(%id, cursor = ticket.cursor, "Server returned entry behind cursor");
            }
            match ingest(entry) {
                RegisterResult::Inserted => outcome.inserted.push(id),
                RegisterResult::Duplicate => outcome.duplicates += 1,
            }
            self.cursor = self.cursor.max(id.as_u64());
        }

        self.synced_once = true;
        outcome.cursor = self.cursor;
        if !outcome.inserted.is_empty() {
            tracing::debug!(
                inserted = outcome.inserted.len(),
                duplicates = outcome.duplicates,
                cursor = self.cursor,
                "Poll complete"
            );
        }
        Ok(outcome)
    }

    /// Run one full poll against `backend`
    pub async fn poll<B, F>(
        &mut self,
        backend: &B,
        now: Instant,
        ingest: F,
    ) -> Result<PollOutcome, SyncError>
    where
        B: WallBackend + ?Sized,
        F: FnMut(Entry) -> RegisterResult,
    {
        let ticket = match self.begin(now) {
            Some(ticket) => ticket,
            None if self.closed => return Err(SyncError::Closed),
            None => return Err(SyncError::Busy),
        };
        let result = backend.list_since(ticket.cursor()).await;
        self.finish(ticket, result, ingest)
    }

    /// Forget an in-flight poll whose ticket was lost
    ///
    /// The cursor is unchanged, so the next poll repeats the same request.
    pub fn abandon(&mut self) {
        if let Some(seq) = self.in_flight.take() {
            tracing::warn!(seq, cursor = self.cursor, "Abandoned in-flight poll");
        }
    }

    /// Stop polling for good
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            tracing::debug!(cursor = self.cursor, "Sync client closed");
        }
    }
}

/// A fetched poll answer together with the ticket it belongs to
pub type FetchResult = (PollTicket, Result<Vec<Entry>, BackendError>);

/// Run a poll's request on the tokio runtime
///
/// The handle resolves to the ticket and the backend's answer, ready for
/// [`SyncClient::finish`].
pub fn spawn_fetch<B>(backend: Arc<B>, ticket: PollTicket) -> JoinHandle<FetchResult>
where
    B: WallBackend + ?Sized + 'static,
{
    tokio::spawn(async move {
        let result = backend.list_since(ticket.cursor()).await;
        (ticket, result)
    })
}

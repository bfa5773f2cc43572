//! End-to-end scenarios for the wall engine
//!
//! These drive a [`Wall`] the way a display surface would: a scripted
//! backend answers polls, a manual clock stands in for frame timing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use driftwall_core::{
    Appearance, BackendError, Clock, Entry, EntryId, Extent, FixedLayout, FocusOutcome,
    ManualClock, MemoryBackend, SubmitClient, SubmitRequest, SyncError, Vec2, Wall, WallBackend,
    WallConfig,
};

// =============================================================================
// Scripted backend
// =============================================================================

/// Answers polls from a queue and records every cursor it was asked for
#[derive(Default)]
struct ScriptedBackend {
    answers: Mutex<VecDeque<Result<Vec<Entry>, BackendError>>>,
    cursors: Mutex<Vec<u64>>,
}

impl ScriptedBackend {
    fn then(self, answer: Result<Vec<Entry>, BackendError>) -> Self {
        self.answers.lock().push_back(answer);
        self
    }

    fn cursors(&self) -> Vec<u64> {
        self.cursors.lock().clone()
    }
}

#[async_trait]
impl WallBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn list_since(&self, cursor: u64) -> Result<Vec<Entry>, BackendError> {
        self.cursors.lock().push(cursor);
        self.answers.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn submit(&self, _request: &SubmitRequest) -> Result<EntryId, BackendError> {
        Err(BackendError::Rejected("read-only".into()))
    }
}

fn entry(id: u64) -> Entry {
    Entry::new(id, "Guest", format!("wish number {id}"), NaiveDateTime::default())
}

fn entries(ids: &[u64]) -> Vec<Entry> {
    ids.iter().copied().map(entry).collect()
}

const CARD: Extent = Extent::new(24.0, 5.0);
const FIELD: Extent = Extent::new(120.0, 40.0);

fn new_wall() -> (Wall, ManualClock) {
    let clock = ManualClock::new();
    let mut wall = Wall::with_clock(WallConfig::default(), FixedLayout(CARD), Arc::new(clock.clone()))
        .with_seed(2024);
    wall.resize(FIELD);
    (wall, clock)
}

fn frame_for(wall: &mut Wall, clock: &ManualClock, total: Duration) {
    let step = Duration::from_millis(16);
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        clock.advance(step);
        wall.frame();
        elapsed += step;
    }
}

// =============================================================================
// Sync
// =============================================================================

#[tokio::test]
async fn test_cursor_scenario_with_echo() {
    let backend = ScriptedBackend::default()
        .then(Ok(entries(&[1, 3])))
        .then(Ok(entries(&[3])));
    let (mut wall, _) = new_wall();

    let first = wall.poll(&backend).await.unwrap();
    assert_eq!(wall.ids(), vec![EntryId::new(1), EntryId::new(3)]);
    assert_eq!(first.cursor, 3);

    let second = wall.poll(&backend).await.unwrap();
    assert!(second.inserted.is_empty());
    assert_eq!(second.duplicates, 1);
    assert_eq!(wall.len(), 2);
    assert_eq!(wall.cursor(), 3);

    assert_eq!(backend.cursors(), vec![0, 3]);
}

#[tokio::test]
async fn test_failed_poll_retries_from_same_cursor() {
    let backend = ScriptedBackend::default()
        .then(Ok(entries(&[1, 2])))
        .then(Err(BackendError::Transport("connection reset".into())))
        .then(Ok(entries(&[3])));
    let (mut wall, _) = new_wall();

    wall.poll(&backend).await.unwrap();
    let err = wall.poll(&backend).await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
    assert_eq!(wall.cursor(), 2);
    assert_eq!(wall.len(), 2);

    wall.poll(&backend).await.unwrap();
    assert_eq!(wall.cursor(), 3);
    assert_eq!(backend.cursors(), vec![0, 2, 2]);
}

#[tokio::test]
async fn test_server_reported_failure_is_swallowed() {
    let backend = ScriptedBackend::default()
        .then(Err(BackendError::Server("maintenance".into())))
        .then(Ok(entries(&[1])));
    let (mut wall, _) = new_wall();

    assert_eq!(
        wall.poll(&backend).await.unwrap_err(),
        SyncError::Rejected("maintenance".into())
    );
    assert!(wall.is_empty());

    let outcome = wall.poll(&backend).await.unwrap();
    assert!(outcome.initial, "first successful poll counts as initial");
}

#[test]
fn test_overlapping_polls_are_refused() {
    let (mut wall, _) = new_wall();
    let ticket = wall.begin_poll().unwrap();
    assert!(wall.begin_poll().is_none());
    wall.finish_poll(ticket, Ok(entries(&[7]))).unwrap();
    assert!(wall.begin_poll().is_some());
}

#[test]
fn test_poll_cadence_follows_clock() {
    let (mut wall, clock) = new_wall();
    assert!(wall.poll_due());

    let ticket = wall.begin_poll().unwrap();
    wall.finish_poll(ticket, Ok(Vec::new())).unwrap();
    assert!(!wall.poll_due());

    clock.advance(Duration::from_millis(2499));
    assert!(!wall.poll_due());
    clock.advance(Duration::from_millis(1));
    assert!(wall.poll_due());
}

// =============================================================================
// Motion
// =============================================================================

#[tokio::test]
async fn test_cards_stay_inside_the_field() {
    let backend = ScriptedBackend::default().then(Ok(entries(&[1, 2, 3, 4, 5, 6, 7, 8])));
    let (mut wall, clock) = new_wall();
    wall.poll(&backend).await.unwrap();

    let max = FIELD.max_offset(CARD);
    for _ in 0..600 {
        clock.advance(Duration::from_millis(33));
        wall.frame();
        for card in wall.cards() {
            let p = card.motion.position;
            assert!(p.x >= 0.0 && p.x <= max.x, "x out of range: {p:?}");
            assert!(p.y >= 0.0 && p.y <= max.y, "y out of range: {p:?}");
        }
    }
}

#[test]
fn test_shrinking_field_pulls_cards_in() {
    let (mut wall, clock) = new_wall();
    for id in 1..=5 {
        wall.ingest(entry(id));
    }
    frame_for(&mut wall, &clock, Duration::from_secs(1));

    let small = Extent::new(30.0, 6.0);
    wall.resize(small);
    let max = small.max_offset(CARD);
    for card in wall.cards() {
        assert!(card.motion.position.x <= max.x);
        assert!(card.motion.position.y <= max.y);
    }

    // Field smaller than a card pins everything to the origin
    wall.resize(Extent::new(10.0, 2.0));
    for card in wall.cards() {
        assert_eq!(card.motion.position, Vec2::ZERO);
    }
}

// =============================================================================
// Focus
// =============================================================================

#[test]
fn test_focus_scenario() {
    let (mut wall, clock) = new_wall();
    for id in [1, 3] {
        wall.ingest(entry(id));
    }
    frame_for(&mut wall, &clock, Duration::from_millis(500));

    let focused = EntryId::new(3);
    let other = EntryId::new(1);
    assert_eq!(wall.focus(focused), FocusOutcome::Focused);
    assert!(wall.is_paused());
    assert_eq!(wall.card(focused).unwrap().motion.position, FIELD.centered(CARD));
    assert_eq!(wall.appearance(other), Appearance::Dimmed);

    // Nothing moves while focused, however long it lasts
    let frozen = wall.card(other).unwrap().motion.position;
    frame_for(&mut wall, &clock, Duration::from_secs(2));
    assert_eq!(wall.card(other).unwrap().motion.position, frozen);

    // A second focus request is ignored
    assert_eq!(wall.focus(other), FocusOutcome::AlreadyFocused);
    assert_eq!(wall.focused(), Some(focused));

    clock.advance(Duration::from_secs(60));
    let unfocused_at = clock.now();
    assert_eq!(wall.unfocus(), FocusOutcome::Unfocused);
    assert!(!wall.is_paused());
    assert_eq!(wall.card(focused).unwrap().motion.last_tick, unfocused_at);

    // First tick after resume integrates only the time since unfocus
    let before = wall.card(focused).unwrap().motion.position;
    clock.advance(Duration::from_millis(20));
    wall.frame();
    let after = wall.card(focused).unwrap().motion.position;
    let travelled = ((after.x - before.x).powi(2) + (after.y - before.y).powi(2)).sqrt();
    assert!(travelled <= 75.0 * 0.02 + 1e-9, "teleported {travelled}");

    assert_eq!(wall.unfocus(), FocusOutcome::NotFocused);
}

#[tokio::test]
async fn test_entries_arriving_during_focus() {
    let backend = ScriptedBackend::default()
        .then(Ok(entries(&[1])))
        .then(Ok(entries(&[2])));
    let (mut wall, clock) = new_wall();
    wall.poll(&backend).await.unwrap();
    wall.focus(EntryId::new(1));

    let outcome = wall.poll(&backend).await.unwrap();
    assert_eq!(outcome.inserted, vec![EntryId::new(2)]);

    let newcomer = wall.card(EntryId::new(2)).unwrap();
    assert!(newcomer.has_badge(clock.now()));
    assert!(!newcomer.motion.slot.is_scheduled());
    assert_eq!(wall.appearance(EntryId::new(2)), Appearance::Dimmed);

    wall.unfocus();
    assert_eq!(wall.pending_ticks(), 2);
}

// =============================================================================
// Submit
// =============================================================================

#[tokio::test]
async fn test_submitted_entry_arrives_through_poll() {
    let backend = Arc::new(MemoryBackend::default());
    let submitter = SubmitClient::new(backend.clone());
    let (mut wall, _) = new_wall();

    wall.poll(backend.as_ref()).await.unwrap();
    assert!(wall.is_empty());

    let id = submitter.submit("Ann", "  many   happy\nreturns ", false).await.unwrap();
    assert!(wall.is_empty(), "submission alone does not touch the wall");

    wall.poll(backend.as_ref()).await.unwrap();
    let card = wall.card(id).unwrap();
    assert_eq!(card.entry.text, "many happy returns");
}

#[tokio::test]
async fn test_teardown_stops_polling() {
    let backend = ScriptedBackend::default().then(Ok(entries(&[1])));
    let (mut wall, _) = new_wall();
    wall.poll(&backend).await.unwrap();

    wall.teardown();
    assert_eq!(wall.poll(&backend).await.unwrap_err(), SyncError::Closed);
    assert_eq!(backend.cursors(), vec![0]);
    assert_eq!(wall.pending_ticks(), 0);
}

//! Wall - The Engine Facade
//!
//! One [`Wall`] is one display surface's worth of state: the registry, the
//! sync cursor, the motion scheduler and the focus controller. Surfaces own
//! it, feed it time and input, and read cards back out to draw.
//!
//! # Design
//!
//! The wall never touches the network or the terminal itself:
//! - Polls go through [`Wall::poll`] (await in place) or the
//!   [`Wall::begin_poll`] / [`Wall::finish_poll`] pair (spawn the request,
//!   apply the answer later).
//! - Frames are driven by the surface calling [`Wall::frame`].
//! - Card sizes come from a [`CardLayout`] supplied by the surface.
//!
//! Everything runs on the surface's task through `&mut self`; there is no
//! interior locking.

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::backend::{BackendError, WallBackend};
use crate::clock::{Clock, MonotonicClock};
use crate::config::WallConfig;
use crate::entry::{Entry, EntryId};
use crate::focus::{Appearance, FocusController, FocusOutcome};
use crate::geometry::Extent;
use crate::motion::MotionScheduler;
use crate::registry::{Card, EntityRegistry, RegisterResult};
use crate::sync::{PollOutcome, PollTicket, SyncClient, SyncError};

/// Measures how large an entry's card is when drawn
pub trait CardLayout: Send {
    /// Rendered size of the card for `entry`
    fn measure(&self, entry: &Entry) -> Extent;
}

/// Every card has the same size
#[derive(Debug, Clone, Copy)]
pub struct FixedLayout(pub Extent);

impl CardLayout for FixedLayout {
    fn measure(&self, _entry: &Entry) -> Extent {
        self.0
    }
}

/// The wall engine
pub struct Wall {
    config: WallConfig,
    clock: Arc<dyn Clock>,
    layout: Box<dyn CardLayout>,
    rng: StdRng,
    registry: EntityRegistry,
    sync: SyncClient,
    scheduler: MotionScheduler,
    focus: FocusController,
}

impl std::fmt::Debug for Wall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wall")
            .field("cards", &self.registry.len())
            .field("cursor", &self.sync.cursor())
            .field("bounds", &self.scheduler.bounds())
            .field("focused", &self.focus.focused())
            .finish_non_exhaustive()
    }
}

impl Wall {
    /// Create a wall on the real clock
    pub fn new(config: WallConfig, layout: impl CardLayout + 'static) -> Self {
        Self::with_clock(config, layout, Arc::new(MonotonicClock))
    }

    /// Create a wall on an explicit clock
    pub fn with_clock(
        config: WallConfig,
        layout: impl CardLayout + 'static,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sync: SyncClient::new(config.sync.poll_interval()),
            scheduler: MotionScheduler::new(config.motion.clone()),
            config,
            clock,
            layout: Box::new(layout),
            rng: StdRng::from_entropy(),
            registry: EntityRegistry::new(),
            focus: FocusController::new(),
        }
    }

    /// Use a deterministic random source for launches
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &WallConfig {
        &self.config
    }

    /// Current instant on the wall's clock
    #[must_use]
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    // ------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------

    /// Highest entry id ever observed
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.sync.cursor()
    }

    /// Whether a poll should start now
    #[must_use]
    pub fn poll_due(&self) -> bool {
        self.sync.is_due(self.clock.now())
    }

    /// Time until the next poll is due
    #[must_use]
    pub fn until_next_poll(&self) -> std::time::Duration {
        self.sync.cadence().remaining(self.clock.now())
    }

    /// Start a poll; `None` while one is in flight or after teardown
    pub fn begin_poll(&mut self) -> Option<PollTicket> {
        self.sync.begin(self.clock.now())
    }

    /// Apply the answer to a poll started with [`begin_poll`](Self::begin_poll)
    pub fn finish_poll(
        &mut self,
        ticket: PollTicket,
        result: Result<Vec<Entry>, BackendError>,
    ) -> Result<PollOutcome, SyncError> {
        let now = self.clock.now();
        let Self {
            sync,
            registry,
            scheduler,
            layout,
            rng,
            ..
        } = self;

        let outcome = sync.finish(ticket, result, |entry| {
            let id = entry.id;
            let size = layout.measure(&entry);
            let result = registry.register(entry, size, now);
            if result.is_inserted() {
                if let Some(card) = registry.get_mut(id) {
                    scheduler.launch(card, now, &mut *rng);
                }
            }
            result
        })?;

        if !outcome.initial {
            let until = now + self.config.sync.badge_duration();
            for id in &outcome.inserted {
                if let Some(card) = self.registry.get_mut(*id) {
                    card.badge_until = Some(until);
                }
            }
        }
        if outcome.initial {
            tracing::info!(cards = self.registry.len(), cursor = outcome.cursor, "Initial sync complete");
        }
        Ok(outcome)
    }

    /// Give up on a poll whose request task died
    pub fn abandon_poll(&mut self) {
        self.sync.abandon();
    }

    /// Run one poll against `backend`
    pub async fn poll<B: WallBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<PollOutcome, SyncError> {
        let ticket = match self.begin_poll() {
            Some(ticket) => ticket,
            None if self.sync.is_closed() => return Err(SyncError::Closed),
            None => return Err(SyncError::Busy),
        };
        let result = backend.list_since(ticket.cursor()).await;
        self.finish_poll(ticket, result)
    }

    // ------------------------------------------------------------------
    // Motion
    // ------------------------------------------------------------------

    /// Advance every card whose tick is due; returns how many moved
    pub fn frame(&mut self) -> usize {
        let now = self.clock.now();
        self.scheduler
            .frame(&mut self.registry, now, self.focus.focused())
    }

    /// Adopt a new container size
    pub fn resize(&mut self, bounds: Extent) {
        if bounds == self.scheduler.bounds() {
            return;
        }
        self.scheduler.resize(&mut self.registry, bounds);
        self.focus.recenter(&mut self.registry, bounds);
        tracing::debug!(width = bounds.width, height = bounds.height, "Wall resized");
    }

    /// Container size
    #[must_use]
    pub fn bounds(&self) -> Extent {
        self.scheduler.bounds()
    }

    /// Whether the motion scheduler is paused
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    /// Ticks waiting for the next frame
    #[must_use]
    pub fn pending_ticks(&self) -> usize {
        self.scheduler.pending_ticks()
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    /// Focus a card
    pub fn focus(&mut self, id: EntryId) -> FocusOutcome {
        self.focus
            .focus(id, &mut self.registry, &mut self.scheduler)
    }

    /// Release focus
    pub fn unfocus(&mut self) -> FocusOutcome {
        let now = self.clock.now();
        self.focus
            .unfocus(&mut self.registry, &mut self.scheduler, now)
    }

    /// The focused card, if any
    #[must_use]
    pub fn focused(&self) -> Option<EntryId> {
        self.focus.focused()
    }

    /// How a card should be drawn
    #[must_use]
    pub fn appearance(&self, id: EntryId) -> Appearance {
        self.focus.appearance(id)
    }

    /// Stacking order of a card
    #[must_use]
    pub fn z_order(&self, id: EntryId) -> u8 {
        self.focus.z_order(id)
    }

    // ------------------------------------------------------------------
    // Cards
    // ------------------------------------------------------------------

    /// Look up a card
    #[must_use]
    pub fn card(&self, id: EntryId) -> Option<&Card> {
        self.registry.get(id)
    }

    /// Every card, in no particular order
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.registry.all()
    }

    /// Card ids, ascending
    #[must_use]
    pub fn ids(&self) -> Vec<EntryId> {
        self.registry.ids()
    }

    /// Number of cards
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether the wall is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Card ids bottom to top
    ///
    /// Newer cards draw over older ones; the focused card draws over all.
    #[must_use]
    pub fn draw_order(&self) -> Vec<EntryId> {
        let mut ids = self.registry.ids();
        ids.sort_by_key(|id| (self.focus.z_order(*id), *id));
        ids
    }

    /// Register an entry that did not arrive through a poll
    ///
    /// Returns `None` once the wall is torn down.
    pub fn ingest(&mut self, entry: Entry) -> Option<RegisterResult> {
        if self.is_torn_down() {
            tracing::debug!(id = %entry.id, "Ignoring entry for torn-down wall");
            return None;
        }
        let now = self.clock.now();
        let id = entry.id;
        let size = self.layout.measure(&entry);
        let result = self.registry.register(entry, size, now);
        if result.is_inserted() {
            if let Some(card) = self.registry.get_mut(id) {
                self.scheduler.launch(card, now, &mut self.rng);
            }
        }
        Some(result)
    }

    /// Stop everything and clear the wall
    pub fn teardown(&mut self) {
        self.sync.close();
        self.scheduler.teardown(&mut self.registry);
        self.focus.reset();
        self.registry.clear();
        tracing::info!("Wall torn down");
    }

    /// Whether [`teardown`](Self::teardown) has run
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.scheduler.is_torn_down()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDateTime;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::clock::ManualClock;

    fn entry(id: u64) -> Entry {
        Entry::new(id, "Ann", format!("wish {id}"), NaiveDateTime::default())
    }

    fn wall() -> (Wall, ManualClock) {
        let clock = ManualClock::new();
        let mut wall = Wall::with_clock(
            WallConfig::default(),
            FixedLayout(Extent::new(20.0, 4.0)),
            Arc::new(clock.clone()),
        )
        .with_seed(42);
        wall.resize(Extent::new(120.0, 40.0));
        (wall, clock)
    }

    #[test]
    fn test_initial_poll_has_no_badges() {
        let (mut wall, clock) = wall();
        let ticket = wall.begin_poll().unwrap();
        let outcome = wall.finish_poll(ticket, Ok(vec![entry(1), entry(3)])).unwrap();
        assert!(outcome.initial);
        assert_eq!(wall.ids(), vec![EntryId::new(1), EntryId::new(3)]);
        assert!(wall.cards().all(|card| !card.has_badge(clock.now())));

        let ticket = wall.begin_poll().unwrap();
        wall.finish_poll(ticket, Ok(vec![entry(4)])).unwrap();
        let card = wall.card(EntryId::new(4)).unwrap();
        assert!(card.has_badge(clock.now()));
        assert!(!card.has_badge(clock.now() + Duration::from_secs(4)));
    }

    #[test]
    fn test_arrival_during_focus_is_dimmed_and_still() {
        let (mut wall, _) = wall();
        wall.ingest(entry(1));
        assert_eq!(wall.focus(EntryId::new(1)), FocusOutcome::Focused);

        wall.ingest(entry(2));
        let id = EntryId::new(2);
        assert_eq!(wall.appearance(id), Appearance::Dimmed);
        assert!(!wall.card(id).unwrap().motion.slot.is_scheduled());
        assert_eq!(wall.pending_ticks(), 0);

        wall.unfocus();
        assert!(wall.card(id).unwrap().motion.slot.is_scheduled());
    }

    #[test]
    fn test_draw_order_puts_focus_on_top() {
        let (mut wall, _) = wall();
        wall.ingest(entry(1));
        wall.ingest(entry(2));
        wall.focus(EntryId::new(1));

        assert_eq!(wall.draw_order(), vec![EntryId::new(2), EntryId::new(1)]);
        wall.unfocus();
        assert_eq!(wall.draw_order(), vec![EntryId::new(1), EntryId::new(2)]);
    }

    #[test]
    fn test_resize_is_noop_when_unchanged() {
        let (mut wall, _) = wall();
        wall.ingest(entry(1));
        let before = wall.card(EntryId::new(1)).unwrap().motion.clone();
        wall.resize(Extent::new(120.0, 40.0));
        assert_eq!(wall.card(EntryId::new(1)).unwrap().motion, before);
    }

    #[test]
    fn test_teardown() {
        let (mut wall, _) = wall();
        wall.ingest(entry(1));
        wall.focus(EntryId::new(1));
        wall.teardown();

        assert!(wall.is_torn_down());
        assert!(wall.is_empty());
        assert_eq!(wall.focused(), None);
        assert!(wall.begin_poll().is_none());
        assert_eq!(wall.frame(), 0);
    }

    #[test]
    fn test_torn_down_wall_refuses_entries() {
        let (mut wall, _) = wall();
        assert_eq!(wall.ingest(entry(1)), Some(RegisterResult::Inserted));
        wall.teardown();

        assert_eq!(wall.ingest(entry(2)), None);
        assert!(wall.is_empty());
        assert_eq!(wall.pending_ticks(), 0);
    }
}

//! Entity Registry - What Is On The Wall
//!
//! The registry is the single source of truth for which entries are
//! currently displayed. Each entry id maps to exactly one [`Card`]: the
//! entry itself, its rendered size, and its animation state.
//!
//! Registration is idempotent. The same id arriving twice (a server echo, an
//! overlapping batch) leaves the existing card untouched and reports
//! [`RegisterResult::Duplicate`]. Nothing is ever removed during a session;
//! the registry is only cleared when the surface is torn down.
//!
//! Visual emphasis (focused / dimmed) is not stored on the card. It is
//! derived from the focus controller, so cards arriving mid-focus come out
//! dimmed.

use std::collections::HashMap;
use std::time::Instant;

use crate::entry::{Entry, EntryId};
use crate::geometry::Extent;
use crate::motion::AnimationState;

/// Outcome of [`EntityRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterResult {
    /// A new card was created
    Inserted,
    /// The id was already known; nothing changed
    Duplicate,
}

impl RegisterResult {
    /// Whether a card was created
    #[must_use]
    pub fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// One displayed entry
#[derive(Debug, Clone)]
pub struct Card {
    /// The entry shown on the card
    pub entry: Entry,
    /// Rendered size of the card
    pub size: Extent,
    /// Motion simulation state
    pub motion: AnimationState,
    /// Show a "new" badge until this instant
    pub badge_until: Option<Instant>,
}

impl Card {
    /// The card's entry id
    #[must_use]
    pub fn id(&self) -> EntryId {
        self.entry.id
    }

    /// Whether the "new" badge is showing at `now`
    #[must_use]
    pub fn has_badge(&self, now: Instant) -> bool {
        self.badge_until.is_some_and(|until| now < until)
    }
}

/// Authoritative id → card map
#[derive(Debug, Default)]
pub struct EntityRegistry {
    cards: HashMap<EntryId, Card>,
}

impl EntityRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry, creating its card at rest
    ///
    /// The new card's motion is anchored at `now`; launching it is up to the
    /// motion scheduler.
    pub fn register(&mut self, entry: Entry, size: Extent, now: Instant) -> RegisterResult {
        if self.cards.contains_key(&entry.id) {
            tracing::trace!(id = %entry.id, "Duplicate entry ignored");
            return RegisterResult::Duplicate;
        }

        let id = entry.id;
        self.cards.insert(
            id,
            Card {
                entry,
                size,
                motion: AnimationState::at_rest(now),
                badge_until: None,
            },
        );
        tracing::debug!(%id, total = self.cards.len(), "Registered card");
        RegisterResult::Inserted
    }

    /// Whether an id is on the wall
    #[must_use]
    pub fn has(&self, id: EntryId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Look up a card
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&Card> {
        self.cards.get(&id)
    }

    /// Look up a card mutably
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Card> {
        self.cards.get_mut(&id)
    }

    /// Every card, in no particular order
    pub fn all(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Every card mutably, in no particular order
    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.cards.values_mut()
    }

    /// All ids in ascending order
    #[must_use]
    pub fn ids(&self) -> Vec<EntryId> {
        let mut ids: Vec<_> = self.cards.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Highest registered id, or 0 when empty
    #[must_use]
    pub fn highest_id(&self) -> u64 {
        self.cards.keys().map(|id| id.as_u64()).max().unwrap_or(0)
    }

    /// Number of cards
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the wall is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Drop every card (surface teardown only)
    pub(crate) fn clear(&mut self) {
        self.cards.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn entry(id: u64, text: &str) -> Entry {
        Entry::new(id, "Ann", text, NaiveDateTime::default())
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = EntityRegistry::new();
        let now = Instant::now();
        let size = Extent::new(20.0, 4.0);

        assert_eq!(
            registry.register(entry(1, "first"), size, now),
            RegisterResult::Inserted
        );
        assert_eq!(
            registry.register(entry(1, "echo"), size, now),
            RegisterResult::Duplicate
        );

        assert_eq!(registry.len(), 1);
        // The original card survives the echo
        assert_eq!(registry.get(EntryId::new(1)).unwrap().entry.text, "first");
    }

    #[test]
    fn test_highest_id() {
        let mut registry = EntityRegistry::new();
        assert_eq!(registry.highest_id(), 0);

        let now = Instant::now();
        registry.register(entry(3, "c"), Extent::default(), now);
        registry.register(entry(1, "a"), Extent::default(), now);
        assert_eq!(registry.highest_id(), 3);
        assert_eq!(registry.ids(), vec![EntryId::new(1), EntryId::new(3)]);
        assert!(registry.has(EntryId::new(1)));
        assert!(!registry.has(EntryId::new(2)));
    }

    #[test]
    fn test_badge() {
        let mut registry = EntityRegistry::new();
        let now = Instant::now();
        registry.register(entry(1, "a"), Extent::default(), now);

        let card = registry.get_mut(EntryId::new(1)).unwrap();
        assert!(!card.has_badge(now));
        card.badge_until = Some(now + std::time::Duration::from_secs(4));
        assert!(card.has_badge(now));
        assert!(!card.has_badge(now + std::time::Duration::from_secs(4)));
    }
}

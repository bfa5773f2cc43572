//! Focus Controller
//!
//! Selecting a card freezes the wall, brings the card to the middle and dims
//! everything else. Dismissing it restores the card to where it was and lets
//! the wall drift again.
//!
//! # State Machine
//!
//! ```text
//!            focus(id)                       unfocus()
//!   Idle ───────────────► Focused { id } ───────────────► Idle
//!    ▲ │ unfocus(): no-op     │ focus(other): no-op
//!    └─┘                      └──────┘
//! ```
//!
//! The motion scheduler is paused exactly while a card is focused.

use std::time::Instant;

use crate::entry::EntryId;
use crate::geometry::{Extent, Vec2};
use crate::motion::{MotionScheduler, TickScheduler};
use crate::registry::EntityRegistry;

/// Who is focused
#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum FocusState {
    /// Nothing is focused
    #[default]
    Idle,
    /// One card is centered and elevated
    Focused {
        /// The focused card
        id: EntryId,
        /// Where the card was before it was centered
        home: Vec2,
    },
}

/// What a focus request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    /// The card is now focused
    Focused,
    /// Another card (or this one) is already focused; nothing changed
    AlreadyFocused,
    /// No card with that id; nothing changed
    UnknownEntity,
    /// Focus was released
    Unfocused,
    /// Nothing was focused; nothing changed
    NotFocused,
}

impl FocusOutcome {
    /// Whether the request changed anything
    #[must_use]
    pub fn changed(self) -> bool {
        matches!(self, Self::Focused | Self::Unfocused)
    }
}

/// How a card should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    /// Regular drifting card
    Normal,
    /// The focused card
    Focused,
    /// Any card while another one is focused
    Dimmed,
}

/// Owns the answer to "who is focused"
#[derive(Debug, Default)]
pub struct FocusController {
    state: FocusState,
}

impl FocusController {
    /// Start idle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The focused card, if any
    #[must_use]
    pub fn focused(&self) -> Option<EntryId> {
        match self.state {
            FocusState::Idle => None,
            FocusState::Focused { id, .. } => Some(id),
        }
    }

    /// Focus a card: pause the wall and center the card
    pub fn focus<Q: TickScheduler>(
        &mut self,
        id: EntryId,
        registry: &mut EntityRegistry,
        scheduler: &mut MotionScheduler<Q>,
    ) -> FocusOutcome {
        if let FocusState::Focused { id: current, .. } = self.state {
            tracing::debug!(requested = %id, %current, "Focus ignored, already focused");
            return FocusOutcome::AlreadyFocused;
        }
        if !registry.has(id) {
            tracing::debug!(%id, "Focus ignored, unknown card");
            return FocusOutcome::UnknownEntity;
        }

        scheduler.pause(registry);
        let bounds = scheduler.bounds();
        let Some(card) = registry.get_mut(id) else {
            return FocusOutcome::UnknownEntity;
        };
        let home = card.motion.position;
        card.motion.position = bounds.centered(card.size);

        self.state = FocusState::Focused { id, home };
        tracing::info!(%id, "Card focused");
        FocusOutcome::Focused
    }

    /// Release focus: restore the card and resume the wall at `now`
    pub fn unfocus<Q: TickScheduler>(
        &mut self,
        registry: &mut EntityRegistry,
        scheduler: &mut MotionScheduler<Q>,
        now: Instant,
    ) -> FocusOutcome {
        let FocusState::Focused { id, home } = self.state else {
            return FocusOutcome::NotFocused;
        };

        let bounds = scheduler.bounds();
        if let Some(card) = registry.get_mut(id) {
            card.motion.position = bounds.clamp(card.size, home);
        }

        self.state = FocusState::Idle;
        scheduler.resume(registry, now, None);
        tracing::info!(%id, "Card unfocused");
        FocusOutcome::Unfocused
    }

    /// Keep the focused card centered after a resize
    pub fn recenter(&self, registry: &mut EntityRegistry, bounds: Extent) {
        if let Some(card) = self.focused().and_then(|id| registry.get_mut(id)) {
            card.motion.position = bounds.centered(card.size);
        }
    }

    /// How the card with `id` should be drawn
    #[must_use]
    pub fn appearance(&self, id: EntryId) -> Appearance {
        match self.focused() {
            None => Appearance::Normal,
            Some(focused) if focused == id => Appearance::Focused,
            Some(_) => Appearance::Dimmed,
        }
    }

    /// Stacking order: higher draws on top
    #[must_use]
    pub fn z_order(&self, id: EntryId) -> u8 {
        u8::from(self.focused() == Some(id))
    }

    /// Forget the focus without touching the scheduler (teardown only)
    pub(crate) fn reset(&mut self) {
        self.state = FocusState::Idle;
    }
}

//! Tick Scheduling
//!
//! Every card's simulation advances through self-rescheduling ticks. Rather
//! than hiding those behind callbacks, each card carries a [`TickSlot`] and
//! all pending ticks live in one [`TickScheduler`]. Pause, resume and
//! teardown then become set operations over handles.
//!
//! [`FrameQueue`] gives animation-frame semantics: ticks scheduled before a
//! frame fire on that frame; ticks scheduled while a frame is running wait
//! for the next one.

use std::collections::BTreeMap;

use crate::entry::EntryId;

/// Opaque handle to one pending tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickHandle(u64);

impl TickHandle {
    /// Get the raw numeric value
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Per-card scheduling state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickSlot {
    /// No tick pending
    #[default]
    Idle,
    /// A tick is pending under this handle
    Scheduled(TickHandle),
}

impl TickSlot {
    /// Whether a tick is pending
    #[must_use]
    pub fn is_scheduled(self) -> bool {
        matches!(self, Self::Scheduled(_))
    }
}

/// Source of per-entity tick callbacks
pub trait TickScheduler {
    /// Request a tick for `id` on the next frame
    fn schedule_tick(&mut self, id: EntryId) -> TickHandle;

    /// Cancel a pending tick. Returns false if it was not pending.
    fn cancel_tick(&mut self, handle: TickHandle) -> bool;

    /// Remove and return every tick due on this frame
    fn take_due(&mut self) -> Vec<(TickHandle, EntryId)>;

    /// Number of pending ticks
    fn pending(&self) -> usize;
}

/// Animation-frame tick queue
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_handle: u64,
    pending: BTreeMap<TickHandle, EntryId>,
}

impl FrameQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickScheduler for FrameQueue {
    fn schedule_tick(&mut self, id: EntryId) -> TickHandle {
        self.next_handle += 1;
        let handle = TickHandle(self.next_handle);
        self.pending.insert(handle, id);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    fn take_due(&mut self) -> Vec<(TickHandle, EntryId)> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}

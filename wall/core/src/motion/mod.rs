//! Motion Scheduler - Drifting Cards
//!
//! Every card on the wall drifts on its own: a constant-velocity simulation
//! advanced by discrete, frame-rate independent ticks and reflected off the
//! container edges.
//!
//! # Tick
//!
//! ```text
//! dt        = min(now - last_tick, max_tick_dt)
//! last_tick = now
//! position += velocity * dt
//! per axis: below 0   -> clamp to 0,   velocity positive
//!           above max -> clamp to max, velocity negative
//!           (max = container - card size, never negative)
//! ```
//!
//! # Pause / Resume
//!
//! Pausing cancels every pending tick; positions and velocities survive.
//! Resuming re-anchors every card's `last_tick` at the resume instant before
//! scheduling fresh ticks, so the time spent paused is never integrated.

mod ticks;

pub use ticks::{FrameQueue, TickHandle, TickScheduler, TickSlot};

use std::f64::consts::TAU;
use std::time::Instant;

use rand::Rng;

use crate::config::MotionConfig;
use crate::entry::EntryId;
use crate::geometry::{Extent, Vec2};
use crate::registry::{Card, EntityRegistry};

/// Simulation state of one card
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    /// Top-left corner in surface coordinates
    pub position: Vec2,
    /// Units per second
    pub velocity: Vec2,
    /// Last-known container extent
    pub bounds: Extent,
    /// When this card was last integrated
    pub last_tick: Instant,
    /// Pending tick, if any
    pub slot: TickSlot,
}

impl AnimationState {
    /// A motionless state anchored at `now`
    #[must_use]
    pub fn at_rest(now: Instant) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            bounds: Extent::default(),
            last_tick: now,
            slot: TickSlot::Idle,
        }
    }
}

/// Which axes hit a boundary during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reflection {
    /// Horizontal boundary hit
    pub x: bool,
    /// Vertical boundary hit
    pub y: bool,
}

impl Reflection {
    /// Whether any boundary was hit
    #[must_use]
    pub fn any(self) -> bool {
        self.x || self.y
    }
}

fn reflect_axis(position: &mut f64, velocity: &mut f64, max: f64) -> bool {
    if *position < 0.0 {
        *position = 0.0;
        *velocity = velocity.abs();
        true
    } else if *position > max {
        *position = max;
        *velocity = -velocity.abs();
        true
    } else {
        false
    }
}

/// Integrate one tick of `motion` for a card of `size`
///
/// `dt` is measured from `motion.last_tick` and capped at `max_dt`.
pub fn integrate(
    motion: &mut AnimationState,
    size: Extent,
    now: Instant,
    max_dt: std::time::Duration,
) -> Reflection {
    let dt = now.saturating_duration_since(motion.last_tick).min(max_dt);
    motion.last_tick = now;
    motion.position += motion.velocity * dt.as_secs_f64();

    let max = motion.bounds.max_offset(size);
    Reflection {
        x: reflect_axis(&mut motion.position.x, &mut motion.velocity.x, max.x),
        y: reflect_axis(&mut motion.position.y, &mut motion.velocity.y, max.y),
    }
}

/// Runs one motion simulation per card on a single thread
#[derive(Debug)]
pub struct MotionScheduler<Q: TickScheduler = FrameQueue> {
    config: MotionConfig,
    queue: Q,
    bounds: Extent,
    paused: bool,
    torn_down: bool,
}

impl MotionScheduler {
    /// Create a scheduler driven by a [`FrameQueue`]
    #[must_use]
    pub fn new(config: MotionConfig) -> Self {
        Self::with_queue(config, FrameQueue::new())
    }
}

impl<Q: TickScheduler> MotionScheduler<Q> {
    /// Create a scheduler over a custom tick source
    pub fn with_queue(config: MotionConfig, queue: Q) -> Self {
        Self {
            config,
            queue,
            bounds: Extent::default(),
            paused: false,
            torn_down: false,
        }
    }

    /// Current container extent
    #[must_use]
    pub fn bounds(&self) -> Extent {
        self.bounds
    }

    /// Whether ticks are globally suspended
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the scheduler has been torn down
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Number of ticks waiting for the next frame
    #[must_use]
    pub fn pending_ticks(&self) -> usize {
        self.queue.pending()
    }

    /// Give a freshly registered card its random start and first tick
    ///
    /// The card is placed uniformly inside the free area of the container
    /// and sent off at a uniform speed in a uniform direction. While paused
    /// the card waits for [`resume`](Self::resume) to get its first tick.
    pub fn launch<R: Rng + ?Sized>(&mut self, card: &mut Card, now: Instant, rng: &mut R) {
        let margin = self.config.launch_margin;
        let span_x = (self.bounds.width - card.size.width - margin).max(margin);
        let span_y = (self.bounds.height - card.size.height - margin).max(margin);
        let position = self.bounds.clamp(
            card.size,
            Vec2::new(rng.gen::<f64>() * span_x, rng.gen::<f64>() * span_y),
        );

        let (min, max) = (self.config.speed_min, self.config.speed_max);
        let speed = if max > min { rng.gen_range(min..max) } else { min };
        let direction = rng.gen_range(0.0..TAU);

        card.motion = AnimationState {
            position,
            velocity: Vec2::from_polar(speed, direction),
            bounds: self.bounds,
            last_tick: now,
            slot: TickSlot::Idle,
        };

        if !self.paused {
            self.schedule(card);
        }
    }

    /// Run every tick due on this frame
    ///
    /// Returns how many cards moved. Cards are rescheduled unless the
    /// scheduler is paused or the card is `focused`.
    pub fn frame(
        &mut self,
        registry: &mut EntityRegistry,
        now: Instant,
        focused: Option<EntryId>,
    ) -> usize {
        if self.torn_down {
            return 0;
        }

        let max_dt = self.config.max_tick_dt();
        let mut moved = 0;
        for (handle, id) in self.queue.take_due() {
            let Some(card) = registry.get_mut(id) else {
                continue;
            };
            if card.motion.slot != TickSlot::Scheduled(handle) {
                continue;
            }
            card.motion.slot = TickSlot::Idle;

            let reflection = integrate(&mut card.motion, card.size, now, max_dt);
            if reflection.any() {
                tracing::trace!(%id, ?reflection, "Card bounced");
            }
            moved += 1;

            if !self.paused && focused != Some(id) {
                self.schedule(card);
            }
        }
        moved
    }

    /// Suspend every card, keeping its state
    ///
    /// Returns false (and does nothing) if already paused.
    pub fn pause(&mut self, registry: &mut EntityRegistry) -> bool {
        if self.paused || self.torn_down {
            return false;
        }

        for card in registry.all_mut() {
            self.cancel(card);
        }
        self.paused = true;
        debug_assert_eq!(self.queue.pending(), 0);
        tracing::debug!(cards = registry.len(), "Motion paused");
        true
    }

    /// Re-anchor every card at `now` and schedule all but `focused`
    ///
    /// Returns false (and does nothing) if not paused.
    pub fn resume(
        &mut self,
        registry: &mut EntityRegistry,
        now: Instant,
        focused: Option<EntryId>,
    ) -> bool {
        if !self.paused || self.torn_down {
            return false;
        }

        self.paused = false;
        for card in registry.all_mut() {
            card.motion.last_tick = now;
            if focused != Some(card.id()) {
                self.schedule(card);
            }
        }
        tracing::debug!(cards = registry.len(), "Motion resumed");
        true
    }

    /// Adopt a new container extent, pulling every card back inside
    ///
    /// Velocities and pending ticks are left alone.
    pub fn resize(&mut self, registry: &mut EntityRegistry, bounds: Extent) {
        self.bounds = bounds;
        for card in registry.all_mut() {
            card.motion.bounds = bounds;
            card.motion.position = bounds.clamp(card.size, card.motion.position);
        }
    }

    /// Cancel every pending tick and refuse further work
    pub fn teardown(&mut self, registry: &mut EntityRegistry) {
        for card in registry.all_mut() {
            self.cancel(card);
        }
        self.torn_down = true;
        tracing::debug!("Motion scheduler torn down");
    }

    fn schedule(&mut self, card: &mut Card) {
        if self.torn_down || card.motion.slot.is_scheduled() {
            return;
        }
        card.motion.slot = TickSlot::Scheduled(self.queue.schedule_tick(card.id()));
    }

    fn cancel(&mut self, card: &mut Card) {
        if let TickSlot::Scheduled(handle) = card.motion.slot {
            self.queue.cancel_tick(handle);
            card.motion.slot = TickSlot::Idle;
        }
    }
}

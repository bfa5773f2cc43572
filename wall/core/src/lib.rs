//! Driftwall Core - Headless Engine for a Drifting Message Wall
//!
//! Short messages posted by guests float across a shared display as cards.
//! This crate keeps the wall in sync with the server, animates every card
//! and handles "look at this one" focus, without knowing anything about the
//! surface that draws it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Display Surface                        │
//! │             (terminal, test harness, replay tool)            │
//! │   frame()   resize()   focus()/unfocus()   begin/finish_poll │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴───────────────────────────────┐
//! │                            Wall                              │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌─────────┐ │
//! │  │ SyncClient │─►│  Entity    │◄─│  Motion    │◄─│  Focus  │ │
//! │  │  (cursor)  │  │  Registry  │  │ Scheduler  │  │  Ctrl   │ │
//! │  └─────┬──────┘  └────────────┘  └────────────┘  └─────────┘ │
//! └────────┼─────────────────────────────────────────────────────┘
//!          │ list_since / submit
//! ┌────────┴─────────────────────────────────────────────────────┐
//! │        WallBackend: HttpBackend (reqwest) | MemoryBackend     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Wall`]: the engine facade a surface owns
//! - [`EntityRegistry`]: id → card, idempotent registration
//! - [`SyncClient`]: cursor tracking and serialized polls
//! - [`MotionScheduler`]: bounded drifting motion with pause/resume
//! - [`FocusController`]: single-card focus
//! - [`SubmitClient`]: sends new entries
//! - [`WallBackend`]: the server seam
//!
//! # Quick Start
//!
//! ```ignore
//! use driftwall_core::{backend::HttpBackend, FixedLayout, Extent, Wall, WallConfig};
//!
//! let config = WallConfig::from_env();
//! let backend = HttpBackend::new(&config.server)?;
//! let mut wall = Wall::new(config, FixedLayout(Extent::new(24.0, 5.0)));
//! wall.resize(Extent::new(120.0, 40.0));
//!
//! loop {
//!     if wall.poll_due() {
//!         let _ = wall.poll(&backend).await;
//!     }
//!     wall.frame();
//!     // draw wall.draw_order() ...
//! }
//! ```
//!
//! # No TUI Dependencies
//!
//! This crate has no dependency on ratatui, crossterm, or any other UI
//! framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod clock;
pub mod config;
pub mod entry;
pub mod focus;
pub mod geometry;
pub mod motion;
pub mod registry;
pub mod submit;
pub mod sync;
pub mod wall;

pub use backend::{BackendError, HttpBackend, MemoryBackend, RevealPolicy, WallBackend};
pub use clock::{Calendar, Clock, FixedCalendar, LocalCalendar, ManualClock, MonotonicClock};
pub use config::{ConfigError, MotionConfig, ServerConfig, SyncConfig, WallConfig};
pub use entry::{Entry, EntryId, SubmitRequest};
pub use focus::{Appearance, FocusController, FocusOutcome};
pub use geometry::{Extent, Vec2};
pub use motion::{AnimationState, FrameQueue, MotionScheduler, Reflection, TickScheduler, TickSlot};
pub use registry::{Card, EntityRegistry, RegisterResult};
pub use submit::{SubmitClient, SubmitError};
pub use sync::{spawn_fetch, FetchResult, PollCadence, PollOutcome, PollTicket, SyncClient, SyncError};
pub use wall::{CardLayout, FixedLayout, Wall};

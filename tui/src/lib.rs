//! Driftwall TUI - Terminal display surface for the message wall
//!
//! Every entry on the wall is a small bordered card that drifts across the
//! terminal and bounces off its edges. Selecting a card freezes the wall and
//! lifts that card to the center; new entries arrive on a steady poll.
//!
//! # Architecture
//!
//! - **App**: Event loop over terminal input, background requests and frames
//! - **Compositor**: Layered rendering, one z-ordered layer per card
//! - **Widgets**: Cards, the compose form, and the status line
//! - **Layout**: Card sizing from wrapped text
//!
//! The engine itself lives in `driftwall-core`; this crate only measures,
//! draws and forwards input.

pub mod app;
pub mod compositor;
pub mod input;
pub mod layout;
pub mod theme;
pub mod widgets;

pub use app::App;

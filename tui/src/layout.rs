//! Card Sizing
//!
//! Decides how many terminal cells a card takes. The engine asks once, when
//! the card is registered, and keeps the answer for the card's lifetime.
//!
//! ```text
//! ╭──────────────────╮
//! │ message text     │  up to MAX_TEXT_LINES wrapped lines
//! │ wraps here       │
//! │ — author         │
//! ╰──────────────────╯
//! ```

use driftwall_core::{CardLayout, Entry, Extent, MotionConfig};

use crate::widgets::text_block::{display_width, wrap_lines};

/// Engine motion units per terminal cell
///
/// Configured speeds and margins are in display units; one cell spans
/// this many of them.
pub const UNITS_PER_CELL: f64 = 10.0;

/// Narrowest text column
pub const MIN_INNER_WIDTH: usize = 12;

/// Widest text column
pub const MAX_INNER_WIDTH: usize = 30;

/// Longest message excerpt shown on a card
pub const MAX_TEXT_LINES: usize = 4;

/// Border plus one cell of padding on each side
const HORIZONTAL_CHROME: usize = 4;

/// Top and bottom border plus the author line
const VERTICAL_CHROME: usize = 3;

/// Author line as drawn on the card
#[must_use]
pub fn author_line(name: &str) -> String {
    format!("— {name}")
}

/// Width of the text column for `entry`
#[must_use]
pub fn inner_width(entry: &Entry) -> usize {
    display_width(&entry.text)
        .max(display_width(&author_line(&entry.name)))
        .clamp(MIN_INNER_WIDTH, MAX_INNER_WIDTH)
}

/// Card size in cells
#[must_use]
pub fn card_size(entry: &Entry) -> (u16, u16) {
    let inner = inner_width(entry);
    let lines = wrap_lines(&entry.text, inner).len().clamp(1, MAX_TEXT_LINES);
    let width = u16::try_from(inner + HORIZONTAL_CHROME).unwrap_or(u16::MAX);
    let height = u16::try_from(lines + VERTICAL_CHROME).unwrap_or(u16::MAX);
    (width, height)
}

/// Motion parameters rescaled from display units to cells
#[must_use]
pub fn cell_motion(motion: &MotionConfig) -> MotionConfig {
    MotionConfig {
        speed_min: motion.speed_min / UNITS_PER_CELL,
        speed_max: motion.speed_max / UNITS_PER_CELL,
        launch_margin: motion.launch_margin / UNITS_PER_CELL,
        ..motion.clone()
    }
}

/// Sizes cards by wrapping their text
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalLayout;

impl CardLayout for TerminalLayout {
    fn measure(&self, entry: &Entry) -> Extent {
        let (width, height) = card_size(entry);
        Extent::new(f64::from(width), f64::from(height))
    }
}

//! Theme and Colors
//!
//! Warm party palette: cards are paper-white on a night background, the
//! focused card glows gold, everything else fades while it does.

use ratatui::style::{Color, Modifier, Style};

use driftwall_core::Appearance;

// ============================================================================
// Card Palette
// ============================================================================

/// Card border when drifting
pub const CARD_BORDER: Color = Color::Rgb(255, 182, 193);

/// Card message text
pub const CARD_TEXT: Color = Color::Rgb(245, 240, 230);

/// Author line
pub const CARD_AUTHOR: Color = Color::Rgb(255, 200, 150);

/// Focused card border and accents
pub const FOCUS_GOLD: Color = Color::Rgb(255, 215, 100);

/// Keyboard selection highlight
pub const SELECT_BLUE: Color = Color::Rgb(120, 180, 255);

/// Everything that is not the focused card
pub const DIM_GRAY: Color = Color::Rgb(90, 90, 90);

/// "NEW" badge
pub const BADGE_CORAL: Color = Color::Rgb(255, 127, 127);

// ============================================================================
// UI Colors
// ============================================================================

/// Status line text
pub const STATUS_TEXT: Color = Color::Rgb(160, 160, 160);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Border style for a card in the given appearance
#[must_use]
pub fn card_border(appearance: Appearance, selected: bool) -> Style {
    match appearance {
        Appearance::Focused => Style::default()
            .fg(FOCUS_GOLD)
            .add_modifier(Modifier::BOLD),
        Appearance::Dimmed => Style::default().fg(DIM_GRAY),
        Appearance::Normal if selected => Style::default()
            .fg(SELECT_BLUE)
            .add_modifier(Modifier::BOLD),
        Appearance::Normal => Style::default().fg(CARD_BORDER),
    }
}

/// Body text style for a card in the given appearance
#[must_use]
pub fn card_text(appearance: Appearance) -> Style {
    match appearance {
        Appearance::Dimmed => Style::default().fg(DIM_GRAY),
        _ => Style::default().fg(CARD_TEXT),
    }
}

/// Author line style for a card in the given appearance
#[must_use]
pub fn card_author(appearance: Appearance) -> Style {
    match appearance {
        Appearance::Dimmed => Style::default().fg(DIM_GRAY),
        _ => Style::default()
            .fg(CARD_AUTHOR)
            .add_modifier(Modifier::ITALIC),
    }
}

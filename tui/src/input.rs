//! Key Bindings
//!
//! Translates terminal key presses into wall actions. The compose form
//! captures almost every key while it is open; otherwise keys drive
//! selection and focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the application
    Quit,
    /// Select the next card
    SelectNext,
    /// Select the previous card
    SelectPrev,
    /// Focus the selected card, or release focus
    ToggleFocus,
    /// Release focus or close the form
    Dismiss,
    /// Open the compose form
    Compose,
    /// Type into the form
    Type(char),
    /// Delete in the form
    Backspace,
    /// Switch form field
    NextField,
    /// Flip the surprise switch
    ToggleSurprise,
    /// Advance through the form, sending from the last field
    Confirm,
    /// Nothing bound
    Ignore,
}

/// Map a key press while browsing the wall
#[must_use]
pub fn wall_action(key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Tab | KeyCode::Right => Action::SelectNext,
        KeyCode::BackTab | KeyCode::Left => Action::SelectPrev,
        KeyCode::Enter | KeyCode::Char(' ') => Action::ToggleFocus,
        KeyCode::Esc => Action::Dismiss,
        KeyCode::Char('n') => Action::Compose,
        _ => Action::Ignore,
    }
}

/// Map a key press while the compose form is open
#[must_use]
pub fn compose_action(key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('s') if ctrl => Action::ToggleSurprise,
        KeyCode::Char(_) if ctrl => Action::Ignore,
        KeyCode::Char(ch) => Action::Type(ch),
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Tab | KeyCode::BackTab => Action::NextField,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Esc => Action::Dismiss,
        _ => Action::Ignore,
    }
}

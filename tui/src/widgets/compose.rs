//! Compose Form
//!
//! The modal where a guest writes a new entry: name, message, and the
//! "surprise" switch that holds the entry back until the next reveal.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Widget};
use thiserror::Error;

use driftwall_core::backend::{MAX_NAME_CHARS, MAX_TEXT_CHARS};

use super::text_block::TextBlock;
use crate::theme;

/// Which input has the cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComposeField {
    /// Author name
    #[default]
    Name,
    /// Message text
    Text,
}

/// Why the form cannot be sent
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// Name or message left blank
    #[error("Name and text are required")]
    Missing,
}

/// Form contents and state
#[derive(Debug, Clone, Default)]
pub struct ComposeForm {
    /// Author name as typed
    pub name: String,
    /// Message as typed
    pub text: String,
    /// Hold back until the next reveal
    pub surprise: bool,
    /// Field with the cursor
    pub field: ComposeField,
    /// Last error to show under the form
    pub error: Option<String>,
    /// A submission is in flight
    pub sending: bool,
}

impl ComposeForm {
    /// An empty form with the cursor on the name
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Type a character into the active field
    pub fn insert(&mut self, ch: char) {
        if self.sending {
            return;
        }
        let (value, max) = match self.field {
            ComposeField::Name => (&mut self.name, MAX_NAME_CHARS),
            ComposeField::Text => (&mut self.text, MAX_TEXT_CHARS),
        };
        if value.chars().count() < max {
            value.push(ch);
            self.error = None;
        }
    }

    /// Delete the last character of the active field
    pub fn backspace(&mut self) {
        if self.sending {
            return;
        }
        match self.field {
            ComposeField::Name => self.name.pop(),
            ComposeField::Text => self.text.pop(),
        };
    }

    /// Move the cursor to the other field
    pub fn next_field(&mut self) {
        self.field = match self.field {
            ComposeField::Name => ComposeField::Text,
            ComposeField::Text => ComposeField::Name,
        };
    }

    /// Flip the surprise switch
    pub fn toggle_surprise(&mut self) {
        if !self.sending {
            self.surprise = !self.surprise;
        }
    }

    /// Check the form before sending
    pub fn validate(&self) -> Result<(), ComposeError> {
        if self.name.trim().is_empty() || self.text.trim().is_empty() {
            return Err(ComposeError::Missing);
        }
        Ok(())
    }
}

/// Renders a [`ComposeForm`] centered in its area
pub struct ComposeView<'a> {
    form: &'a ComposeForm,
    reveal_hour: u32,
}

impl<'a> ComposeView<'a> {
    /// View a form
    pub fn new(form: &'a ComposeForm, reveal_hour: u32) -> Self {
        Self { form, reveal_hour }
    }

    /// Box the form is drawn in, centered in `area`
    #[must_use]
    pub fn frame(area: Rect) -> Rect {
        let width = area.width.min(60);
        let height = area.height.min(14);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }

    fn label(&self, field: ComposeField) -> Style {
        if self.form.field == field {
            Style::default()
                .fg(theme::FOCUS_GOLD)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme::STATUS_TEXT)
        }
    }
}

impl Widget for ComposeView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = Self::frame(area);
        Clear.render(frame, buf);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::CARD_BORDER))
            .title(Line::styled(" New wish ", Style::default().add_modifier(Modifier::BOLD)));
        let inner = block.inner(frame);
        block.render(frame, buf);
        if inner.width < 4 || inner.height < 6 {
            return;
        }

        let x = inner.x + 1;
        let width = inner.width - 2;
        let mut y = inner.y;

        buf.set_string(x, y, "Name", self.label(ComposeField::Name));
        y += 1;
        let cursor = |field: ComposeField| if self.form.field == field { "_" } else { "" };
        buf.set_stringn(
            x,
            y,
            format!("{}{}", self.form.name, cursor(ComposeField::Name)),
            width as usize,
            Style::default().fg(theme::CARD_TEXT),
        );
        y += 2;

        buf.set_string(x, y, "Message", self.label(ComposeField::Text));
        y += 1;
        let footer_rows = 4;
        let text_height = (inner.y + inner.height).saturating_sub(y + footer_rows).max(1);
        let text = format!("{}{}", self.form.text, cursor(ComposeField::Text));
        TextBlock::new(&text)
            .style(Style::default().fg(theme::CARD_TEXT))
            .render(Rect::new(x, y, width, text_height), buf);
        y += text_height + 1;

        let mark = if self.form.surprise { "[x]" } else { "[ ]" };
        buf.set_stringn(
            x,
            y,
            format!("{mark} Surprise: reveal tomorrow at {:02}:00", self.reveal_hour),
            width as usize,
            Style::default().fg(theme::CARD_AUTHOR),
        );
        y += 1;

        if let Some(error) = &self.form.error {
            buf.set_stringn(x, y, error, width as usize, Style::default().fg(theme::ERROR_RED));
        } else if self.form.sending {
            buf.set_stringn(x, y, "Sending...", width as usize, Style::default().fg(theme::STATUS_TEXT));
        }
        y += 1;

        buf.set_stringn(
            x,
            y.min(inner.y + inner.height - 1),
            "Enter send · Tab switch · Ctrl-S surprise · Esc cancel",
            width as usize,
            Style::default().fg(theme::DIM_GRAY),
        );
    }
}

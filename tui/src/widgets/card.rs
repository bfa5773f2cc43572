//! Card Widget
//!
//! Draws one entry as a rounded box: message text, author line, and the
//! little extras (a "NEW" badge for fresh arrivals, a close mark on the
//! focused card).

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Widget};

use driftwall_core::{Appearance, Entry};

use super::text_block::TextBlock;
use crate::layout::author_line;
use crate::theme;

/// One card, ready to draw
pub struct CardWidget<'a> {
    entry: &'a Entry,
    appearance: Appearance,
    selected: bool,
    badge: bool,
}

impl<'a> CardWidget<'a> {
    /// A card in its normal appearance
    pub fn new(entry: &'a Entry) -> Self {
        Self {
            entry,
            appearance: Appearance::Normal,
            selected: false,
            badge: false,
        }
    }

    /// Focused / dimmed / normal
    #[must_use]
    pub fn appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    /// Highlight as the keyboard selection
    #[must_use]
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Show the "NEW" badge
    #[must_use]
    pub fn badge(mut self, badge: bool) -> Self {
        self.badge = badge;
        self
    }
}

impl Widget for CardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme::card_border(self.appearance, self.selected));
        if self.appearance == Appearance::Focused {
            block = block.title_top(Line::styled("[x]", Style::default().fg(theme::FOCUS_GOLD)).right_aligned());
        } else if self.badge {
            block = block.title_top(
                Line::styled(
                    "NEW",
                    Style::default()
                        .fg(theme::BADGE_CORAL)
                        .add_modifier(Modifier::BOLD),
                )
                .right_aligned(),
            );
        }

        let inner = block.inner(area);
        block.render(area, buf);

        let padded = Rect {
            x: inner.x.saturating_add(1),
            width: inner.width.saturating_sub(2),
            ..inner
        };
        if padded.width == 0 || padded.height == 0 {
            return;
        }

        let text_area = Rect {
            height: padded.height.saturating_sub(1),
            ..padded
        };
        TextBlock::new(&self.entry.text)
            .style(theme::card_text(self.appearance))
            .render(text_area, buf);

        let author_y = padded.y + padded.height - 1;
        buf.set_stringn(
            padded.x,
            author_y,
            author_line(&self.entry.name),
            padded.width as usize,
            theme::card_author(self.appearance),
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::layout::card_size;

    fn rendered(widget: CardWidget<'_>, entry: &Entry) -> Buffer {
        let (w, h) = card_size(entry);
        let area = Rect::new(0, 0, w, h);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map_or(" ", |c| c.symbol()).to_string())
            .collect()
    }

    #[test]
    fn test_card_shows_text_and_author() {
        let entry = Entry::new(1u64, "Maria", "Be happy!", NaiveDateTime::default());
        let buf = rendered(CardWidget::new(&entry), &entry);

        assert!(row(&buf, 0).starts_with('╭'));
        assert!(row(&buf, 1).contains("Be happy!"));
        assert!(row(&buf, 2).contains("— Maria"));
    }

    #[test]
    fn test_badge_and_close_mark() {
        let entry = Entry::new(1u64, "Maria", "Be happy!", NaiveDateTime::default());

        let buf = rendered(CardWidget::new(&entry).badge(true), &entry);
        assert!(row(&buf, 0).contains("NEW"));

        let buf = rendered(
            CardWidget::new(&entry)
                .badge(true)
                .appearance(Appearance::Focused),
            &entry,
        );
        assert!(row(&buf, 0).contains("[x]"));
        assert!(!row(&buf, 0).contains("NEW"));
    }

    #[test]
    fn test_dimmed_card_is_gray() {
        let entry = Entry::new(1u64, "Maria", "Be happy!", NaiveDateTime::default());
        let buf = rendered(CardWidget::new(&entry).appearance(Appearance::Dimmed), &entry);
        assert_eq!(buf.cell((0, 0)).unwrap().fg, theme::DIM_GRAY);
    }
}

//! Status Line
//!
//! One row at the bottom of the screen: card count, sync health, a
//! short-lived notice, and key hints.

use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::theme;

/// How long a notice stays up
pub const NOTICE_DURATION: Duration = Duration::from_secs(5);

/// Tone of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Something went well
    Success,
    /// Something went wrong
    Error,
}

/// A message shown on the status line for a while
#[derive(Debug, Clone)]
pub struct Notice {
    /// What to say
    pub text: String,
    /// How to color it
    pub level: NoticeLevel,
    /// When it disappears
    pub until: Instant,
}

/// Everything the status line shows
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    /// Cards on the wall
    pub cards: usize,
    /// Last poll failed with this message
    pub offline: Option<String>,
    /// Time until the next poll, shown while offline
    pub retry_in: Option<Duration>,
    /// Wall is frozen on a focused card
    pub focused: bool,
    /// Short-lived notice
    pub notice: Option<Notice>,
}

impl StatusLine {
    /// Post a notice that expires after [`NOTICE_DURATION`]
    pub fn notify(&mut self, text: impl Into<String>, level: NoticeLevel, now: Instant) {
        self.notice = Some(Notice {
            text: text.into(),
            level,
            until: now + NOTICE_DURATION,
        });
    }

    /// Drop an expired notice
    pub fn expire(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| now >= n.until) {
            self.notice = None;
        }
    }

    /// Left-hand text
    #[must_use]
    pub fn summary(&self) -> String {
        let plural = if self.cards == 1 { "" } else { "s" };
        let mut text = format!(" driftwall · {} card{plural}", self.cards);
        if let Some(err) = &self.offline {
            text.push_str(&format!(" · offline ({err})"));
            if let Some(retry) = self.retry_in {
                let secs = retry.as_millis().div_ceil(1000);
                text.push_str(&format!(", retry in {secs}s"));
            }
        }
        text
    }

    /// Right-hand key hints
    #[must_use]
    pub fn hints(&self) -> &'static str {
        if self.focused {
            "Esc/Enter close · q quit "
        } else {
            "n new · Tab select · Enter focus · q quit "
        }
    }
}

impl Widget for &StatusLine {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let width = area.width as usize;
        let base = Style::default().fg(theme::STATUS_TEXT);

        let summary = self.summary();
        let summary_style = if self.offline.is_some() {
            Style::default().fg(theme::ERROR_RED)
        } else {
            base
        };
        let (x, _) = buf.set_stringn(area.x, area.y, &summary, width, summary_style);

        let mut used = usize::from(x - area.x);
        if let Some(notice) = &self.notice {
            let style = match notice.level {
                NoticeLevel::Success => Style::default().fg(theme::SUCCESS_GREEN),
                NoticeLevel::Error => Style::default().fg(theme::ERROR_RED),
            };
            let text = format!(" · {}", notice.text);
            let (x, _) = buf.set_stringn(x, area.y, &text, width.saturating_sub(used), style);
            used = usize::from(x - area.x);
        }

        let hints = self.hints();
        let hints_width = hints.chars().count();
        if used + hints_width < width {
            let hx = area.x + u16::try_from(width - hints_width).unwrap_or(0);
            buf.set_string(hx, area.y, hints, Style::default().fg(theme::DIM_GRAY));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut status = StatusLine {
            cards: 1,
            ..StatusLine::default()
        };
        assert_eq!(status.summary(), " driftwall · 1 card");

        status.cards = 3;
        status.offline = Some("connection refused".into());
        assert_eq!(
            status.summary(),
            " driftwall · 3 cards · offline (connection refused)"
        );
    }

    #[test]
    fn test_summary_counts_down_retry() {
        let status = StatusLine {
            offline: Some("timeout".into()),
            retry_in: Some(Duration::from_millis(1200)),
            ..StatusLine::default()
        };
        assert_eq!(
            status.summary(),
            " driftwall · 0 cards · offline (timeout), retry in 2s"
        );
    }

    #[test]
    fn test_notice_expires() {
        let now = Instant::now();
        let mut status = StatusLine::default();
        status.notify("Sent!", NoticeLevel::Success, now);

        status.expire(now + Duration::from_secs(1));
        assert!(status.notice.is_some());
        status.expire(now + NOTICE_DURATION);
        assert!(status.notice.is_none());
    }

    #[test]
    fn test_render_fits_one_row() {
        let status = StatusLine {
            cards: 2,
            ..StatusLine::default()
        };
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        (&status).render(area, &mut buf);

        let row: String = (0..80)
            .map(|x| buf.cell((x, 0)).map_or(" ", |c| c.symbol()).to_string())
            .collect();
        assert!(row.starts_with(" driftwall · 2 cards"));
        assert!(row.trim_end().ends_with("q quit"));
    }
}

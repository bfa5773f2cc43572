//! TextBlock Widget
//!
//! A borderless, word-wrapped text region. Text that does not fit the area
//! is cut at the last visible line, which ends in an ellipsis.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

/// Wrap `content` to `width` display columns
///
/// Blank lines in the source survive as empty lines.
#[must_use]
pub fn wrap_lines(content: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    content
        .lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, width)
                    .into_iter()
                    .map(|cow| cow.to_string())
                    .collect()
            }
        })
        .collect()
}

/// Widest line of `content`, in display columns
#[must_use]
pub fn display_width(content: &str) -> usize {
    content.lines().map(UnicodeWidthStr::width).max().unwrap_or(0)
}

/// A borderless, wrapped text block
pub struct TextBlock<'a> {
    content: &'a str,
    style: Style,
}

impl<'a> TextBlock<'a> {
    /// Wrap `content` for display
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            style: Style::default(),
        }
    }

    /// Text style
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Widget for TextBlock<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let mut wrapped = wrap_lines(self.content, area.width as usize);
        let height = area.height as usize;
        if wrapped.len() > height {
            wrapped.truncate(height);
            if let Some(last) = wrapped.last_mut() {
                let budget = (area.width as usize).saturating_sub(1);
                let mut cut = String::new();
                for ch in last.chars() {
                    if UnicodeWidthStr::width(cut.as_str()) + 1 > budget {
                        break;
                    }
                    cut.push(ch);
                }
                cut.push('…');
                *last = cut;
            }
        }

        for (i, line) in wrapped.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let y = area.y + i as u16;
            buf.set_stringn(area.x, y, line, area.width as usize, self.style);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map_or(" ", |c| c.symbol()).to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_wrap_lines() {
        assert_eq!(
            wrap_lines("love each other and dance", 10),
            vec!["love each", "other and", "dance"]
        );
        assert_eq!(wrap_lines("a\n\nb", 10), vec!["a", "", "b"]);
        assert!(wrap_lines("anything", 0).is_empty());
    }

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("ab\nabcd"), 4);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn test_render_truncates_with_ellipsis() {
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        TextBlock::new("one two three four five six seven").render(area, &mut buf);

        assert_eq!(row(&buf, 0), "one two");
        assert!(row(&buf, 1).ends_with('…'));
    }
}

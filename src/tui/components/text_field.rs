//! Single-line editable text with a byte-offset cursor.
//!
//! Shared by the source panel (URL, document path) and the chat input.
//! The field scrolls horizontally by display width so wide glyphs and long
//! pasted paths keep the cursor in view.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    Changed,
    CursorMoved,
}

#[derive(Debug, Default)]
pub struct TextField {
    value: String,
    /// Byte offset, always on a char boundary (0..=value.len()).
    cursor: usize,
    /// First visible display column.
    scroll: usize,
    /// Shown dimmed while the value is empty
    pub placeholder: String,
    /// Whether to place the terminal cursor on render
    pub focused: bool,
}

impl TextField {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            ..Default::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replace the whole value, cursor at the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = single_line(&value.into());
        self.cursor = self.value.len();
    }

    /// Empty the field and hand back what it held.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        self.scroll = 0;
        std::mem::take(&mut self.value)
    }

    pub fn insert_str(&mut self, text: &str) {
        let text = single_line(text);
        self.value.insert_str(self.cursor, &text);
        self.cursor += text.len();
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }

    fn display_width(text: &str) -> usize {
        text.chars().map(|c| c.width().unwrap_or(0)).sum()
    }

    /// Keep the cursor column inside `[scroll, scroll + width)`.
    fn update_scroll(&mut self, width: usize) {
        if width == 0 {
            return;
        }
        let cursor_col = Self::display_width(&self.value[..self.cursor]);
        if cursor_col < self.scroll {
            self.scroll = cursor_col;
        } else if cursor_col >= self.scroll + width {
            self.scroll = cursor_col + 1 - width;
        }
    }

    /// The slice of the value that fits in `width` columns after scrolling.
    fn visible(&self, width: usize) -> String {
        let mut col = 0;
        let mut out = String::new();
        for c in self.value.chars() {
            let w = c.width().unwrap_or(0);
            if col >= self.scroll {
                if col + w > self.scroll + width {
                    break;
                }
                out.push(c);
            }
            col += w;
        }
        out
    }
}

/// Turn a dropped or pasted file reference into a plain path.
///
/// Terminals deliver drag-and-drop as quoted paths, backslash-escaped
/// paths, or `file://` URIs depending on the emulator.
pub fn dropped_path(text: &str) -> String {
    let trimmed = text.trim();
    let unquoted = ['\'', '"']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed);
    let path = unquoted.strip_prefix("file://").unwrap_or(unquoted);
    path.replace("\\ ", " ")
}

/// Line breaks become spaces; other control characters are dropped.
fn single_line(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

impl Component for TextField {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width as usize;
        self.update_scroll(width);

        if self.value.is_empty() {
            let style = Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC);
            frame.render_widget(Span::styled(self.placeholder.as_str(), style), area);
        } else {
            frame.render_widget(Span::raw(self.visible(width)), area);
        }

        if self.focused && area.width > 0 {
            let col = Self::display_width(&self.value[..self.cursor]) - self.scroll;
            let x = area.x + (col as u16).min(area.width - 1);
            frame.set_cursor_position((x, area.y));
        }
    }
}

impl EventHandler for TextField {
    type Event = FieldEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.value.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(FieldEvent::Changed)
            }
            TuiEvent::Paste(text) => {
                self.insert_str(text);
                Some(FieldEvent::Changed)
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = self.prev_boundary();
                self.value.drain(prev..self.cursor);
                self.cursor = prev;
                Some(FieldEvent::Changed)
            }
            TuiEvent::Delete if self.cursor < self.value.len() => {
                let next = self.next_boundary();
                self.value.drain(self.cursor..next);
                Some(FieldEvent::Changed)
            }
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.cursor = self.prev_boundary();
                Some(FieldEvent::CursorMoved)
            }
            TuiEvent::CursorRight if self.cursor < self.value.len() => {
                self.cursor = self.next_boundary();
                Some(FieldEvent::CursorMoved)
            }
            TuiEvent::CursorHome => {
                self.cursor = 0;
                Some(FieldEvent::CursorMoved)
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.value.len();
                Some(FieldEvent::CursorMoved)
            }
            _ => None,
        }
    }
}

//! # Header Component
//!
//! Top bar: the "MathsCare" brand, the transient status text, and a "↓ New"
//! marker when the conversation has content below the scroll position.
//!
//! Purely presentational. All three values are props set by the parent each
//! frame:
//!
//! ```rust,ignore
//! let mut header = Header::new(app.status_message.clone(), has_unseen);
//! header.render(frame, header_area);
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub const BRAND: &str = "MathsCare";

pub struct Header {
    pub status_message: String,
    pub has_unseen_content: bool,
}

impl Header {
    pub fn new(status_message: String, has_unseen_content: bool) -> Self {
        Self {
            status_message,
            has_unseen_content,
        }
    }
}

impl Component for Header {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                format!(" ∑ {BRAND} "),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  AI math tutor", Style::default().fg(Color::DarkGray)),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                self.status_message.as_str(),
                Style::default().fg(Color::Yellow),
            ));
        }
        if self.has_unseen_content {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                "↓ New",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
        }

        frame.render_widget(Line::from(spans), area);
    }
}

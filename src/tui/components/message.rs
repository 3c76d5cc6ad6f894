use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::conversation::{self, Role};
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Borders (1 left + 1 right) plus padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// One chat bubble, rebuilt every frame from a conversation entry.
///
/// Content is rendered as markdown in both directions: answers carry
/// headings, lists and math, and user turns carry the italic attachment note.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a conversation::Message,
    /// The answer is still being revealed
    pub is_revealing: bool,
}

impl<'a> Message<'a> {
    pub fn new(message: &'a conversation::Message, is_revealing: bool) -> Self {
        Self {
            message,
            is_revealing,
        }
    }

    fn role_style(role: Role) -> Style {
        match role {
            Role::User => Style::default().fg(Color::Green),
            Role::Assistant => Style::default().fg(Color::Blue),
        }
    }

    fn title(role: Role) -> &'static str {
        match role {
            Role::User => "you",
            Role::Assistant => "mathscare",
        }
    }

    fn paragraph(message: &conversation::Message) -> Paragraph<'static> {
        let fg = Self::role_style(message.role).fg.unwrap_or(Color::Reset);
        let text: Text<'static> = markdown::render(message.content.trim(), fg);
        Paragraph::new(text).wrap(Wrap { trim: false })
    }

    /// Rendered height for `width` columns, borders included.
    ///
    /// Uses the same `Paragraph` that `render` draws, so the prediction and
    /// the drawn result wrap identically.
    pub fn calculate_height(message: &conversation::Message, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        let lines = Self::paragraph(message).line_count(content_width);
        let max_lines = u16::MAX - VERTICAL_OVERHEAD;
        let lines = u16::try_from(lines).unwrap_or(max_lines).min(max_lines);
        lines.max(1) + VERTICAL_OVERHEAD
    }
}

impl Widget for Message<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Self::role_style(self.message.role);
        let border_style = if self.is_revealing {
            style.add_modifier(Modifier::BOLD)
        } else {
            style.add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title(Self::title(self.message.role))
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let inner = block.inner(area);
        block.render(area, buf);

        Self::paragraph(self.message).render(inner, buf);
    }
}

impl Component for Message<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::Message as ChatMessage;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn empty_content_still_has_one_line() {
        let msg = ChatMessage::assistant("");
        assert_eq!(Message::calculate_height(&msg, 80), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn zero_width_returns_minimum() {
        let msg = ChatMessage::user("Hello world");
        assert_eq!(Message::calculate_height(&msg, 0), 1);
        assert_eq!(Message::calculate_height(&msg, HORIZONTAL_OVERHEAD), 1);
    }

    #[test]
    fn single_line_fits() {
        let msg = ChatMessage::user("Hello");
        assert_eq!(Message::calculate_height(&msg, 80), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn long_content_wraps() {
        let msg = ChatMessage::assistant("one two three four five six seven eight");
        // 20 - 4 overhead = 16 columns
        assert!(Message::calculate_height(&msg, 20) > 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn very_tall_message_saturates_height() {
        let msg = ChatMessage::assistant("step\n\n".repeat(40_000));
        assert_eq!(Message::calculate_height(&msg, 40), u16::MAX);
    }

    #[test]
    fn paragraphs_add_lines() {
        let msg = ChatMessage::assistant("First step.\n\nSecond step.");
        // text, blank, text
        assert_eq!(Message::calculate_height(&msg, 80), 3 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn renders_role_titles() {
        let backend = TestBackend::new(40, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let user = ChatMessage::user("Is 7 prime?");
        let answer = ChatMessage::assistant("Yes.");

        terminal
            .draw(|f| {
                f.render_widget(Message::new(&user, false), Rect::new(0, 0, 40, 3));
                f.render_widget(Message::new(&answer, true), Rect::new(0, 3, 40, 3));
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("you"));
        assert!(text.contains("Is 7 prime?"));
        assert!(text.contains("mathscare"));
        assert!(text.contains("Yes."));
    }

    #[test]
    fn role_colors() {
        assert_eq!(Message::role_style(Role::User).fg, Some(Color::Green));
        assert_eq!(Message::role_style(Role::Assistant).fg, Some(Color::Blue));
    }
}

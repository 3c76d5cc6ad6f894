//! # MessageList Component
//!
//! Scrollable view of the conversation.
//!
//! ## Responsibilities
//!
//! - Lay out and draw every message as a [`Message`] bubble
//! - Keep the view pinned to the bottom while new text arrives
//! - Cache message heights between frames
//! - Show the placeholder for an empty chat and the typing indicator
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the conversation (props).
//! `Component::render` takes `&mut self`, so the layout cache and scroll
//! state are updated during the render pass.

use std::hash::{DefaultHasher, Hash, Hasher};

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::conversation::{self, Conversation, Role};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

pub const EMPTY_PLACEHOLDER: &str = "Ask anything about the math content!";

/// Typing indicator line plus one blank line above it.
const INDICATOR_HEIGHT: u16 = 2;

const DOT_FRAMES: [&str; 4] = ["●○○", "○●○", "○○●", "○●○"];

/// Layout and scroll state for the message list.
/// Lives in the TUI state and survives across frames.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// New content arrived while scrolled up
    pub has_unseen_content: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    last_total_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            has_unseen_content: false,
            viewport_height: 0,
            last_total_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout
            .total_height()
            .saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user scrolls back to the end.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.has_unseen_content = false;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Jump to the newest message and stay there.
    pub fn pin_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.has_unseen_content = false;
    }
}

/// Scrollable conversation view.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub conversation: &'a Conversation,
    /// Index of the message currently being revealed, if any
    pub revealing_index: Option<usize>,
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        conversation: &'a Conversation,
        revealing_index: Option<usize>,
        is_loading: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            conversation,
            revealing_index,
            is_loading,
            spinner_frame,
        }
    }

    fn render_placeholder(frame: &mut Frame, area: Rect) {
        let y = area.y + area.height / 2;
        let line_area = Rect::new(area.x, y.saturating_sub(1), area.width, 3u16.min(area.height));
        let placeholder = Paragraph::new(vec![
            Line::from(Span::styled(
                "∑",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                EMPTY_PLACEHOLDER,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, line_area);
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let messages = self.conversation.messages();
        if messages.is_empty() && !self.is_loading {
            self.state.layout.clear();
            Self::render_placeholder(frame, area);
            return;
        }

        let content_width = area.width.saturating_sub(1); // scrollbar column

        // 1. Update layout cache
        let layout = &mut self.state.layout;
        layout.sync(messages, content_width);
        let total_height = layout.total_height();

        if total_height != self.state.last_total_height {
            if !self.state.stick_to_bottom && total_height > self.state.last_total_height {
                self.state.has_unseen_content = true;
            }
            self.state.last_total_height = total_height;
        }

        let indicator = if self.is_loading { INDICATOR_HEIGHT } else { 0 };
        let canvas_height = total_height.saturating_add(indicator);

        // 2. Pin or clamp the scroll offset
        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            self.state.scroll_state.set_offset(Position {
                x: 0,
                y: canvas_height.saturating_sub(area.height),
            });
        } else {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible messages into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset = self.state.layout.top_of(visible_range.start);
        for i in visible_range {
            let height = self.state.layout.heights[i];
            let rect = Rect::new(0, y_offset, content_width, height);
            let revealing = self.revealing_index == Some(i);
            scroll_view.render_widget(Message::new(&messages[i], revealing), rect);
            y_offset = y_offset.saturating_add(height);
        }

        if self.is_loading {
            let dots = DOT_FRAMES[self.spinner_frame % DOT_FRAMES.len()];
            let line = Line::from(vec![
                Span::styled(" mathscare is thinking ", Style::default().fg(Color::DarkGray)),
                Span::styled(dots, Style::default().fg(Color::Blue)),
            ]);
            let indicator_y = total_height.saturating_add(1);
            scroll_view.render_widget(line, Rect::new(0, indicator_y, content_width, 1));
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Scrolling is handled on the persistent state, not the per-frame view.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
                Some(())
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
                Some(())
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
                Some(())
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
                Some(())
            }
            _ => None,
        }
    }
}

/// Cached message heights for one content width.
///
/// Each entry remembers a fingerprint of the message it was measured from,
/// so only messages whose text changed (the one being revealed, or all of
/// them after a reset) are measured again.
#[derive(Default)]
pub struct LayoutCache {
    pub heights: Vec<u16>,
    prefix_heights: Vec<u16>,
    fingerprints: Vec<u64>,
    content_width: u16,
}

fn fingerprint(message: &conversation::Message) -> u64 {
    let mut hasher = DefaultHasher::new();
    matches!(message.role, Role::User).hash(&mut hasher);
    message.content.hash(&mut hasher);
    hasher.finish()
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.heights.clear();
        self.prefix_heights.clear();
        self.fingerprints.clear();
    }

    /// Number of leading entries still valid for `messages` at `content_width`.
    pub fn reusable_count(&self, fingerprints: &[u64], content_width: u16) -> usize {
        if self.content_width != content_width {
            return 0;
        }
        self.fingerprints
            .iter()
            .zip(fingerprints)
            .take_while(|(cached, current)| cached == current)
            .count()
    }

    pub fn sync(&mut self, messages: &[conversation::Message], content_width: u16) {
        let current: Vec<u64> = messages.iter().map(fingerprint).collect();
        let reusable = self.reusable_count(&current, content_width);

        self.heights.truncate(reusable);
        for message in &messages[reusable..] {
            self.heights
                .push(Message::calculate_height(message, content_width));
        }
        self.fingerprints = current;
        self.content_width = content_width;
        self.rebuild_prefix_heights();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Canvas y of the top edge of message `index`.
    pub fn top_of(&self, index: usize) -> u16 {
        if index == 0 {
            0
        } else {
            self.prefix_heights.get(index - 1).copied().unwrap_or(0)
        }
    }

    fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Messages overlapping the viewport, padded by half a screen each way.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end.max(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::Message as ChatMessage;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn conversation(messages: &[ChatMessage]) -> Conversation {
        let mut conv = Conversation::new();
        for m in messages {
            conv.push(m.clone());
        }
        conv
    }

    fn render_to_string(
        state: &mut MessageListState,
        conv: &Conversation,
        is_loading: bool,
        width: u16,
        height: u16,
    ) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(state, conv, None, is_loading, 0).render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn empty_conversation_shows_placeholder() {
        let mut state = MessageListState::new();
        let text = render_to_string(&mut state, &Conversation::new(), false, 60, 10);
        assert!(text.contains(EMPTY_PLACEHOLDER));
    }

    #[test]
    fn loading_shows_typing_indicator() {
        let mut state = MessageListState::new();
        let conv = conversation(&[ChatMessage::user("What is 2+2?")]);
        let text = render_to_string(&mut state, &conv, true, 60, 10);
        assert!(text.contains("What is 2+2?"));
        assert!(text.contains("mathscare is thinking"));
    }

    #[test]
    fn overflowing_history_renders_while_loading() {
        let mut state = MessageListState::new();
        let long = "step\n\n".repeat(40_000);
        let conv = conversation(&[
            ChatMessage::assistant(long.clone()),
            ChatMessage::assistant(long),
        ]);
        render_to_string(&mut state, &conv, true, 20, 8);
        assert_eq!(state.layout.total_height(), u16::MAX);
        assert!(state.scroll_state.offset().y > 60_000);
    }

    #[test]
    fn sticks_to_bottom_with_long_history() {
        let mut state = MessageListState::new();
        let messages: Vec<ChatMessage> = (0..20)
            .map(|i| ChatMessage::assistant(format!("step {i}")))
            .collect();
        let conv = conversation(&messages);
        let text = render_to_string(&mut state, &conv, false, 40, 10);
        assert!(text.contains("step 19"));
        assert!(!text.contains("step 0 "));
    }

    #[test]
    fn scrolling_up_unpins_and_marks_new_content() {
        let mut state = MessageListState::new();
        let messages: Vec<ChatMessage> = (0..20)
            .map(|i| ChatMessage::assistant(format!("step {i}")))
            .collect();
        let mut conv = conversation(&messages);
        render_to_string(&mut state, &conv, false, 40, 10);

        state.handle_event(&TuiEvent::ScrollPageUp);
        assert!(!state.stick_to_bottom);

        conv.push(ChatMessage::assistant("step 20"));
        render_to_string(&mut state, &conv, false, 40, 10);
        assert!(state.has_unseen_content);

        state.pin_to_bottom();
        assert!(!state.has_unseen_content);
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn layout_cache_reuses_unchanged_prefix() {
        let mut cache = LayoutCache::new();
        let mut messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("Hel"),
        ];
        cache.sync(&messages, 40);
        let fps: Vec<u64> = messages.iter().map(fingerprint).collect();
        assert_eq!(cache.reusable_count(&fps, 40), 2);

        // The revealed message grew: only it needs measuring again.
        messages[1].content.push_str("lo there");
        let fps: Vec<u64> = messages.iter().map(fingerprint).collect();
        assert_eq!(cache.reusable_count(&fps, 40), 1);

        // Width change invalidates everything.
        assert_eq!(cache.reusable_count(&fps, 30), 0);
    }

    #[test]
    fn layout_cache_invalidates_after_reset() {
        let mut cache = LayoutCache::new();
        let before = vec![ChatMessage::user("a"), ChatMessage::assistant("b")];
        cache.sync(&before, 40);

        let after = vec![ChatMessage::assistant("greeting")];
        cache.sync(&after, 40);
        assert_eq!(cache.heights.len(), 1);
        assert_eq!(cache.total_height(), Message::calculate_height(&after[0], 40));
    }

    #[test]
    fn visible_range_covers_viewport() {
        let mut cache = LayoutCache::new();
        let messages: Vec<ChatMessage> = (0..10)
            .map(|i| ChatMessage::assistant(format!("m{i}")))
            .collect();
        cache.sync(&messages, 40); // each message is 3 rows
        let range = cache.visible_range(15, 6);
        assert!(range.contains(&5) && range.contains(&6));
        assert!(range.end <= 10);
    }
}

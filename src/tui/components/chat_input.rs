//! # ChatInput Component
//!
//! Question field, pending image attachment, and the disclaimer footer.
//!
//! ## Attachments
//!
//! An image can be attached three ways:
//! - paste (or drag-and-drop) a path to a png/jpeg/gif/webp/bmp file
//! - `Ctrl+V` with an image on the clipboard (the event loop calls [`ChatInput::attach`])
//! - programmatically through [`ChatInput::attach`]
//!
//! `Esc` drops the pending attachment. Submitting hands both text and
//! attachment to the parent and clears them.

use std::path::Path;

use image::ImageFormat;
use log::{info, warn};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType};

use crate::backend::Attachment;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_field::{TextField, dropped_path};
use crate::tui::event::TuiEvent;

pub const DISCLAIMER: &str = "MathsCare AI can make mistakes. Verify important information.";

/// Input block (3) plus footer (1).
const BASE_HEIGHT: u16 = 4;

#[derive(Debug, PartialEq)]
pub enum ChatEvent {
    Submit {
        text: String,
        attachment: Option<Attachment>,
    },
    Attached(String),
    AttachmentRemoved,
    /// A pasted image path could not be read.
    AttachFailed(String),
    Edited,
}

pub struct ChatInput {
    field: TextField,
    attachment: Option<Attachment>,
    /// An answer is pending; submission is blocked.
    pub is_loading: bool,
    pub focused: bool,
}

impl Default for ChatInput {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatInput {
    pub fn new() -> Self {
        Self {
            field: TextField::new("Ask a question about the content..."),
            attachment: None,
            is_loading: false,
            focused: false,
        }
    }

    pub fn text(&self) -> &str {
        self.field.value()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Replace any pending attachment.
    pub fn attach(&mut self, attachment: Attachment) {
        info!("Attached {:?}", attachment);
        self.attachment = Some(attachment);
    }

    pub fn can_submit(&self) -> bool {
        !self.is_loading && (!self.field.value().trim().is_empty() || self.attachment.is_some())
    }

    pub fn height(&self) -> u16 {
        BASE_HEIGHT + u16::from(self.attachment.is_some())
    }

    fn try_attach_path(&mut self, pasted: &str) -> Option<ChatEvent> {
        let path_text = dropped_path(pasted);
        let path = Path::new(&path_text);
        if !is_supported_image(path) || !path.is_file() {
            return None;
        }
        match Attachment::load(path) {
            Ok(file) => {
                let name = file.name.clone();
                self.attach(file);
                Some(ChatEvent::Attached(name))
            }
            Err(e) => {
                warn!("Could not attach {}: {}", path.display(), e);
                Some(ChatEvent::AttachFailed(e.to_string()))
            }
        }
    }
}

/// Formats the backend's vision endpoint accepts.
pub fn is_supported_image(path: &Path) -> bool {
    matches!(
        ImageFormat::from_path(path),
        Ok(ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::Gif
            | ImageFormat::WebP
            | ImageFormat::Bmp)
    )
}

impl Component for ChatInput {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [preview_area, input_area, footer_area] = Layout::vertical([
            Constraint::Length(u16::from(self.attachment.is_some())),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(file) = &self.attachment {
            let line = Line::from(vec![
                Span::styled(" 🖼 ", Style::default().fg(Color::Magenta)),
                Span::styled(file.name.as_str(), Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!(" ({:.1} KB)", file.size_kb()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled("  ✕ Esc", Style::default().fg(Color::Red)),
            ]);
            frame.render_widget(line, preview_area);
        }

        let (title, border_style) = if self.is_loading {
            ("Waiting for answer...", Style::default().fg(Color::DarkGray))
        } else if self.focused {
            ("Ask MathsCare", Style::default().fg(Color::Green))
        } else {
            ("Ask MathsCare", Style::default().fg(Color::DarkGray))
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title)
            .title_bottom(Line::from("Enter send · Ctrl+V image").right_aligned());
        let inner = block.inner(input_area);
        frame.render_widget(block, input_area);
        self.field.focused = self.focused;
        self.field.render(frame, inner);

        let footer = Line::from(Span::styled(
            DISCLAIMER,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
        .centered();
        frame.render_widget(footer, footer_area);
    }
}

impl EventHandler for ChatInput {
    type Event = ChatEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Submit => {
                if !self.can_submit() {
                    return None;
                }
                Some(ChatEvent::Submit {
                    text: self.field.take(),
                    attachment: self.attachment.take(),
                })
            }
            TuiEvent::Escape => self
                .attachment
                .take()
                .map(|_| ChatEvent::AttachmentRemoved),
            TuiEvent::Paste(text) => self
                .try_attach_path(text)
                .or_else(|| self.field.handle_event(event).map(|_| ChatEvent::Edited)),
            other => self.field.handle_event(other).map(|_| ChatEvent::Edited),
        }
    }
}

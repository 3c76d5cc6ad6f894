use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::tui::component::Component;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// The analyze control. Two flags in, one bordered label out.
///
/// `is_loading` wins over `disabled`: while a request is in flight the button
/// shows the spinner label and stays inert either way.
pub struct AnalyzeButton {
    pub is_loading: bool,
    pub disabled: bool,
    pub spinner_frame: usize,
}

impl AnalyzeButton {
    pub fn new(is_loading: bool, disabled: bool, spinner_frame: usize) -> Self {
        Self {
            is_loading,
            disabled,
            spinner_frame,
        }
    }

    /// Whether pressing the button should do anything.
    pub fn is_active(&self) -> bool {
        !self.is_loading && !self.disabled
    }

    pub fn label(&self) -> String {
        if self.is_loading {
            let frame = SPINNER[self.spinner_frame % SPINNER.len()];
            format!("{frame} Analyzing Content...")
        } else {
            "▶ Analyze Content".to_string()
        }
    }
}

impl Component for AnalyzeButton {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = if self.is_loading {
            Style::default().fg(Color::Yellow)
        } else if self.disabled {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(style)
            .title_bottom("Enter");
        let button = Paragraph::new(self.label())
            .alignment(Alignment::Center)
            .style(style)
            .block(block);
        frame.render_widget(button, area);
    }
}

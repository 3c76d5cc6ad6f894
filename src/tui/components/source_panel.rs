//! # SourcePanel Component
//!
//! The "Input Source" column: a video/document tab switch, one text field per
//! tab, a preview of what will be analyzed, and the analyze button.
//!
//! ## State
//!
//! The panel owns the two fields and the active tab. Each tab keeps its own
//! value, so flipping back and forth never loses what was typed. The
//! [`SourceForm`] used for validation is rebuilt from the fields on demand.
//!
//! ## Props
//!
//! - `is_analyzing`: request in flight, button shows the spinner and is inert
//! - `focused`: whether keystrokes are routed here
//! - `spinner_frame`: animation tick for the button

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Tabs, Wrap};

use crate::backend::AnalyzeRequest;
use crate::core::source::{SourceForm, SourceTab, thumbnail_url};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::analyze_button::AnalyzeButton;
use crate::tui::components::text_field::{TextField, dropped_path};
use crate::tui::event::TuiEvent;

#[derive(Debug, PartialEq)]
pub enum SourceEvent {
    Analyze(AnalyzeRequest),
    TabChanged(SourceTab),
    Edited,
}

pub struct SourcePanel {
    tab: SourceTab,
    url_field: TextField,
    path_field: TextField,
    pub is_analyzing: bool,
    pub focused: bool,
    pub spinner_frame: usize,
}

impl Default for SourcePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl SourcePanel {
    pub fn new() -> Self {
        Self {
            tab: SourceTab::default(),
            url_field: TextField::new("https://www.youtube.com/watch?v=..."),
            path_field: TextField::new("Drop or paste a PDF path"),
            is_analyzing: false,
            focused: true,
            spinner_frame: 0,
        }
    }

    pub fn active_tab(&self) -> SourceTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: SourceTab) {
        self.tab = tab;
    }

    pub fn set_url(&mut self, url: &str) {
        self.url_field.set_value(url.trim());
    }

    pub fn set_pdf_path(&mut self, path: &str) {
        self.path_field.set_value(dropped_path(path));
    }

    pub fn form(&self) -> SourceForm {
        SourceForm {
            active_tab: self.tab,
            url: self.url_field.value().trim().to_string(),
            pdf_path: self.path_field.value().to_string(),
        }
    }

    fn button(&self) -> AnalyzeButton {
        AnalyzeButton::new(
            self.is_analyzing,
            !self.form().can_submit(),
            self.spinner_frame,
        )
    }

    fn active_field(&mut self) -> &mut TextField {
        match self.tab {
            SourceTab::Youtube => &mut self.url_field,
            SourceTab::Pdf => &mut self.path_field,
        }
    }

    fn preview_lines(&self) -> Vec<Line<'static>> {
        let label = Style::default().fg(Color::DarkGray);
        let value = Style::default().fg(Color::Cyan);
        let form = self.form();
        match self.tab {
            SourceTab::Youtube => match form.video_id() {
                Some(id) => vec![
                    Line::from(vec![Span::styled("Video ID  ", label), Span::styled(id.clone(), value)]),
                    Line::from(Span::styled("Thumbnail", label)),
                    Line::from(Span::styled(
                        thumbnail_url(&id),
                        Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                    )),
                ],
                None => vec![Line::from(Span::styled(
                    "Paste a YouTube link to preview it here.",
                    label.add_modifier(Modifier::ITALIC),
                ))],
            },
            SourceTab::Pdf => match form.selected_document() {
                Some(doc) => vec![
                    Line::from(vec![Span::raw("📄 "), Span::styled(doc.name.clone(), value)]),
                    Line::from(Span::styled(format!("{:.2} MB", doc.size_mb()), label)),
                ],
                None if !form.pdf_path.trim().is_empty() => vec![Line::from(Span::styled(
                    "No file at that path.",
                    Style::default().fg(Color::Red),
                ))],
                None => vec![Line::from(Span::styled(
                    "Drag a PDF onto the terminal, or paste its path.",
                    label.add_modifier(Modifier::ITALIC),
                ))],
            },
        }
    }
}

impl Component for SourcePanel {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title("Input Source")
            .title_bottom(Line::from("Ctrl+T switch").right_aligned());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [tabs_area, _, field_area, preview_area, button_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .areas(inner);

        let selected = match self.tab {
            SourceTab::Youtube => 0,
            SourceTab::Pdf => 1,
        };
        let tabs = Tabs::new([SourceTab::Youtube.label(), SourceTab::Pdf.label()])
            .select(selected)
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .divider("│");
        frame.render_widget(tabs, tabs_area);

        let field_title = match self.tab {
            SourceTab::Youtube => "YouTube URL",
            SourceTab::Pdf => "PDF file",
        };
        let field_block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(field_title);
        let field_inner = field_block.inner(field_area);
        frame.render_widget(field_block, field_area);
        let focused = self.focused && !self.is_analyzing;
        let field = self.active_field();
        field.focused = focused;
        field.render(frame, field_inner);

        let preview = Paragraph::new(self.preview_lines()).wrap(Wrap { trim: false });
        frame.render_widget(preview, preview_area);

        self.button().render(frame, button_area);
    }
}

impl EventHandler for SourcePanel {
    type Event = SourceEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::SwitchSourceTab => {
                self.tab = self.tab.toggled();
                Some(SourceEvent::TabChanged(self.tab))
            }
            TuiEvent::Submit => {
                if !self.button().is_active() {
                    return None;
                }
                self.form().to_request().map(SourceEvent::Analyze)
            }
            TuiEvent::Paste(text) if self.tab == SourceTab::Pdf => {
                self.set_pdf_path(text);
                Some(SourceEvent::Edited)
            }
            _ if self.is_analyzing => None,
            other => self
                .active_field()
                .handle_event(other)
                .map(|_| SourceEvent::Edited),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::io::Write;

    fn type_str(panel: &mut SourcePanel, s: &str) {
        for c in s.chars() {
            panel.handle_event(&TuiEvent::InputChar(c));
        }
    }

    fn render_to_string(panel: &mut SourcePanel) -> String {
        let backend = TestBackend::new(60, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| panel.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn submit_with_video_url_emits_analyze() {
        let mut panel = SourcePanel::new();
        type_str(&mut panel, "https://www.youtube.com/watch?v=abc123");
        let event = panel.handle_event(&TuiEvent::Submit);
        assert_eq!(
            event,
            Some(SourceEvent::Analyze(AnalyzeRequest::Youtube {
                url: "https://www.youtube.com/watch?v=abc123".to_string()
            }))
        );
    }

    #[test]
    fn submit_with_empty_url_does_nothing() {
        let mut panel = SourcePanel::new();
        assert_eq!(panel.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn submit_while_analyzing_does_nothing() {
        let mut panel = SourcePanel::new();
        panel.set_url("https://www.youtube.com/watch?v=abc123");
        panel.is_analyzing = true;
        assert_eq!(panel.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn tabs_keep_their_own_values() {
        let mut panel = SourcePanel::new();
        type_str(&mut panel, "https://youtu.be/x");
        panel.handle_event(&TuiEvent::SwitchSourceTab);
        assert_eq!(panel.active_tab(), SourceTab::Pdf);
        panel.handle_event(&TuiEvent::Paste("/tmp/notes.pdf".to_string()));
        panel.handle_event(&TuiEvent::SwitchSourceTab);

        let form = panel.form();
        assert_eq!(form.active_tab, SourceTab::Youtube);
        assert_eq!(form.url, "https://youtu.be/x");
        assert_eq!(form.pdf_path, "/tmp/notes.pdf");
    }

    #[test]
    fn paste_replaces_document_path() {
        let mut panel = SourcePanel::new();
        panel.set_tab(SourceTab::Pdf);
        panel.handle_event(&TuiEvent::Paste("/tmp/first.pdf".to_string()));
        panel.handle_event(&TuiEvent::Paste("'/tmp/second.pdf'".to_string()));
        assert_eq!(panel.form().pdf_path, "/tmp/second.pdf");
    }

    #[test]
    fn document_submit_requires_existing_file() {
        let mut panel = SourcePanel::new();
        panel.set_tab(SourceTab::Pdf);
        panel.set_pdf_path("/definitely/not/here.pdf");
        assert_eq!(panel.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn document_submit_sends_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.4")
            .unwrap();

        let mut panel = SourcePanel::new();
        panel.set_tab(SourceTab::Pdf);
        panel.set_pdf_path(path.to_str().unwrap());

        match panel.handle_event(&TuiEvent::Submit) {
            Some(SourceEvent::Analyze(AnalyzeRequest::Pdf(file))) => {
                assert_eq!(file.name, "notes.pdf");
                assert_eq!(file.mime, "application/pdf");
                assert_eq!(file.bytes, b"%PDF-1.4");
            }
            other => panic!("expected a document request, got {other:?}"),
        }
    }

    #[test]
    fn preview_shows_video_id_and_thumbnail() {
        let mut panel = SourcePanel::new();
        panel.set_url("https://www.youtube.com/watch?v=abc123");
        let text = render_to_string(&mut panel);
        assert!(text.contains("abc123"));
        assert!(text.contains("img.youtube.com/vi/abc123"));
        assert!(text.contains("Analyze Content"));
    }

    #[test]
    fn no_preview_for_url_without_video_id() {
        let mut panel = SourcePanel::new();
        panel.set_url("https://www.youtube.com/");
        let text = render_to_string(&mut panel);
        assert!(!text.contains("Video ID"));
    }

    #[test]
    fn analyzing_shows_spinner_label() {
        let mut panel = SourcePanel::new();
        panel.set_url("https://www.youtube.com/watch?v=abc123");
        panel.is_analyzing = true;
        let text = render_to_string(&mut panel);
        assert!(text.contains("Analyzing Content..."));
    }
}

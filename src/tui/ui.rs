use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{Header, MessageList};

/// Below this width the source panel stacks above the chat.
const SIDE_BY_SIDE_MIN_WIDTH: u16 = 90;
const SOURCE_PANEL_WIDTH: u16 = 42;
const SOURCE_PANEL_STACKED_HEIGHT: u16 = 14;

/// Split the body into (source panel, chat column).
fn split_body(area: Rect) -> (Rect, Rect) {
    if area.width >= SIDE_BY_SIDE_MIN_WIDTH {
        let [source, chat] =
            Layout::horizontal([Constraint::Length(SOURCE_PANEL_WIDTH), Constraint::Min(0)])
                .areas(area);
        (source, chat)
    } else {
        let [source, chat] = Layout::vertical([
            Constraint::Length(SOURCE_PANEL_STACKED_HEIGHT),
            Constraint::Min(0),
        ])
        .areas(area);
        (source, chat)
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let [header_area, body_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(frame.area());
    let (source_area, chat_area) = split_body(body_area);

    let [list_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(tui.chat_input.height()),
    ])
    .areas(chat_area);

    tui.source_panel.spinner_frame = spinner_frame;
    tui.source_panel.render(frame, source_area);

    MessageList::new(
        &mut tui.message_list,
        &app.conversation,
        app.reveal.as_ref().map(|r| r.message_index()),
        app.is_chat_loading,
        spinner_frame,
    )
    .render(frame, list_area);

    tui.chat_input.render(frame, input_area);

    // Header last: it reads the unseen flag the list just updated.
    Header::new(
        app.status_message.clone(),
        tui.message_list.has_unseen_content,
    )
    .render(frame, header_area);
}

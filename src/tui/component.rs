use ratatui::Frame;
use ratatui::layout::Rect;

use crate::tui::event::TuiEvent;

/// A piece of the screen.
///
/// Components get their data as props (struct fields) and draw into the
/// `Rect` they are given. `render` takes `&mut self` so stateful components
/// can update caches such as scroll offsets while drawing.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that reacts to terminal events.
pub trait EventHandler {
    /// What the component reports back to the event loop.
    type Event;

    /// Handle a `TuiEvent`, returning a higher-level event if one resulted.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}

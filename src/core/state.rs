//! # Application State
//!
//! Core business state for MathsCare. Domain logic only; presentation state
//! (focus, scroll, text fields) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn TutorBackend>  // remote tutoring service
//! ├── conversation: Conversation      // chat history
//! ├── status_message: String          // header text
//! ├── is_analyzing: bool              // source upload in flight
//! ├── is_chat_loading: bool           // question in flight
//! ├── reveal: Option<Reveal>          // answer being typed out
//! └── reveal_interval: Duration       // time between reveal ticks
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::TutorBackend;
use crate::core::config::{DEFAULT_REVEAL_INTERVAL_MS, ResolvedConfig};
use crate::core::conversation::Conversation;
use crate::core::reveal::{Reveal, RevealId};

pub struct App {
    pub backend: Arc<dyn TutorBackend>,
    pub conversation: Conversation,
    pub status_message: String,
    pub is_analyzing: bool,
    pub is_chat_loading: bool,
    pub reveal: Option<Reveal>,
    pub reveal_interval: Duration,
    next_reveal_id: u64,
}

impl App {
    pub fn new(backend: Arc<dyn TutorBackend>) -> Self {
        Self {
            backend,
            conversation: Conversation::new(),
            status_message: String::from("Add a video or document to get started"),
            is_analyzing: false,
            is_chat_loading: false,
            reveal: None,
            reveal_interval: Duration::from_millis(DEFAULT_REVEAL_INTERVAL_MS),
            next_reveal_id: 0,
        }
    }

    pub fn from_config(backend: Arc<dyn TutorBackend>, config: &ResolvedConfig) -> Self {
        let mut app = Self::new(backend);
        app.reveal_interval = config.reveal_interval;
        app
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    pub(crate) fn next_reveal_id(&mut self) -> RevealId {
        self.next_reveal_id += 1;
        RevealId(self.next_reveal_id)
    }
}

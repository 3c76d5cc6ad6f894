//! # Conversation
//!
//! The ordered message list shown in the chat pane. Owned by `App`;
//! components only ever see `&Conversation`.

use crate::backend::{Attachment, SourceKind};

pub const VIDEO_GREETING: &str =
    "I have analyzed the video. I am ready to answer your questions regarding the content!";
pub const ANALYSIS_APOLOGY: &str =
    "Sorry, I encountered an error analyzing the content. Please ensure the backend is running.";
pub const ANSWER_APOLOGY: &str = "Sorry, I couldn't generate an answer at this time.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Drops the whole history and starts over from `message`.
    pub fn reset_to(&mut self, message: Message) {
        self.messages.clear();
        self.messages.push(message);
    }

    /// Appends a message and returns its index.
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Appends text to the message at `index`. Returns `false` if there is none.
    pub fn append_to(&mut self, index: usize, text: &str) -> bool {
        match self.messages.get_mut(index) {
            Some(message) => {
                message.content.push_str(text);
                true
            }
            None => false,
        }
    }
}

/// Greeting that replaces the conversation after a successful analysis.
pub fn analysis_greeting(kind: &SourceKind) -> String {
    match kind {
        SourceKind::Video => VIDEO_GREETING.to_string(),
        SourceKind::Document(name) => format!(
            "I have received and analyzed the document **\"{name}\"**. \
             I am ready to answer your questions regarding the content!"
        ),
    }
}

/// Text displayed for a user's question. Only the attachment's name is kept.
pub fn user_message_text(text: &str, attachment: Option<&Attachment>) -> String {
    match attachment {
        Some(file) => format!("{text}\n\n*[Attached Image: {}]*", file.name),
        None => text.to_string(),
    }
}

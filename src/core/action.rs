//! # Actions
//!
//! Everything that can happen in MathsCare becomes an `Action`.
//! User hits Analyze? That's `Action::Analyze(request)`.
//! Backend answers? That's `Action::AnswerReceived(text)`.
//!
//! The `update()` function applies an action to the state and returns an
//! `Effect` describing the I/O the caller must start. No side effects here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info, warn};

use crate::backend::{AnalyzeRequest, Attachment, SourceKind};
use crate::core::conversation::{
    ANALYSIS_APOLOGY, ANSWER_APOLOGY, Message, analysis_greeting, user_message_text,
};
use crate::core::reveal::{Reveal, RevealId};
use crate::core::state::App;

#[derive(Debug)]
pub enum Action {
    Analyze(AnalyzeRequest),
    AnalyzeSucceeded(SourceKind),
    AnalyzeFailed(String),
    Send {
        text: String,
        attachment: Option<Attachment>,
    },
    AnswerReceived(String),
    AnswerFailed(String),
    RevealTick(RevealId),
    Quit,
}

#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    Quit,
    SpawnAnalyze(AnalyzeRequest),
    SpawnAnswer {
        query: String,
        attachment: Option<Attachment>,
    },
    /// Start the tick timer for a new reveal, replacing any running one.
    StartReveal { id: RevealId, ticks: usize },
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Analyze(request) => {
            if app.is_analyzing {
                debug!("Analyze ignored: already analyzing");
                return Effect::None;
            }
            app.is_analyzing = true;
            app.status_message = String::from("Analyzing content...");
            Effect::SpawnAnalyze(request)
        }
        Action::AnalyzeSucceeded(kind) => {
            info!("Analysis complete: {:?}", kind);
            app.is_analyzing = false;
            // The reset invalidates message indices held by a running reveal.
            app.reveal = None;
            app.conversation
                .reset_to(Message::assistant(analysis_greeting(&kind)));
            app.status_message = String::from("Ready for questions");
            Effect::None
        }
        Action::AnalyzeFailed(error) => {
            warn!("Analysis failed: {}", error);
            app.is_analyzing = false;
            app.conversation.push(Message::assistant(ANALYSIS_APOLOGY));
            app.status_message = format!("Analysis failed: {error}");
            Effect::None
        }
        Action::Send { text, attachment } => {
            if app.is_chat_loading {
                debug!("Send ignored: answer already pending");
                return Effect::None;
            }
            if text.trim().is_empty() && attachment.is_none() {
                return Effect::None;
            }
            app.conversation
                .push(Message::user(user_message_text(&text, attachment.as_ref())));
            app.is_chat_loading = true;
            app.status_message = String::from("Thinking...");
            Effect::SpawnAnswer {
                query: text,
                attachment,
            }
        }
        Action::AnswerReceived(answer) => {
            app.is_chat_loading = false;
            app.status_message.clear();
            flush_active_reveal(app);

            let index = app.conversation.push(Message::assistant(""));
            let id = app.next_reveal_id();
            let reveal = Reveal::new(id, index, answer);
            let ticks = reveal.total_chars();
            debug!("Starting reveal {:?}: {} chars", id, ticks);
            if reveal.is_finished() {
                return Effect::None;
            }
            app.reveal = Some(reveal);
            Effect::StartReveal { id, ticks }
        }
        Action::AnswerFailed(error) => {
            warn!("Answer generation failed: {}", error);
            app.is_chat_loading = false;
            app.conversation.push(Message::assistant(ANSWER_APOLOGY));
            app.status_message = format!("Request failed: {error}");
            Effect::None
        }
        Action::RevealTick(id) => {
            let Some(reveal) = app.reveal.as_mut() else {
                return Effect::None;
            };
            if reveal.id() != id {
                return Effect::None;
            }
            let index = reveal.message_index();
            if let Some(ch) = reveal.advance() {
                app.conversation.append_to(index, ch);
            }
            if reveal.is_finished() {
                app.reveal = None;
            }
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

/// Completes the running reveal, if any, so its message holds the full answer.
fn flush_active_reveal(app: &mut App) {
    if let Some(mut reveal) = app.reveal.take() {
        let index = reveal.message_index();
        let id = reveal.id();
        let rest = reveal.flush();
        debug!("Flushing reveal {:?} ({} bytes left)", id, rest.len());
        app.conversation.append_to(index, rest);
    }
}

//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::backend::{AnalyzeRequest, AnswerBody, Attachment, BackendError, TutorBackend};

/// A backend that records calls and replies with canned results.
#[derive(Default)]
pub struct ScriptedBackend {
    pub fail: bool,
    pub answer: String,
    pub analyzed: Mutex<Vec<AnalyzeRequest>>,
    pub questions: Mutex<Vec<(String, Option<Attachment>)>>,
}

impl ScriptedBackend {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl TutorBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<(), BackendError> {
        self.analyzed.lock().unwrap().push(request);
        if self.fail {
            return Err(BackendError::Network("scripted failure".to_string()));
        }
        Ok(())
    }

    async fn generate_answer(
        &self,
        query: String,
        attachment: Option<Attachment>,
    ) -> Result<AnswerBody, BackendError> {
        self.questions.lock().unwrap().push((query, attachment));
        if self.fail {
            return Err(BackendError::Api {
                status: 500,
                message: "scripted failure".to_string(),
            });
        }
        Ok(AnswerBody::decode(&self.answer))
    }
}

/// Creates a test App with a backend that answers with an empty string.
pub fn test_app() -> crate::core::state::App {
    crate::core::state::App::new(Arc::new(ScriptedBackend::default()))
}

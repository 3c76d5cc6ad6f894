use std::fmt;

use async_trait::async_trait;

use super::types::{AnalyzeRequest, AnswerBody, Attachment};

/// Errors that can occur while talking to the tutoring backend.
#[derive(Debug)]
pub enum BackendError {
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Backend answered with a non-2xx status.
    Api { status: u16, message: String },
    /// A local file could not be read.
    Io(String),
    /// An attachment could not be turned into a multipart part.
    InvalidAttachment(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api { status, message } => {
                write!(f, "backend error (HTTP {status}): {message}")
            }
            BackendError::Io(msg) => write!(f, "file error: {msg}"),
            BackendError::InvalidAttachment(msg) => write!(f, "invalid attachment: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

#[async_trait]
pub trait TutorBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Uploads a video link or document for the backend to study.
    /// The response body is ignored.
    async fn analyze(&self, request: AnalyzeRequest) -> Result<(), BackendError>;

    /// Asks a question about the analyzed content, optionally with an image.
    async fn generate_answer(
        &self,
        query: String,
        attachment: Option<Attachment>,
    ) -> Result<AnswerBody, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_api_error() {
        let err = BackendError::Api {
            status: 503,
            message: "down".to_string(),
        };
        assert_eq!(err.to_string(), "backend error (HTTP 503): down");
    }

    #[test]
    fn display_network_error() {
        let err = BackendError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "network error: connection refused");
    }
}

pub mod http;
pub mod service;
pub mod types;

pub use http::{DEFAULT_BACKEND_URL, HttpBackend};
pub use service::{BackendError, TutorBackend};
pub use types::{AnalyzeRequest, AnswerBody, Attachment, PDF_MIME, SourceKind};

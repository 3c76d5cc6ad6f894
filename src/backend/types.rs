use std::fmt;
use std::fs;
use std::path::Path;

use image::ImageFormat;
use serde_json::Value;

use super::service::BackendError;

pub const PDF_MIME: &str = "application/pdf";
const FALLBACK_MIME: &str = "application/octet-stream";

/// A file picked by the user, held only until it is handed to a request.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Reads a file from disk. The content type is taken from the extension.
    pub fn load(path: &Path) -> Result<Self, BackendError> {
        let bytes = fs::read(path)
            .map_err(|e| BackendError::Io(format!("{}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, mime_for_path(path), bytes))
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}

// Attachments can be several megabytes; keep them out of debug logs.
impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Content type for a local file, from its extension.
pub fn mime_for_path(path: &Path) -> String {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        return PDF_MIME.to_string();
    }
    match ImageFormat::from_path(path) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => FALLBACK_MIME.to_string(),
    }
}

/// What the user asked the backend to ingest before chatting.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeRequest {
    Youtube { url: String },
    Pdf(Attachment),
}

impl AnalyzeRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            AnalyzeRequest::Youtube { .. } => "/uploadURL",
            AnalyzeRequest::Pdf(_) => "/uploadPDF",
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            AnalyzeRequest::Youtube { .. } => SourceKind::Video,
            AnalyzeRequest::Pdf(file) => SourceKind::Document(file.name.clone()),
        }
    }
}

/// An analyzed source, without its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Video,
    Document(String),
}

#[derive(serde::Serialize)]
pub(crate) struct UploadUrlBody<'a> {
    pub url: &'a str,
}

/// Body of a `/generateAnswer` response.
///
/// The backend has returned plain strings, `{"answer": ..}` and
/// `{"content": ..}` objects over time. Decoding probes those shapes in order
/// and keeps anything else as raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerBody {
    /// Non-JSON text, or a JSON string.
    Plain(String),
    Answer(String),
    Content(String),
    Other(Value),
}

impl AnswerBody {
    pub fn decode(raw: &str) -> Self {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(_) => return AnswerBody::Plain(raw.to_string()),
        };

        match value {
            Value::String(s) => AnswerBody::Plain(s),
            Value::Object(map) => {
                if let Some(Value::String(s)) = map.get("answer")
                    && !s.is_empty()
                {
                    return AnswerBody::Answer(s.clone());
                }
                if let Some(Value::String(s)) = map.get("content")
                    && !s.is_empty()
                {
                    return AnswerBody::Content(s.clone());
                }
                AnswerBody::Other(Value::Object(map))
            }
            other => AnswerBody::Other(other),
        }
    }

    /// The text shown to the user.
    pub fn into_text(self) -> String {
        match self {
            AnswerBody::Plain(s) | AnswerBody::Answer(s) | AnswerBody::Content(s) => s,
            AnswerBody::Other(value) => value.to_string(),
        }
    }
}

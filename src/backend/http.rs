//! HTTP implementation of [`TutorBackend`].
//!
//! Three endpoints, all `POST`:
//! - `/uploadURL`: JSON `{ "url": .. }`
//! - `/uploadPDF`: multipart with a `file` part
//! - `/generateAnswer`: multipart with `userQuery` and an optional `file` part

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};

use super::service::{BackendError, TutorBackend};
use super::types::{AnalyzeRequest, AnswerBody, Attachment, UploadUrlBody};

/// Compiled-in backend address, used when nothing overrides it.
pub const DEFAULT_BACKEND_URL: &str = "http://192.168.0.134:5500";

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn upload_url(&self, url: &str) -> Result<(), BackendError> {
        info!("Uploading video link: {}", url);
        let response = self
            .client
            .post(format!("{}/uploadURL", self.base_url))
            .json(&UploadUrlBody { url })
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        ensure_success(response, "uploadURL").await?;
        Ok(())
    }

    pub async fn upload_pdf(&self, file: Attachment) -> Result<(), BackendError> {
        info!(
            "Uploading document: {} ({} bytes)",
            file.name,
            file.bytes.len()
        );
        let form = Form::new().part("file", file_part(file)?);
        let response = self
            .client
            .post(format!("{}/uploadPDF", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        ensure_success(response, "uploadPDF").await?;
        Ok(())
    }
}

fn file_part(file: Attachment) -> Result<Part, BackendError> {
    Part::bytes(file.bytes)
        .file_name(file.name)
        .mime_str(&file.mime)
        .map_err(|e| BackendError::InvalidAttachment(e.to_string()))
}

async fn ensure_success(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<reqwest::Response, BackendError> {
    debug!("{} response status: {}", endpoint, response.status());
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    warn!("{} failed: {} - {}", endpoint, status, message);
    Err(BackendError::Api { status, message })
}

#[async_trait]
impl TutorBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<(), BackendError> {
        match request {
            AnalyzeRequest::Youtube { url } => self.upload_url(&url).await,
            AnalyzeRequest::Pdf(file) => self.upload_pdf(file).await,
        }
    }

    async fn generate_answer(
        &self,
        query: String,
        attachment: Option<Attachment>,
    ) -> Result<AnswerBody, BackendError> {
        info!(
            "generateAnswer request: query_len={}, attachment={:?}",
            query.len(),
            attachment.as_ref().map(|a| a.name.as_str())
        );

        let mut form = Form::new().text("userQuery", query);
        if let Some(file) = attachment {
            form = form.part("file", file_part(file)?);
        }

        let response = self
            .client
            .post(format!("{}/generateAnswer", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let response = ensure_success(response, "generateAnswer").await?;

        let raw = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        debug!("generateAnswer body: {} bytes", raw.len());
        Ok(AnswerBody::decode(&raw))
    }
}

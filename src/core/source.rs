//! # Source Selection
//!
//! Rules behind the "Input Source" panel: which tab is active, when the
//! analyze control is enabled, and how the pending values become an
//! [`AnalyzeRequest`].

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use url::Url;

use crate::backend::{AnalyzeRequest, Attachment};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceTab {
    #[default]
    Youtube,
    Pdf,
}

impl SourceTab {
    pub fn toggled(self) -> Self {
        match self {
            SourceTab::Youtube => SourceTab::Pdf,
            SourceTab::Pdf => SourceTab::Youtube,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceTab::Youtube => "YouTube Video",
            SourceTab::Pdf => "PDF Document",
        }
    }
}

/// Pending values for both tabs. Switching tabs keeps both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceForm {
    pub active_tab: SourceTab,
    pub url: String,
    pub pdf_path: String,
}

impl SourceForm {
    pub fn can_submit(&self) -> bool {
        match self.active_tab {
            SourceTab::Youtube => !self.url.is_empty(),
            SourceTab::Pdf => self.selected_document().is_some(),
        }
    }

    pub fn video_id(&self) -> Option<String> {
        youtube_video_id(&self.url)
    }

    pub fn selected_document(&self) -> Option<DocumentInfo> {
        DocumentInfo::probe(self.pdf_path.trim())
    }

    /// Builds the request for the active tab, or `None` if it has nothing valid.
    pub fn to_request(&self) -> Option<AnalyzeRequest> {
        match self.active_tab {
            SourceTab::Youtube if !self.url.is_empty() => Some(AnalyzeRequest::Youtube {
                url: self.url.clone(),
            }),
            SourceTab::Pdf => {
                let doc = self.selected_document()?;
                match Attachment::load(&doc.path) {
                    Ok(file) => Some(AnalyzeRequest::Pdf(file)),
                    Err(e) => {
                        warn!("Ignoring document selection: {}", e);
                        None
                    }
                }
            }
            _ => None,
        }
    }
}

/// The `v` query parameter of a YouTube watch URL.
///
/// Anything that does not parse as a URL, or has no `v`, gives `None`.
pub fn youtube_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg")
}

/// A document chosen on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
}

impl DocumentInfo {
    pub fn probe(path: &str) -> Option<Self> {
        if path.is_empty() {
            return None;
        }
        let path = Path::new(path);
        let metadata = fs::metadata(path).ok().filter(|m| m.is_file())?;
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            path: path.to_path_buf(),
            name,
            size_bytes: metadata.len(),
        })
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }
}

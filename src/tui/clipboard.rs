//! Image paste from the system clipboard.

use std::fmt;
use std::io::Cursor;

use arboard::Clipboard;
use image::{ImageFormat, RgbaImage};
use log::debug;

use crate::backend::Attachment;

pub const PASTED_IMAGE_NAME: &str = "pasted-image.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No clipboard could be opened (headless session, no display server)
    Unavailable(String),
    /// The clipboard holds no image
    NoImage,
    Encode(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Unavailable(msg) => write!(f, "Clipboard unavailable: {}", msg),
            ClipboardError::NoImage => write!(f, "No image on the clipboard"),
            ClipboardError::Encode(msg) => write!(f, "Could not encode image: {}", msg),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Read the clipboard image and package it as a PNG attachment.
pub fn paste_image() -> Result<Attachment, ClipboardError> {
    let mut clipboard =
        Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
    let data = clipboard.get_image().map_err(|e| match e {
        arboard::Error::ContentNotAvailable => ClipboardError::NoImage,
        other => ClipboardError::Unavailable(other.to_string()),
    })?;
    debug!("Clipboard image {}x{}", data.width, data.height);
    encode_png(data.width, data.height, data.bytes.into_owned())
}

/// Encode raw RGBA pixels as a PNG attachment.
pub fn encode_png(width: usize, height: usize, rgba: Vec<u8>) -> Result<Attachment, ClipboardError> {
    let (w, h) = (
        u32::try_from(width).map_err(|e| ClipboardError::Encode(e.to_string()))?,
        u32::try_from(height).map_err(|e| ClipboardError::Encode(e.to_string()))?,
    );
    let image = RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| ClipboardError::Encode("pixel buffer does not match size".to_string()))?;

    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| ClipboardError::Encode(e.to_string()))?;

    Ok(Attachment::new(PASTED_IMAGE_NAME, "image/png", png.into_inner()))
}

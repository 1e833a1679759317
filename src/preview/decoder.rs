/// Attachment decode operation
///
/// This module turns one attachment's bytes into preview-sized RGBA
/// pixels. Decoding is CPU-intensive, so the blocking work runs on
/// tokio's blocking pool and the async wrapper just awaits it.

use std::fmt;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use thiserror::Error;
use tokio::task;

/// Longest edge of a generated preview, in pixels.
/// Large photos are downscaled to this before display; smaller images
/// are kept at their native size.
const PREVIEW_MAX_DIM: u32 = 1280;

/// Why a decode failed.
///
/// All of these are expected, per-file outcomes: the batch keeps going
/// and the failed file is simply left out of the preview list.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DecodeError {
    #[error("could not read {path}: {message}")]
    Read { path: String, message: String },
    #[error("unsupported or corrupt image data: {0}")]
    Malformed(String),
    #[error("decode task failed to complete: {0}")]
    TaskFailed(String),
}

/// Decoded, preview-sized RGBA pixels for one attachment.
#[derive(Clone, PartialEq)]
pub struct DecodedPreview {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, row-major, width * height * 4 bytes
    pub pixels: Vec<u8>,
}

// Keep Debug output readable: the pixel buffer would otherwise dump
// megabytes into logs.
impl fmt::Debug for DecodedPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedPreview")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Decode one attachment into a preview.
///
/// Reads the file and decodes it on the blocking pool. Returns the
/// preview pixels, or a DecodeError describing which step failed.
pub async fn decode_preview(path: PathBuf) -> Result<DecodedPreview, DecodeError> {
    // Spawn blocking because image decoding is CPU-intensive
    task::spawn_blocking(move || decode_preview_blocking(&path))
        .await
        .map_err(|e| DecodeError::TaskFailed(e.to_string()))?
}

/// Blocking implementation of preview decoding
fn decode_preview_blocking(path: &Path) -> Result<DecodedPreview, DecodeError> {
    let bytes = std::fs::read(path).map_err(|e| DecodeError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    decode_bytes(&bytes)
}

/// Decode in-memory image bytes into preview-sized RGBA pixels.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedPreview, DecodeError> {
    let img = image::load_from_memory(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    // Downscale large photos; small images are displayed as-is
    let img = if img.width() > PREVIEW_MAX_DIM || img.height() > PREVIEW_MAX_DIM {
        img.resize(PREVIEW_MAX_DIM, PREVIEW_MAX_DIM, FilterType::Lanczos3)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedPreview {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the selection layer, the preview pipeline, and the UI layer.

use std::path::{Path, PathBuf};

/// A single user-selected attachment candidate.
///
/// This is a handle to a file on disk, never a copy of its bytes.
/// The MIME type is derived from the file extension at selection time.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFile {
    /// Filename only (e.g., "IMG_0001.jpg")
    pub name: String,
    /// MIME type derived from the extension (e.g., "image/jpeg")
    pub mime_type: String,
    /// File size in bytes
    pub byte_length: u64,
    /// Full path to the file
    pub path: PathBuf,
}

impl RawFile {
    /// Build a RawFile from a path and its on-disk size.
    ///
    /// Unrecognized extensions get "application/octet-stream" so the
    /// acceptor can classify them as rejected instead of this layer
    /// silently dropping them.
    pub fn new(path: PathBuf, byte_length: u64) -> Self {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let mime_type = mime_for_path(&path)
            .unwrap_or("application/octet-stream")
            .to_string();

        RawFile {
            name,
            mime_type,
            byte_length,
            path,
        }
    }
}

/// Map a file extension to its image MIME type.
///
/// Only the formats the composer accepts are listed; everything else
/// returns None.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Attachment preview pipeline
///
/// This module turns accepted files into renderable previews:
/// - Decoding file bytes into bounded-size RGBA pixels (decoder.rs)
/// - Ordered slot buffer with stale-batch suppression (loader.rs)
/// - Ownership and release of displayable image sources (source.rs)

pub mod decoder;
pub mod loader;
pub mod source;

pub use decoder::{DecodeError, DecodedPreview};
pub use loader::{PreviewLoader, PreviewRecord, PreviewSet, Settle};
pub use source::{SourceId, SourceRegistry};

/// UI widgets for the compose dialog
///
/// - carousel.rs: the preview area (loading placeholder, single image,
///   multi-image carousel with thumbnail strip)
/// - picker.rs: the attachment picker panel and clear-images control

pub mod carousel;
pub mod picker;

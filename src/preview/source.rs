/// Displayable image sources
///
/// Decoded previews become renderable image handles owned by a registry.
/// The registry is the single owner of every handle it hands out an id
/// for. Releasing a source (on slot replacement, on clear, or on session
/// teardown) happens here, exactly once per id, rather than scattered
/// across the UI.

use std::collections::HashMap;

use iced::widget::image::Handle;

use super::decoder::DecodedPreview;

/// Opaque id of a registered displayable source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

/// A renderable reference to decoded image data.
#[derive(Debug, Clone)]
pub struct DisplayableSource {
    /// Widget-ready image handle (shared pixel buffer)
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
}

/// Owner of all live displayable sources for one compose session.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    next_id: u64,
    live: HashMap<SourceId, DisplayableSource>,
    released: u64,
}

impl SourceRegistry {
    pub fn new() -> Self {
        SourceRegistry::default()
    }

    /// Turn a decoded preview into a registered, renderable source.
    pub fn register(&mut self, decoded: DecodedPreview) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;

        let handle = Handle::from_rgba(decoded.width, decoded.height, decoded.pixels);
        self.live.insert(
            id,
            DisplayableSource {
                handle,
                width: decoded.width,
                height: decoded.height,
            },
        );

        id
    }

    /// Look up a live source for rendering.
    pub fn get(&self, id: SourceId) -> Option<&DisplayableSource> {
        self.live.get(&id)
    }

    /// Release one source, freeing its pixel data.
    ///
    /// Returns false if the id was already released; the double release
    /// is a no-op apart from the log line.
    pub fn release(&mut self, id: SourceId) -> bool {
        if self.live.remove(&id).is_some() {
            self.released += 1;
            true
        } else {
            eprintln!("⚠️  Ignoring release of already-released source {:?}", id);
            false
        }
    }

    /// Release every live source. Returns how many were freed.
    pub fn release_all(&mut self) -> usize {
        let count = self.live.len();
        self.released += count as u64;
        self.live.clear();
        count
    }

    /// Number of currently live sources.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total sources released over the registry's lifetime.
    pub fn released_count(&self) -> u64 {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(width: u32, height: u32) -> DecodedPreview {
        DecodedPreview {
            width,
            height,
            pixels: vec![0u8; (width * height * 4) as usize],
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = SourceRegistry::new();
        let id = registry.register(decoded(2, 2));

        let source = registry.get(id).unwrap();
        assert_eq!((source.width, source.height), (2, 2));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_release_is_exactly_once() {
        let mut registry = SourceRegistry::new();
        let id = registry.register(decoded(1, 1));

        assert!(registry.release(id));
        assert!(!registry.release(id));
        assert!(!registry.release(id));

        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.released_count(), 1);
    }

    #[test]
    fn test_release_all_counts_every_live_source() {
        let mut registry = SourceRegistry::new();
        let a = registry.register(decoded(1, 1));
        let _b = registry.register(decoded(1, 1));
        let _c = registry.register(decoded(1, 1));

        assert!(registry.release(a));
        assert_eq!(registry.release_all(), 2);

        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.released_count(), 3);

        // release_all on an empty registry frees nothing more
        assert_eq!(registry.release_all(), 0);
        assert_eq!(registry.released_count(), 3);
    }

    #[test]
    fn test_ids_are_not_reused_across_cycles() {
        let mut registry = SourceRegistry::new();
        let first = registry.register(decoded(1, 1));
        registry.release_all();

        let second = registry.register(decoded(1, 1));
        assert_ne!(first, second);
        assert!(registry.get(first).is_none());
        assert!(registry.get(second).is_some());
    }
}

/// Ordered preview loading
///
/// Decodes for one batch of accepted files run concurrently and finish in
/// any order, but the preview list must always read in the files' original
/// order. The loader keeps one slot per accepted file, filled in by
/// original index as each decode settles, and derives the visible preview
/// set from the slots. A monotonically increasing epoch marks the current
/// batch; completions carrying an older epoch are discarded before they
/// can touch the slots or allocate a source.

use super::decoder::{DecodeError, DecodedPreview};
use super::source::{SourceId, SourceRegistry};

/// One completed preview, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRecord {
    /// Filename of the originating attachment
    pub name: String,
    /// Renderable source owned by the session's SourceRegistry
    pub source: SourceId,
    /// Index of the originating file in the accepted list
    pub file_index: usize,
}

/// Snapshot of the preview state for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewSet {
    /// Completed previews, in accepted-list order
    pub items: Vec<PreviewRecord>,
    /// True while at least one decode has neither completed nor failed
    pub is_loading: bool,
}

/// State of one accepted file's decode.
#[derive(Debug)]
enum Slot {
    Pending,
    Ready(PreviewRecord),
    Failed,
}

/// What happened to a reported completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// The completion belonged to the current batch and was applied
    Applied,
    /// The completion belonged to a superseded batch and was discarded
    Stale,
}

/// Slot buffer for the currently loading batch.
#[derive(Debug, Default)]
pub struct PreviewLoader {
    epoch: u64,
    slots: Vec<Slot>,
}

impl PreviewLoader {
    pub fn new() -> Self {
        PreviewLoader::default()
    }

    /// The epoch decode completions must present to be applied.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Start loading a new batch of `count` files.
    ///
    /// The previous batch's sources are released and its in-flight
    /// decodes are invalidated by the epoch bump. Returns the new epoch
    /// for tagging the batch's decode jobs.
    pub fn begin(&mut self, registry: &mut SourceRegistry, count: usize) -> u64 {
        self.release_slots(registry);
        self.epoch += 1;
        self.slots = (0..count).map(|_| Slot::Pending).collect();
        self.epoch
    }

    /// Drop the current batch entirely.
    ///
    /// Releases every source and bumps the epoch so that decodes still in
    /// flight for the dropped batch settle as stale.
    pub fn clear(&mut self, registry: &mut SourceRegistry) {
        self.release_slots(registry);
        self.epoch += 1;
        self.slots = Vec::new();
    }

    /// Apply one decode completion to its slot.
    ///
    /// Completions from superseded batches are rejected here, before any
    /// source is allocated, so a stale decode can never leak a handle or
    /// disturb the current batch.
    pub fn settle(
        &mut self,
        registry: &mut SourceRegistry,
        epoch: u64,
        index: usize,
        name: &str,
        result: Result<DecodedPreview, DecodeError>,
    ) -> Settle {
        if epoch != self.epoch {
            println!("🕓 Discarding stale preview for '{}' (batch superseded)", name);
            return Settle::Stale;
        }

        let Some(slot) = self.slots.get_mut(index) else {
            eprintln!("⚠️  Preview completion for out-of-range slot {}", index);
            return Settle::Stale;
        };

        // A slot settles once per epoch; release the old source if a
        // duplicate completion ever lands anyway
        if let Slot::Ready(old) = slot {
            registry.release(old.source);
        }

        *slot = match result {
            Ok(decoded) => {
                let source = registry.register(decoded);
                Slot::Ready(PreviewRecord {
                    name: name.to_string(),
                    source,
                    file_index: index,
                })
            }
            Err(e) => {
                eprintln!("⚠️  Preview failed for '{}': {}", name, e);
                Slot::Failed
            }
        };

        Settle::Applied
    }

    /// True while any slot is still pending.
    pub fn is_loading(&self) -> bool {
        self.slots.iter().any(|s| matches!(s, Slot::Pending))
    }

    /// True if at least one decode in the current batch failed.
    pub fn has_failures(&self) -> bool {
        self.slots.iter().any(|s| matches!(s, Slot::Failed))
    }

    /// Snapshot the visible preview state.
    ///
    /// Items appear in slot (= accepted list) order; failed or pending
    /// slots are simply absent.
    pub fn snapshot(&self) -> PreviewSet {
        let items = self
            .slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Ready(record) => Some(record.clone()),
                _ => None,
            })
            .collect();

        PreviewSet {
            items,
            is_loading: self.is_loading(),
        }
    }

    fn release_slots(&mut self, registry: &mut SourceRegistry) {
        for slot in self.slots.drain(..) {
            if let Slot::Ready(record) = slot {
                registry.release(record.source);
            }
        }
    }
}

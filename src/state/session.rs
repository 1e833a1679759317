/// Compose session
///
/// One open compose dialog = one ComposeSession. The session owns the
/// accepted attachment list, the caption, the preview slot buffer, and
/// the registry of displayable sources; it is created when the dialog
/// opens and torn down when the dialog closes or the post is submitted.
/// Nothing outside the session writes into the preview state; the UI
/// only reads snapshots.

use thiserror::Error;

use crate::accept::{self, RejectedFile};
use crate::config::ComposeOptions;
use crate::preview::decoder::{DecodeError, DecodedPreview};
use crate::preview::loader::{PreviewLoader, PreviewSet, Settle};
use crate::preview::source::{DisplayableSource, SourceId, SourceRegistry};
use crate::state::data::RawFile;

/// One decode task to spawn for the current batch.
#[derive(Debug, Clone)]
pub struct DecodeJob {
    /// Batch epoch the completion must present back
    pub epoch: u64,
    /// Slot index (= position in the accepted list)
    pub index: usize,
    /// File to decode
    pub path: std::path::PathBuf,
}

/// Why a post cannot be submitted right now.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmitBlocked {
    #[error("attach at least one image before posting")]
    NoAttachments,
    #[error("caption is {len} characters, the limit is {max}")]
    CaptionTooLong { len: usize, max: usize },
    #[error("some attachments could not be previewed")]
    PreviewsFailed,
}

/// State for one open compose dialog.
#[derive(Debug)]
pub struct ComposeSession {
    /// Caption text as typed (trimmed at validation/submit time)
    pub caption: String,
    accepted: Vec<RawFile>,
    loader: PreviewLoader,
    sources: SourceRegistry,
    carousel: usize,
    options: ComposeOptions,
}

impl ComposeSession {
    pub fn new(options: ComposeOptions) -> Self {
        ComposeSession {
            caption: String::new(),
            accepted: Vec::new(),
            loader: PreviewLoader::new(),
            sources: SourceRegistry::new(),
            carousel: 0,
            options,
        }
    }

    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// Classify a fresh selection and start loading previews for it.
    ///
    /// A new selection always replaces the previous one: old sources are
    /// released, the epoch advances, and in-flight decodes of the old
    /// batch become stale. Returns the rejection report for the status
    /// line and one decode job per accepted file.
    pub fn select_files(&mut self, files: Vec<RawFile>) -> (Vec<RejectedFile>, Vec<DecodeJob>) {
        let selection = accept::accept(files, &self.options.accept_rule());

        self.accepted = selection.accepted;
        self.carousel = 0;
        let epoch = self.loader.begin(&mut self.sources, self.accepted.len());

        let jobs = self
            .accepted
            .iter()
            .enumerate()
            .map(|(index, file)| DecodeJob {
                epoch,
                index,
                path: file.path.clone(),
            })
            .collect();

        (selection.rejected, jobs)
    }

    /// Apply one decode completion.
    ///
    /// The epoch is checked before the accepted list is touched: a stale
    /// completion must not read the new batch's files either.
    pub fn settle_preview(
        &mut self,
        epoch: u64,
        index: usize,
        result: Result<DecodedPreview, DecodeError>,
    ) -> Settle {
        if epoch != self.loader.epoch() {
            println!("🕓 Discarding stale preview completion (batch superseded)");
            return Settle::Stale;
        }

        let name = self
            .accepted
            .get(index)
            .map(|f| f.name.clone())
            .unwrap_or_default();

        self.loader
            .settle(&mut self.sources, epoch, index, &name, result)
    }

    /// Snapshot of the preview state for rendering.
    pub fn preview_set(&self) -> PreviewSet {
        self.loader.snapshot()
    }

    /// Look up a displayable source by id (for rendering).
    pub fn source(&self, id: SourceId) -> Option<&DisplayableSource> {
        self.sources.get(id)
    }

    /// The accepted attachments, in post order.
    pub fn accepted(&self) -> &[RawFile] {
        &self.accepted
    }

    pub fn has_attachments(&self) -> bool {
        !self.accepted.is_empty()
    }

    /// Remove all attachments, keeping the caption.
    ///
    /// Matches the "Clear images" button: the files go, the text stays.
    pub fn clear_images(&mut self) {
        self.loader.clear(&mut self.sources);
        self.accepted.clear();
        self.carousel = 0;
    }

    /// Tear the session down, releasing every live source.
    ///
    /// Safe while decodes are still in flight: their completions arrive
    /// after the session is gone and are dropped by the shell.
    pub fn close(mut self) -> usize {
        let before = self.sources.released_count();
        self.loader.clear(&mut self.sources);
        self.sources.release_all();
        (self.sources.released_count() - before) as usize
    }

    /// Total sources released over this session (for diagnostics/tests).
    pub fn released_sources(&self) -> u64 {
        self.sources.released_count()
    }

    /// Live sources right now (for diagnostics/tests).
    pub fn live_sources(&self) -> usize {
        self.sources.live_count()
    }

    /// Caption with surrounding whitespace removed, as it would be posted.
    pub fn trimmed_caption(&self) -> &str {
        self.caption.trim()
    }

    /// Check whether the post can be submitted.
    ///
    /// Decode failures only block when `require_previews_for_submit` is
    /// set; by default a failed preview still uploads fine.
    pub fn can_submit(&self) -> Result<(), SubmitBlocked> {
        if self.accepted.is_empty() {
            return Err(SubmitBlocked::NoAttachments);
        }

        let len = self.trimmed_caption().chars().count();
        let max = self.options.caption_max_chars;
        if len > max {
            return Err(SubmitBlocked::CaptionTooLong { len, max });
        }

        if self.options.require_previews_for_submit && self.loader.has_failures() {
            return Err(SubmitBlocked::PreviewsFailed);
        }

        Ok(())
    }

    // ========== Carousel navigation ==========

    /// Current carousel position, clamped to the item count.
    pub fn carousel_index(&self, item_count: usize) -> usize {
        self.carousel.min(item_count.saturating_sub(1))
    }

    pub fn carousel_next(&mut self, item_count: usize) {
        if item_count > 0 {
            self.carousel = (self.carousel_index(item_count) + 1) % item_count;
        }
    }

    pub fn carousel_prev(&mut self, item_count: usize) {
        if item_count > 0 {
            let current = self.carousel_index(item_count);
            self.carousel = (current + item_count - 1) % item_count;
        }
    }

    pub fn carousel_jump(&mut self, index: usize) {
        self.carousel = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(name: &str) -> RawFile {
        RawFile::new(PathBuf::from(format!("/pics/{}", name)), 256)
    }

    fn decoded() -> DecodedPreview {
        DecodedPreview {
            width: 1,
            height: 1,
            pixels: vec![0u8; 4],
        }
    }

    fn session() -> ComposeSession {
        ComposeSession::new(ComposeOptions::default())
    }

    #[test]
    fn test_select_files_classifies_and_yields_jobs() {
        let mut s = session();
        let (rejected, jobs) = s.select_files(vec![file("a.png"), file("b.txt"), file("c.jpg")]);

        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].file.name, "b.txt");

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].index, 0);
        assert_eq!(jobs[1].index, 1);
        assert_eq!(jobs[0].epoch, jobs[1].epoch);
        assert!(jobs[0].path.ends_with("a.png"));
        assert!(jobs[1].path.ends_with("c.jpg"));

        assert_eq!(s.accepted().len(), 2);
        assert!(s.preview_set().is_loading);
    }

    #[test]
    fn test_new_selection_replaces_not_merges() {
        let mut s = session();
        let (_, jobs_a) = s.select_files(vec![file("a.png")]);
        s.settle_preview(jobs_a[0].epoch, 0, Ok(decoded()));

        let (_, jobs_b) = s.select_files(vec![file("x.png"), file("y.png")]);

        // Old batch's source was released, accepted list fully replaced
        assert_eq!(s.live_sources(), 0);
        assert_eq!(s.released_sources(), 1);
        assert_eq!(s.accepted().len(), 2);
        assert!(jobs_b[0].epoch > jobs_a[0].epoch);

        // And the old batch's late completion is suppressed
        let settled = s.settle_preview(jobs_a[0].epoch, 0, Ok(decoded()));
        assert_eq!(settled, Settle::Stale);
        assert_eq!(s.live_sources(), 0);
    }

    #[test]
    fn test_settled_previews_read_in_accepted_order() {
        let mut s = session();
        let (_, jobs) = s.select_files(vec![file("a.png"), file("b.png"), file("c.png")]);
        let epoch = jobs[0].epoch;

        s.settle_preview(epoch, 2, Ok(decoded()));
        s.settle_preview(epoch, 0, Ok(decoded()));
        s.settle_preview(epoch, 1, Ok(decoded()));

        let set = s.preview_set();
        assert!(!set.is_loading);
        let names: Vec<&str> = set.items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_clear_images_keeps_caption_and_invalidates_batch() {
        let mut s = session();
        s.caption = "beach day".to_string();
        let (_, jobs) = s.select_files(vec![file("a.png"), file("b.png")]);
        s.settle_preview(jobs[0].epoch, 0, Ok(decoded()));

        s.clear_images();

        assert_eq!(s.caption, "beach day");
        assert!(!s.has_attachments());
        assert_eq!(s.live_sources(), 0);
        assert!(!s.preview_set().is_loading);

        let settled = s.settle_preview(jobs[1].epoch, 1, Ok(decoded()));
        assert_eq!(settled, Settle::Stale);
    }

    #[test]
    fn test_close_releases_everything_with_decodes_in_flight() {
        let mut s = session();
        let (_, jobs) = s.select_files(vec![file("a.png"), file("b.png"), file("c.png")]);

        // Only one decode landed before the dialog closes
        s.settle_preview(jobs[0].epoch, 0, Ok(decoded()));
        assert_eq!(s.live_sources(), 1);

        let released = s.close();
        assert_eq!(released, 1);
    }

    #[test]
    fn test_no_leaks_across_select_and_clear_cycles() {
        let mut s = session();

        for _ in 0..3 {
            let (_, jobs) = s.select_files(vec![file("a.png"), file("b.png")]);
            let epoch = jobs[0].epoch;
            s.settle_preview(epoch, 0, Ok(decoded()));
            s.settle_preview(epoch, 1, Ok(decoded()));
        }
        s.clear_images();

        // Every source ever registered has been released exactly once
        assert_eq!(s.live_sources(), 0);
        assert_eq!(s.released_sources(), 6);
        assert_eq!(s.close(), 0);
    }

    #[test]
    fn test_can_submit_requires_an_attachment() {
        let s = session();
        assert_eq!(s.can_submit(), Err(SubmitBlocked::NoAttachments));
    }

    #[test]
    fn test_can_submit_enforces_caption_limit() {
        let mut s = session();
        s.select_files(vec![file("a.png")]);

        s.caption = "x".repeat(2200);
        assert!(s.can_submit().is_ok());

        s.caption = "x".repeat(2201);
        assert_eq!(
            s.can_submit(),
            Err(SubmitBlocked::CaptionTooLong {
                len: 2201,
                max: 2200
            })
        );

        // Surrounding whitespace does not count against the limit
        s.caption = format!("  {}  ", "x".repeat(2200));
        assert!(s.can_submit().is_ok());
    }

    #[test]
    fn test_preview_failure_policy() {
        let mut options = ComposeOptions::default();
        options.require_previews_for_submit = true;

        let mut s = ComposeSession::new(options);
        let (_, jobs) = s.select_files(vec![file("a.png"), file("b.png")]);
        let epoch = jobs[0].epoch;

        s.settle_preview(epoch, 0, Ok(decoded()));
        s.settle_preview(epoch, 1, Err(DecodeError::Malformed("truncated".into())));

        assert_eq!(s.can_submit(), Err(SubmitBlocked::PreviewsFailed));

        // Default policy submits past preview failures
        let mut lenient = session();
        let (_, jobs) = lenient.select_files(vec![file("a.png")]);
        lenient.settle_preview(jobs[0].epoch, 0, Err(DecodeError::Malformed("bad".into())));
        assert!(lenient.can_submit().is_ok());
    }

    #[test]
    fn test_carousel_wraps_and_clamps() {
        let mut s = session();
        s.carousel_jump(2);
        assert_eq!(s.carousel_index(2), 1); // clamped to last item

        s.carousel_next(2);
        assert_eq!(s.carousel_index(2), 0); // wrapped forward

        s.carousel_prev(2);
        assert_eq!(s.carousel_index(2), 1); // wrapped backward

        // Empty carousel never moves
        s.carousel_prev(0);
        assert_eq!(s.carousel_index(0), 0);
    }
}

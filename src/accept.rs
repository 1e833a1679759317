/// Attachment selection rules
///
/// This module classifies a raw file selection against the accept rules
/// (allowed MIME types, maximum attachment count). It is a pure function
/// over its inputs with no I/O and no error path: a fully rejected
/// selection is a valid outcome, not a failure.

use std::collections::HashSet;

use crate::state::data::RawFile;

/// Rules a selection is checked against.
///
/// Immutable once built; the caller supplies it per selection event.
#[derive(Debug, Clone)]
pub struct AcceptRule {
    /// MIME types the composer will attach (e.g., "image/png")
    pub allowed_mime_types: HashSet<String>,
    /// Maximum number of accepted files per post
    pub max_count: usize,
}

impl AcceptRule {
    pub fn new(allowed_mime_types: impl IntoIterator<Item = String>, max_count: usize) -> Self {
        AcceptRule {
            allowed_mime_types: allowed_mime_types.into_iter().collect(),
            max_count,
        }
    }
}

/// Why a file was rejected.
///
/// The user-facing message text lives in the shell; this is only the
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// MIME type is not in the allowed set
    UnsupportedType,
    /// File was valid but arrived after the count limit was reached
    OverCountLimit,
}

/// A rejected file together with its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedFile {
    pub file: RawFile,
    pub reason: RejectReason,
}

/// Result of classifying one selection event.
///
/// `accepted` and `rejected` both preserve the input's relative order,
/// no file appears in both, and `accepted.len() <= rule.max_count`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptedSelection {
    pub accepted: Vec<RawFile>,
    pub rejected: Vec<RejectedFile>,
}

impl AcceptedSelection {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.rejected.is_empty()
    }
}

/// Classify a selection against the rule.
///
/// Files are visited in input order. The type check runs first; a file of
/// an allowed type is then rejected with `OverCountLimit` if the accepted
/// list is already full. Keeping that evaluation order fixed makes the
/// rejection report deterministic.
pub fn accept(files: Vec<RawFile>, rule: &AcceptRule) -> AcceptedSelection {
    let mut selection = AcceptedSelection::default();

    for file in files {
        if !rule.allowed_mime_types.contains(&file.mime_type) {
            selection.rejected.push(RejectedFile {
                file,
                reason: RejectReason::UnsupportedType,
            });
        } else if selection.accepted.len() >= rule.max_count {
            selection.rejected.push(RejectedFile {
                file,
                reason: RejectReason::OverCountLimit,
            });
        } else {
            selection.accepted.push(file);
        }
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn image_rule(max_count: usize) -> AcceptRule {
        AcceptRule::new(
            ["image/png", "image/jpeg", "image/bmp"]
                .iter()
                .map(|s| s.to_string()),
            max_count,
        )
    }

    fn png(name: &str) -> RawFile {
        RawFile::new(PathBuf::from(format!("/pics/{}.png", name)), 100)
    }

    fn text(name: &str) -> RawFile {
        RawFile::new(PathBuf::from(format!("/docs/{}.txt", name)), 100)
    }

    #[test]
    fn test_empty_selection() {
        let selection = accept(Vec::new(), &image_rule(5));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_count_limit_rejects_trailing_files() {
        let files: Vec<RawFile> = (0..7).map(|i| png(&format!("p{}", i))).collect();
        let selection = accept(files, &image_rule(5));

        assert_eq!(selection.accepted.len(), 5);
        assert_eq!(selection.rejected.len(), 2);

        // The rejected files are exactly the last two, in original order
        assert_eq!(selection.rejected[0].file.name, "p5.png");
        assert_eq!(selection.rejected[1].file.name, "p6.png");
        for rejected in &selection.rejected {
            assert_eq!(rejected.reason, RejectReason::OverCountLimit);
        }
    }

    #[test]
    fn test_type_filter() {
        let files = vec![png("a"), text("b"), png("c")];
        let selection = accept(files, &image_rule(5));

        assert_eq!(selection.accepted.len(), 2);
        assert_eq!(selection.accepted[0].name, "a.png");
        assert_eq!(selection.accepted[1].name, "c.png");

        assert_eq!(selection.rejected.len(), 1);
        assert_eq!(selection.rejected[0].file.name, "b.txt");
        assert_eq!(selection.rejected[0].reason, RejectReason::UnsupportedType);
    }

    #[test]
    fn test_type_check_runs_before_count_limit() {
        // Two invalid files interleaved with four valid ones, limit 3:
        // the invalid ones must be rejected for their type, not counted
        // against the limit.
        let files = vec![png("a"), text("x"), png("b"), png("c"), text("y"), png("d")];
        let selection = accept(files, &image_rule(3));

        assert_eq!(selection.accepted.len(), 3);
        assert_eq!(selection.accepted[2].name, "c.png");

        assert_eq!(selection.rejected.len(), 3);
        assert_eq!(selection.rejected[0].reason, RejectReason::UnsupportedType);
        assert_eq!(selection.rejected[1].reason, RejectReason::UnsupportedType);
        assert_eq!(selection.rejected[2].file.name, "d.png");
        assert_eq!(selection.rejected[2].reason, RejectReason::OverCountLimit);
    }

    #[test]
    fn test_all_rejected_is_not_an_error() {
        let files = vec![text("a"), text("b")];
        let selection = accept(files, &image_rule(5));

        assert!(selection.accepted.is_empty());
        assert_eq!(selection.rejected.len(), 2);
    }

    #[test]
    fn test_input_order_preserved_and_partitioned() {
        let files = vec![png("1"), text("2"), png("3"), text("4"), png("5")];
        let total = files.len();
        let selection = accept(files, &image_rule(5));

        assert_eq!(selection.accepted.len() + selection.rejected.len(), total);

        let accepted: Vec<&str> = selection.accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(accepted, vec!["1.png", "3.png", "5.png"]);

        let rejected: Vec<&str> = selection
            .rejected
            .iter()
            .map(|r| r.file.name.as_str())
            .collect();
        assert_eq!(rejected, vec!["2.txt", "4.txt"]);
    }
}

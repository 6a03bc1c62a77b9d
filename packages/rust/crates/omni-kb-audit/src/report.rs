//! Report aggregation: accumulated diagnostics → one immutable verdict.

use serde::{Deserialize, Serialize};

use crate::index::LoadedIndex;
use crate::link_graph::{LinkScan, UnreadableFragment, UnresolvedLink};
use crate::store::FragmentStore;
use crate::tags::{TagCoverage, TagIndex};

/// Final audit output.
///
/// `pass` is true iff `duplicate_ids`, `missing_fragments`,
/// `unreadable_fragments` and `unresolved_links` are all empty. The remaining
/// fields are informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Index rows loaded, duplicates included.
    pub total_fragments: usize,
    /// Ids declared by more than one row, once each.
    pub duplicate_ids: Vec<String>,
    /// `fragment_file` of every row whose file does not exist.
    pub missing_fragments: Vec<String>,
    /// Existing fragments whose content could not be read.
    #[serde(default)]
    pub unreadable_fragments: Vec<UnreadableFragment>,
    /// Candidate links whose target does not resolve.
    pub unresolved_links: Vec<UnresolvedLink>,
    /// Distinct tags and untagged rows.
    pub tag_coverage: TagCoverage,
    /// Candidate links checked.
    pub link_count: usize,
    /// Knowledge files no index row references.
    #[serde(default)]
    pub unindexed_files: Vec<String>,
    /// Informational notes.
    #[serde(default)]
    pub notes: Vec<String>,
    /// Overall verdict.
    pub pass: bool,
}

/// One itemized failure line, keyed by a stable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportIssue {
    /// `duplicate_id`, `missing_fragment`, `unreadable_fragment` or
    /// `unresolved_link`.
    pub code: &'static str,
    /// Human-readable detail.
    pub message: String,
}

impl ValidationReport {
    /// Failures in category order: duplicates, missing fragments, unreadable
    /// fragments, links.
    #[must_use]
    pub fn issues(&self) -> Vec<ReportIssue> {
        let duplicates = self.duplicate_ids.iter().map(|id| ReportIssue {
            code: "duplicate_id",
            message: format!("duplicate fragment id: {id}"),
        });
        let missing = self.missing_fragments.iter().map(|file| ReportIssue {
            code: "missing_fragment",
            message: format!("fragment file not found: {file}"),
        });
        let unreadable = self.unreadable_fragments.iter().map(|fragment| ReportIssue {
            code: "unreadable_fragment",
            message: format!(
                "fragment '{}' unreadable: {} ({})",
                fragment.id, fragment.fragment_file, fragment.reason
            ),
        });
        let links = self.unresolved_links.iter().map(|link| ReportIssue {
            code: "unresolved_link",
            message: match &link.attempted_path {
                Some(path) => format!(
                    "{} -> {} (resolved `{}`)",
                    link.source_id,
                    link.raw_target,
                    path.display()
                ),
                None => format!(
                    "{} -> {} (no resolution rule applies)",
                    link.source_id, link.raw_target
                ),
            },
        });
        duplicates
            .chain(missing)
            .chain(unreadable)
            .chain(links)
            .collect()
    }
}

/// Accumulator each stage appends to; consumed by [`Diagnostics::finish`].
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    total_fragments: usize,
    duplicate_ids: Vec<String>,
    missing_fragments: Vec<String>,
    unreadable_fragments: Vec<UnreadableFragment>,
    unresolved_links: Vec<UnresolvedLink>,
    tag_coverage: TagCoverage,
    link_count: usize,
    unindexed_files: Vec<String>,
    notes: Vec<String>,
}

impl Diagnostics {
    /// Record index-level counts and duplicate ids.
    pub fn record_index(&mut self, loaded: &LoadedIndex) {
        self.total_fragments = loaded.records.len();
        self.duplicate_ids.extend(loaded.duplicate_ids.iter().cloned());
        if let Some(first) = loaded.records.first()
            && first.tags.is_empty()
        {
            self.note(format!("first index record '{}' declares no tags", first.id));
        }
    }

    /// Record missing fragments.
    pub fn record_store(&mut self, store: &FragmentStore) {
        self.missing_fragments.extend(store.missing_fragments());
    }

    /// Record tag coverage.
    pub fn record_tags(&mut self, tags: &TagIndex) {
        self.tag_coverage = tags.coverage();
    }

    /// Take ownership of the link scan's unresolved and unreadable lists.
    pub fn record_links(&mut self, scan: LinkScan) {
        self.link_count += scan.link_count();
        if self.link_count == 0 {
            self.note("no cross-fragment links detected (informational)");
        }
        self.unresolved_links.extend(scan.unresolved);
        self.unreadable_fragments.extend(scan.unreadable);
    }

    /// Record knowledge files no index row references.
    pub fn record_unindexed(&mut self, files: Vec<String>) {
        self.unindexed_files.extend(files);
    }

    /// Attach an informational note.
    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    /// Freeze into the immutable report and compute `pass`.
    #[must_use]
    pub fn finish(self) -> ValidationReport {
        let pass = self.duplicate_ids.is_empty()
            && self.missing_fragments.is_empty()
            && self.unreadable_fragments.is_empty()
            && self.unresolved_links.is_empty();
        ValidationReport {
            total_fragments: self.total_fragments,
            duplicate_ids: self.duplicate_ids,
            missing_fragments: self.missing_fragments,
            unreadable_fragments: self.unreadable_fragments,
            unresolved_links: self.unresolved_links,
            tag_coverage: self.tag_coverage,
            link_count: self.link_count,
            unindexed_files: self.unindexed_files,
            notes: self.notes,
            pass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_diagnostics_pass() {
        let report = Diagnostics::default().finish();
        assert!(report.pass);
        assert!(report.issues().is_empty());
    }

    #[test]
    fn test_notes_do_not_fail() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.note("informational");
        diagnostics.record_unindexed(vec!["knowledge/stray.md".to_string()]);
        let report = diagnostics.finish();
        assert!(report.pass);
        assert_eq!(report.notes, vec!["informational"]);
    }

    #[test]
    fn test_unresolved_link_fails_and_is_itemized() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record_links(LinkScan {
            unresolved: vec![UnresolvedLink {
                source_id: "a1".to_string(),
                raw_target: "nope.md".to_string(),
                attempted_path: Some(PathBuf::from("/kb/knowledge/nope.md")),
            }],
            ..LinkScan::default()
        });
        let report = diagnostics.finish();
        assert!(!report.pass);
        let issues = report.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "unresolved_link");
        assert!(issues[0].message.contains("a1 -> nope.md"));
    }

    #[test]
    fn test_unreadable_fragment_fails_and_is_itemized() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record_links(LinkScan {
            unreadable: vec![UnreadableFragment {
                id: "d1".to_string(),
                fragment_file: "knowledge/dir.md".to_string(),
                reason: "Is a directory (os error 21)".to_string(),
            }],
            ..LinkScan::default()
        });
        let report = diagnostics.finish();
        assert!(!report.pass);
        let issues = report.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "unreadable_fragment");
        assert!(issues[0].message.contains("knowledge/dir.md"));
    }
}

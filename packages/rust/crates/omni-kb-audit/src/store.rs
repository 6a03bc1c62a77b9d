//! Fragment store: index records resolved against the knowledge root.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::deadline::Deadline;
use crate::error::AuditResult;
use crate::index::FragmentRecord;

/// A record joined to the filesystem.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedFragment {
    /// Source index row.
    pub record: FragmentRecord,
    /// `root.join(fragment_file)`.
    pub path: PathBuf,
    /// Result of the single existence probe.
    pub exists: bool,
}

impl ResolvedFragment {
    /// Whether the fragment exists and carries `extension` (e.g. `.md`).
    #[must_use]
    pub fn is_text_fragment(&self, extension: &str) -> bool {
        self.exists && self.record.fragment_file.ends_with(extension)
    }
}

/// Id → resolved path mapping for one run.
#[derive(Debug, Clone)]
pub struct FragmentStore {
    root: PathBuf,
    fragments: Vec<ResolvedFragment>,
}

impl FragmentStore {
    /// Resolve every record and probe existence once, in parallel.
    ///
    /// Runs on the current rayon pool. Output keeps index order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuditError::Timeout`] when `deadline` elapses before
    /// every record is probed. A missing fragment is not an error.
    pub fn resolve(records: &[FragmentRecord], root: &Path, deadline: &Deadline) -> AuditResult<Self> {
        let fragments = records
            .par_iter()
            .map(|record| {
                deadline.check()?;
                let path = root.join(&record.fragment_file);
                let exists = path.exists();
                if !exists {
                    log::warn!(
                        "fragment '{}' missing: {}",
                        record.id,
                        record.fragment_file
                    );
                }
                Ok(ResolvedFragment {
                    record: record.clone(),
                    path,
                    exists,
                })
            })
            .collect::<AuditResult<Vec<_>>>()?;
        Ok(Self {
            root: root.to_path_buf(),
            fragments,
        })
    }

    /// Knowledge root used for resolution.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All resolved fragments in index order.
    #[must_use]
    pub fn fragments(&self) -> &[ResolvedFragment] {
        &self.fragments
    }

    /// First fragment declared with `id`.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&ResolvedFragment> {
        self.fragments.iter().find(|fragment| fragment.record.id == id)
    }

    /// Files under `<root>/<knowledge_dir>` ending in `extension` that no
    /// record references, as sorted root-relative `/` paths.
    #[must_use]
    pub fn unindexed_files(&self, knowledge_dir: &str, extension: &str) -> Vec<String> {
        let indexed: HashSet<String> = self
            .fragments
            .iter()
            .map(|fragment| normalize_relative(&fragment.record.fragment_file))
            .collect();
        let scan_root = self.root.join(knowledge_dir);
        let mut out: Vec<String> = WalkDir::new(&scan_root)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&self.root).ok()?;
                let relative = normalize_relative(&relative.to_string_lossy());
                (relative.ends_with(extension) && !indexed.contains(&relative)).then_some(relative)
            })
            .collect();
        out.sort();
        out
    }

    /// `fragment_file` of every missing fragment, in index order.
    #[must_use]
    pub fn missing_fragments(&self) -> Vec<String> {
        self.fragments
            .iter()
            .filter(|fragment| !fragment.exists)
            .map(|fragment| fragment.record.fragment_file.clone())
            .collect()
    }
}

fn normalize_relative(raw: &str) -> String {
    let slashed = raw.trim().replace('\\', "/");
    slashed
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::normalize_relative;

    #[test]
    fn test_normalize_relative_strips_dot_segments() {
        assert_eq!(normalize_relative("./knowledge//a.md"), "knowledge/a.md");
        assert_eq!(normalize_relative("knowledge\\a.md"), "knowledge/a.md");
    }
}

use std::path::PathBuf;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::extract::candidate_targets;
use super::resolve::ResolutionPolicy;
use crate::deadline::Deadline;
use crate::error::AuditResult;
use crate::store::{FragmentStore, ResolvedFragment};

/// One directed link occurrence between fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEdge {
    /// Id of the fragment containing the link.
    pub source_id: String,
    /// Target exactly as written (trimmed).
    pub raw_target: String,
    /// Existing target path; `None` when unresolved.
    pub resolved: Option<PathBuf>,
}

/// Diagnostic for a link that did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedLink {
    /// Id of the fragment containing the link.
    pub source_id: String,
    /// Target exactly as written (trimmed).
    pub raw_target: String,
    /// Path that was probed; `None` when no policy rule applied.
    pub attempted_path: Option<PathBuf>,
}

/// Diagnostic for an existing fragment whose content could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadableFragment {
    /// Fragment id.
    pub id: String,
    /// `fragment_file` as written in the index.
    pub fragment_file: String,
    /// I/O error text.
    pub reason: String,
}

/// All candidate edges of a run plus the unresolved subset.
#[derive(Debug, Clone, Default)]
pub struct LinkScan {
    /// Every candidate edge, grouped by source in index order.
    pub edges: Vec<LinkEdge>,
    /// Unresolved edges, same order as `edges`.
    pub unresolved: Vec<UnresolvedLink>,
    /// Existing fragments that could not be scanned, in index order.
    pub unreadable: Vec<UnreadableFragment>,
}

impl LinkScan {
    /// Number of candidate links checked.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.edges.len()
    }

    fn extend(&mut self, other: Self) {
        self.edges.extend(other.edges);
        self.unresolved.extend(other.unresolved);
        self.unreadable.extend(other.unreadable);
    }
}

/// Resolve and check every candidate link in one fragment's content.
#[must_use]
pub fn scan_fragment(
    fragment: &ResolvedFragment,
    content: &str,
    policy: &ResolutionPolicy,
    extension: &str,
) -> LinkScan {
    let mut scan = LinkScan::default();
    for raw_target in candidate_targets(content, extension) {
        let attempted = policy.resolve(&fragment.path, &raw_target).path().map(PathBuf::from);
        let resolved = attempted.clone().filter(|path| path.exists());
        if resolved.is_none() {
            log::warn!(
                "unresolved link in '{}': {raw_target}",
                fragment.record.id
            );
            scan.unresolved.push(UnresolvedLink {
                source_id: fragment.record.id.clone(),
                raw_target: raw_target.clone(),
                attempted_path: attempted,
            });
        }
        scan.edges.push(LinkEdge {
            source_id: fragment.record.id.clone(),
            raw_target,
            resolved,
        });
    }
    scan
}

// Read failures (a directory named `x.md`, missing permissions) are recorded,
// never propagated.
fn scan_or_record(
    fragment: &ResolvedFragment,
    policy: &ResolutionPolicy,
    extension: &str,
) -> LinkScan {
    match std::fs::read(&fragment.path) {
        Ok(bytes) => scan_fragment(fragment, &String::from_utf8_lossy(&bytes), policy, extension),
        Err(err) => {
            log::warn!(
                "fragment '{}' unreadable at {}: {err}",
                fragment.record.id,
                fragment.path.display()
            );
            LinkScan {
                unreadable: vec![UnreadableFragment {
                    id: fragment.record.id.clone(),
                    fragment_file: fragment.record.fragment_file.clone(),
                    reason: err.to_string(),
                }],
                ..LinkScan::default()
            }
        }
    }
}

/// Scan every existing text fragment of `store`, in parallel.
///
/// Runs on the current rayon pool; results are joined before merging so edge
/// order follows index order. Unreadable fragments are collected in
/// [`LinkScan::unreadable`] rather than failing the scan.
///
/// # Errors
///
/// Returns [`crate::AuditError::Timeout`] when `deadline` elapses before a
/// fragment is scanned.
pub fn validate_links(
    store: &FragmentStore,
    policy: &ResolutionPolicy,
    extension: &str,
    deadline: &Deadline,
) -> AuditResult<LinkScan> {
    let per_fragment = store
        .fragments()
        .par_iter()
        .filter(|fragment| fragment.is_text_fragment(extension))
        .map(|fragment| {
            deadline.check()?;
            Ok(scan_or_record(fragment, policy, extension))
        })
        .collect::<AuditResult<Vec<_>>>()?;

    let mut merged = LinkScan::default();
    for scan in per_fragment {
        merged.extend(scan);
    }
    log::debug!(
        "checked {} candidate links, {} unresolved, {} unreadable fragments",
        merged.link_count(),
        merged.unresolved.len(),
        merged.unreadable.len()
    );
    Ok(merged)
}

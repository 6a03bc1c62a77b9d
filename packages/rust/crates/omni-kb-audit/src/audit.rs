//! Audit pipeline: index → store + tags → link graph → report.

use std::path::Path;
use std::time::Duration;

use crate::config::AuditSettings;
use crate::deadline::Deadline;
use crate::error::{AuditError, AuditResult};
use crate::index::{LoadedIndex, load_index, load_index_file};
use crate::link_graph::{LinkScan, ResolutionPolicy, validate_links};
use crate::report::{Diagnostics, ValidationReport};
use crate::store::FragmentStore;
use crate::tags::TagIndex;

/// Per-run options; usually derived from [`AuditSettings`].
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Canonical knowledge subdirectory.
    pub knowledge_dir: String,
    /// Fragment document extension.
    pub fragment_extension: String,
    /// Worker pool size; `0` lets rayon pick.
    pub workers: usize,
    /// Overall deadline; `None` is unbounded.
    pub timeout: Option<Duration>,
    /// List knowledge files the index does not reference.
    pub report_unindexed: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self::from(&AuditSettings::default())
    }
}

impl From<&AuditSettings> for AuditOptions {
    fn from(settings: &AuditSettings) -> Self {
        Self {
            knowledge_dir: settings.knowledge_dir.clone(),
            fragment_extension: settings.fragment_extension.clone(),
            workers: settings.workers,
            timeout: settings.timeout(),
            report_unindexed: settings.report_unindexed,
        }
    }
}

/// Everything one run derived from the filesystem snapshot.
#[derive(Debug, Clone)]
pub struct AuditSnapshot {
    /// Loaded index rows and duplicate ids.
    pub index: LoadedIndex,
    /// Resolved fragments.
    pub store: FragmentStore,
    /// Tag → ids.
    pub tags: TagIndex,
    /// Candidate link edges and unresolved subset.
    pub links: LinkScan,
    /// Knowledge files missing from the index.
    pub unindexed_files: Vec<String>,
}

impl AuditSnapshot {
    /// Aggregate into the final report.
    #[must_use]
    pub fn into_report(self) -> ValidationReport {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record_index(&self.index);
        diagnostics.record_store(&self.store);
        diagnostics.record_tags(&self.tags);
        diagnostics.record_links(self.links);
        diagnostics.record_unindexed(self.unindexed_files);
        let report = diagnostics.finish();
        log::info!(
            "knowledge base audit {}: {} fragments, {} links, {} issues",
            if report.pass { "passed" } else { "failed" },
            report.total_fragments,
            report.link_count,
            report.issues().len()
        );
        report
    }
}

fn check_root(root: &Path) -> AuditResult<()> {
    let unreadable = |reason: String| AuditError::UnreadableRoot {
        path: root.to_path_buf(),
        reason,
    };
    let meta = std::fs::metadata(root).map_err(|err| unreadable(err.to_string()))?;
    if !meta.is_dir() {
        return Err(unreadable("not a directory".to_string()));
    }
    std::fs::read_dir(root).map_err(|err| unreadable(err.to_string()))?;
    Ok(())
}

fn build_pool(workers: usize) -> AuditResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|idx| format!("kb-audit-{idx}"))
        .build()
        .map_err(|err| AuditError::WorkerPool(err.to_string()))
}

/// Run every stage after loading against an already parsed index.
///
/// # Errors
///
/// Returns [`AuditError::UnreadableRoot`] when `root` is not a readable
/// directory, [`AuditError::WorkerPool`] when the pool cannot be built, and
/// [`AuditError::Timeout`] when `deadline` elapses between or within stages.
pub fn build_snapshot(
    index: LoadedIndex,
    root: &Path,
    options: &AuditOptions,
    deadline: &Deadline,
) -> AuditResult<AuditSnapshot> {
    check_root(root)?;
    let pool = build_pool(options.workers)?;
    let policy = ResolutionPolicy::new(root, &options.knowledge_dir);

    pool.install(|| {
        deadline.check()?;
        let store = FragmentStore::resolve(&index.records, root, deadline)?;
        let tags = TagIndex::build(&index.records);
        deadline.check()?;
        let links = validate_links(&store, &policy, &options.fragment_extension, deadline)?;
        deadline.check()?;
        let unindexed_files = if options.report_unindexed {
            store.unindexed_files(policy.knowledge_dir(), &options.fragment_extension)
        } else {
            Vec::new()
        };
        deadline.check()?;
        Ok(AuditSnapshot {
            index,
            store,
            tags,
            links,
            unindexed_files,
        })
    })
}

/// Audit index text against `root`.
///
/// # Errors
///
/// Returns [`AuditError::MalformedIndex`] for a malformed index, otherwise
/// any error from [`build_snapshot`]. Content problems are reported, not
/// returned.
pub fn audit_index_text(
    text: &str,
    root: &Path,
    options: &AuditOptions,
) -> AuditResult<ValidationReport> {
    let deadline = Deadline::start(options.timeout);
    let index = load_index(text)?;
    Ok(build_snapshot(index, root, options, &deadline)?.into_report())
}

/// Audit the index file at `index_path` against `root`.
///
/// # Errors
///
/// Same as [`audit_index_text`], plus [`AuditError::IndexRead`] when the
/// index file cannot be read.
pub fn run_audit(
    index_path: &Path,
    root: &Path,
    options: &AuditOptions,
) -> AuditResult<ValidationReport> {
    let deadline = Deadline::start(options.timeout);
    log::debug!(
        "auditing {} against {}",
        index_path.display(),
        root.display()
    );
    let index = load_index_file(index_path)?;
    Ok(build_snapshot(index, root, options, &deadline)?.into_report())
}

//! omni-kb-audit - Knowledge-base consistency checks.
//!
//! Verifies a tag-indexed collection of markdown fragments: every index row
//! points at an existing file, tags select the expected fragments, and
//! cross-fragment links resolve.
//!
//! # Architecture
//!
//! ```text
//! omni-kb-audit/src/
//! ├── lib.rs          # Re-exports (this file)
//! ├── error.rs        # AuditError
//! ├── config.rs       # AuditSettings (YAML + env)
//! ├── deadline.rs     # Run deadline
//! ├── index/          # CSV index → FragmentRecord
//! ├── store.rs        # FragmentStore (existence probes)
//! ├── tags.rs         # TagIndex
//! ├── link_graph/     # Link extraction, resolution policy, validation
//! ├── report.rs       # Diagnostics → ValidationReport
//! └── audit.rs        # Pipeline entry points
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use omni_kb_audit::{AuditOptions, run_audit};
//!
//! let report = run_audit(
//!     Path::new("src/testarch/tea-index.csv"),
//!     Path::new("src/testarch"),
//!     &AuditOptions::default(),
//! )?;
//! assert!(report.pass, "{:?}", report.issues());
//! ```

mod audit;
mod config;
mod deadline;
mod error;
pub mod index;
pub mod link_graph;
mod report;
mod store;
mod tags;

pub use audit::{AuditOptions, AuditSnapshot, audit_index_text, build_snapshot, run_audit};
pub use config::{
    AuditSettings, PROJECT_SETTINGS_FILE, TIMEOUT_SECS_ENV, load_settings,
    load_settings_with_lookup,
};
pub use deadline::Deadline;
pub use error::{AuditError, AuditResult};
pub use index::{FragmentRecord, LoadedIndex, load_index, load_index_file, parse_tags};
pub use link_graph::{LinkEdge, Resolution, ResolutionPolicy, UnreadableFragment, UnresolvedLink};
pub use report::{Diagnostics, ReportIssue, ValidationReport};
pub use store::{FragmentStore, ResolvedFragment};
pub use tags::{TagCoverage, TagIndex};

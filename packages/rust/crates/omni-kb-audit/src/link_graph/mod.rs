//! Cross-fragment link graph: extraction, resolution policy, validation.
//!
//! Extraction and resolution are separate stages so the policy can be
//! exercised without any markdown input.

mod extract;
mod resolve;
mod validate;

pub use extract::{candidate_targets, extract_link_targets, is_external_link};
pub use resolve::{Resolution, ResolutionPolicy};
pub use validate::{
    LinkEdge, LinkScan, UnreadableFragment, UnresolvedLink, scan_fragment, validate_links,
};

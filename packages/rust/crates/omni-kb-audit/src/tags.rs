//! Inverted tag index over fragment records.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::index::FragmentRecord;

/// Tag coverage summary carried by the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCoverage {
    /// Number of distinct tags across the index.
    pub distinct_tags: usize,
    /// Number of records declaring no tag at all.
    pub untagged_fragments: usize,
}

/// Tag → ids mapping; immutable once built.
///
/// Buckets are never empty and only hold ids present in the source records.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    buckets: BTreeMap<String, BTreeSet<String>>,
    untagged: usize,
}

impl TagIndex {
    /// Derive the index from records. Pure, cannot fail.
    #[must_use]
    pub fn build(records: &[FragmentRecord]) -> Self {
        let mut buckets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut untagged = 0;
        for record in records {
            if record.tags.is_empty() {
                untagged += 1;
                continue;
            }
            for tag in &record.tags {
                buckets
                    .entry(tag.clone())
                    .or_default()
                    .insert(record.id.clone());
            }
        }
        Self { buckets, untagged }
    }

    /// Ids declaring `tag` exactly; empty for unknown tags.
    #[must_use]
    pub fn select_by_tag(&self, tag: &str) -> BTreeSet<String> {
        self.buckets.get(tag).cloned().unwrap_or_default()
    }

    /// Whether any fragment declares `tag`.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.buckets.contains_key(tag)
    }

    /// Tags in sorted order with the size of their bucket.
    pub fn tags(&self) -> impl Iterator<Item = (&str, usize)> {
        self.buckets
            .iter()
            .map(|(tag, ids)| (tag.as_str(), ids.len()))
    }

    /// Distinct-tag and untagged-fragment counts.
    #[must_use]
    pub fn coverage(&self) -> TagCoverage {
        TagCoverage {
            distinct_tags: self.buckets.len(),
            untagged_fragments: self.untagged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, tags: &[&str]) -> FragmentRecord {
        FragmentRecord {
            id: id.to_string(),
            name: id.to_string(),
            description: "desc".to_string(),
            tags: tags.iter().map(|tag| (*tag).to_string()).collect(),
            fragment_file: format!("knowledge/{id}.md"),
            row: 1,
        }
    }

    #[test]
    fn test_select_by_tag_collects_all_declaring_ids() {
        let index = TagIndex::build(&[record("a1", &["foo", "bar"]), record("a2", &["bar"])]);
        let bar: Vec<String> = index.select_by_tag("bar").into_iter().collect();
        assert_eq!(bar, vec!["a1", "a2"]);
        let foo: Vec<String> = index.select_by_tag("foo").into_iter().collect();
        assert_eq!(foo, vec!["a1"]);
    }

    #[test]
    fn test_unknown_tag_is_empty() {
        let index = TagIndex::build(&[record("a1", &["foo"])]);
        assert!(index.select_by_tag("__no_such_tag__").is_empty());
        assert!(!index.contains("__no_such_tag__"));
    }

    #[test]
    fn test_coverage_counts_untagged() {
        let index = TagIndex::build(&[
            record("a1", &["foo"]),
            record("a2", &[]),
            record("a3", &["foo", "baz"]),
        ]);
        assert_eq!(
            index.coverage(),
            TagCoverage {
                distinct_tags: 2,
                untagged_fragments: 1,
            }
        );
        let listed: Vec<(&str, usize)> = index.tags().collect();
        assert_eq!(listed, vec![("baz", 1), ("foo", 2)]);
    }
}

use serde::{Deserialize, Serialize};

/// One fragment row from the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRecord {
    /// Stable fragment identity.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text description; never empty.
    pub description: String,
    /// Trimmed, non-empty tags in declaration order.
    pub tags: Vec<String>,
    /// Path relative to the knowledge root.
    pub fragment_file: String,
    /// 1-based data row in the index.
    pub row: usize,
}

impl FragmentRecord {
    /// Whether this record declares `tag` (exact, case-sensitive).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|value| value == tag)
    }
}

/// Split a comma-separated tag field, trimming and dropping empty entries.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_trims_and_drops_empty() {
        assert_eq!(parse_tags(" foo , bar,,  ,baz "), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_parse_tags_empty_field() {
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn test_has_tag_is_case_sensitive() {
        let record = FragmentRecord {
            id: "a1".to_string(),
            name: "A".to_string(),
            description: "d".to_string(),
            tags: vec!["Fixtures".to_string()],
            fragment_file: "knowledge/a.md".to_string(),
            row: 1,
        };
        assert!(record.has_tag("Fixtures"));
        assert!(!record.has_tag("fixtures"));
    }
}

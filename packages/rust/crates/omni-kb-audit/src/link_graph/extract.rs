use regex::Regex;
use std::sync::LazyLock;

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(_compile_err) => match Regex::new(r"$^") {
            Ok(fallback) => fallback,
            Err(fallback_err) => panic!("hardcoded fallback regex must compile: {fallback_err}"),
        },
    }
}

// `[label](target)`; only the `](target)` tail matters.
static INLINE_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"\]\(([^)]+)\)"));

/// Every inline-link target in `content`, trimmed, in document order.
#[must_use]
pub fn extract_link_targets(content: &str) -> Vec<String> {
    INLINE_LINK_REGEX
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|target| !target.is_empty())
        .collect()
}

/// `scheme://...` targets are external and never resolved.
#[must_use]
pub fn is_external_link(target: &str) -> bool {
    let Some((scheme, _rest)) = target.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

/// Targets that look like fragment references.
///
/// External links are dropped first, then anything not ending in `extension`.
#[must_use]
pub fn candidate_targets(content: &str, extension: &str) -> Vec<String> {
    extract_link_targets(content)
        .into_iter()
        .filter(|target| !is_external_link(target))
        .filter(|target| target.ends_with(extension))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keeps_order_and_repeats() {
        let content = "See [a](b.md), then [c]( ./d.md ) and [a again](b.md).";
        assert_eq!(extract_link_targets(content), vec!["b.md", "./d.md", "b.md"]);
    }

    #[test]
    fn test_external_detection() {
        assert!(is_external_link("https://example.com/x.md"));
        assert!(is_external_link("git+ssh://host/repo.md"));
        assert!(!is_external_link("knowledge/x.md"));
        assert!(!is_external_link("://x.md"));
        assert!(!is_external_link("1http://x.md"));
    }

    #[test]
    fn test_candidates_drop_external_before_extension() {
        let content = "[ext](https://example.com/doc.md) [img](diagram.png) [anchor](#top) [ok](b.md)";
        assert_eq!(candidate_targets(content, ".md"), vec!["b.md"]);
    }
}

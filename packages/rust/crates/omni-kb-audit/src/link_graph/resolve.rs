use std::path::{Component, Path, PathBuf};

/// Outcome of the ordered resolution policy for one raw target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Target starts with the knowledge subdirectory; joined to the root.
    KnowledgeRelative(PathBuf),
    /// Target starts with `./` or `../`; joined to the source's directory.
    SourceRelative(PathBuf),
    /// Bare filename; assumed to live in the knowledge subdirectory.
    Bare(PathBuf),
    /// No rule applies; fails closed without a filesystem check.
    Unresolvable,
}

impl Resolution {
    /// Candidate path, when a rule produced one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::KnowledgeRelative(path) | Self::SourceRelative(path) | Self::Bare(path) => {
                Some(path)
            }
            Self::Unresolvable => None,
        }
    }
}

/// Ordered rules mapping raw link targets to candidate paths.
#[derive(Debug, Clone)]
pub struct ResolutionPolicy {
    root: PathBuf,
    knowledge_dir: String,
}

fn is_bare_filename(target: &str) -> bool {
    !target.contains('/') && !target.contains('\\')
}

// Lexical join: `.` is dropped and `..` pops a normal segment.
fn clean_join(base: &Path, relative: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

impl ResolutionPolicy {
    /// Policy rooted at `root` with `knowledge_dir` as the canonical subdirectory.
    #[must_use]
    pub fn new(root: &Path, knowledge_dir: &str) -> Self {
        let knowledge_dir = knowledge_dir
            .trim()
            .replace('\\', "/")
            .trim_matches('/')
            .to_string();
        Self {
            root: root.to_path_buf(),
            knowledge_dir,
        }
    }

    /// Knowledge root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical knowledge subdirectory name.
    #[must_use]
    pub fn knowledge_dir(&self) -> &str {
        &self.knowledge_dir
    }

    /// Apply the rules in order; first match wins.
    #[must_use]
    pub fn resolve(&self, source_path: &Path, target: &str) -> Resolution {
        let knowledge_prefix = format!("{}/", self.knowledge_dir);
        if !self.knowledge_dir.is_empty() && target.starts_with(&knowledge_prefix) {
            return Resolution::KnowledgeRelative(clean_join(&self.root, target));
        }
        if target.starts_with("./") || target.starts_with("../") {
            let source_dir = source_path.parent().unwrap_or(self.root.as_path());
            return Resolution::SourceRelative(clean_join(source_dir, target));
        }
        if is_bare_filename(target) {
            let knowledge_root = self.root.join(&self.knowledge_dir);
            return Resolution::Bare(knowledge_root.join(target));
        }
        Resolution::Unresolvable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ResolutionPolicy {
        ResolutionPolicy::new(Path::new("/kb"), "knowledge")
    }

    #[test]
    fn test_knowledge_prefix_joins_root() {
        let source = Path::new("/kb/knowledge/a.md");
        assert_eq!(
            policy().resolve(source, "knowledge/b.md"),
            Resolution::KnowledgeRelative(PathBuf::from("/kb/knowledge/b.md"))
        );
    }

    #[test]
    fn test_relative_markers_join_source_dir() {
        let source = Path::new("/kb/knowledge/deep/a.md");
        assert_eq!(
            policy().resolve(source, "./b.md"),
            Resolution::SourceRelative(PathBuf::from("/kb/knowledge/deep/b.md"))
        );
        assert_eq!(
            policy().resolve(source, "../c.md"),
            Resolution::SourceRelative(PathBuf::from("/kb/knowledge/c.md"))
        );
    }

    #[test]
    fn test_bare_filename_lands_in_knowledge_dir() {
        let source = Path::new("/kb/other/a.md");
        assert_eq!(
            policy().resolve(source, "b.md"),
            Resolution::Bare(PathBuf::from("/kb/knowledge/b.md"))
        );
    }

    #[test]
    fn test_ambiguous_path_is_unresolvable() {
        let source = Path::new("/kb/knowledge/a.md");
        let outcome = policy().resolve(source, "docs/b.md");
        assert_eq!(outcome, Resolution::Unresolvable);
        assert!(outcome.path().is_none());
    }

    #[test]
    fn test_parent_escape_above_base_is_kept() {
        assert_eq!(
            clean_join(Path::new("rel"), "../../x.md"),
            PathBuf::from("../x.md")
        );
    }
}

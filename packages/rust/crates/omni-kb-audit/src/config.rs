//! Audit settings resolved from YAML files and the environment.
//!
//! Order (later wins):
//! 1) built-in defaults
//! 2) `<root>/.kb-audit.yaml` when present
//! 3) explicit `--conf` file
//! 4) `KB_AUDIT_TIMEOUT_SECS`

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AuditError, AuditResult};

/// Project-local settings file name, looked up under the knowledge root.
pub const PROJECT_SETTINGS_FILE: &str = ".kb-audit.yaml";
/// Environment override for [`AuditSettings::timeout_secs`].
pub const TIMEOUT_SECS_ENV: &str = "KB_AUDIT_TIMEOUT_SECS";

/// Tunables for one audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    /// Index file name, relative to the knowledge root.
    pub index_file: String,
    /// Canonical knowledge subdirectory for bare and `knowledge/` links.
    pub knowledge_dir: String,
    /// Extension identifying fragment documents.
    pub fragment_extension: String,
    /// Worker pool size; `0` lets rayon pick.
    pub workers: usize,
    /// Overall run deadline in seconds.
    pub timeout_secs: Option<u64>,
    /// Whether to list knowledge files missing from the index.
    pub report_unindexed: bool,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            index_file: "tea-index.csv".to_string(),
            knowledge_dir: "knowledge".to_string(),
            fragment_extension: ".md".to_string(),
            workers: 0,
            timeout_secs: None,
            report_unindexed: true,
        }
    }
}

impl AuditSettings {
    /// Deadline as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn read_yaml_file(path: &Path) -> AuditResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|err| AuditError::Settings {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    serde_yaml::from_str::<Value>(&content).map_err(|err| AuditError::Settings {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(existing) = base_map.get_mut(&key) {
                    deep_merge(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        // Empty documents parse as null; they must not wipe earlier layers.
        (_, Value::Null) => {}
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn parse_positive_u64(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|value| *value > 0)
}

/// Resolve settings for `root`, layering an optional explicit file on top.
///
/// A missing project file is fine; a missing explicit file is an error.
///
/// # Errors
///
/// Returns [`AuditError::Settings`] when a settings file cannot be read or
/// does not deserialize into [`AuditSettings`].
pub fn load_settings(root: &Path, explicit: Option<&Path>) -> AuditResult<AuditSettings> {
    load_settings_with_lookup(root, explicit, |name| std::env::var(name).ok())
}

/// [`load_settings`] with the environment replaced by `lookup`.
///
/// # Errors
///
/// Same as [`load_settings`].
#[doc(hidden)]
pub fn load_settings_with_lookup<F>(
    root: &Path,
    explicit: Option<&Path>,
    lookup: F,
) -> AuditResult<AuditSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut merged = Value::Mapping(Mapping::new());
    let project_path = root.join(PROJECT_SETTINGS_FILE);
    if project_path.is_file() {
        deep_merge(&mut merged, read_yaml_file(&project_path)?);
    }
    if let Some(path) = explicit {
        deep_merge(&mut merged, read_yaml_file(path)?);
    }

    let source: PathBuf = explicit.map_or(project_path, Path::to_path_buf);
    let mut settings: AuditSettings =
        serde_yaml::from_value(merged).map_err(|err| AuditError::Settings {
            path: source,
            message: err.to_string(),
        })?;

    if let Some(secs) = lookup(TIMEOUT_SECS_ENV)
        .as_deref()
        .and_then(parse_positive_u64)
    {
        settings.timeout_secs = Some(secs);
    }
    log::debug!("resolved audit settings: {settings:?}");
    Ok(settings)
}

//! Configuration for the compiler host.
//!
//! [`HostConfig`] names the directories that make up the build layout:
//!
//! - `project_root` - where hand-written sources live
//! - `generated_root` - where code generation writes its artifacts
//! - `vendor_dir` - the path segment that marks third-party packages
//!
//! The config is plain data. Use [`Roots::new`](crate::Roots::new) to validate
//! and normalize it before resolving anything.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths::GENERATED_SUFFIXES;

/// Root configuration for the compiler host.
///
/// # Examples
///
/// ```
/// use ngh_core::HostConfig;
///
/// let config = HostConfig::default();
/// assert_eq!(config.vendor_dir, "node_modules");
/// assert_eq!(config.generated_suffixes, vec!["ngfactory", "ngstyle"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Absolute path of the project (source) root.
    pub project_root: Utf8PathBuf,

    /// Absolute path of the generated-output root.
    ///
    /// May be the project root itself, nested inside it, or a sibling tree.
    pub generated_root: Utf8PathBuf,

    /// Path segment that marks the vendored-package namespace.
    pub vendor_dir: String,

    /// Base-name suffix tags that mark a file as generated, without the
    /// leading dot (`foo.ngfactory.ts` carries the `ngfactory` tag).
    pub generated_suffixes: Vec<String>,

    /// Extra directories the resolution algorithm treats as one merged tree.
    ///
    /// The project and generated roots are always part of the merged set.
    pub root_dirs: Vec<Utf8PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::new(),
            generated_root: Utf8PathBuf::new(),
            vendor_dir: "node_modules".to_owned(),
            generated_suffixes: GENERATED_SUFFIXES.iter().map(|s| (*s).to_owned()).collect(),
            root_dirs: Vec::new(),
        }
    }
}

impl HostConfig {
    /// Creates a config for the given roots with default vendor and suffix settings.
    #[must_use]
    pub fn new(project_root: impl Into<Utf8PathBuf>, generated_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            generated_root: generated_root.into(),
            ..Self::default()
        }
    }

    /// Parses a config from JSON text. Missing fields take their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use ngh_core::HostConfig;
    ///
    /// let config = HostConfig::from_json_str(r#"{"project_root": "/p", "generated_root": "/out"}"#)?;
    /// assert_eq!(config.generated_root, "/out");
    /// assert_eq!(config.vendor_dir, "node_modules");
    /// # Ok::<(), ngh_core::ConfigError>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks the options that are not paths.
    pub(crate) fn validate_options(&self) -> Result<(), ConfigError> {
        if self.vendor_dir.is_empty() || self.vendor_dir.contains(|c| c == '/' || c == '\\') {
            return Err(ConfigError::InvalidOption {
                option: "vendor_dir".to_owned(),
                reason: format!("must be a single path segment, got '{}'", self.vendor_dir),
            });
        }
        if let Some(tag) = self
            .generated_suffixes
            .iter()
            .find(|tag| tag.is_empty() || tag.starts_with('.'))
        {
            return Err(ConfigError::InvalidOption {
                option: "generated_suffixes".to_owned(),
                reason: format!("tags must be non-empty and have no leading dot, got '{tag}'"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_config_defaults() {
        let config = HostConfig::default();
        assert!(config.project_root.as_str().is_empty());
        assert_eq!(config.vendor_dir, "node_modules");
        assert_eq!(config.generated_suffixes, vec!["ngfactory", "ngstyle"]);
        assert!(config.root_dirs.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = HostConfig::new("/p", "/p/gen");
        let json = serde_json::to_string(&config).unwrap();
        let parsed: HostConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let config = HostConfig::from_json_str(r#"{"project_root": "/work/app"}"#).unwrap();
        assert_eq!(config.project_root, "/work/app");
        assert!(config.generated_root.as_str().is_empty());
        assert_eq!(config.generated_suffixes.len(), 2);
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        let result = HostConfig::from_json_str("{ project_root: ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = HostConfig::load(Utf8Path::new("/definitely/not/here/ngh.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_validate_options() {
        let mut config = HostConfig::new("/p", "/p/gen");
        assert!(config.validate_options().is_ok());

        config.vendor_dir = "a/b".to_owned();
        assert!(config.validate_options().is_err());

        config.vendor_dir = "node_modules".to_owned();
        config.generated_suffixes = vec![".ngfactory".to_owned()];
        assert!(config.validate_options().is_err());
    }
}

//! Error types for the ngh-core crate.
//!
//! This module provides the [`ConfigError`] type for failures while loading a
//! [`HostConfig`](crate::HostConfig) or deriving [`Roots`](crate::Roots) from it.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use ngh_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::RelativeRoot {
///     option: "project_root",
///     path: Utf8PathBuf::from("src"),
/// };
/// assert!(error.to_string().contains("project_root"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A root directory was given as a relative path.
    ///
    /// Roots are compared by prefix, so they must be absolute.
    #[error("{option} must be an absolute path, got '{path}'")]
    RelativeRoot {
        /// The name of the offending option.
        option: &'static str,
        /// The relative path that was supplied.
        path: Utf8PathBuf,
    },

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// The configuration file that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_root_display() {
        let error = ConfigError::RelativeRoot {
            option: "generated_root",
            path: Utf8PathBuf::from("out"),
        };
        let msg = error.to_string();
        assert!(msg.contains("generated_root"));
        assert!(msg.contains("'out'"));
    }

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::InvalidOption {
            option: "vendor_dir".to_owned(),
            reason: "must be a single path segment".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("vendor_dir"));
        assert!(msg.contains("single path segment"));
    }

    #[test]
    fn test_io_display_names_path() {
        let error = ConfigError::Io {
            path: Utf8PathBuf::from("/etc/ngh.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(error.to_string().contains("/etc/ngh.json"));
    }
}

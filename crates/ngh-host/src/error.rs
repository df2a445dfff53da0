//! Error types for the ngh-host crate.
//!
//! This module provides the [`HostError`] type for failures while resolving
//! modules, reading files through a host context, and loading metadata.
//!
//! "Not found" is not an error here: [`CompilerHost::locate`] returns
//! `Ok(None)` and [`CompilerHost::metadata_for`] returns `Ok(None)` for that.
//!
//! [`CompilerHost::locate`]: crate::CompilerHost::locate
//! [`CompilerHost::metadata_for`]: crate::CompilerHost::metadata_for

use camino::Utf8PathBuf;

/// Errors that can occur in the compiler host.
///
/// # Error Recovery Strategy
///
/// None of these are retried. Each is raised where it is detected and
/// propagated to the immediate caller.
///
/// - **Invalid argument** ([`HostError::RelativeWithoutContainingFile`]): caller bug
/// - **I/O** ([`HostError::Read`], [`HostError::Metadata`], [`HostError::Parse`]):
///   the offending path is attached for diagnostics
/// - **Missing resource** ([`HostError::ResourceMissing`]): delivered through the
///   deferred read
///
/// # Examples
///
/// ```
/// use ngh_host::HostError;
///
/// let err = HostError::RelativeWithoutContainingFile { module_name: "./a".to_owned() };
/// assert!(err.is_invalid_argument());
/// assert!(err.path().is_none());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A relative module name was resolved without a containing file.
    #[error("resolution of relative paths requires a containing file (module '{module_name}')")]
    RelativeWithoutContainingFile {
        /// The relative module name.
        module_name: String,
    },

    /// Failed to read a file through the host context.
    #[error("failed to read file {path}: {source}")]
    Read {
        /// The path of the file that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A metadata sidecar could not be parsed.
    #[error("failed to read JSON file {path}: {source}")]
    Metadata {
        /// The sidecar path.
        path: Utf8PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Export extraction failed for a source file.
    #[error("failed to parse file {path}: {source}")]
    Parse {
        /// The path of the file that couldn't be parsed.
        path: Utf8PathBuf,
        /// The underlying parse error.
        #[source]
        source: ngh_ts_parser::ParseError,
    },

    /// A source file was requested that neither exists nor is known.
    #[error("source file {0} not present in program")]
    SourceNotFound(Utf8PathBuf),

    /// A resource file did not exist when its read was requested.
    #[error("compilation failed, resource file not found: {0}")]
    ResourceMissing(Utf8PathBuf),
}

impl HostError {
    /// Creates a new [`HostError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`HostError::Metadata`] error.
    #[inline]
    pub fn metadata(path: impl Into<Utf8PathBuf>, source: serde_json::Error) -> Self {
        Self::Metadata {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`HostError::Parse`] error.
    #[inline]
    pub fn parse(path: impl Into<Utf8PathBuf>, source: ngh_ts_parser::ParseError) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for errors caused by the arguments of the call itself.
    #[inline]
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::RelativeWithoutContainingFile { .. })
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Metadata { path, .. } | Self::Parse { path, .. } => {
                Some(path)
            }
            Self::SourceNotFound(path) | Self::ResourceMissing(path) => Some(path),
            Self::RelativeWithoutContainingFile { .. } => None,
        }
    }
}

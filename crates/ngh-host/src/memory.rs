//! An in-memory [`ModuleResolutionHost`].

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use ngh_core::normalize_path;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::ModuleResolutionHost;
use crate::error::HostError;

/// A file table held in memory.
///
/// Directories are derived from the inserted file paths. A host built with
/// [`MemoryHost::without_directory_probes`] reports no directory capability,
/// which is how embedders without one are modelled.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use ngh_host::{MemoryHost, ModuleResolutionHost};
///
/// let host = MemoryHost::new().with_file("/p/node_modules/rxjs/index.d.ts", "");
///
/// assert!(host.file_exists(Utf8Path::new("/p/node_modules/rxjs/index.d.ts")));
/// assert_eq!(host.directory_exists(Utf8Path::new("/p/node_modules")), Some(true));
/// assert_eq!(host.directory_exists(Utf8Path::new("/q")), Some(false));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryHost {
    files: FxHashMap<Utf8PathBuf, String>,
    directories: FxHashSet<Utf8PathBuf>,
    directory_probes: bool,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self {
            files: FxHashMap::default(),
            directories: FxHashSet::default(),
            directory_probes: true,
        }
    }
}

impl MemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, builder style.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<str>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Drops the `directory_exists` capability.
    #[must_use]
    pub fn without_directory_probes(mut self) -> Self {
        self.directory_probes = false;
        self
    }

    /// Adds or replaces a file and registers its ancestor directories.
    pub fn insert(&mut self, path: impl AsRef<str>, contents: impl Into<String>) {
        let path = normalize_path(path.as_ref());
        for dir in path.ancestors().skip(1) {
            if !self.directories.insert(dir.to_owned()) {
                break;
            }
        }
        self.files.insert(path, contents.into());
    }

    /// Number of files held.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the host holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ModuleResolutionHost for MemoryHost {
    fn file_exists(&self, path: &Utf8Path) -> bool {
        self.files.contains_key(&normalize_path(path.as_str()))
    }

    fn read_file(&self, path: &Utf8Path) -> Result<String, HostError> {
        self.files
            .get(&normalize_path(path.as_str()))
            .cloned()
            .ok_or_else(|| {
                HostError::read(path, io::Error::new(io::ErrorKind::NotFound, "no such file"))
            })
    }

    fn directory_exists(&self, path: &Utf8Path) -> Option<bool> {
        self.directory_probes
            .then(|| self.directories.contains(&normalize_path(path.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_registers_ancestors() {
        let host = MemoryHost::new().with_file("/p/gen/a/c.ts", "");
        for dir in ["/", "/p", "/p/gen", "/p/gen/a"] {
            assert_eq!(host.directory_exists(Utf8Path::new(dir)), Some(true), "{dir}");
        }
        assert_eq!(host.directory_exists(Utf8Path::new("/p/gen/a/c.ts")), Some(false));
    }

    #[test]
    fn test_lookup_is_normalized() {
        let host = MemoryHost::new().with_file("/p/a.ts", "x");
        assert!(host.file_exists(Utf8Path::new("/p/./b/../a.ts")));
        assert_eq!(host.read_file(Utf8Path::new("/p//a.ts")).unwrap(), "x");
    }

    #[test]
    fn test_read_missing_file() {
        let host = MemoryHost::new();
        let err = host.read_file(Utf8Path::new("/p/missing.ts")).unwrap_err();
        assert_eq!(err.path().map(|p| p.as_str()), Some("/p/missing.ts"));
    }

    #[test]
    fn test_insert_replaces_contents() {
        let mut host = MemoryHost::new();
        host.insert("/p/a.ts", "old");
        host.insert("/p/a.ts", "new");
        assert_eq!(host.len(), 1);
        assert_eq!(host.read_file(Utf8Path::new("/p/a.ts")).unwrap(), "new");
    }

    #[test]
    fn test_without_directory_probes() {
        let host = MemoryHost::new()
            .with_file("/p/a.ts", "")
            .without_directory_probes();
        assert_eq!(host.directory_exists(Utf8Path::new("/p")), None);
        assert!(host.file_exists(Utf8Path::new("/p/a.ts")));
    }
}

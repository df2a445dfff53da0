//! Capability contexts: what the host may ask of the filesystem.
//!
//! Two traits split the capabilities:
//!
//! - [`ModuleResolutionHost`] - the probes the resolution algorithm needs
//!   (`file_exists`, `read_file`, optional `directory_exists`)
//! - [`HostContext`] - adds deferred resource reads and existence assumptions
//!
//! Existence assumptions are held by [`AssumedFiles`], an insert-only overlay
//! consulted before any real check. Contexts compose it rather than inherit it:
//!
//! ```text
//! NodeHostContext            ResolutionHostAdapter<H>
//!     ├── AssumedFiles           ├── AssumedFiles
//!     └── std::fs                └── H: ModuleResolutionHost
//! ```

use std::cell::RefCell;

use camino::{Utf8Path, Utf8PathBuf};
use futures_util::future::{self, BoxFuture, FutureExt};
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::error::HostError;

/// Deferred result of a resource read.
pub type ResourceFuture = BoxFuture<'static, Result<String, HostError>>;

/// Filesystem probes used by the module-resolution algorithm.
pub trait ModuleResolutionHost {
    /// Returns `true` if `path` names an existing file.
    fn file_exists(&self, path: &Utf8Path) -> bool;

    /// Reads a file as UTF-8 text.
    fn read_file(&self, path: &Utf8Path) -> Result<String, HostError>;

    /// Returns whether `path` is an existing directory.
    ///
    /// `None` means the host cannot answer. The resolution algorithm then
    /// treats every directory as possibly existing.
    fn directory_exists(&self, _path: &Utf8Path) -> Option<bool> {
        None
    }
}

/// The capability interface the compiler host calls.
pub trait HostContext: ModuleResolutionHost {
    /// Reads a non-source resource (template, stylesheet).
    ///
    /// Existence is checked when this is called. A missing resource produces
    /// a future that resolves to [`HostError::ResourceMissing`].
    fn read_resource(&self, path: &Utf8Path) -> ResourceFuture;

    /// Records `path` as existing regardless of the real filesystem.
    fn assume_file_exists(&self, path: &Utf8Path);
}

/// Insert-only set of paths asserted to exist.
///
/// Paths are never removed; the set lives as long as its context.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use ngh_host::AssumedFiles;
///
/// let assumed = AssumedFiles::new();
/// assumed.insert(Utf8Path::new("/p/gen/a.ngfactory.ts"));
///
/// assert!(assumed.contains(Utf8Path::new("/p/gen/a.ngfactory.ts")));
/// assert!(assumed.contains_dir(Utf8Path::new("/p/gen")));
/// ```
#[derive(Debug, Default)]
pub struct AssumedFiles {
    paths: RefCell<FxHashSet<Utf8PathBuf>>,
}

impl AssumedFiles {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` as existing.
    pub fn insert(&self, path: &Utf8Path) {
        trace!(%path, "assuming file exists");
        self.paths.borrow_mut().insert(path.to_owned());
    }

    /// Returns `true` if `path` was asserted to exist.
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.paths.borrow().contains(path)
    }

    /// Returns `true` if some asserted path lies under `dir`.
    pub fn contains_dir(&self, dir: &Utf8Path) -> bool {
        self.paths
            .borrow()
            .iter()
            .any(|path| path != dir && path.starts_with(dir))
    }

    /// Number of asserted paths.
    pub fn len(&self) -> usize {
        self.paths.borrow().len()
    }

    /// Returns `true` if nothing has been asserted.
    pub fn is_empty(&self) -> bool {
        self.paths.borrow().is_empty()
    }
}

/// A context backed by the real filesystem.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use ngh_host::{HostContext, ModuleResolutionHost, NodeHostContext};
///
/// let context = NodeHostContext::new();
/// let planned = Utf8Path::new("/nonexistent/gen/app.ngfactory.ts");
///
/// assert!(!context.file_exists(planned));
/// context.assume_file_exists(planned);
/// assert!(context.file_exists(planned));
/// ```
#[derive(Debug, Default)]
pub struct NodeHostContext {
    assumed: AssumedFiles,
}

impl NodeHostContext {
    /// Creates a context with no assumptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The paths asserted to exist so far.
    pub fn assumed(&self) -> &AssumedFiles {
        &self.assumed
    }
}

impl ModuleResolutionHost for NodeHostContext {
    fn file_exists(&self, path: &Utf8Path) -> bool {
        self.assumed.contains(path) || path.is_file()
    }

    fn read_file(&self, path: &Utf8Path) -> Result<String, HostError> {
        std::fs::read_to_string(path).map_err(|source| HostError::read(path, source))
    }

    fn directory_exists(&self, path: &Utf8Path) -> Option<bool> {
        Some(path.is_dir() || self.assumed.contains_dir(path))
    }
}

impl HostContext for NodeHostContext {
    fn read_resource(&self, path: &Utf8Path) -> ResourceFuture {
        if !self.file_exists(path) {
            return future::ready(Err(HostError::ResourceMissing(path.to_owned()))).boxed();
        }
        future::ready(self.read_file(path)).boxed()
    }

    fn assume_file_exists(&self, path: &Utf8Path) {
        self.assumed.insert(path);
    }
}

/// Lifts any [`ModuleResolutionHost`] into a [`HostContext`].
///
/// The adapter owns a private [`AssumedFiles`] table. Asserted paths count as
/// existing for resolution probes, but resource reads only see files the
/// wrapped host really has.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use ngh_host::{HostContext, MemoryHost, ModuleResolutionHost, ResolutionHostAdapter};
///
/// let host = MemoryHost::new().with_file("/p/a.ts", "export class A {}");
/// let adapter = ResolutionHostAdapter::new(host);
///
/// assert!(adapter.file_exists(Utf8Path::new("/p/a.ts")));
/// adapter.assume_file_exists(Utf8Path::new("/p/gen/a.ngfactory.ts"));
/// assert!(adapter.file_exists(Utf8Path::new("/p/gen/a.ngfactory.ts")));
/// assert!(!adapter.host().file_exists(Utf8Path::new("/p/gen/a.ngfactory.ts")));
/// ```
#[derive(Debug, Default)]
pub struct ResolutionHostAdapter<H> {
    host: H,
    assumed: AssumedFiles,
}

impl<H: ModuleResolutionHost> ResolutionHostAdapter<H> {
    /// Wraps `host` with an empty assumption table.
    pub fn new(host: H) -> Self {
        Self {
            host,
            assumed: AssumedFiles::new(),
        }
    }

    /// The wrapped host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The paths asserted to exist so far.
    pub fn assumed(&self) -> &AssumedFiles {
        &self.assumed
    }
}

impl<H: ModuleResolutionHost> ModuleResolutionHost for ResolutionHostAdapter<H> {
    fn file_exists(&self, path: &Utf8Path) -> bool {
        self.assumed.contains(path) || self.host.file_exists(path)
    }

    fn read_file(&self, path: &Utf8Path) -> Result<String, HostError> {
        self.host.read_file(path)
    }

    fn directory_exists(&self, path: &Utf8Path) -> Option<bool> {
        self.host
            .directory_exists(path)
            .map(|exists| exists || self.assumed.contains_dir(path))
    }
}

impl<H: ModuleResolutionHost> HostContext for ResolutionHostAdapter<H> {
    fn read_resource(&self, path: &Utf8Path) -> ResourceFuture {
        if !self.host.file_exists(path) {
            return future::ready(Err(HostError::ResourceMissing(path.to_owned()))).boxed();
        }
        future::ready(self.host.read_file(path)).boxed()
    }

    fn assume_file_exists(&self, path: &Utf8Path) {
        self.assumed.insert(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;

    #[test]
    fn test_assumed_files_are_insert_only() {
        let assumed = AssumedFiles::new();
        assert!(assumed.is_empty());

        let path = Utf8Path::new("/p/gen/a.ngfactory.ts");
        assumed.insert(path);
        assumed.insert(path);
        assert_eq!(assumed.len(), 1);
        assert!(assumed.contains(path));
        assert!(!assumed.contains(Utf8Path::new("/p/gen/b.ngfactory.ts")));
    }

    #[test]
    fn test_assumed_dir_is_component_based() {
        let assumed = AssumedFiles::new();
        assumed.insert(Utf8Path::new("/p/gen/a.ts"));
        assert!(assumed.contains_dir(Utf8Path::new("/p")));
        assert!(!assumed.contains_dir(Utf8Path::new("/p/ge")));
        assert!(!assumed.contains_dir(Utf8Path::new("/p/gen/a.ts")));
    }

    #[test]
    fn test_adapter_assumption_overrides_negative_probe() {
        let adapter = ResolutionHostAdapter::new(MemoryHost::new());
        let path = Utf8Path::new("/p/gen/x.ngfactory.ts");
        assert!(!adapter.file_exists(path));

        adapter.assume_file_exists(path);
        assert!(adapter.file_exists(path));
        assert_eq!(adapter.directory_exists(Utf8Path::new("/p/gen")), Some(true));
    }

    #[test]
    fn test_adapter_without_directory_probe() {
        let host = MemoryHost::new()
            .with_file("/p/a.ts", "")
            .without_directory_probes();
        let adapter = ResolutionHostAdapter::new(host);
        assert_eq!(adapter.directory_exists(Utf8Path::new("/p")), None);
    }

    #[tokio::test]
    async fn test_adapter_read_resource() {
        let adapter =
            ResolutionHostAdapter::new(MemoryHost::new().with_file("/p/app.html", "<app></app>"));
        let text = adapter
            .read_resource(Utf8Path::new("/p/app.html"))
            .await
            .unwrap();
        assert_eq!(text, "<app></app>");
    }

    #[tokio::test]
    async fn test_adapter_read_resource_ignores_assumptions() {
        let adapter = ResolutionHostAdapter::new(MemoryHost::new());
        let path = Utf8Path::new("/p/app.css");
        adapter.assume_file_exists(path);

        let err = adapter.read_resource(path).await.unwrap_err();
        assert!(matches!(err, HostError::ResourceMissing(p) if p == "/p/app.css"));
    }

    #[tokio::test]
    async fn test_node_context_reads_real_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let file = root.join("app.html");
        std::fs::write(&file, "<p>hi</p>").unwrap();

        let context = NodeHostContext::new();
        assert!(context.file_exists(&file));
        assert_eq!(context.directory_exists(&root), Some(true));
        assert_eq!(context.read_resource(&file).await.unwrap(), "<p>hi</p>");

        let missing = root.join("missing.css");
        let err = context.read_resource(&missing).await.unwrap_err();
        assert!(matches!(err, HostError::ResourceMissing(_)));
        assert!(matches!(context.read_file(&missing), Err(HostError::Read { .. })));
    }
}

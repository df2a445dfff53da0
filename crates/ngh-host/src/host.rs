//! The compiler host: forward and reverse module resolution.
//!
//! # Overview
//!
//! [`CompilerHost`] maps module names to files ([`CompilerHost::locate`]) and
//! files to the module names generated code should import them by
//! ([`CompilerHost::name_for`]). Reverse resolution is pure path arithmetic
//! over the three roots:
//!
//! | generated? | vendor? | name |
//! |---|---|---|
//! | yes | yes | relative path to the file's copy under `<generated>/<vendor>/` |
//! | yes | no | relative path to the file's position in the generated tree |
//! | no | yes | bare package specifier |
//! | no | no | relative path, mirrored into the generated tree when it is a sibling |
//!
//! Relative names are always taken from the containing file's position in
//! the generated tree, since that is where the importing code is emitted.

use camino::{Utf8Path, Utf8PathBuf};
use ngh_core::{
    ConfigError, DECLARATION_EXTENSION, HostConfig, Roots, dot_relative, strip_source_extension,
};
use tracing::debug;

use crate::context::{HostContext, ResourceFuture};
use crate::error::HostError;
use crate::metadata::{MetadataCollector, MetadataList, MetadataLoader, read_source};
use crate::resolution::{ModuleResolver, NodeModuleResolver, ResolutionOptions};

/// File name used as the containing file for non-relative lookups that have none.
const SENTINEL_FILE: &str = "index.ts";

/// Which row of the reverse-resolution table applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameCase {
    GeneratedVendor,
    GeneratedLocal,
    Vendor,
    Local,
}

/// Path-space resolver over a [`HostContext`].
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use ngh_core::HostConfig;
/// use ngh_host::{CompilerHost, MemoryHost, ResolutionHostAdapter};
///
/// let files = MemoryHost::new().with_file("/p/node_modules/rxjs/Observable.d.ts", "");
/// let host = CompilerHost::new(
///     &HostConfig::new("/p", "/p/gen"),
///     ResolutionHostAdapter::new(files),
/// )?;
///
/// let containing = Utf8Path::new("/p/gen/a/b.ts");
/// assert_eq!(
///     host.name_for(Utf8Path::new("/p/gen/a/c.ngfactory.ts"), containing),
///     "./c.ngfactory"
/// );
/// assert_eq!(
///     host.name_for(Utf8Path::new("/p/node_modules/rxjs/Observable.d.ts"), containing),
///     "rxjs/Observable"
/// );
/// assert_eq!(
///     host.locate("rxjs/Observable", Some(containing))?.unwrap(),
///     "/p/node_modules/rxjs/Observable.d.ts"
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct CompilerHost<C> {
    context: C,
    roots: Roots,
    options: ResolutionOptions,
    resolver: Box<dyn ModuleResolver>,
    metadata: MetadataLoader,
}

impl<C: HostContext> CompilerHost<C> {
    /// Creates a host over `context` with the default resolver and collector.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the roots in `config` are invalid.
    pub fn new(config: &HostConfig, context: C) -> Result<Self, ConfigError> {
        let roots = Roots::new(config)?;
        let options = ResolutionOptions::new(&roots, &config.root_dirs);
        Ok(Self {
            context,
            roots,
            options,
            resolver: Box::new(NodeModuleResolver),
            metadata: MetadataLoader::default(),
        })
    }

    /// Replaces the module-resolution algorithm.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Replaces the metadata collector. Clears the sidecar cache.
    #[must_use]
    pub fn with_collector(mut self, collector: impl MetadataCollector + 'static) -> Self {
        self.metadata = MetadataLoader::new(Box::new(collector));
        self
    }

    /// The normalized roots.
    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    /// The options handed to the resolver.
    pub fn options(&self) -> &ResolutionOptions {
        &self.options
    }

    /// The capability context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Returns the canonical form of a file name.
    ///
    /// Paths handed to the host are already absolute and slash-normalized, so
    /// this is the identity.
    pub fn canonical_file_name(&self, path: &Utf8Path) -> Utf8PathBuf {
        path.to_owned()
    }

    /// Resolves `module_name` to a file.
    ///
    /// Without a containing file, non-relative names resolve as if imported
    /// from `<project>/index.ts`. A recognized source extension on the name is
    /// ignored. Returns `Ok(None)` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::RelativeWithoutContainingFile`] for a relative name
    /// with no (or an empty) containing file.
    pub fn locate(
        &self,
        module_name: &str,
        containing_file: Option<&Utf8Path>,
    ) -> Result<Option<Utf8PathBuf>, HostError> {
        let containing_file = match containing_file.filter(|file| !file.as_str().is_empty()) {
            Some(file) => file.to_owned(),
            None if module_name.starts_with('.') => {
                return Err(HostError::RelativeWithoutContainingFile {
                    module_name: module_name.to_owned(),
                });
            }
            None => self.roots.project_root().join(SENTINEL_FILE),
        };

        let stripped = strip_source_extension(module_name);
        let resolved = self
            .resolver
            .resolve(stripped, &containing_file, &self.options, &self.context)
            .map(|path| self.canonical_file_name(&path));

        debug!(
            module_name,
            containing = %containing_file,
            resolved = ?resolved.as_ref().map(|path| path.as_str()),
            "locate"
        );
        Ok(resolved)
    }

    /// Computes the module name `containing_file` should import
    /// `imported_file` by.
    ///
    /// A file that does not exist yet is assumed to exist from here on, so a
    /// later [`locate`](Self::locate) of the returned name finds it.
    pub fn name_for(&self, imported_file: &Utf8Path, containing_file: &Utf8Path) -> String {
        if !self.context.file_exists(imported_file) {
            self.context.assume_file_exists(imported_file);
        }

        let containing = self.roots.rewrite_into_generated(containing_file.as_str());
        let from_dir = containing.parent().unwrap_or(&containing);

        let imported = strip_source_extension(imported_file.as_str());
        let vendor_suffix = self.roots.vendor_suffix(imported);
        let generated = self.roots.is_generated(imported);

        let (case, name) = match (generated, vendor_suffix) {
            (true, Some(_)) => {
                let target = self.roots.rewrite_into_generated(imported);
                (NameCase::GeneratedVendor, dot_relative(from_dir.as_str(), target.as_str()))
            }
            (true, None) => {
                let target = self.roots.rewrite_into_generated(imported);
                (NameCase::GeneratedLocal, dot_relative(from_dir.as_str(), target.as_str()))
            }
            (false, Some(suffix)) => (NameCase::Vendor, suffix.to_owned()),
            (false, None) => {
                let target = if self.roots.generated_is_under_project() {
                    Utf8PathBuf::from(imported)
                } else {
                    self.roots.mirror_into_generated(imported)
                };
                (NameCase::Local, dot_relative(from_dir.as_str(), target.as_str()))
            }
        };

        debug!(
            imported = %imported_file,
            containing = %containing_file,
            ?case,
            name = %name,
            "name_for"
        );
        name
    }

    /// Returns the text of a program source file.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::SourceNotFound`] if the context does not know the
    /// file.
    pub fn source_text(&self, path: &Utf8Path) -> Result<String, HostError> {
        read_source(&self.context, path)
    }

    /// Returns the export metadata for `path`.
    ///
    /// See [`MetadataLoader::metadata_for`].
    pub fn metadata_for(&self, path: &Utf8Path) -> Result<Option<MetadataList>, HostError> {
        self.metadata.metadata_for(&self.context, path)
    }

    /// Reads a sidecar file. Memoized by `sidecar`.
    ///
    /// See [`MetadataLoader::read_metadata`].
    pub fn read_metadata(
        &self,
        sidecar: &Utf8Path,
        declaration_file: &Utf8Path,
    ) -> Result<MetadataList, HostError> {
        self.metadata.read_metadata(&self.context, sidecar, declaration_file)
    }

    /// Reads a template or stylesheet through the context.
    pub fn load_resource(&self, path: &Utf8Path) -> ResourceFuture {
        self.context.read_resource(path)
    }

    /// Reads a summary file, or `Ok(None)` if it does not exist.
    pub fn load_summary(&self, path: &Utf8Path) -> Result<Option<String>, HostError> {
        if !self.context.file_exists(path) {
            return Ok(None);
        }
        self.context.read_file(path).map(Some)
    }

    /// The declaration file emitted for `source_path`.
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use ngh_core::HostConfig;
    /// use ngh_host::{CompilerHost, MemoryHost, ResolutionHostAdapter};
    ///
    /// let host = CompilerHost::new(
    ///     &HostConfig::new("/p", "/p/gen"),
    ///     ResolutionHostAdapter::new(MemoryHost::new()),
    /// )?;
    /// assert_eq!(host.output_file_name(Utf8Path::new("/p/a/app.ts")), "/p/a/app.d.ts");
    /// # Ok::<(), ngh_core::ConfigError>(())
    /// ```
    pub fn output_file_name(&self, source_path: &Utf8Path) -> Utf8PathBuf {
        let stem = strip_source_extension(source_path.as_str());
        Utf8PathBuf::from(format!("{stem}{DECLARATION_EXTENSION}"))
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for CompilerHost<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerHost")
            .field("roots", &self.roots)
            .field("options", &self.options)
            .field("context", &self.context)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

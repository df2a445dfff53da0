//! Export metadata loading.
//!
//! [`MetadataLoader`] answers "what does this file export" for the compiler
//! host. Declaration files are described by their `.metadata.json` sidecar;
//! any other source is run through a [`MetadataCollector`].
//!
//! # Caching
//!
//! Sidecar reads are memoized by sidecar path for the lifetime of the loader.
//! The cache only grows, so a list handed out earlier is never invalidated.

use std::cell::RefCell;
use std::rc::Rc;

use camino::{Utf8Path, Utf8PathBuf};
use ngh_core::{ModuleMetadata, is_declaration_file, sidecar_path};
use ngh_ts_parser::TsMetadataCollector;
use rustc_hash::FxHashMap;
use tracing::{debug, error};

use crate::compat;
use crate::context::ModuleResolutionHost;
use crate::error::HostError;

/// Records loaded for one file.
pub type MetadataList = Rc<Vec<ModuleMetadata>>;

/// Extracts export metadata from source text.
pub trait MetadataCollector {
    /// Returns the file's metadata record, or `None` if it exports nothing.
    fn collect(&self, file_name: &Utf8Path, source: &str) -> Result<Option<ModuleMetadata>, HostError>;
}

impl MetadataCollector for TsMetadataCollector {
    fn collect(&self, file_name: &Utf8Path, source: &str) -> Result<Option<ModuleMetadata>, HostError> {
        self.collect_metadata(file_name.as_str(), source)
            .map_err(|err| HostError::parse(file_name, err))
    }
}

/// Reads the text of a program source file.
///
/// # Errors
///
/// Returns [`HostError::SourceNotFound`] if the context does not know the
/// file, or the context's read error.
pub fn read_source<H>(context: &H, path: &Utf8Path) -> Result<String, HostError>
where
    H: ModuleResolutionHost + ?Sized,
{
    if !context.file_exists(path) {
        return Err(HostError::SourceNotFound(path.to_owned()));
    }
    context.read_file(path)
}

/// Loads and caches export metadata.
pub struct MetadataLoader {
    collector: Box<dyn MetadataCollector>,
    cache: RefCell<FxHashMap<Utf8PathBuf, MetadataList>>,
}

impl MetadataLoader {
    /// Creates a loader backed by `collector`.
    pub fn new(collector: Box<dyn MetadataCollector>) -> Self {
        Self {
            collector,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Number of sidecars cached so far.
    pub fn cached_sidecars(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Returns the metadata records for `file_path`.
    ///
    /// - `Ok(None)` if the file does not exist, or is a declaration file
    ///   without a sidecar.
    /// - A declaration file with a sidecar yields the sidecar's records.
    /// - Any other file yields its extracted record, or an empty list.
    pub fn metadata_for<H>(&self, context: &H, file_path: &Utf8Path) -> Result<Option<MetadataList>, HostError>
    where
        H: ModuleResolutionHost + ?Sized,
    {
        if !context.file_exists(file_path) {
            debug!(path = %file_path, "no metadata, file does not exist");
            return Ok(None);
        }

        if is_declaration_file(file_path.as_str()) {
            let Some(sidecar) = sidecar_path(file_path.as_str()).map(Utf8PathBuf::from) else {
                return Ok(None);
            };
            if !context.file_exists(&sidecar) {
                debug!(path = %file_path, "declaration file has no sidecar");
                return Ok(None);
            }
            return self.read_metadata(context, &sidecar, file_path).map(Some);
        }

        let source = read_source(context, file_path)?;
        let records: Vec<ModuleMetadata> = self.collector.collect(file_path, &source)?.into_iter().collect();
        Ok(Some(Rc::new(records)))
    }

    /// Reads a sidecar, upgrading a legacy-only record list.
    ///
    /// Memoized by `sidecar`: a second call returns the same [`Rc`].
    ///
    /// # Errors
    ///
    /// Read, JSON, or extraction failures are logged against the sidecar path
    /// and returned. Failures are not cached.
    pub fn read_metadata<H>(
        &self,
        context: &H,
        sidecar: &Utf8Path,
        declaration_file: &Utf8Path,
    ) -> Result<MetadataList, HostError>
    where
        H: ModuleResolutionHost + ?Sized,
    {
        if let Some(cached) = self.cache.borrow().get(sidecar) {
            return Ok(Rc::clone(cached));
        }

        let records = self
            .load_sidecar(context, sidecar, declaration_file)
            .inspect_err(|err| error!(path = %sidecar, error = %err, "failed to read JSON file"))?;

        let records = Rc::new(records);
        self.cache
            .borrow_mut()
            .insert(sidecar.to_owned(), Rc::clone(&records));
        Ok(records)
    }

    fn load_sidecar<H>(
        &self,
        context: &H,
        sidecar: &Utf8Path,
        declaration_file: &Utf8Path,
    ) -> Result<Vec<ModuleMetadata>, HostError>
    where
        H: ModuleResolutionHost + ?Sized,
    {
        let text = context.read_file(sidecar)?;
        let mut records =
            ModuleMetadata::list_from_json(&text).map_err(|source| HostError::metadata(sidecar, source))?;

        compat::upgrade_records(&mut records, || {
            debug!(path = %sidecar, "upgrading legacy metadata");
            let source = read_source(context, declaration_file)?;
            self.collector.collect(declaration_file, &source)
        })?;
        Ok(records)
    }
}

impl Default for MetadataLoader {
    fn default() -> Self {
        Self::new(Box::new(TsMetadataCollector::new()))
    }
}

impl std::fmt::Debug for MetadataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataLoader")
            .field("cached_sidecars", &self.cached_sidecars())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;

    const LEGACY_SIDECAR: &str =
        r#"{"__symbolic": "module", "version": 1, "metadata": {"Observable": {"__symbolic": "interface"}}}"#;

    fn host() -> MemoryHost {
        MemoryHost::new()
            .with_file("/p/app.ts", "export class AppModule {}")
            .with_file("/p/empty.ts", "const x = 1;")
            .with_file("/p/node_modules/rx/index.d.ts", "export declare class Observable {}\nexport declare function of(): void;")
            .with_file("/p/node_modules/rx/index.metadata.json", LEGACY_SIDECAR)
            .with_file("/p/node_modules/bare/index.d.ts", "export declare class Bare {}")
    }

    #[test]
    fn test_missing_file_is_none() {
        let loader = MetadataLoader::default();
        assert!(loader.metadata_for(&host(), Utf8Path::new("/p/missing.ts")).unwrap().is_none());
    }

    #[test]
    fn test_declaration_without_sidecar_is_none() {
        let loader = MetadataLoader::default();
        let result = loader
            .metadata_for(&host(), Utf8Path::new("/p/node_modules/bare/index.d.ts"))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_source_file_is_collected() {
        let loader = MetadataLoader::default();
        let records = loader
            .metadata_for(&host(), Utf8Path::new("/p/app.ts"))
            .unwrap()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].metadata.contains_key("AppModule"));
    }

    #[test]
    fn test_source_without_exports_is_empty_list() {
        let loader = MetadataLoader::default();
        let records = loader
            .metadata_for(&host(), Utf8Path::new("/p/empty.ts"))
            .unwrap()
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_legacy_sidecar_is_upgraded_and_cached() {
        let host = host();
        let loader = MetadataLoader::default();
        let dts = Utf8Path::new("/p/node_modules/rx/index.d.ts");

        let first = loader.metadata_for(&host, dts).unwrap().unwrap();
        let second = loader.metadata_for(&host, dts).unwrap().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(loader.cached_sidecars(), 1);

        assert_eq!(first.len(), 2);
        let upgraded = &first[1];
        assert!(upgraded.is_current());
        assert_eq!(upgraded.metadata["Observable"]["__symbolic"], "interface");
        assert_eq!(upgraded.metadata["of"]["__symbolic"], "function");
    }

    #[test]
    fn test_malformed_sidecar_names_path() {
        let host = MemoryHost::new()
            .with_file("/p/lib/index.d.ts", "")
            .with_file("/p/lib/index.metadata.json", "{ broken");
        let loader = MetadataLoader::default();

        let err = loader
            .metadata_for(&host, Utf8Path::new("/p/lib/index.d.ts"))
            .unwrap_err();
        assert!(matches!(&err, HostError::Metadata { path, .. } if path == "/p/lib/index.metadata.json"));
        assert_eq!(loader.cached_sidecars(), 0);
    }

    #[test]
    fn test_read_source_unknown_file() {
        let err = read_source(&MemoryHost::new(), Utf8Path::new("/p/x.ts")).unwrap_err();
        assert_eq!(err.to_string(), "source file /p/x.ts not present in program");
    }

    struct FixedCollector;

    impl MetadataCollector for FixedCollector {
        fn collect(&self, _file_name: &Utf8Path, _source: &str) -> Result<Option<ModuleMetadata>, HostError> {
            let mut record = ModuleMetadata::current();
            record.metadata.insert("Fixed".into(), serde_json::json!({"__symbolic": "class"}));
            Ok(Some(record))
        }
    }

    #[test]
    fn test_custom_collector() {
        let loader = MetadataLoader::new(Box::new(FixedCollector));
        let records = loader
            .metadata_for(&host(), Utf8Path::new("/p/empty.ts"))
            .unwrap()
            .unwrap();
        assert!(records[0].metadata.contains_key("Fixed"));
    }
}

//! Node-style module resolution for TypeScript sources.
//!
//! # Algorithm
//!
//! Given a module name and the file that imports it:
//!
//! 1. **Relative** (`./x`, `../x`): join with the containing directory and
//!    probe it as a file, then as a directory. If nothing is found and the
//!    candidate sits under one of the root dirs, probe the same suffix under
//!    every other root dir.
//! 2. **Absolute** (`/x`): probe as a file, then as a directory.
//! 3. **Bare** (`rxjs/Observable`): walk up from the containing directory,
//!    probing `<dir>/<vendor>/<name>` and then `<dir>/<vendor>/@types/<name>`.
//!    If that finds nothing, repeat the walk from the containing directory's
//!    mirror under every other root dir.
//!
//! A file probe tries each of [`RESOLUTION_EXTENSIONS`] in order. A directory
//! probe reads `typings`/`types` from `package.json`, then falls back to
//! `index`.

use camino::{Utf8Path, Utf8PathBuf};
use ngh_core::{Roots, is_relative_specifier, normalize_path, strip_source_extension};
use serde::Deserialize;
use tracing::trace;

use crate::context::ModuleResolutionHost;

/// Extensions tried, in order, when probing a candidate file.
pub const RESOLUTION_EXTENSIONS: [&str; 3] = [".ts", ".tsx", ".d.ts"];

/// Options handed to a [`ModuleResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOptions {
    /// The vendor directory segment.
    pub vendor_dir: String,
    /// Virtual roots merged for relative resolution, longest first.
    pub root_dirs: Vec<Utf8PathBuf>,
}

impl ResolutionOptions {
    /// Builds options from the host roots plus any extra root dirs.
    ///
    /// The project and generated roots are always included.
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use ngh_core::{HostConfig, Roots};
    /// use ngh_host::ResolutionOptions;
    ///
    /// let roots = Roots::new(&HostConfig::new("/p", "/p/gen"))?;
    /// let options = ResolutionOptions::new(&roots, &[]);
    ///
    /// assert_eq!(options.vendor_dir, "node_modules");
    /// assert_eq!(options.root_dirs, [Utf8PathBuf::from("/p/gen"), Utf8PathBuf::from("/p")]);
    /// # Ok::<(), ngh_core::ConfigError>(())
    /// ```
    pub fn new(roots: &Roots, extra_root_dirs: &[Utf8PathBuf]) -> Self {
        let mut root_dirs: Vec<Utf8PathBuf> = [roots.project_root(), roots.generated_root()]
            .into_iter()
            .map(Utf8Path::to_path_buf)
            .chain(extra_root_dirs.iter().map(|dir| normalize_path(dir.as_str())))
            .collect();
        root_dirs.sort_by(|a, b| b.as_str().len().cmp(&a.as_str().len()).then_with(|| a.cmp(b)));
        root_dirs.dedup();

        Self {
            vendor_dir: roots.vendor_dir().to_owned(),
            root_dirs,
        }
    }
}

/// The module-resolution algorithm the compiler host delegates to.
pub trait ModuleResolver {
    /// Resolves `module_name` as imported from `containing_file`.
    ///
    /// Returns `None` when nothing matches.
    fn resolve(
        &self,
        module_name: &str,
        containing_file: &Utf8Path,
        options: &ResolutionOptions,
        host: &dyn ModuleResolutionHost,
    ) -> Option<Utf8PathBuf>;
}

/// TypeScript's node-style resolution, limited to TypeScript outputs.
///
/// # Examples
///
/// ```
/// use camino::{Utf8Path, Utf8PathBuf};
/// use ngh_core::{HostConfig, Roots};
/// use ngh_host::{MemoryHost, ModuleResolver, NodeModuleResolver, ResolutionOptions};
///
/// let host = MemoryHost::new()
///     .with_file("/p/src/app.ts", "")
///     .with_file("/p/node_modules/rxjs/Observable.d.ts", "");
/// let roots = Roots::new(&HostConfig::new("/p", "/p/gen"))?;
/// let options = ResolutionOptions::new(&roots, &[]);
/// let from = Utf8Path::new("/p/src/main.ts");
///
/// let resolver = NodeModuleResolver;
/// assert_eq!(
///     resolver.resolve("./app", from, &options, &host),
///     Some(Utf8PathBuf::from("/p/src/app.ts"))
/// );
/// assert_eq!(
///     resolver.resolve("rxjs/Observable", from, &options, &host),
///     Some(Utf8PathBuf::from("/p/node_modules/rxjs/Observable.d.ts"))
/// );
/// # Ok::<(), ngh_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeModuleResolver;

impl ModuleResolver for NodeModuleResolver {
    fn resolve(
        &self,
        module_name: &str,
        containing_file: &Utf8Path,
        options: &ResolutionOptions,
        host: &dyn ModuleResolutionHost,
    ) -> Option<Utf8PathBuf> {
        let containing_dir = containing_file.parent().unwrap_or(containing_file);

        if is_relative_specifier(module_name) {
            let candidate = normalize_path(containing_dir.join(module_name).as_str());
            return load_file_or_directory(&candidate, host)
                .or_else(|| load_from_root_dirs(&candidate, options, host));
        }

        if module_name.starts_with('/') {
            return load_file_or_directory(&normalize_path(module_name), host);
        }

        load_from_vendor(module_name, containing_dir, options, host)
    }
}

fn load_file_or_directory(candidate: &Utf8Path, host: &dyn ModuleResolutionHost) -> Option<Utf8PathBuf> {
    load_as_file(candidate, host).or_else(|| load_as_directory(candidate, host))
}

fn load_as_file(candidate: &Utf8Path, host: &dyn ModuleResolutionHost) -> Option<Utf8PathBuf> {
    RESOLUTION_EXTENSIONS.iter().find_map(|ext| {
        let file = Utf8PathBuf::from(format!("{candidate}{ext}"));
        let exists = host.file_exists(&file);
        trace!(path = %file, exists, "probe file");
        exists.then_some(file)
    })
}

fn load_as_directory(candidate: &Utf8Path, host: &dyn ModuleResolutionHost) -> Option<Utf8PathBuf> {
    if !directory_may_exist(candidate, host) {
        return None;
    }

    if let Some(typings) = read_typings(&candidate.join("package.json"), host) {
        let target = normalize_path(candidate.join(&typings).as_str());
        if host.file_exists(&target) {
            return Some(target);
        }
        let stripped = Utf8PathBuf::from(strip_source_extension(target.as_str()));
        if let Some(found) = load_as_file(&stripped, host) {
            return Some(found);
        }
    }

    load_as_file(&candidate.join("index"), host)
}

fn directory_may_exist(dir: &Utf8Path, host: &dyn ModuleResolutionHost) -> bool {
    let exists = host.directory_exists(dir);
    trace!(path = %dir, ?exists, "probe directory");
    exists.unwrap_or(true)
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    typings: Option<String>,
    types: Option<String>,
}

fn read_typings(manifest: &Utf8Path, host: &dyn ModuleResolutionHost) -> Option<String> {
    if !host.file_exists(manifest) {
        return None;
    }
    let text = host.read_file(manifest).ok()?;
    match serde_json::from_str::<PackageManifest>(&text) {
        Ok(parsed) => parsed.typings.or(parsed.types),
        Err(err) => {
            trace!(path = %manifest, error = %err, "ignoring unreadable package.json");
            None
        }
    }
}

fn load_from_root_dirs(
    candidate: &Utf8Path,
    options: &ResolutionOptions,
    host: &dyn ModuleResolutionHost,
) -> Option<Utf8PathBuf> {
    mirrors_under_root_dirs(candidate, options).find_map(|mirror| load_file_or_directory(&mirror, host))
}

/// Re-roots `path` under every root dir other than the one it sits in.
fn mirrors_under_root_dirs<'a>(
    path: &Utf8Path,
    options: &'a ResolutionOptions,
) -> impl Iterator<Item = Utf8PathBuf> + 'a {
    let matched = options
        .root_dirs
        .iter()
        .find_map(|root| path.strip_prefix(root).ok().map(|suffix| (root, suffix.to_owned())));

    matched.into_iter().flat_map(move |(matched, suffix)| {
        options
            .root_dirs
            .iter()
            .filter(move |root| *root != matched)
            .map(move |root| normalize_path(root.join(&suffix).as_str()))
    })
}

fn load_from_vendor(
    module_name: &str,
    containing_dir: &Utf8Path,
    options: &ResolutionOptions,
    host: &dyn ModuleResolutionHost,
) -> Option<Utf8PathBuf> {
    walk_vendor_dirs(module_name, containing_dir, options, host).or_else(|| {
        mirrors_under_root_dirs(containing_dir, options)
            .find_map(|mirror| walk_vendor_dirs(module_name, &mirror, options, host))
    })
}

fn walk_vendor_dirs(
    module_name: &str,
    start: &Utf8Path,
    options: &ResolutionOptions,
    host: &dyn ModuleResolutionHost,
) -> Option<Utf8PathBuf> {
    let typed_name = types_package_name(module_name);

    for dir in start.ancestors() {
        if dir.file_name() == Some(options.vendor_dir.as_str()) {
            continue;
        }
        let vendor = dir.join(&options.vendor_dir);
        if !directory_may_exist(&vendor, host) {
            continue;
        }
        let found = load_file_or_directory(&vendor.join(module_name), host)
            .or_else(|| load_file_or_directory(&vendor.join("@types").join(&typed_name), host));
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Maps a package name to its `@types` directory name (`@scope/pkg` becomes
/// `scope__pkg`).
fn types_package_name(module_name: &str) -> String {
    match module_name.strip_prefix('@').and_then(|rest| rest.split_once('/')) {
        Some((scope, rest)) => format!("{scope}__{rest}"),
        None => module_name.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;
    use ngh_core::HostConfig;

    fn options(project: &str, generated: &str) -> ResolutionOptions {
        let roots = Roots::new(&HostConfig::new(project, generated)).unwrap();
        ResolutionOptions::new(&roots, &[])
    }

    fn resolve(host: &MemoryHost, name: &str, from: &str) -> Option<Utf8PathBuf> {
        NodeModuleResolver.resolve(name, Utf8Path::new(from), &options("/p", "/p/gen"), host)
    }

    #[test]
    fn test_relative_extension_order() {
        let host = MemoryHost::new()
            .with_file("/p/a/c.d.ts", "")
            .with_file("/p/a/c.ts", "");
        assert_eq!(resolve(&host, "./c", "/p/a/b.ts").unwrap(), "/p/a/c.ts");
    }

    #[test]
    fn test_relative_directory_index() {
        let host = MemoryHost::new().with_file("/p/lib/index.d.ts", "");
        assert_eq!(resolve(&host, "../lib", "/p/a/b.ts").unwrap(), "/p/lib/index.d.ts");
    }

    #[test]
    fn test_package_typings() {
        let host = MemoryHost::new()
            .with_file("/p/node_modules/pkg/package.json", r#"{"typings": "dist/pkg.d.ts"}"#)
            .with_file("/p/node_modules/pkg/dist/pkg.d.ts", "");
        assert_eq!(
            resolve(&host, "pkg", "/p/src/app.ts").unwrap(),
            "/p/node_modules/pkg/dist/pkg.d.ts"
        );
    }

    #[test]
    fn test_package_types_without_extension() {
        let host = MemoryHost::new()
            .with_file("/p/node_modules/pkg/package.json", r#"{"types": "./lib/main.js"}"#)
            .with_file("/p/node_modules/pkg/lib/main.d.ts", "");
        assert_eq!(
            resolve(&host, "pkg", "/p/src/app.ts").unwrap(),
            "/p/node_modules/pkg/lib/main.d.ts"
        );
    }

    #[test]
    fn test_malformed_package_json_falls_back_to_index() {
        let host = MemoryHost::new()
            .with_file("/p/node_modules/pkg/package.json", "{ not json")
            .with_file("/p/node_modules/pkg/index.d.ts", "");
        assert_eq!(
            resolve(&host, "pkg", "/p/src/app.ts").unwrap(),
            "/p/node_modules/pkg/index.d.ts"
        );
    }

    #[test]
    fn test_vendor_walks_ancestors() {
        let host = MemoryHost::new().with_file("/node_modules/shared/index.d.ts", "");
        assert_eq!(
            resolve(&host, "shared", "/p/src/deep/app.ts").unwrap(),
            "/node_modules/shared/index.d.ts"
        );
    }

    #[test]
    fn test_vendor_types_fallback() {
        let host = MemoryHost::new().with_file("/p/node_modules/@types/node/index.d.ts", "");
        assert_eq!(
            resolve(&host, "node", "/p/src/app.ts").unwrap(),
            "/p/node_modules/@types/node/index.d.ts"
        );
    }

    #[test]
    fn test_types_package_name() {
        assert_eq!(types_package_name("@angular/core"), "angular__core");
        assert_eq!(types_package_name("lodash"), "lodash");
    }

    #[test]
    fn test_root_dirs_merge_generated_and_source() {
        let host = MemoryHost::new().with_file("/p/a/c.ts", "");
        assert_eq!(resolve(&host, "./c", "/p/gen/a/b.ngfactory.ts").unwrap(), "/p/a/c.ts");

        let host = MemoryHost::new().with_file("/p/gen/a/c.ngfactory.ts", "");
        assert_eq!(
            resolve(&host, "./c.ngfactory", "/p/a/b.ts").unwrap(),
            "/p/gen/a/c.ngfactory.ts"
        );
    }

    #[test]
    fn test_vendor_walk_bridges_sibling_root_dirs() {
        let host = MemoryHost::new().with_file("/p/node_modules/rxjs/Observable.d.ts", "");
        let options = options("/p", "/out");
        assert_eq!(
            NodeModuleResolver
                .resolve("rxjs/Observable", Utf8Path::new("/out/a/b.ngfactory.ts"), &options, &host)
                .unwrap(),
            "/p/node_modules/rxjs/Observable.d.ts"
        );
        assert!(
            NodeModuleResolver
                .resolve("missing", Utf8Path::new("/out/a/b.ngfactory.ts"), &options, &host)
                .is_none()
        );
    }

    #[test]
    fn test_absolute_name() {
        let host = MemoryHost::new().with_file("/p/a/c.ts", "");
        assert_eq!(resolve(&host, "/p/a/c", "/p/index.ts").unwrap(), "/p/a/c.ts");
    }

    #[test]
    fn test_unresolved_is_none() {
        let host = MemoryHost::new();
        assert!(resolve(&host, "./missing", "/p/a/b.ts").is_none());
        assert!(resolve(&host, "missing-pkg", "/p/a/b.ts").is_none());
    }

    #[test]
    fn test_without_directory_probes_still_resolves() {
        let host = MemoryHost::new()
            .with_file("/p/node_modules/rxjs/index.d.ts", "")
            .without_directory_probes();
        assert_eq!(
            resolve(&host, "rxjs", "/p/src/app.ts").unwrap(),
            "/p/node_modules/rxjs/index.d.ts"
        );
    }

    #[test]
    fn test_options_include_extra_root_dirs() {
        let roots = Roots::new(&HostConfig::new("/p", "/out")).unwrap();
        let options = ResolutionOptions::new(&roots, &[Utf8PathBuf::from("/shared/./lib/")]);
        assert_eq!(options.root_dirs, ["/shared/lib", "/out", "/p"]);
    }
}

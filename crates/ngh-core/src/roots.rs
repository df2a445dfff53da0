//! The normalized root set.
//!
//! [`Roots`] is built once from a [`HostConfig`] and answers every
//! "which tree is this path in" question the resolver asks:
//!
//! | question | method |
//! |---|---|
//! | is it generated? | [`Roots::is_generated`] |
//! | is it in the vendor namespace? | [`Roots::vendor_suffix`] |
//! | where does it sit in generated space? | [`Roots::rewrite_into_generated`] |
//! | where does its mirror sit? | [`Roots::mirror_into_generated`] |

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::HostConfig;
use crate::error::ConfigError;
use crate::paths::{normalize_path, strip_source_extension};

/// Project, generated, and vendor roots, normalized at construction.
///
/// # Examples
///
/// ```
/// use ngh_core::{HostConfig, Roots};
///
/// let roots = Roots::new(&HostConfig::new("/p/", "/out"))?;
/// assert_eq!(roots.project_root(), "/p");
/// assert!(!roots.generated_is_under_project());
/// assert_eq!(roots.rewrite_into_generated("/p/a/b.ts"), "/out/a/b.ts");
/// # Ok::<(), ngh_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    project_root: Utf8PathBuf,
    generated_root: Utf8PathBuf,
    vendor_dir: String,
    /// `/<vendor_dir>/`, the marker searched for inside file paths.
    vendor_marker: String,
    /// Generated tags with their leading dot (`.ngfactory`).
    generated_tags: Vec<String>,
    generated_is_under_project: bool,
    /// The project root is strictly inside the generated root.
    project_is_under_generated: bool,
}

impl Roots {
    /// Validates and normalizes the roots named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RelativeRoot`] if either root is not absolute,
    /// and [`ConfigError::InvalidOption`] for a malformed vendor segment or
    /// generated tag.
    pub fn new(config: &HostConfig) -> Result<Self, ConfigError> {
        config.validate_options()?;

        let project_root = absolute_root("project_root", &config.project_root)?;
        let generated_root = absolute_root("generated_root", &config.generated_root)?;
        let generated_is_under_project = generated_root.starts_with(&project_root);
        let project_is_under_generated =
            project_root != generated_root && project_root.starts_with(&generated_root);

        Ok(Self {
            project_root,
            generated_root,
            vendor_marker: format!("/{}/", config.vendor_dir),
            vendor_dir: config.vendor_dir.clone(),
            generated_tags: config
                .generated_suffixes
                .iter()
                .map(|tag| format!(".{tag}"))
                .collect(),
            generated_is_under_project,
            project_is_under_generated,
        })
    }

    /// The project (source) root.
    #[inline]
    pub fn project_root(&self) -> &Utf8Path {
        &self.project_root
    }

    /// The generated-output root.
    #[inline]
    pub fn generated_root(&self) -> &Utf8Path {
        &self.generated_root
    }

    /// The vendor path segment (`node_modules` by default).
    #[inline]
    pub fn vendor_dir(&self) -> &str {
        &self.vendor_dir
    }

    /// The vendor namespace directly under the project root.
    pub fn vendor_root(&self) -> Utf8PathBuf {
        self.project_root.join(&self.vendor_dir)
    }

    /// `true` iff the generated root equals or is nested inside the project root.
    #[inline]
    pub const fn generated_is_under_project(&self) -> bool {
        self.generated_is_under_project
    }

    /// Returns `true` if the base name of `path`, without its source
    /// extension, ends with a generated tag.
    ///
    /// ```
    /// use ngh_core::{HostConfig, Roots};
    ///
    /// let roots = Roots::new(&HostConfig::new("/p", "/p/gen"))?;
    /// assert!(roots.is_generated("/p/gen/app.ngfactory.ts"));
    /// assert!(roots.is_generated("/p/gen/app.css.ngstyle"));
    /// assert!(!roots.is_generated("/p/ngfactory/app.ts"));
    /// # Ok::<(), ngh_core::ConfigError>(())
    /// ```
    pub fn is_generated(&self, path: &str) -> bool {
        let stem = strip_source_extension(path);
        let base = stem.rsplit_once('/').map_or(stem, |(_, base)| base);
        self.generated_tags.iter().any(|tag| base.ends_with(tag.as_str()))
    }

    /// Returns the part of `path` after the first vendor segment, if any.
    ///
    /// For `/p/node_modules/rxjs/Observable` this is `rxjs/Observable`, the
    /// package-style specifier a loader resolves through its own vendor lookup.
    pub fn vendor_suffix<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.find(&self.vendor_marker)
            .map(|index| &path[index + self.vendor_marker.len()..])
    }

    /// Expresses `path` in generated-root space.
    ///
    /// - Vendor paths are transplanted under the generated root, keeping the
    ///   vendor segment and everything after it.
    /// - Paths already in the generated tree are kept.
    /// - Paths under the project root have that prefix swapped for the
    ///   generated root.
    /// - Anything else is returned normalized but otherwise unchanged.
    pub fn rewrite_into_generated(&self, path: &str) -> Utf8PathBuf {
        let path = normalize_path(path);
        if let Some(index) = path.as_str().find(&self.vendor_marker) {
            return normalize_path(&format!("{}{}", self.generated_root, &path.as_str()[index..]));
        }
        if self.in_generated_tree(&path) {
            return path;
        }
        self.swap_project_prefix(path)
    }

    /// Maps a project-tree path onto its positional mirror in the generated tree.
    ///
    /// Used when the generated root is a sibling of the project root. Paths
    /// outside the project root, or already in the generated tree, are returned
    /// unchanged.
    pub fn mirror_into_generated(&self, path: &str) -> Utf8PathBuf {
        let path = normalize_path(path);
        if self.in_generated_tree(&path) {
            return path;
        }
        self.swap_project_prefix(path)
    }

    /// Under the generated root, unless the project root nests inside it and
    /// claims the path first.
    fn in_generated_tree(&self, path: &Utf8Path) -> bool {
        path.starts_with(&self.generated_root)
            && !(self.project_is_under_generated && path.starts_with(&self.project_root))
    }

    fn swap_project_prefix(&self, path: Utf8PathBuf) -> Utf8PathBuf {
        match path.strip_prefix(&self.project_root) {
            Ok(rest) if rest.as_str().is_empty() => self.generated_root.clone(),
            Ok(rest) => self.generated_root.join(rest),
            Err(_) => path,
        }
    }
}

fn absolute_root(option: &'static str, path: &Utf8Path) -> Result<Utf8PathBuf, ConfigError> {
    let normalized = normalize_path(path.as_str());
    let is_absolute = normalized.as_str().starts_with('/') || has_drive_prefix(normalized.as_str());
    if path.as_str().is_empty() || !is_absolute {
        return Err(ConfigError::RelativeRoot {
            option,
            path: path.to_owned(),
        });
    }
    Ok(normalized)
}

/// `C:/...` style roots on Windows hosts.
fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

//! Path-space primitives.
//!
//! Everything here is a pure string computation over slash-separated paths.
//! Nothing touches the filesystem.
//!
//! # Recognized Extensions
//!
//! [`SOURCE_EXTENSIONS`] is the closed set of suffixes that may be dropped from
//! a file identity without changing which module it names. `.d.ts` is listed
//! before `.ts` so that `foo.d.ts` strips to `foo`, not `foo.d`.
//!
//! ```
//! use ngh_core::strip_source_extension;
//!
//! assert_eq!(strip_source_extension("/p/a/b.d.ts"), "/p/a/b");
//! assert_eq!(strip_source_extension("/p/a/b.tsx"), "/p/a/b");
//! assert_eq!(strip_source_extension("/p/a/b.css"), "/p/a/b.css");
//! ```

use camino::Utf8PathBuf;

/// Source extensions that name the same logical module when dropped.
pub const SOURCE_EXTENSIONS: [&str; 5] = [".d.ts", ".ts", ".tsx", ".js", ".jsx"];

/// Extension of declaration-only files.
pub const DECLARATION_EXTENSION: &str = ".d.ts";

/// Extension that replaces [`DECLARATION_EXTENSION`] to name a sidecar file.
pub const METADATA_EXTENSION: &str = ".metadata.json";

/// Default base-name tags that mark generated files.
pub const GENERATED_SUFFIXES: [&str; 2] = ["ngfactory", "ngstyle"];

/// Returns the recognized source extension `path` ends with, if any.
#[inline]
pub fn source_extension(path: &str) -> Option<&'static str> {
    SOURCE_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| path.ends_with(ext))
}

/// Drops one recognized source extension from the end of `path`.
#[inline]
pub fn strip_source_extension(path: &str) -> &str {
    source_extension(path)
        .and_then(|ext| path.strip_suffix(ext))
        .unwrap_or(path)
}

/// Returns `true` if `path` names a declaration-only file.
#[inline]
pub fn is_declaration_file(path: &str) -> bool {
    path.ends_with(DECLARATION_EXTENSION)
}

/// Returns the sidecar metadata path for a declaration file.
///
/// ```
/// use ngh_core::sidecar_path;
///
/// assert_eq!(
///     sidecar_path("/p/node_modules/lib/index.d.ts").as_deref(),
///     Some("/p/node_modules/lib/index.metadata.json"),
/// );
/// assert_eq!(sidecar_path("/p/a.ts"), None);
/// ```
pub fn sidecar_path(declaration_file: &str) -> Option<String> {
    declaration_file
        .strip_suffix(DECLARATION_EXTENSION)
        .map(|stem| format!("{stem}{METADATA_EXTENSION}"))
}

/// Returns `true` if a module specifier is relative (`.`, `..`, `./x`, `../x`).
///
/// This is the shape the resolution algorithm resolves against the
/// containing directory rather than the vendor namespace.
#[inline]
pub fn is_relative_specifier(specifier: &str) -> bool {
    let rest = specifier
        .strip_prefix("..")
        .or_else(|| specifier.strip_prefix('.'));
    rest.is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '\\']))
}

/// Lexically normalizes a path.
///
/// Backslashes become forward slashes, empty and `.` segments are dropped,
/// `..` segments cancel the preceding segment, and any trailing slash is
/// removed. `..` never climbs above the root of an absolute path.
///
/// ```
/// use ngh_core::normalize_path;
///
/// assert_eq!(normalize_path("/p/gen/./a//b/../c/"), "/p/gen/a/c");
/// assert_eq!(normalize_path("C:\\work\\app"), "C:/work/app");
/// assert_eq!(normalize_path("/.."), "/");
/// ```
pub fn normalize_path(path: &str) -> Utf8PathBuf {
    let slashed = path.replace('\\', "/");
    let absolute = slashed.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for segment in slashed.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    let normalized = if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_owned()
    } else {
        joined
    };
    Utf8PathBuf::from(normalized)
}

/// Computes the relative path from directory `from` to `to`.
///
/// Both inputs are normalized first. The result uses forward slashes and is
/// empty when the two paths are the same.
///
/// ```
/// use ngh_core::relative_path;
///
/// assert_eq!(relative_path("/p/gen/a", "/p/gen/a/c"), "c");
/// assert_eq!(relative_path("/p/gen/a", "/p/b/c"), "../../b/c");
/// assert_eq!(relative_path("/p", "/p"), "");
/// ```
pub fn relative_path(from: &str, to: &str) -> String {
    let from = normalize_path(from);
    let to = normalize_path(to);
    let from_parts: Vec<&str> = segments(from.as_str()).collect();
    let to_parts: Vec<&str> = segments(to.as_str()).collect();

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<&str> = std::iter::repeat_n("..", from_parts.len() - common).collect();
    out.extend_from_slice(&to_parts[common..]);
    out.join("/")
}

/// Formats the relative path from `from` to `to` as a loader specifier.
///
/// Loaders treat a specifier without a leading `.` as a package name, so a
/// `./` marker is added unless the path already starts with a dot.
///
/// ```
/// use ngh_core::dot_relative;
///
/// assert_eq!(dot_relative("/p/gen/a", "/p/gen/a/c.ngfactory"), "./c.ngfactory");
/// assert_eq!(dot_relative("/p/gen/a", "/p/gen/b/c"), "../b/c");
/// ```
pub fn dot_relative(from: &str, to: &str) -> String {
    let relative = relative_path(from, to);
    if relative.starts_with('.') {
        relative
    } else {
        format!("./{relative}")
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_every_recognized_extension() {
        for ext in SOURCE_EXTENSIONS {
            let path = format!("/p/a/b{ext}");
            assert_eq!(strip_source_extension(&path), "/p/a/b", "extension {ext}");
        }
    }

    #[test]
    fn test_strip_only_one_extension() {
        assert_eq!(strip_source_extension("/p/a/b.ngfactory.ts"), "/p/a/b.ngfactory");
        assert_eq!(strip_source_extension("/p/a/b.js.ts"), "/p/a/b.js");
        assert_eq!(strip_source_extension("/p/a/b"), "/p/a/b");
        assert_eq!(strip_source_extension("/p/a/b.json"), "/p/a/b.json");
    }

    #[test]
    fn test_source_extension_prefers_declaration() {
        assert_eq!(source_extension("x.d.ts"), Some(".d.ts"));
        assert_eq!(source_extension("x.ts"), Some(".ts"));
        assert_eq!(source_extension("x.jsx"), Some(".jsx"));
        assert_eq!(source_extension("x.css"), None);
    }

    #[test]
    fn test_is_declaration_file() {
        assert!(is_declaration_file("/p/node_modules/a/index.d.ts"));
        assert!(!is_declaration_file("/p/a.ts"));
        assert!(!is_declaration_file("/p/a.d.tsx"));
    }

    #[test]
    fn test_is_relative_specifier() {
        assert!(is_relative_specifier("./a"));
        assert!(is_relative_specifier("../a/b"));
        assert!(is_relative_specifier("."));
        assert!(is_relative_specifier(".."));
        assert!(!is_relative_specifier("rxjs/Observable"));
        assert!(!is_relative_specifier("@angular/core"));
        assert!(!is_relative_specifier(".hidden"));
        assert!(!is_relative_specifier("/abs/path"));
    }

    #[test]
    fn test_normalize_relative_paths() {
        assert_eq!(normalize_path("a/./b/../c"), "a/c");
        assert_eq!(normalize_path("../a"), "../a");
        assert_eq!(normalize_path("a/../.."), "..");
        assert_eq!(normalize_path(""), ".");
    }

    #[test]
    fn test_relative_path_to_sibling_tree() {
        assert_eq!(relative_path("/out/a", "/out/a/c"), "c");
        assert_eq!(relative_path("/p/a", "/out/a/c"), "../../out/a/c");
        assert_eq!(relative_path("/p/a/b", "/p"), "../..");
    }

    #[test]
    fn test_dot_relative_same_directory() {
        assert_eq!(dot_relative("/p", "/p"), "./");
        assert_eq!(dot_relative("/p/a", "/p/a/.hidden"), ".hidden");
    }
}

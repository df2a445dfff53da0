//! Core types, errors, and path-space primitives for the ngh compiler host.
//!
//! This crate provides the foundational pieces used across the workspace:
//!
//! - [`HostConfig`] and the normalized [`Roots`] derived from it
//! - The recognized source-extension set and the generated-file predicate
//! - Lexical path normalization and loader-style relative specifiers
//! - Export metadata records ([`ModuleMetadata`]) as stored in sidecar files
//!
//! # Examples
//!
//! ```
//! use ngh_core::{HostConfig, Roots};
//!
//! let config = HostConfig::new("/p", "/p/gen");
//! let roots = Roots::new(&config)?;
//!
//! assert!(roots.generated_is_under_project());
//! assert!(roots.is_generated("/p/gen/a/c.ngfactory.ts"));
//! assert_eq!(roots.vendor_suffix("/p/node_modules/rxjs/Observable"), Some("rxjs/Observable"));
//! # Ok::<(), ngh_core::ConfigError>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod paths;
pub mod roots;
pub mod types;

pub use config::HostConfig;
pub use error::ConfigError;
pub use paths::{
    DECLARATION_EXTENSION, GENERATED_SUFFIXES, METADATA_EXTENSION, SOURCE_EXTENSIONS,
    dot_relative, is_declaration_file, is_relative_specifier, normalize_path, relative_path,
    sidecar_path, source_extension, strip_source_extension,
};
pub use roots::Roots;
pub use types::{
    ExportDeclaration, ExportedName, LEGACY_METADATA_VERSION, METADATA_VERSION, ModuleMetadata,
    SymbolKind,
};

//! Domain types for the ngh compiler host.
//!
//! - [`metadata`] - export metadata records as stored in `.metadata.json` sidecars
//!
//! All public types are re-exported at the crate root:
//!
//! ```
//! use ngh_core::{ModuleMetadata, ExportDeclaration, SymbolKind};
//! ```

pub mod metadata;

pub use metadata::{
    ExportDeclaration, ExportedName, LEGACY_METADATA_VERSION, METADATA_VERSION, ModuleMetadata,
    SymbolKind,
};

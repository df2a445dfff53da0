//! TypeScript export extraction using tree-sitter.
//!
//! This crate is the metadata-collection side of the ngh compiler host. It
//! parses TypeScript, TSX, and declaration (`.d.ts`) files and reports what
//! each one exports:
//!
//! - Declared symbols (classes, interfaces, functions, variables, enums, type aliases)
//! - Local export clauses (`export { a as b }`)
//! - Re-exports (`export * from './x'`, `export { a } from './x'`)
//!
//! # Overview
//!
//! [`TsParser`] wraps a tree-sitter parser and returns an [`ExportSummary`].
//! [`TsMetadataCollector`] turns that summary into a
//! [`ModuleMetadata`](ngh_core::ModuleMetadata) record:
//!
//! ```
//! use ngh_ts_parser::TsMetadataCollector;
//!
//! let source = r#"
//!     export class AppModule {}
//!     export { map } from './operators';
//! "#;
//!
//! let record = TsMetadataCollector::new()
//!     .collect_metadata("/p/app.module.ts", source)?
//!     .expect("exports present");
//!
//! assert_eq!(record.metadata.len(), 1);
//! assert_eq!(record.exports.as_ref().map(Vec::len), Some(1));
//! # Ok::<(), ngh_ts_parser::ParseError>(())
//! ```
//!
//! # Thread Safety
//!
//! [`TsParser`] is `Send` but not `Sync`. The collector creates a parser per
//! call, so it can be shared freely. Compiled queries are cached globally.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod collector;
pub mod error;
pub mod exports;
mod parser;
pub mod queries;

pub use collector::{TsMetadataCollector, to_metadata};
pub use error::ParseError;
pub use exports::{ExportSummary, ExportedSymbol, extract_exports};
pub use parser::{ParseResult, TsParser};

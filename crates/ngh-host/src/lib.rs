//! Path-space compiler host for generated TypeScript.
//!
//! This crate resolves module names to files and back inside a layout with
//! three roots: hand-written sources under a project root, generated
//! artifacts under a generated root, and third-party packages under a vendor
//! directory. It also loads per-file export metadata.
//!
//! # Overview
//!
//! The main entry point is [`CompilerHost`], which combines:
//!
//! - [`HostContext`]: filesystem capabilities, with an insert-only set of
//!   files assumed to exist
//! - [`ModuleResolver`]: the forward resolution algorithm ([`NodeModuleResolver`])
//! - [`MetadataLoader`]: sidecar reads with legacy upgrade and memoization
//!
//! # Example
//!
//! ```
//! use camino::Utf8Path;
//! use ngh_core::HostConfig;
//! use ngh_host::{CompilerHost, MemoryHost, ResolutionHostAdapter};
//!
//! let files = MemoryHost::new()
//!     .with_file("/p/a/c.ts", "export class C {}")
//!     .with_file("/p/a/b.ts", "import { C } from './c';");
//! let host = CompilerHost::new(&HostConfig::new("/p", "/out"), ResolutionHostAdapter::new(files))?;
//!
//! let containing = Utf8Path::new("/p/a/b.ts");
//! let name = host.name_for(Utf8Path::new("/p/a/c.ts"), containing);
//! assert_eq!(name, "./c");
//! assert_eq!(host.locate(&name, Some(containing))?.unwrap(), "/p/a/c.ts");
//!
//! let records = host.metadata_for(Utf8Path::new("/p/a/c.ts"))?.unwrap();
//! assert!(records[0].metadata.contains_key("C"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! CompilerHost<C: HostContext>
//!     │
//!     ├── Roots (ngh-core)
//!     │
//!     ├── NodeModuleResolver ── probes ──> C
//!     │
//!     └── MetadataLoader
//!             │
//!             ├── TsMetadataCollector (ngh-ts-parser)
//!             └── compat (version 1 upgrade)
//! ```
//!
//! # Threading
//!
//! A host drives one compilation pass at a time. The assumption set and the
//! sidecar cache use `RefCell`, so a host is neither `Sync` nor shared across
//! threads. Resource reads return a `Send` future.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod compat;
mod context;
mod error;
mod host;
mod memory;
mod metadata;
mod resolution;

pub use context::{
    AssumedFiles, HostContext, ModuleResolutionHost, NodeHostContext, ResolutionHostAdapter,
    ResourceFuture,
};
pub use error::HostError;
pub use host::CompilerHost;
pub use memory::MemoryHost;
pub use metadata::{MetadataCollector, MetadataList, MetadataLoader, read_source};
pub use resolution::{
    ModuleResolver, NodeModuleResolver, RESOLUTION_EXTENSIONS, ResolutionOptions,
};

//! Export metadata records.
//!
//! A sidecar file holds either one record or an array of records, one per
//! schema version. Each record has:
//!
//! - `version` - the schema version (`1` legacy, `3` current)
//! - `exports` - re-export declarations (`export * from './x'`)
//! - `metadata` - exported symbol name to descriptor
//!
//! Fields this crate does not interpret (`importAs`, `origins`, ...) are kept in
//! [`ModuleMetadata::extra`] so that a record survives a parse/serialize cycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema version of legacy records.
pub const LEGACY_METADATA_VERSION: u32 = 1;

/// Schema version of current records.
pub const METADATA_VERSION: u32 = 3;

/// One export metadata record.
///
/// # Examples
///
/// ```
/// use ngh_core::{ModuleMetadata, SymbolKind};
///
/// let mut record = ModuleMetadata::current();
/// record.metadata.insert("AppModule".to_owned(), SymbolKind::Class.descriptor());
///
/// assert!(record.is_current());
/// assert!(record.metadata.contains_key("AppModule"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// Record tag, always `"module"` for records this crate writes.
    #[serde(rename = "__symbolic", default = "module_tag")]
    pub symbolic: String,

    /// Schema version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// Re-export declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<Vec<ExportDeclaration>>,

    /// Exported symbol name to descriptor. Ordered so output is deterministic.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,

    /// Fields not interpreted here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn module_tag() -> String {
    "module".to_owned()
}

impl ModuleMetadata {
    /// Creates an empty record at the current schema version.
    #[must_use]
    pub fn current() -> Self {
        Self {
            symbolic: module_tag(),
            version: Some(METADATA_VERSION),
            exports: None,
            metadata: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// Returns `true` for a legacy (version 1) record.
    #[inline]
    pub fn is_legacy(&self) -> bool {
        self.version == Some(LEGACY_METADATA_VERSION)
    }

    /// Returns `true` for a current (version 3) record.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.version == Some(METADATA_VERSION)
    }

    /// Parses the contents of a sidecar file into a list of records.
    ///
    /// A single record becomes a one-element list. `null` becomes an empty list.
    ///
    /// ```
    /// use ngh_core::ModuleMetadata;
    ///
    /// let one = ModuleMetadata::list_from_json(r#"{"__symbolic":"module","version":3,"metadata":{}}"#)?;
    /// assert_eq!(one.len(), 1);
    ///
    /// let none = ModuleMetadata::list_from_json("null")?;
    /// assert!(none.is_empty());
    /// # Ok::<(), serde_json::Error>(())
    /// ```
    pub fn list_from_json(text: &str) -> Result<Vec<Self>, serde_json::Error> {
        match serde_json::from_str::<Value>(text)? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.into_iter().map(serde_json::from_value).collect(),
            record => Ok(vec![serde_json::from_value(record)?]),
        }
    }
}

/// One re-export declaration: `export * from 'x'` or `export { a as b } from 'x'`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDeclaration {
    /// The module specifier being re-exported from.
    pub from: String,

    /// The re-exported names. `None` means every export (`export *`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<Vec<ExportedName>>,

    /// Fields not interpreted here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExportDeclaration {
    /// A star re-export of every name in `from`.
    #[must_use]
    pub fn star(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            export: None,
            extra: Map::new(),
        }
    }

    /// A re-export of the listed names from `from`.
    #[must_use]
    pub fn named(from: impl Into<String>, names: Vec<ExportedName>) -> Self {
        Self {
            from: from.into(),
            export: Some(names),
            extra: Map::new(),
        }
    }
}

/// A single name in a re-export list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportedName {
    /// Re-exported under its own name.
    Name(String),
    /// Re-exported under a different name.
    Alias {
        /// The name in the source module.
        name: String,
        /// The name it is exported as.
        #[serde(rename = "as")]
        alias: String,
        /// Fields not interpreted here.
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl ExportedName {
    /// `name` re-exported as `alias`.
    #[must_use]
    pub fn alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Alias {
            name: name.into(),
            alias: alias.into(),
            extra: Map::new(),
        }
    }

    /// The name this entry is visible as from the re-exporting module.
    pub fn exported_as(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Alias { alias, .. } => alias,
        }
    }
}

/// Kind of an exported symbol, used to build its descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SymbolKind {
    /// `export class Foo`.
    Class,
    /// `export interface Foo`.
    Interface,
    /// `export function foo`.
    Function,
    /// `export const foo` / `export let foo`.
    Variable,
    /// `export enum Foo`.
    Enum,
    /// `export type Foo = ...`.
    TypeAlias,
    /// `export { foo }` naming a local binding.
    Reference,
}

impl SymbolKind {
    /// The `__symbolic` tag written into descriptors.
    pub const fn symbolic(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Function => "function",
            Self::Variable => "variable",
            Self::Enum => "enum",
            Self::TypeAlias => "type",
            Self::Reference => "reference",
        }
    }

    /// A descriptor object for a symbol of this kind.
    ///
    /// ```
    /// use ngh_core::SymbolKind;
    ///
    /// assert_eq!(SymbolKind::Class.descriptor().to_string(), r#"{"__symbolic":"class"}"#);
    /// ```
    pub fn descriptor(self) -> Value {
        let mut object = Map::new();
        object.insert("__symbolic".to_owned(), Value::from(self.symbolic()));
        Value::Object(object)
    }
}

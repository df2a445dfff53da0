//! Pre-compiled tree-sitter queries for export extraction.
//!
//! The query only locates top-level `export` statements. What each statement
//! exports is read from its fields in [`crate::exports`], which keeps the
//! query itself independent of grammar details that vary between
//! `.ts` and `.d.ts` forms (`export class` vs `export declare class`).

use std::sync::OnceLock;

use tree_sitter::{Language, Query};

use crate::error::ParseError;

/// Tree-sitter query matching every top-level export statement.
///
/// # Capture Names
///
/// - `export.statement` - the `export_statement` node
pub const EXPORT_QUERY: &str = r"
; Top-level exports only; exports inside `declare module` blocks belong to another module
(program
  (export_statement) @export.statement)
";

/// Capture index for `export.statement`.
pub const CAPTURE_EXPORT_STATEMENT: u32 = 0;

/// Global cache for the compiled export query (TypeScript).
static COMPILED_QUERY_TS: OnceLock<Query> = OnceLock::new();

/// Global cache for the compiled export query (TSX).
static COMPILED_QUERY_TSX: OnceLock<Query> = OnceLock::new();

/// Returns the compiled export query for TypeScript.
///
/// The query is compiled once and cached for all subsequent calls.
///
/// # Errors
///
/// Returns [`ParseError::QueryCompile`] if the query fails to compile.
pub fn get_typescript_export_query() -> Result<&'static Query, ParseError> {
    if let Some(query) = COMPILED_QUERY_TS.get() {
        return Ok(query);
    }

    let language: Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
    let query = compile_query(&language)?;

    Ok(COMPILED_QUERY_TS.get_or_init(|| query))
}

/// Returns the compiled export query for TSX.
///
/// # Errors
///
/// Returns [`ParseError::QueryCompile`] if the query fails to compile.
pub fn get_tsx_export_query() -> Result<&'static Query, ParseError> {
    if let Some(query) = COMPILED_QUERY_TSX.get() {
        return Ok(query);
    }

    let language: Language = tree_sitter_typescript::LANGUAGE_TSX.into();
    let query = compile_query(&language)?;

    Ok(COMPILED_QUERY_TSX.get_or_init(|| query))
}

/// Compiles the export query for the given language.
fn compile_query(language: &Language) -> Result<Query, ParseError> {
    Query::new(language, EXPORT_QUERY).map_err(|e| ParseError::QueryCompile {
        offset: e.offset,
        kind: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_compiles() {
        let language: Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
        let result = compile_query(&language);
        assert!(result.is_ok(), "Query should compile: {result:?}");
    }

    #[test]
    fn test_tsx_query_compiles() {
        assert!(get_tsx_export_query().is_ok());
    }

    #[test]
    fn test_capture_names() {
        let query = get_typescript_export_query().unwrap();
        assert_eq!(
            query.capture_names()[CAPTURE_EXPORT_STATEMENT as usize],
            "export.statement"
        );
        assert_eq!(query.pattern_count(), 1);
    }
}

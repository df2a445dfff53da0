//! Error types for the ngh-ts-parser crate.
//!
//! This module provides the [`ParseError`] type for errors that can occur
//! while parsing TypeScript and collecting export metadata.

/// Errors that can occur during TypeScript parsing.
///
/// # Examples
///
/// ```
/// use ngh_ts_parser::ParseError;
///
/// fn describe(err: &ParseError) -> &'static str {
///     match err {
///         ParseError::LanguageInit => "grammar",
///         ParseError::QueryCompile { .. } => "query",
///         ParseError::Parse => "parse",
///     }
/// }
///
/// assert_eq!(describe(&ParseError::Parse), "parse");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to set the TypeScript language on the parser.
    #[error("failed to set TypeScript language")]
    LanguageInit,

    /// Failed to compile a tree-sitter query.
    #[error("failed to compile query at offset {offset}: {kind:?}")]
    QueryCompile {
        /// The byte offset in the query string where the error occurred.
        offset: usize,
        /// The underlying query error.
        kind: tree_sitter::QueryError,
    },

    /// Failed to parse the source code.
    ///
    /// This typically indicates the parser ran out of memory or was cancelled.
    #[error("failed to parse source code")]
    Parse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_init_display() {
        let err = ParseError::LanguageInit;
        assert_eq!(err.to_string(), "failed to set TypeScript language");
    }

    #[test]
    fn test_parse_display() {
        let err = ParseError::Parse;
        assert_eq!(err.to_string(), "failed to parse source code");
    }
}

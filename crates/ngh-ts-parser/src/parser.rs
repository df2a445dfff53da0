//! TypeScript parser management using tree-sitter.
//!
//! This module provides the [`TsParser`] struct for parsing TypeScript files
//! and extracting their exports.

use tree_sitter::{Language, Parser, Query, Tree};

use crate::error::ParseError;
use crate::exports::{ExportSummary, extract_exports};
use crate::queries::{get_tsx_export_query, get_typescript_export_query};

/// Indicates whether the parser is configured for TypeScript or TSX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserKind {
    TypeScript,
    Tsx,
}

/// Result of parsing a TypeScript file.
#[derive(Debug)]
pub struct ParseResult {
    /// Top-level exports of the file.
    pub exports: ExportSummary,

    /// The syntax tree from parsing.
    pub tree: Tree,
}

/// TypeScript parser for extracting exports from source files.
///
/// Wraps a tree-sitter parser configured for TypeScript or TSX. The parser can
/// be reused for multiple files to avoid repeated initialization.
///
/// # Thread Safety
///
/// `TsParser` is `Send` but not `Sync`. The compiled [`Query`] is shared
/// across all parser instances.
///
/// # Examples
///
/// ```
/// use ngh_ts_parser::TsParser;
///
/// let mut parser = TsParser::new()?;
/// let result = parser.parse("export class AppModule {}")?;
/// assert_eq!(result.exports.symbols[0].name, "AppModule");
/// # Ok::<(), ngh_ts_parser::ParseError>(())
/// ```
pub struct TsParser {
    /// The underlying tree-sitter parser.
    parser: Parser,
    /// The language the parser is configured for.
    language: Language,
    /// Whether this is a TypeScript or TSX parser.
    kind: ParserKind,
}

impl TsParser {
    /// Creates a new TypeScript parser.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LanguageInit`] if the TypeScript language
    /// cannot be set on the parser.
    pub fn new() -> Result<Self, ParseError> {
        Self::with_kind(ParserKind::TypeScript)
    }

    /// Creates a new TSX parser, for `.tsx` and `.jsx` files.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LanguageInit`] if the TSX language
    /// cannot be set on the parser.
    pub fn new_tsx() -> Result<Self, ParseError> {
        Self::with_kind(ParserKind::Tsx)
    }

    /// Creates the parser matching a file's extension.
    ///
    /// ```
    /// use ngh_ts_parser::TsParser;
    ///
    /// let parser = TsParser::for_file("/p/app/view.tsx")?;
    /// assert!(parser.is_tsx());
    /// # Ok::<(), ngh_ts_parser::ParseError>(())
    /// ```
    pub fn for_file(file_name: &str) -> Result<Self, ParseError> {
        if file_name.ends_with(".tsx") || file_name.ends_with(".jsx") {
            Self::new_tsx()
        } else {
            Self::new()
        }
    }

    fn with_kind(kind: ParserKind) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        let language: Language = match kind {
            ParserKind::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            ParserKind::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        };

        parser
            .set_language(&language)
            .map_err(|_| ParseError::LanguageInit)?;

        Ok(Self {
            parser,
            language,
            kind,
        })
    }

    /// Returns the appropriate export query for this parser's language.
    fn get_query(&self) -> Result<&'static Query, ParseError> {
        match self.kind {
            ParserKind::TypeScript => get_typescript_export_query(),
            ParserKind::Tsx => get_tsx_export_query(),
        }
    }

    /// Parses source code and extracts its exports.
    ///
    /// # Errors
    ///
    /// - Returns [`ParseError::Parse`] if parsing fails
    /// - Returns [`ParseError::QueryCompile`] if the export query fails to compile
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, ParseError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(ParseError::Parse)?;

        let query = self.get_query()?;
        let exports = extract_exports(&tree, source, query);

        Ok(ParseResult { exports, tree })
    }

    /// Returns `true` if this parser handles TSX.
    #[inline]
    pub fn is_tsx(&self) -> bool {
        self.kind == ParserKind::Tsx
    }

    /// Returns the tree-sitter language used by this parser.
    #[inline]
    pub fn language(&self) -> &Language {
        &self.language
    }
}

impl std::fmt::Debug for TsParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let language = match self.kind {
            ParserKind::TypeScript => "TypeScript",
            ParserKind::Tsx => "TSX",
        };
        f.debug_struct("TsParser")
            .field("language", &language)
            .finish_non_exhaustive()
    }
}

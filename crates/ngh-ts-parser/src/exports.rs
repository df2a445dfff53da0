//! Export extraction from TypeScript source using tree-sitter queries.
//!
//! # Export Forms Detected
//!
//! | Source | Result |
//! |---|---|
//! | `export class Foo {}` / `export declare class Foo` | symbol `Foo`, [`SymbolKind::Class`] |
//! | `export interface Foo {}` | symbol, [`SymbolKind::Interface`] |
//! | `export function foo()` / `export declare function foo(): void;` | symbol, [`SymbolKind::Function`] |
//! | `export const a = 1, b = 2;` | symbols `a`, `b`, [`SymbolKind::Variable`] |
//! | `export enum E {}` / `export type T = ...` | symbol, `Enum` / `TypeAlias` |
//! | `export { a, b as c };` | symbols `a`, `c`, [`SymbolKind::Reference`] |
//! | `export * as ns from './x';` | symbol `ns`, [`SymbolKind::Reference`] |
//! | `export * from './x';` | re-export of everything in `./x` |
//! | `export { a, b as c } from './x';` | re-export of `a` and `b` (as `c`) |

use ngh_core::{ExportDeclaration, ExportedName, SymbolKind};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor, Tree};

use crate::queries::CAPTURE_EXPORT_STATEMENT;

/// A symbol exported by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedSymbol {
    /// The name the symbol is exported as.
    pub name: String,
    /// What kind of declaration introduced it.
    pub kind: SymbolKind,
}

impl ExportedSymbol {
    /// Creates a new exported symbol.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Everything a module exports: its own symbols and its re-exports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Symbols declared (or locally re-bound) and exported by the module,
    /// in source order, first occurrence wins.
    pub symbols: SmallVec<[ExportedSymbol; 16]>,

    /// `export ... from '...'` declarations, in source order.
    pub reexports: SmallVec<[ExportDeclaration; 4]>,
}

impl ExportSummary {
    /// Returns `true` if the module exports nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.reexports.is_empty()
    }
}

/// Extracts all top-level exports from a parsed syntax tree.
///
/// # Arguments
///
/// * `tree` - The parsed syntax tree
/// * `source` - The source text
/// * `query` - The pre-compiled export query
pub fn extract_exports(tree: &Tree, source: &str, query: &Query) -> ExportSummary {
    let source_bytes = source.as_bytes();
    let mut collector = SummaryBuilder::default();

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), source_bytes);

    while let Some(match_) = matches.next() {
        for capture in match_.captures {
            if capture.index == CAPTURE_EXPORT_STATEMENT {
                collector.statement(capture.node, source_bytes);
            }
        }
    }

    collector.finish()
}

#[derive(Default)]
struct SummaryBuilder {
    summary: ExportSummary,
    seen: FxHashSet<String>,
}

impl SummaryBuilder {
    fn finish(self) -> ExportSummary {
        self.summary
    }

    fn push_symbol(&mut self, name: &str, kind: SymbolKind) {
        if self.seen.insert(name.to_owned()) {
            self.summary.symbols.push(ExportedSymbol::new(name, kind));
        }
    }

    fn statement(&mut self, node: Node<'_>, source: &[u8]) {
        let is_default = has_token(node, "default");

        if let Some(declaration) = node.child_by_field_name("declaration") {
            if is_default {
                let kind = declaration_kind(declaration).unwrap_or(SymbolKind::Reference);
                self.push_symbol("default", kind);
            } else {
                self.declaration(declaration, source);
            }
            return;
        }

        if is_default {
            self.push_symbol("default", SymbolKind::Reference);
            return;
        }

        let clause = first_child_of_kind(node, "export_clause");
        let from = node
            .child_by_field_name("source")
            .and_then(|s| node_text(s, source))
            .map(strip_quotes);

        match (from, clause) {
            (Some(from), Some(clause)) => {
                let names = clause_names(clause, source);
                self.summary.reexports.push(ExportDeclaration::named(from, names));
            }
            (Some(from), None) => {
                if let Some(namespace) = first_child_of_kind(node, "namespace_export") {
                    if let Some(name) = last_named_text(namespace, source) {
                        self.push_symbol(strip_quotes(name), SymbolKind::Reference);
                    }
                } else {
                    self.summary.reexports.push(ExportDeclaration::star(from));
                }
            }
            (None, Some(clause)) => {
                for name in clause_names(clause, source) {
                    self.push_symbol(name.exported_as(), SymbolKind::Reference);
                }
            }
            // `export = foo;` and `export as namespace Foo;` name no symbols.
            (None, None) => {}
        }
    }

    fn declaration(&mut self, node: Node<'_>, source: &[u8]) {
        match node.kind() {
            "ambient_declaration" => {
                let mut cursor = node.walk();
                let inner: SmallVec<[Node<'_>; 2]> = node.named_children(&mut cursor).collect();
                for child in inner {
                    self.declaration(child, source);
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = node.walk();
                let declarators: SmallVec<[Node<'_>; 4]> = node
                    .named_children(&mut cursor)
                    .filter(|child| child.kind() == "variable_declarator")
                    .collect();
                for declarator in declarators {
                    if let Some(name) = declarator
                        .child_by_field_name("name")
                        .filter(|n| n.kind() == "identifier")
                        .and_then(|n| node_text(n, source))
                    {
                        self.push_symbol(name, SymbolKind::Variable);
                    }
                }
            }
            _ => {
                let Some(kind) = declaration_kind(node) else {
                    return;
                };
                if let Some(name) = node
                    .child_by_field_name("name")
                    .and_then(|n| node_text(n, source))
                {
                    self.push_symbol(name, kind);
                }
            }
        }
    }
}

/// Maps a named declaration node to the kind of symbol it introduces.
fn declaration_kind(node: Node<'_>) -> Option<SymbolKind> {
    match node.kind() {
        "class_declaration" | "abstract_class_declaration" | "class" => Some(SymbolKind::Class),
        "interface_declaration" => Some(SymbolKind::Interface),
        "function_declaration" | "generator_function_declaration" | "function_signature" => {
            Some(SymbolKind::Function)
        }
        "enum_declaration" => Some(SymbolKind::Enum),
        "type_alias_declaration" => Some(SymbolKind::TypeAlias),
        "lexical_declaration" | "variable_declaration" => Some(SymbolKind::Variable),
        _ => None,
    }
}

/// Reads the specifiers of an `export { ... }` clause.
fn clause_names(clause: Node<'_>, source: &[u8]) -> Vec<ExportedName> {
    let mut cursor = clause.walk();
    clause
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "export_specifier")
        .filter_map(|specifier| {
            let name = specifier
                .child_by_field_name("name")
                .and_then(|n| node_text(n, source))
                .map(strip_quotes)?;
            let alias = specifier
                .child_by_field_name("alias")
                .and_then(|n| node_text(n, source))
                .map(strip_quotes);
            Some(match alias {
                Some(alias) if alias != name => ExportedName::alias(name, alias),
                _ => ExportedName::Name(name.to_owned()),
            })
        })
        .collect()
}

fn has_token(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|child| child.kind() == kind)
}

fn first_child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|child| child.kind() == kind)
}

fn last_named_text<'a>(node: Node<'_>, source: &'a [u8]) -> Option<&'a str> {
    let count = node.named_child_count();
    let last = node.named_child(count.checked_sub(1)?)?;
    node_text(last, source)
}

/// Extracts text from a node.
fn node_text<'a>(node: Node<'_>, source: &'a [u8]) -> Option<&'a str> {
    std::str::from_utf8(source.get(node.start_byte()..node.end_byte())?).ok()
}

/// Strips leading and trailing quotes from a string literal.
#[inline]
fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::get_typescript_export_query;
    use tree_sitter::{Language, Parser};

    fn summarize(source: &str) -> ExportSummary {
        let mut parser = Parser::new();
        let language: Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
        parser
            .set_language(&language)
            .expect("Failed to set language");
        let tree = parser.parse(source, None).expect("Parse failed");
        let query = get_typescript_export_query().expect("Query should compile");
        extract_exports(&tree, source, query)
    }

    fn names(summary: &ExportSummary) -> Vec<&str> {
        summary.symbols.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_extract_declarations() {
        let summary = summarize(
            r"
export class AppModule {}
export interface Options { id: string; }
export function bootstrap() {}
export enum Mode { A, B }
export type Id = string;
export const VERSION = '1', BUILD = 2;
",
        );
        assert_eq!(
            names(&summary),
            vec!["AppModule", "Options", "bootstrap", "Mode", "Id", "VERSION", "BUILD"]
        );
        assert_eq!(summary.symbols[0].kind, SymbolKind::Class);
        assert_eq!(summary.symbols[1].kind, SymbolKind::Interface);
        assert_eq!(summary.symbols[2].kind, SymbolKind::Function);
        assert_eq!(summary.symbols[3].kind, SymbolKind::Enum);
        assert_eq!(summary.symbols[4].kind, SymbolKind::TypeAlias);
        assert_eq!(summary.symbols[5].kind, SymbolKind::Variable);
        assert!(summary.reexports.is_empty());
    }

    #[test]
    fn test_extract_ambient_declarations() {
        let summary = summarize(
            r"
export declare class Observable<T> {
    subscribe(): void;
}
export declare function of<T>(value: T): Observable<T>;
export declare const EMPTY: Observable<never>;
",
        );
        assert_eq!(names(&summary), vec!["Observable", "of", "EMPTY"]);
        assert_eq!(summary.symbols[0].kind, SymbolKind::Class);
        assert_eq!(summary.symbols[1].kind, SymbolKind::Function);
        assert_eq!(summary.symbols[2].kind, SymbolKind::Variable);
    }

    #[test]
    fn test_overloads_recorded_once() {
        let summary = summarize(
            r"
export declare function pick(a: string): string;
export declare function pick(a: number): number;
",
        );
        assert_eq!(names(&summary), vec!["pick"]);
    }

    #[test]
    fn test_extract_reexports() {
        let summary = summarize(
            r"
export * from './operators';
export { map, filter as where } from './lib/ops';
",
        );
        assert!(summary.symbols.is_empty());
        assert_eq!(summary.reexports.len(), 2);
        assert_eq!(summary.reexports[0], ExportDeclaration::star("./operators"));

        let second = &summary.reexports[1];
        assert_eq!(second.from, "./lib/ops");
        assert_eq!(
            second.export.as_deref(),
            Some(
                &[
                    ExportedName::Name("map".to_owned()),
                    ExportedName::alias("filter", "where"),
                ][..]
            )
        );
    }

    #[test]
    fn test_local_export_clause() {
        let summary = summarize(
            r"
class Impl {}
const helper = 1;
export { Impl as Service, helper };
",
        );
        assert_eq!(names(&summary), vec!["Service", "helper"]);
        assert!(summary.symbols.iter().all(|s| s.kind == SymbolKind::Reference));
    }

    #[test]
    fn test_namespace_reexport() {
        let summary = summarize("export * as ops from './ops';");
        assert_eq!(names(&summary), vec!["ops"]);
        assert!(summary.reexports.is_empty());
    }

    #[test]
    fn test_nested_module_exports_ignored() {
        let summary = summarize(
            r"
declare module 'other' {
    export class Hidden {}
}
export class Visible {}
",
        );
        assert_eq!(names(&summary), vec!["Visible"]);
    }

    #[test]
    fn test_no_exports() {
        let summary = summarize("const x = 1;\nfunction foo() { return x; }\n");
        assert!(summary.is_empty());
    }
}

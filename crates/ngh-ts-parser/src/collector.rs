//! Export metadata collection.
//!
//! [`TsMetadataCollector`] turns a file's top-level exports into a current
//! schema [`ModuleMetadata`] record, the same shape a `.metadata.json`
//! sidecar carries.

use ngh_core::ModuleMetadata;

use crate::error::ParseError;
use crate::exports::ExportSummary;
use crate::parser::TsParser;

/// Collects export metadata from TypeScript source text.
///
/// # Examples
///
/// ```
/// use ngh_ts_parser::TsMetadataCollector;
///
/// let collector = TsMetadataCollector::new();
/// let record = collector
///     .collect_metadata("/p/app.ts", "export class AppModule {}")?
///     .expect("file has exports");
///
/// assert!(record.is_current());
/// assert!(record.metadata.contains_key("AppModule"));
/// # Ok::<(), ngh_ts_parser::ParseError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TsMetadataCollector;

impl TsMetadataCollector {
    /// Creates a new collector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses `source` and builds its metadata record.
    ///
    /// The grammar is picked from `file_name`'s extension. Returns `Ok(None)`
    /// when the file exports nothing.
    pub fn collect_metadata(
        &self,
        file_name: &str,
        source: &str,
    ) -> Result<Option<ModuleMetadata>, ParseError> {
        let mut parser = TsParser::for_file(file_name)?;
        let result = parser.parse(source)?;
        Ok(to_metadata(result.exports))
    }
}

/// Builds a current-version record from an export summary.
pub fn to_metadata(exports: ExportSummary) -> Option<ModuleMetadata> {
    if exports.is_empty() {
        return None;
    }

    let mut record = ModuleMetadata::current();
    for symbol in exports.symbols {
        record.metadata.insert(symbol.name, symbol.kind.descriptor());
    }
    if !exports.reexports.is_empty() {
        record.exports = Some(exports.reexports.into_vec());
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_declaration_file() {
        let collector = TsMetadataCollector::new();
        let source = r"
export declare class Observable<T> {}
export * from './operators';
";
        let record = collector
            .collect_metadata("/p/node_modules/rxjs/Observable.d.ts", source)
            .unwrap()
            .unwrap();

        insta::assert_json_snapshot!(record, @r#"
        {
          "__symbolic": "module",
          "version": 3,
          "exports": [
            {
              "from": "./operators"
            }
          ],
          "metadata": {
            "Observable": {
              "__symbolic": "class"
            }
          }
        }
        "#);
    }

    #[test]
    fn test_collect_nothing_exported() {
        let collector = TsMetadataCollector::new();
        let record = collector
            .collect_metadata("/p/a.ts", "const local = 1;")
            .unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_reexport_only_file_has_no_symbols() {
        let collector = TsMetadataCollector::new();
        let record = collector
            .collect_metadata("/p/index.ts", "export * from './a';")
            .unwrap()
            .unwrap();
        assert!(record.metadata.is_empty());
        assert_eq!(record.exports.map(|e| e.len()), Some(1));
    }
}

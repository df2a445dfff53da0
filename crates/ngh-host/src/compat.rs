//! Version 1 sidecar compatibility.
//!
//! Older sidecars carry only a version 1 record. When no version 3 record sits
//! beside it, one is synthesized from the legacy record and the declaration
//! file's own extracted exports, then appended to the list. Nothing else in the
//! crate knows the legacy format exists.

use ngh_core::ModuleMetadata;
use serde_json::Value;

use crate::error::HostError;

/// Returns `true` if `records` hold a legacy record and no current one.
pub fn needs_upgrade(records: &[ModuleMetadata]) -> bool {
    let legacy = records.iter().any(ModuleMetadata::is_legacy);
    let current = records.iter().any(ModuleMetadata::is_current);
    legacy && !current
}

/// Synthesizes a current record from a legacy one.
///
/// Legacy `exports` and `metadata` are copied verbatim. Symbols from
/// `extracted` fill keys whose legacy value is missing or falsy (`null`,
/// `false`, `0`, `""`); they never overwrite any other legacy value. Extracted `exports` are adopted only when the legacy record
/// has none.
///
/// # Examples
///
/// ```
/// use ngh_core::{ModuleMetadata, SymbolKind};
/// use ngh_host::compat::upgrade_legacy;
///
/// let legacy: ModuleMetadata = serde_json::from_str(
///     r#"{"__symbolic": "module", "version": 1, "metadata": {"A": {"__symbolic": "class"}}}"#,
/// )?;
/// let mut extracted = ModuleMetadata::current();
/// extracted.metadata.insert("A".into(), SymbolKind::Function.descriptor());
/// extracted.metadata.insert("B".into(), SymbolKind::Enum.descriptor());
///
/// let upgraded = upgrade_legacy(&legacy, Some(&extracted));
/// assert!(upgraded.is_current());
/// assert_eq!(upgraded.metadata["A"], SymbolKind::Class.descriptor());
/// assert_eq!(upgraded.metadata["B"], SymbolKind::Enum.descriptor());
/// # Ok::<(), serde_json::Error>(())
/// ```
pub fn upgrade_legacy(
    legacy: &ModuleMetadata,
    extracted: Option<&ModuleMetadata>,
) -> ModuleMetadata {
    let mut upgraded = ModuleMetadata::current();
    upgraded.exports = legacy.exports.clone();
    upgraded.metadata = legacy.metadata.clone();

    let Some(extracted) = extracted else {
        return upgraded;
    };

    for (name, value) in &extracted.metadata {
        if upgraded.metadata.get(name).is_none_or(is_falsy) {
            upgraded.metadata.insert(name.clone(), value.clone());
        }
    }
    if upgraded.exports.is_none() {
        upgraded.exports = extracted.exports.clone();
    }
    upgraded
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_none_or(|n| n == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Appends a synthesized current record when only a legacy one is present.
///
/// `extract` is called at most once, and only when an upgrade happens.
pub(crate) fn upgrade_records<F>(records: &mut Vec<ModuleMetadata>, extract: F) -> Result<(), HostError>
where
    F: FnOnce() -> Result<Option<ModuleMetadata>, HostError>,
{
    if !needs_upgrade(records) {
        return Ok(());
    }
    let Some(legacy) = records.iter().find(|record| record.is_legacy()) else {
        return Ok(());
    };

    let extracted = extract()?;
    let upgraded = upgrade_legacy(legacy, extracted.as_ref());
    records.push(upgraded);
    Ok(())
}

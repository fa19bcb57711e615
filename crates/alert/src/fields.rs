//! Dotted-field-path helpers.
//!
//! Search responses flatten nested fields into dotted paths
//! (`host.name`), while alert payloads carry them as nested objects
//! (`{"host": {"name": ...}}`). These helpers rebuild the nested form;
//! the behavior is deliberately hand-rolled so the payload shape stays
//! stable for downstream consumers.

use serde_json::{Map, Value};

/// Set `value` at the dotted `path` inside `target`, creating
/// intermediate objects as needed.
///
/// An intermediate non-object value is replaced by an object; the last
/// writer wins, matching flat-map insertion semantics.
pub fn set_nested(target: &mut Map<String, Value>, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = target;
    for part in parents {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(map) = entry else {
            unreachable!();
        };
        current = map;
    }
    current.insert(last.to_string(), value);
}

/// Rebuild a nested object from flat `(dotted path, value)` entries.
pub fn unflatten<'a, I>(entries: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (&'a str, Value)>,
{
    let mut out = Map::new();
    for (path, value) in entries {
        set_nested(&mut out, path, value);
    }
    out
}

/// Unwrap a single-element array to its element.
///
/// Top-hits field values always arrive as arrays; single values are
/// surfaced as scalars in alert context, multi-value fields stay arrays.
pub fn unwrap_single(value: &Value) -> Value {
    match value {
        Value::Array(items) if items.len() == 1 => items[0].clone(),
        other => other.clone(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

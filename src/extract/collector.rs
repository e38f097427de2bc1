//! Target collection: gathering every value of a key within a resolved scope.

use crate::extract::types::{ArraySelector, ExtractedValue, ValueSet};
use serde_json::Value;

/// Collect every value of `target_key` found at any depth inside `scope`.
///
/// Unlike the anchor search, a match does not stop the descent: the matched
/// value is materialized and then scanned for further nested occurrences of
/// the same key.
pub(crate) fn collect_values(
    scope: &Value,
    target_key: &str,
    selector: ArraySelector,
    results: &mut ValueSet,
) {
    match scope {
        Value::Object(entries) => {
            for (key, child) in entries {
                if key == target_key {
                    materialize(child, results);
                }
                collect_values(child, target_key, selector, results);
            }
        }
        Value::Array(items) => {
            for item in selector.select(items) {
                collect_values(item, target_key, selector, results);
            }
        }
        _ => {}
    }
}

/// Turn a matched value into result entries.
///
/// Arrays flatten recursively, element by element. Objects and nulls emit
/// nothing; the traversal reaches into objects separately.
fn materialize(value: &Value, results: &mut ValueSet) {
    match value {
        Value::String(text) => {
            results.insert(ExtractedValue::String(text.clone()));
        }
        Value::Number(number) => {
            results.insert(ExtractedValue::from_number(number));
        }
        Value::Bool(flag) => {
            results.insert(ExtractedValue::Bool(*flag));
        }
        Value::Array(items) => {
            for item in items {
                materialize(item, results);
            }
        }
        Value::Object(_) | Value::Null => {}
    }
}

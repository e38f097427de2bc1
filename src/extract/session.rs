//! Extraction sessions: the public operations tying anchor resolution and
//! target collection together.
//!
//! Every operation is a pure function of the document and its parameters.
//! Argument problems fail fast before any traversal; everything the traversal
//! itself runs into (missing keys, scalar roots, out-of-range indexes)
//! degrades to an empty result instead.

use crate::extract::anchor::{resolve_chain_scopes, resolve_scopes};
use crate::extract::collector::collect_values;
use crate::extract::types::{ArraySelector, ExtractError, Result, ValueSet};
use indexmap::IndexMap;
use serde_json::Value;

/// Extract every value of `target_key` found beneath any occurrence of
/// `path_key`, deduplicated in first-found order.
pub fn extract_all_values(doc: &Value, path_key: &str, target_key: &str) -> Result<ValueSet> {
    extract_values(doc, path_key, target_key, ArraySelector::All)
}

/// Like [`extract_all_values`], but only the `index`-th element of every
/// array is visited during traversal.
pub fn extract_all_values_with_index(
    doc: &Value,
    path_key: &str,
    target_key: &str,
    index: usize,
) -> Result<ValueSet> {
    extract_values(doc, path_key, target_key, ArraySelector::Index(index))
}

/// Extract target values beneath the scopes reached by consuming
/// `path_chain` key by key.
pub fn extract_with_path_chain(
    doc: &Value,
    path_chain: &[&str],
    target_key: &str,
) -> Result<ValueSet> {
    extract_chain_values(doc, path_chain, target_key, ArraySelector::All)
}

/// Like [`extract_with_path_chain`], restricted to the `index`-th element of
/// every array.
pub fn extract_with_path_chain_and_index(
    doc: &Value,
    path_chain: &[&str],
    target_key: &str,
    index: usize,
) -> Result<ValueSet> {
    extract_chain_values(doc, path_chain, target_key, ArraySelector::Index(index))
}

/// Find every string-valued occurrence of `string_field_key`, parse each
/// string as an independent JSON document, and run the anchored extraction
/// against the parsed tree.
///
/// A string that fails to parse contributes nothing for that occurrence; the
/// search continues across the rest of the outer document.
pub fn extract_from_string_field(
    doc: &Value,
    string_field_key: &str,
    path_key: &str,
    target_key: &str,
) -> Result<ValueSet> {
    let string_field_key = require_key(string_field_key, "string field key")?;
    let path_key = require_key(path_key, "path key")?;
    let target_key = require_key(target_key, "target key")?;

    let mut results = ValueSet::new();
    for embedded in find_string_fields(doc, string_field_key) {
        let Ok(parsed) = serde_json::from_str::<Value>(embedded) else {
            continue;
        };
        for scope in resolve_scopes(&parsed, path_key, ArraySelector::All) {
            collect_values(scope, target_key, ArraySelector::All, &mut results);
        }
    }
    Ok(results)
}

/// Chain form of [`extract_from_string_field`].
pub fn extract_from_string_field_with_path_chain(
    doc: &Value,
    string_field_key: &str,
    path_chain: &[&str],
    target_key: &str,
) -> Result<ValueSet> {
    let string_field_key = require_key(string_field_key, "string field key")?;
    let path_chain = require_chain(path_chain)?;
    let target_key = require_key(target_key, "target key")?;

    let mut results = ValueSet::new();
    for embedded in find_string_fields(doc, string_field_key) {
        let Ok(parsed) = serde_json::from_str::<Value>(embedded) else {
            continue;
        };
        for scope in resolve_chain_scopes(&parsed, path_chain, ArraySelector::All) {
            collect_values(scope, target_key, ArraySelector::All, &mut results);
        }
    }
    Ok(results)
}

/// Run several (path key, target key) extractions against one document.
///
/// The result map is keyed by target key in mapping order; a later mapping
/// with the same target key replaces the earlier result set in place.
pub fn batch_extract(
    doc: &Value,
    mappings: &[(&str, &str)],
) -> Result<IndexMap<String, ValueSet>> {
    let mut results = IndexMap::new();
    for (path_key, target_key) in mappings {
        let values = extract_all_values(doc, path_key, target_key)?;
        results.insert((*target_key).to_string(), values);
    }
    Ok(results)
}

/// Parse raw document text, rejecting empty input up front.
pub fn parse_document(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }
    Ok(serde_json::from_str(text)?)
}

/// String-input form of [`extract_all_values`].
pub fn extract_all_values_from_str(
    text: &str,
    path_key: &str,
    target_key: &str,
) -> Result<ValueSet> {
    let doc = parse_document(text)?;
    extract_all_values(&doc, path_key, target_key)
}

/// String-input form of [`batch_extract`].
pub fn batch_extract_from_str(
    text: &str,
    mappings: &[(&str, &str)],
) -> Result<IndexMap<String, ValueSet>> {
    let doc = parse_document(text)?;
    batch_extract(&doc, mappings)
}

fn extract_values(
    doc: &Value,
    path_key: &str,
    target_key: &str,
    selector: ArraySelector,
) -> Result<ValueSet> {
    let path_key = require_key(path_key, "path key")?;
    let target_key = require_key(target_key, "target key")?;

    let mut results = ValueSet::new();
    for scope in resolve_scopes(doc, path_key, selector) {
        collect_values(scope, target_key, selector, &mut results);
    }
    Ok(results)
}

fn extract_chain_values(
    doc: &Value,
    path_chain: &[&str],
    target_key: &str,
    selector: ArraySelector,
) -> Result<ValueSet> {
    let path_chain = require_chain(path_chain)?;
    let target_key = require_key(target_key, "target key")?;

    let mut results = ValueSet::new();
    for scope in resolve_chain_scopes(doc, path_chain, selector) {
        collect_values(scope, target_key, selector, &mut results);
    }
    Ok(results)
}

/// Depth-first, left-to-right scan for string values stored under
/// `field_key`. The scan is unrestricted by any anchor and never recurses
/// into the strings it finds.
fn find_string_fields<'a>(doc: &'a Value, field_key: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    scan_string_fields(doc, field_key, &mut found);
    found
}

fn scan_string_fields<'a>(node: &'a Value, field_key: &str, found: &mut Vec<&'a str>) {
    match node {
        Value::Object(entries) => {
            for (key, child) in entries {
                if key == field_key {
                    if let Value::String(text) = child {
                        found.push(text);
                    }
                }
                scan_string_fields(child, field_key, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                scan_string_fields(item, field_key, found);
            }
        }
        _ => {}
    }
}

fn require_key<'a>(key: &'a str, name: &'static str) -> Result<&'a str> {
    if key.is_empty() {
        return Err(ExtractError::EmptyKey(name));
    }
    Ok(key)
}

fn require_chain<'a, 'k>(path_chain: &'a [&'k str]) -> Result<&'a [&'k str]> {
    if path_chain.is_empty() {
        return Err(ExtractError::EmptyPathChain);
    }
    for key in path_chain {
        require_key(key, "path chain key")?;
    }
    Ok(path_chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::types::ExtractedValue;
    use serde_json::json;

    fn strings(values: &ValueSet) -> Vec<&str> {
        values
            .iter()
            .map(|v| match v {
                ExtractedValue::String(s) => s.as_str(),
                other => panic!("expected a string, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_extracts_deeply_nested_target() {
        let doc = json!({"a": {"l1": {"l2": {"x": "deep"}}}});
        let values = extract_all_values(&doc, "a", "x").unwrap();

        assert_eq!(strings(&values), vec!["deep"]);
    }

    #[test]
    fn test_collects_from_all_matching_anchors() {
        let doc = json!({
            "first": {"a": {"x": "env1"}},
            "second": {"a": {"x": "env2"}}
        });
        let values = extract_all_values(&doc, "a", "x").unwrap();

        assert_eq!(strings(&values), vec!["env1", "env2"]);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let doc = json!({
            "a": {
                "x": "env1",
                "nested": {"x": "env2"},
                "list": [{"x": "env1"}, {"x": "env3"}]
            }
        });
        let values = extract_all_values(&doc, "a", "x").unwrap();

        assert_eq!(strings(&values), vec!["env1", "env2", "env3"]);
    }

    #[test]
    fn test_self_nesting_discards_outer_scope() {
        let doc = json!({"a": {"x": "outer", "a": {"x": "inner"}}});
        let values = extract_all_values(&doc, "a", "x").unwrap();

        assert_eq!(strings(&values), vec!["inner"]);
    }

    #[test]
    fn test_array_index_selects_one_branch() {
        let doc = json!({"a": {"items": [{"x": "first"}, {"x": "second"}]}});
        let values = extract_all_values_with_index(&doc, "a", "x", 0).unwrap();

        assert_eq!(strings(&values), vec!["first"]);
    }

    #[test]
    fn test_array_index_out_of_range_contributes_nothing() {
        let doc = json!({"a": {"items": [{"x": "first"}, {"x": "second"}]}});
        let values = extract_all_values_with_index(&doc, "a", "x", 2).unwrap();

        assert!(values.is_empty());
    }

    #[test]
    fn test_chain_excludes_sibling_targets() {
        let doc = json!({"a": {"x": "ignored", "a1": {"x": "found"}}});
        let values = extract_with_path_chain(&doc, &["a", "a1"], "x").unwrap();

        assert_eq!(strings(&values), vec!["found"]);
    }

    #[test]
    fn test_chain_with_index() {
        let doc = json!({
            "a": {"envs": [{"b": {"x": "zero"}}, {"b": {"x": "one"}}]}
        });
        let values = extract_with_path_chain_and_index(&doc, &["a", "b"], "x", 1).unwrap();

        assert_eq!(strings(&values), vec!["one"]);
    }

    #[test]
    fn test_mixed_types_preserve_value_classes() {
        let doc = json!({"a": {"x": "str", "n": {"x": 123}, "b": {"x": true}, "f": {"x": 1.0}}});
        let values = extract_all_values(&doc, "a", "x").unwrap();

        let items: Vec<&ExtractedValue> = values.iter().collect();
        assert_eq!(items[0], &ExtractedValue::String("str".to_string()));
        assert_eq!(items[1], &ExtractedValue::Integer(123));
        assert_eq!(items[2], &ExtractedValue::Bool(true));
        // 1.0 classifies by value and deduplicates against nothing here
        assert_eq!(items[3], &ExtractedValue::Integer(1));
    }

    #[test]
    fn test_scalar_root_yields_empty_result() {
        assert!(extract_all_values(&json!("scalar"), "a", "x")
            .unwrap()
            .is_empty());
        assert!(extract_all_values(&json!(null), "a", "x").unwrap().is_empty());
    }

    #[test]
    fn test_empty_keys_fail_fast() {
        let doc = json!({"a": {"x": "v"}});
        assert!(matches!(
            extract_all_values(&doc, "", "x"),
            Err(ExtractError::EmptyKey("path key"))
        ));
        assert!(matches!(
            extract_all_values(&doc, "a", ""),
            Err(ExtractError::EmptyKey("target key"))
        ));
        assert!(matches!(
            extract_with_path_chain(&doc, &[], "x"),
            Err(ExtractError::EmptyPathChain)
        ));
        assert!(matches!(
            extract_with_path_chain(&doc, &["a", ""], "x"),
            Err(ExtractError::EmptyKey("path chain key"))
        ));
        assert!(matches!(
            extract_from_string_field(&doc, "", "a", "x"),
            Err(ExtractError::EmptyKey("string field key"))
        ));
    }

    #[test]
    fn test_parse_document_rejects_empty_and_malformed_text() {
        assert!(matches!(parse_document(""), Err(ExtractError::EmptyDocument)));
        assert!(matches!(
            parse_document("   "),
            Err(ExtractError::EmptyDocument)
        ));
        assert!(matches!(
            parse_document("{not json"),
            Err(ExtractError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_extract_from_str_end_to_end() {
        let text = r#"{"a":{"x":"env1","nested":{"x":"env2"}}}"#;
        let values = extract_all_values_from_str(text, "a", "x").unwrap();

        assert_eq!(strings(&values), vec!["env1", "env2"]);
    }

    #[test]
    fn test_string_field_extraction() {
        let doc = json!({
            "payload": "{\"a\":{\"x\":\"embedded\"}}",
            "other": {"payload": "{\"a\":{\"x\":\"nested-embedded\"}}"}
        });
        let values = extract_from_string_field(&doc, "payload", "a", "x").unwrap();

        assert_eq!(strings(&values), vec!["embedded", "nested-embedded"]);
    }

    #[test]
    fn test_string_field_recovers_from_malformed_embedded_document() {
        let doc = json!({
            "f": "not json",
            "g": {"f": "{\"a\":{\"x\":\"v\"}}"}
        });
        let values = extract_from_string_field(&doc, "f", "a", "x").unwrap();

        assert_eq!(strings(&values), vec!["v"]);
    }

    #[test]
    fn test_string_field_ignores_non_string_occurrences() {
        let doc = json!({
            "f": {"a": {"x": "not reached"}},
            "g": {"f": "{\"a\":{\"x\":\"reached\"}}"}
        });
        let values = extract_from_string_field(&doc, "f", "a", "x").unwrap();

        assert_eq!(strings(&values), vec!["reached"]);
    }

    #[test]
    fn test_string_field_with_chain() {
        let doc = json!({
            "f": "{\"a\":{\"x\":\"ignored\",\"a1\":{\"x\":\"found\"}}}"
        });
        let values =
            extract_from_string_field_with_path_chain(&doc, "f", &["a", "a1"], "x").unwrap();

        assert_eq!(strings(&values), vec!["found"]);
    }

    #[test]
    fn test_batch_extract_keeps_mapping_order() {
        let doc = json!({"a": {"aenv": "env1"}, "b": {"benv": "benv1"}});
        let results = batch_extract(&doc, &[("a", "aenv"), ("b", "benv")]).unwrap();

        let keys: Vec<&String> = results.keys().collect();
        assert_eq!(keys, vec!["aenv", "benv"]);
        assert_eq!(strings(&results["aenv"]), vec!["env1"]);
        assert_eq!(strings(&results["benv"]), vec!["benv1"]);
    }

    #[test]
    fn test_batch_extract_later_mapping_overwrites() {
        let doc = json!({
            "database": {"host": "db-host"},
            "cache": {"host": "cache-host"}
        });
        let results = batch_extract(&doc, &[("database", "host"), ("cache", "host")]).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(strings(&results["host"]), vec!["cache-host"]);
    }

    #[test]
    fn test_environment_config_scenario() {
        let doc = json!({
            "development": {
                "env": "dev",
                "services": [
                    {"name": "api", "env": "dev-api"},
                    {"name": "web", "env": "dev-web"}
                ]
            },
            "production": {
                "env": "prod",
                "services": [{"name": "api", "env": "prod-api"}]
            }
        });

        let dev = extract_all_values(&doc, "development", "env").unwrap();
        assert_eq!(strings(&dev), vec!["dev", "dev-api", "dev-web"]);

        let prod = extract_all_values(&doc, "production", "env").unwrap();
        assert_eq!(strings(&prod), vec!["prod", "prod-api"]);
    }

    #[test]
    fn test_replica_hosts_scenario() {
        let doc = json!({
            "database": {
                "host": "localhost",
                "replicas": [{"host": "replica1"}, {"host": "replica2"}]
            },
            "cache": {"host": "redis-server", "clusters": [{"host": "cluster1"}]}
        });
        let values = extract_all_values(&doc, "database", "host").unwrap();

        assert_eq!(strings(&values), vec!["localhost", "replica1", "replica2"]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let doc = json!({"a": {"x": "v1", "n": {"x": "v2"}}});
        let first = extract_all_values(&doc, "a", "x").unwrap();
        let second = extract_all_values(&doc, "a", "x").unwrap();

        let a: Vec<&ExtractedValue> = first.iter().collect();
        let b: Vec<&ExtractedValue> = second.iter().collect();
        assert_eq!(a, b);
    }
}

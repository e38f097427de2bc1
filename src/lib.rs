//! # Sluice - Anchored JSON Value Extraction
//!
//! A library for pulling configuration-like values out of nested JSON
//! documents whose shape is not fully known in advance. An anchor key
//! ("path key") may sit at any depth; the target key may sit at any depth
//! beneath it; values may be buried in arrays; and an anchor nested directly
//! inside an anchor of the same name resolves to the innermost occurrence.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use sluice::extract_all_values;
//!
//! # fn main() -> anyhow::Result<()> {
//! let doc = json!({
//!     "development": {
//!         "env": "dev",
//!         "services": [{"name": "api", "env": "dev-api"}]
//!     }
//! });
//!
//! let values = extract_all_values(&doc, "development", "env")?;
//!
//! // values = {"dev", "dev-api"} in first-found order
//! assert_eq!(values.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ### Path chains
//!
//! ```rust
//! use serde_json::json;
//! use sluice::extract_with_path_chain;
//!
//! let doc = json!({"a": {"x": "ignored", "a1": {"x": "found"}}});
//! let values = extract_with_path_chain(&doc, &["a", "a1"], "x").unwrap();
//!
//! assert_eq!(values.len(), 1);
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::BufRead;

pub mod extract;

// Re-export the operation surface and result types for convenience
pub use extract::{
    batch_extract, batch_extract_from_str, extract_all_values, extract_all_values_from_str,
    extract_all_values_with_index, extract_from_string_field,
    extract_from_string_field_with_path_chain, extract_with_path_chain,
    extract_with_path_chain_and_index, parse_document, ExtractError, ExtractedValue, ValueSet,
};

/// Run an anchored extraction over a stream of newline-delimited JSON
/// documents, unioning per-line results in order.
pub fn extract_ndjson<R: BufRead>(
    reader: R,
    path_key: &str,
    target_key: &str,
) -> Result<ValueSet> {
    let mut results = ValueSet::new();

    for line in reader.lines() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line).context("Failed to parse JSON")?;

        results.extend(extract_all_values(&value, path_key, target_key)?);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndjson_union_keeps_order() {
        let input = concat!(
            "{\"a\":{\"x\":\"one\"}}\n",
            "\n",
            "{\"a\":{\"x\":\"two\",\"n\":{\"x\":\"one\"}}}\n",
        );

        let values = extract_ndjson(input.as_bytes(), "a", "x").unwrap();

        let rendered: Vec<String> = values
            .iter()
            .map(|v| serde_json::to_string(v).unwrap())
            .collect();
        assert_eq!(rendered, vec!["\"one\"", "\"two\""]);
    }

    #[test]
    fn test_ndjson_propagates_parse_failure() {
        let input = "{\"a\":{\"x\":\"one\"}}\nnot json\n";
        assert!(extract_ndjson(input.as_bytes(), "a", "x").is_err());
    }
}

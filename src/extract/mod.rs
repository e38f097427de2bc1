//! Anchored value extraction - pull target-key values out of nested JSON
//!
//! This module implements the two-phase search: resolve every scope opened
//! by an anchor key (or a chain of anchor keys), then collect the target
//! key's values at any depth within each scope. Results are deduplicated
//! with first-found order preserved.

pub mod anchor;
pub mod collector;
pub mod session;
pub mod types;

pub use session::{
    batch_extract, batch_extract_from_str, extract_all_values, extract_all_values_from_str,
    extract_all_values_with_index, extract_from_string_field,
    extract_from_string_field_with_path_chain, extract_with_path_chain,
    extract_with_path_chain_and_index, parse_document,
};
pub use types::{ExtractError, ExtractedValue, Result, ValueSet};

use indexmap::IndexSet;
use serde::Serialize;
use serde_json::Value;
use std::hash::{Hash, Hasher};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors raised before any traversal starts. Everything else in the
/// extraction pipeline degrades to "no match" instead of failing.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("document text cannot be empty")]
    EmptyDocument,

    #[error("{0} cannot be empty")]
    EmptyKey(&'static str),

    #[error("path chain cannot be empty")]
    EmptyPathChain,

    #[error("malformed JSON document: {0}")]
    MalformedDocument(#[from] serde_json::Error),
}

/// A scalar pulled out of a document.
///
/// Only scalars appear in extraction results: objects and nulls are never
/// emitted, and arrays are flattened into their elements. Numbers are split
/// by value, so `1.0` comes out as `Integer(1)` while `1.5` stays a float.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExtractedValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl ExtractedValue {
    /// Classify a JSON number by its value, not its spelling: `1.0` is an
    /// integer. Integral magnitudes outside the i64 range stay floats.
    pub(crate) fn from_number(number: &serde_json::Number) -> Self {
        if let Some(integer) = number.as_i64() {
            return ExtractedValue::Integer(integer);
        }
        let float = number.as_f64().unwrap_or(f64::NAN);
        if float.is_finite()
            && float.fract() == 0.0
            && float >= i64::MIN as f64
            && float < i64::MAX as f64
        {
            ExtractedValue::Integer(float as i64)
        } else {
            ExtractedValue::Float(float)
        }
    }
}

// JSON numbers cannot be NaN, so bit-pattern comparison gives well-behaved
// set membership for floats.
impl PartialEq for ExtractedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExtractedValue::String(a), ExtractedValue::String(b)) => a == b,
            (ExtractedValue::Integer(a), ExtractedValue::Integer(b)) => a == b,
            (ExtractedValue::Float(a), ExtractedValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ExtractedValue::Bool(a), ExtractedValue::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ExtractedValue {}

impl Hash for ExtractedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ExtractedValue::String(text) => text.hash(state),
            ExtractedValue::Integer(integer) => integer.hash(state),
            ExtractedValue::Float(float) => float.to_bits().hash(state),
            ExtractedValue::Bool(flag) => flag.hash(state),
        }
    }
}

/// Result collection for every extraction operation: set semantics with
/// first-insertion order.
pub type ValueSet = IndexSet<ExtractedValue>;

/// Which elements of an array the traversal visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArraySelector {
    /// Visit every element.
    All,
    /// Visit only the n-th element of every array encountered. Selection is
    /// local to each array; shorter arrays contribute nothing.
    Index(usize),
}

impl ArraySelector {
    pub(crate) fn select(self, items: &[Value]) -> &[Value] {
        match self {
            ArraySelector::All => items,
            ArraySelector::Index(n) => items.get(n).map(std::slice::from_ref).unwrap_or(&[]),
        }
    }
}

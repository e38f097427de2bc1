//! Anchor resolution: locating the subtree(s) a target search runs within.

use crate::extract::types::ArraySelector;
use serde_json::Value;

/// Find every occurrence of `path_key` anywhere in the tree and return the
/// scope each one opens.
///
/// A matching entry stops the anchor search in that branch: the entry's value
/// becomes a scope as-is, except that an anchor directly wrapping another
/// anchor of the same name collapses to the innermost occurrence. Siblings
/// and unrelated branches keep being searched, so several anchors can each
/// contribute a scope.
pub(crate) fn resolve_scopes<'a>(
    root: &'a Value,
    path_key: &str,
    selector: ArraySelector,
) -> Vec<&'a Value> {
    let mut scopes = Vec::new();
    search_anchor(root, path_key, selector, &mut scopes);
    scopes
}

/// Consume a chain of anchor keys in order, each round narrowing the scope
/// set by searching the previous round's scopes for the next key.
///
/// A scope with no match for the current key drops out; if every scope drops
/// out, the chain resolves to nothing.
pub(crate) fn resolve_chain_scopes<'a>(
    root: &'a Value,
    path_chain: &[&str],
    selector: ArraySelector,
) -> Vec<&'a Value> {
    let mut scopes = vec![root];
    for key in path_chain {
        let mut narrowed = Vec::new();
        for scope in &scopes {
            search_anchor(scope, key, selector, &mut narrowed);
        }
        scopes = narrowed;
        if scopes.is_empty() {
            break;
        }
    }
    scopes
}

fn search_anchor<'a>(
    node: &'a Value,
    path_key: &str,
    selector: ArraySelector,
    scopes: &mut Vec<&'a Value>,
) {
    match node {
        Value::Object(entries) => {
            for (key, child) in entries {
                if key == path_key {
                    scopes.push(collapse_self_nesting(child, path_key));
                } else {
                    search_anchor(child, path_key, selector, scopes);
                }
            }
        }
        Value::Array(items) => {
            for item in selector.select(items) {
                search_anchor(item, path_key, selector, scopes);
            }
        }
        _ => {}
    }
}

/// Resolve `a` nested directly inside `a` to the innermost occurrence.
///
/// Only the immediate form collapses: the candidate must be an object whose
/// own entry carries the anchor key. An anchor reachable through
/// differently-named wrappers opens its own scope instead.
fn collapse_self_nesting<'a>(mut scope: &'a Value, path_key: &str) -> &'a Value {
    while let Value::Object(entries) = scope {
        match entries.get(path_key) {
            Some(inner) => scope = inner,
            None => break,
        }
    }
    scope
}

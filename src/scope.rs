//! Layered binding scopes consulted during parameter lookup
//!
//! A [`ScopeChain`] is an ordered sequence of binding objects searched front
//! to back; earlier entries shadow later ones. The chain is only ever mutated
//! by the iteration directive, which pushes per-element scopes at the front
//! and must restore the chain exactly — [`ScopeChain::with_front_scopes`]
//! enforces that on every exit path.

use std::collections::VecDeque;

use serde_json::Value;

use crate::path::Segment;

#[derive(Debug, Default)]
pub struct ScopeChain {
    entries: VecDeque<Value>,
}

impl ScopeChain {
    /// Create a chain from binding scopes ordered outermost last.
    pub fn new(scopes: Vec<Value>) -> Self {
        Self {
            entries: scopes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk a parsed parameter path through the chain. The first scope that
    /// satisfies the full path wins; scopes that miss anywhere along the path
    /// are skipped silently. A `null` found at the end of the walk is a
    /// genuine value, not a miss.
    pub fn find(&self, segments: &[Segment]) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|scope| find_in(scope, segments))
    }

    /// Push `scopes` at the front of the chain (first entry ends up
    /// frontmost), run `f`, then pop them again. The pop happens on every
    /// exit path, so an error inside `f` cannot corrupt the chain.
    pub fn with_front_scopes<T>(
        &mut self,
        scopes: Vec<Value>,
        f: impl FnOnce(&mut ScopeChain) -> T,
    ) -> T {
        let count = scopes.len();
        for scope in scopes.into_iter().rev() {
            self.entries.push_front(scope);
        }
        let result = f(self);
        for _ in 0..count {
            self.entries.pop_front();
        }
        result
    }
}

fn find_in<'a>(scope: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    let mut current = scope;
    for segment in segments {
        current = current.as_object()?.get(&segment.key)?;
        if let Some(index) = segment.index {
            // An index suffix requires an array with the index in range;
            // anything else abandons this scope.
            current = current.as_array()?.get(index)?;
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use serde_json::json;

    fn find<'a>(chain: &'a ScopeChain, name: &str) -> Option<&'a Value> {
        chain.find(&path::parse(name).expect("Should parse"))
    }

    #[test]
    fn test_first_scope_wins() {
        let chain = ScopeChain::new(vec![json!({"x": 1}), json!({"x": 2})]);
        assert_eq!(find(&chain, "x"), Some(&json!(1)));
    }

    #[test]
    fn test_missing_key_falls_back_to_next_scope() {
        let chain = ScopeChain::new(vec![json!({}), json!({"x": 1})]);
        assert_eq!(find(&chain, "x"), Some(&json!(1)));
    }

    #[test]
    fn test_nested_path_with_index() {
        let chain = ScopeChain::new(vec![json!({"a": {"b": [10, 20, 30]}})]);
        assert_eq!(find(&chain, "a.b[1]"), Some(&json!(20)));
    }

    #[test]
    fn test_out_of_range_index_abandons_scope() {
        let chain = ScopeChain::new(vec![json!({"a": [1]}), json!({"a": [1, 2, 3]})]);
        assert_eq!(find(&chain, "a[2]"), Some(&json!(3)));
    }

    #[test]
    fn test_index_into_non_array_abandons_scope() {
        let chain = ScopeChain::new(vec![json!({"a": "text"})]);
        assert_eq!(find(&chain, "a[0]"), None);
    }

    #[test]
    fn test_null_is_a_value_not_a_miss() {
        let chain = ScopeChain::new(vec![json!({"x": null}), json!({"x": 1})]);
        assert_eq!(find(&chain, "x"), Some(&Value::Null));
    }

    #[test]
    fn test_with_front_scopes_restores_chain_on_error() {
        let mut chain = ScopeChain::new(vec![json!({"x": 1})]);
        let result: Result<(), ()> =
            chain.with_front_scopes(vec![json!({"y": 2}), json!({"z": 3})], |chain| {
                assert_eq!(chain.len(), 3);
                Err(())
            });
        assert!(result.is_err());
        assert_eq!(chain.len(), 1);
        assert_eq!(find(&chain, "x"), Some(&json!(1)));
        assert_eq!(find(&chain, "y"), None);
    }

    #[test]
    fn test_front_scopes_shadow_in_push_order() {
        let mut chain = ScopeChain::new(vec![json!({"x": 1})]);
        chain.with_front_scopes(vec![json!({"x": 2}), json!({"x": 3})], |chain| {
            assert_eq!(find(chain, "x"), Some(&json!(2)));
        });
    }
}

//! Parameter usage counters and duplicate-binding diagnostics

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Counts how many times each parameter path was successfully resolved.
/// Diagnostic only; cleared at the start of every top-level resolve.
#[derive(Debug, Default)]
pub struct UsageStats {
    counts: BTreeMap<String, u64>,
}

impl UsageStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, parameter: &str) {
        *self.counts.entry(parameter.to_string()).or_insert(0) += 1;
    }

    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

/// Leaf parameter paths bound in more than one scope, with the distinct
/// values observed across the chain.
pub type DuplicateMap = BTreeMap<String, Vec<Value>>;

/// Flatten every binding scope independently into leaf dotted paths
/// (recursing through objects only; arrays and scalars are leaves) and report
/// each path contributed by more than one scope. Purely diagnostic — scope
/// ordering still decides which value a lookup sees.
pub fn find_duplicates(scopes: &[Value]) -> DuplicateMap {
    let mut observed: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for scope in scopes {
        if let Some(object) = scope.as_object() {
            flatten(None, object, &mut observed);
        }
    }
    observed
        .into_iter()
        .filter(|(_, values)| values.len() > 1)
        .map(|(path, values)| {
            let mut distinct: Vec<Value> = Vec::new();
            for value in values {
                if !distinct.contains(&value) {
                    distinct.push(value);
                }
            }
            (path, distinct)
        })
        .collect()
}

fn flatten(
    prefix: Option<&str>,
    object: &Map<String, Value>,
    out: &mut BTreeMap<String, Vec<Value>>,
) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten(Some(&name), nested, out),
            leaf => out.entry(name).or_default().push(leaf.clone()),
        }
    }
}

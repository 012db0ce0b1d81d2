//! Final pass stripping one level of backslash escaping
//!
//! Escapes protect placeholder syntax and path separators during resolution;
//! once resolution is done, a single left-to-right pass removes exactly one
//! backslash before any character in every string leaf, keys included.

use serde_json::{Map, Value};

pub fn unescape_value(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(unescape_string(&text)),
        Value::Array(items) => Value::Array(items.into_iter().map(unescape_value).collect()),
        Value::Object(entries) => {
            let mut out = Map::with_capacity(entries.len());
            for (key, value) in entries {
                out.insert(unescape_string(&key), unescape_value(value));
            }
            Value::Object(out)
        }
        other => other,
    }
}

fn unescape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unescape_string_leaves() {
        let value = unescape_value(json!({"a": "\\${x}", "b": ["a\\.b", 1, null]}));
        assert_eq!(value, json!({"a": "${x}", "b": ["a.b", 1, null]}));
    }

    #[test]
    fn test_unescape_keys() {
        let value = unescape_value(json!({"a\\.b": 1}));
        assert_eq!(value, json!({"a.b": 1}));
    }

    #[test]
    fn test_double_backslash_collapses_to_one() {
        assert_eq!(unescape_string("a\\\\b"), "a\\b");
    }

    #[test]
    fn test_trailing_backslash_is_dropped() {
        assert_eq!(unescape_string("ab\\"), "ab");
    }

    #[test]
    fn test_non_strings_pass_through() {
        assert_eq!(unescape_value(json!(3)), json!(3));
        assert_eq!(unescape_value(json!(true)), json!(true));
        assert_eq!(unescape_value(Value::Null), Value::Null);
    }
}

//! Placeholder interpolation inside template strings
//!
//! A single left-to-right scan tracks `${` positions on a stack. When a `}`
//! closes the innermost placeholder, the enclosed name is looked up in the
//! scope chain. A placeholder spanning the whole string hands back the looked
//! up value in its structured form; otherwise its text form is spliced in and
//! the scan resumes at the splice point, so substituted text that introduces
//! new placeholder syntax is itself re-scanned.

use serde_json::Value;

use crate::error::TemplateError;
use crate::path;
use crate::scope::ScopeChain;

use super::Resolver;

impl Resolver<'_> {
    pub(crate) fn resolve_string(
        &mut self,
        text: &str,
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError> {
        let mut buf = text.to_string();
        let mut starts: Vec<usize> = Vec::new();
        let mut i = 0;
        while i < buf.len() {
            match buf.as_bytes()[i] {
                // A backslash escapes the next character.
                b'\\' => i += 2,
                b'$' if buf.as_bytes().get(i + 1) == Some(&b'{') => {
                    starts.push(i);
                    i += 2;
                }
                b'}' => match starts.pop() {
                    None => i += 1,
                    Some(start) => {
                        let name = buf[start + 2..i].to_string();
                        let value = self.lookup(&name, scopes)?;
                        if start == 0 && i + 1 == buf.len() {
                            // The placeholder is the entire string: return the
                            // resolved value without converting it to text.
                            return self.resolve(&value, scopes);
                        }
                        let resolved = self.resolve(&value, scopes)?.ok_or_else(|| {
                            TemplateError::ElidedInString {
                                name: name.clone(),
                                text: text.to_string(),
                            }
                        })?;
                        let splice = match resolved {
                            Value::String(text) => text,
                            other => other.to_string(),
                        };
                        buf.replace_range(start..i + 1, &splice);
                        i = start;
                    }
                },
                _ => i += 1,
            }
        }
        if !starts.is_empty() {
            return Err(TemplateError::MalformedString(text.to_string()));
        }
        Ok(Some(Value::String(buf)))
    }

    fn lookup(&mut self, name: &str, scopes: &ScopeChain) -> Result<Value, TemplateError> {
        let segments = path::parse(name)?;
        match scopes.find(&segments) {
            Some(value) => {
                let value = value.clone();
                self.usage.record(name);
                Ok(value)
            }
            None => Err(TemplateError::UnresolvableParameter(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::DirectiveRegistry;
    use crate::loader::FileLoader;
    use crate::stats::UsageStats;
    use serde_json::json;

    fn resolve_text(text: &str, scopes: Vec<Value>) -> Result<Option<Value>, TemplateError> {
        let registry = DirectiveRegistry::with_builtins();
        let mut loader = FileLoader::new();
        let mut usage = UsageStats::new();
        let mut resolver = Resolver::new(&registry, &mut loader, &mut usage);
        let mut chain = ScopeChain::new(scopes);
        resolver.resolve_string(text, &mut chain)
    }

    #[test]
    fn test_whole_string_placeholder_keeps_value_kind() {
        let value = resolve_text("${x}", vec![json!({"x": 1})]).expect("Should resolve");
        assert_eq!(value, Some(json!(1)));
    }

    #[test]
    fn test_partial_placeholder_splices_text() {
        let value =
            resolve_text("prefix-${x}-suffix", vec![json!({"x": 1})]).expect("Should resolve");
        assert_eq!(value, Some(json!("prefix-1-suffix")));
    }

    #[test]
    fn test_non_string_splice_uses_json_text() {
        let value = resolve_text("flag=${b}", vec![json!({"b": true})]).expect("Should resolve");
        assert_eq!(value, Some(json!("flag=true")));
    }

    #[test]
    fn test_dotted_and_indexed_path() {
        let value = resolve_text("${a.b[1]}", vec![json!({"a": {"b": [10, 20, 30]}})])
            .expect("Should resolve");
        assert_eq!(value, Some(json!(20)));
    }

    #[test]
    fn test_scope_fallback() {
        let value = resolve_text("${x}", vec![json!({}), json!({"x": 1})]).expect("Should resolve");
        assert_eq!(value, Some(json!(1)));
    }

    #[test]
    fn test_escaped_placeholder_is_left_alone() {
        let value = resolve_text("\\${x}", vec![json!({})]).expect("Should resolve");
        // The escape survives until the final unescape pass.
        assert_eq!(value, Some(json!("\\${x}")));
    }

    #[test]
    fn test_unbalanced_placeholder_is_error() {
        let result = resolve_text("${x", vec![json!({"x": 1})]);
        assert!(matches!(result, Err(TemplateError::MalformedString(_))));
    }

    #[test]
    fn test_stray_close_brace_is_literal() {
        let value = resolve_text("a}b", vec![json!({})]).expect("Should resolve");
        assert_eq!(value, Some(json!("a}b")));
    }

    #[test]
    fn test_unknown_parameter_is_error() {
        let result = resolve_text("${missing}", vec![json!({"x": 1})]);
        assert!(matches!(
            result,
            Err(TemplateError::UnresolvableParameter(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_substituted_text_is_rescanned() {
        let scopes = vec![json!({"x": "${y}", "y": 1})];
        let value = resolve_text("value=${x}", scopes).expect("Should resolve");
        assert_eq!(value, Some(json!("value=1")));
    }

    #[test]
    fn test_whole_string_indirection_resolves_structurally() {
        let scopes = vec![json!({"x": "${y}", "y": [1, 2]})];
        let value = resolve_text("${x}", scopes).expect("Should resolve");
        assert_eq!(value, Some(json!([1, 2])));
    }

    #[test]
    fn test_nested_placeholder_builds_parameter_name() {
        let scopes = vec![json!({"i": 1, "x1": "deep"})];
        let value = resolve_text("${x${i}}", scopes).expect("Should resolve");
        assert_eq!(value, Some(json!("deep")));
    }
}

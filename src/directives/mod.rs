//! Directive dispatch: `#`-marked names invoked from arrays or object keys
//!
//! A directive invocation is a list whose first element is a marked name
//! (`["#at", value, key]`), or an object key carrying its arguments as a list
//! (`{"#for-each": [src, tpl]}`). The registry is open for extension: later
//! registrations shadow built-ins of the same name.

mod at;
mod convert;
mod exists;
mod for_each;
mod len;
mod one_of;

use std::collections::HashMap;

use serde_json::Value;

use crate::error::TemplateError;
use crate::expr;
use crate::resolver::Resolver;
use crate::scope::ScopeChain;

pub use at::At;
pub use convert::{ToBool, ToFloat, ToInt};
pub use exists::Exists;
pub use for_each::{ForEach, INDEX_PARAMETER};
pub use len::Len;
pub use one_of::OneOf;

/// First character of every directive name
pub const MARKER: char = '#';

/// Text from this separator to the end of a directive key is ignored during
/// dispatch, so one object can carry the same directive under distinct keys
/// (`"#one-of:a"`, `"#one-of:b"`).
pub const LABEL_SEPARATOR: char = ':';

/// A directive handler. Arguments arrive unresolved; each handler decides
/// which of them to resolve eagerly and which to defer.
pub trait Directive {
    fn process(
        &self,
        args: &[Value],
        rt: &mut Resolver<'_>,
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError>;
}

pub struct DirectiveRegistry {
    handlers: HashMap<String, Box<dyn Directive>>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("at", Box::new(At));
        registry.register("exists", Box::new(Exists));
        registry.register("len", Box::new(Len));
        registry.register("for-each", Box::new(ForEach));
        registry.register("one-of", Box::new(OneOf));
        registry.register("to-bool", Box::new(ToBool));
        registry.register("to-int", Box::new(ToInt));
        registry
    }

    /// Register a handler, shadowing any existing binding of the same name.
    pub fn register(&mut self, name: impl Into<String>, handler: Box<dyn Directive>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Directive> {
        self.handlers.get(name).map(|handler| handler.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|name| name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for DirectiveRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Handlers for optional directives that are not registered by default;
/// named from startup configuration.
pub fn extension(name: &str) -> Option<Box<dyn Directive>> {
    match name {
        "to-float" => Some(Box::new(ToFloat)),
        _ => None,
    }
}

pub(crate) fn is_invocation(items: &[Value]) -> bool {
    matches!(items.first(), Some(Value::String(head)) if is_directive_key(head))
}

pub(crate) fn is_directive_key(key: &str) -> bool {
    key.len() > 1 && key.starts_with(MARKER)
}

/// Strip the marker and any `:label` suffix from a directive head.
pub(crate) fn dispatch_name(head: &str) -> &str {
    let name = &head[1..];
    match name.find(LABEL_SEPARATOR) {
        Some(position) => &name[..position],
        None => name,
    }
}

/// Evaluate a resolved condition operand. Genuine booleans pass through;
/// strings go through the expression evaluator.
pub(crate) fn eval_condition(value: &Value, directive: &str) -> Result<bool, TemplateError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(text) => expr::eval(text).map_err(|source| TemplateError::Condition {
            expr: text.clone(),
            source,
        }),
        other => Err(TemplateError::directive(
            directive,
            format!(
                "condition must be a boolean or an expression string, found {}",
                other
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_invocation() {
        assert!(is_invocation(&[json!("#at"), json!([1]), json!(0)]));
        assert!(!is_invocation(&[json!("at"), json!([1])]));
        assert!(!is_invocation(&[json!("#")]));
        assert!(!is_invocation(&[]));
        assert!(!is_invocation(&[json!(1), json!("#at")]));
    }

    #[test]
    fn test_dispatch_name_strips_marker_and_label() {
        assert_eq!(dispatch_name("#one-of"), "one-of");
        assert_eq!(dispatch_name("#one-of:first"), "one-of");
        assert_eq!(dispatch_name("#len:"), "len");
    }

    #[test]
    fn test_registry_shadowing() {
        struct Nothing;
        impl Directive for Nothing {
            fn process(
                &self,
                _args: &[Value],
                _rt: &mut Resolver<'_>,
                _scopes: &mut ScopeChain,
            ) -> Result<Option<Value>, TemplateError> {
                Ok(None)
            }
        }

        let mut registry = DirectiveRegistry::with_builtins();
        assert!(registry.get("len").is_some());
        registry.register("len", Box::new(Nothing));
        assert!(registry.get("len").is_some());
        assert!(registry.get("no-such-directive").is_none());
    }

    #[test]
    fn test_extension_lookup() {
        assert!(extension("to-float").is_some());
        assert!(extension("ipv4-subnet").is_none());
    }

    #[test]
    fn test_eval_condition_accepts_genuine_booleans() {
        assert!(eval_condition(&json!(true), "one-of").expect("Should evaluate"));
        assert!(!eval_condition(&json!(false), "one-of").expect("Should evaluate"));
        assert!(eval_condition(&json!("2 == 2"), "one-of").expect("Should evaluate"));
        let result = eval_condition(&json!(3), "one-of");
        assert!(matches!(result, Err(TemplateError::Directive { .. })));
    }
}

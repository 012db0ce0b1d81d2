//! Error types for template resolution

use serde_json::Value;
use thiserror::Error;

use crate::expr::ExprError;

#[derive(Error, Debug)]
pub enum TemplateError {
    /// Every scope in the chain was exhausted for a parameter path.
    /// Recoverable by probing directives such as `exists`.
    #[error("unable to resolve parameter \"{0}\"")]
    UnresolvableParameter(String),

    /// Unbalanced `${`/`}` in a template string
    #[error("mis-formed parameterized string \"{0}\"")]
    MalformedString(String),

    /// A parameter path that cannot be parsed at all
    #[error("invalid parameter path \"{path}\": {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("unknown directive \"{0}\"")]
    UnknownDirective(String),

    /// Wrong arity, argument shape, or resolved argument type for a directive
    #[error("directive \"{name}\": {detail}")]
    Directive { name: String, detail: String },

    /// A directive used as an object key must carry its arguments as a list
    #[error("value of directive key \"{key}\" must be a list, found {value}")]
    DirectiveKeyArgs { key: String, value: Value },

    /// A directive used as an object key may only produce an object (merged
    /// into the enclosing object) or nothing at all
    #[error("directive key \"{key}\" produced a non-object result {value}")]
    DirectiveKeyResult { key: String, value: Value },

    /// A placeholder inside a larger string resolved to an elided value,
    /// which has no text form
    #[error("parameter \"{name}\" produced no value inside string \"{text}\"")]
    ElidedInString { name: String, text: String },

    #[error("failed to evaluate condition \"{expr}\": {source}")]
    Condition { expr: String, source: ExprError },

    #[error("resource \"{name}\": {reason}")]
    ResourceLoad { name: String, reason: String },

    /// Loads and unloads must pair up in strict LIFO order
    #[error("resource unload out of order: expected \"{expected}\", requested \"{requested}\"")]
    UnloadOrder { expected: String, requested: String },

    #[error("binding scope must be a JSON object, found {0}")]
    InvalidBindingScope(Value),
}

impl TemplateError {
    pub(crate) fn directive(name: &str, detail: impl Into<String>) -> Self {
        TemplateError::Directive {
            name: name.to_string(),
            detail: detail.into(),
        }
    }
}

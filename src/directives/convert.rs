//! Strict string-to-scalar coercion directives

use serde_json::Value;

use crate::error::TemplateError;
use crate::resolver::Resolver;
use crate::scope::ScopeChain;

use super::Directive;

/// `to-bool` — `"true"`/`"false"` (case-insensitive) to a boolean
pub struct ToBool;

impl Directive for ToBool {
    fn process(
        &self,
        args: &[Value],
        rt: &mut Resolver<'_>,
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError> {
        let text = string_argument("to-bool", args, rt, scopes)?;
        match text.to_ascii_lowercase().as_str() {
            "true" => Ok(Some(Value::Bool(true))),
            "false" => Ok(Some(Value::Bool(false))),
            _ => Err(TemplateError::directive(
                "to-bool",
                format!("invalid boolean string \"{}\"", text),
            )),
        }
    }
}

/// `to-int` — decimal integer string to a number
pub struct ToInt;

impl Directive for ToInt {
    fn process(
        &self,
        args: &[Value],
        rt: &mut Resolver<'_>,
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError> {
        let text = string_argument("to-int", args, rt, scopes)?;
        let number = text.trim().parse::<i64>().map_err(|_| {
            TemplateError::directive("to-int", format!("invalid integer string \"{}\"", text))
        })?;
        Ok(Some(Value::from(number)))
    }
}

/// `to-float` — decimal float string to a number. Not registered by default;
/// enabled through the extension configuration.
pub struct ToFloat;

impl Directive for ToFloat {
    fn process(
        &self,
        args: &[Value],
        rt: &mut Resolver<'_>,
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError> {
        let text = string_argument("to-float", args, rt, scopes)?;
        let number = text.trim().parse::<f64>().map_err(|_| {
            TemplateError::directive("to-float", format!("invalid float string \"{}\"", text))
        })?;
        let number = serde_json::Number::from_f64(number).ok_or_else(|| {
            TemplateError::directive("to-float", format!("non-finite float \"{}\"", text))
        })?;
        Ok(Some(Value::Number(number)))
    }
}

fn string_argument(
    name: &str,
    args: &[Value],
    rt: &mut Resolver<'_>,
    scopes: &mut ScopeChain,
) -> Result<String, TemplateError> {
    if args.len() != 1 {
        return Err(TemplateError::directive(
            name,
            format!("requires 1 argument, found {}", args.len()),
        ));
    }
    match rt.resolve(&args[0], scopes)? {
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(TemplateError::directive(
            name,
            format!("argument must be a string, found {}", other),
        )),
        None => Err(TemplateError::directive(name, "argument produced no value")),
    }
}

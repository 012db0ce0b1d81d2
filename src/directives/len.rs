//! `len` — element, entry, or character count

use serde_json::Value;

use crate::error::TemplateError;
use crate::resolver::Resolver;
use crate::scope::ScopeChain;

use super::Directive;

const NAME: &str = "len";

pub struct Len;

impl Directive for Len {
    fn process(
        &self,
        args: &[Value],
        rt: &mut Resolver<'_>,
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError> {
        if args.len() != 1 {
            return Err(TemplateError::directive(
                NAME,
                format!("requires 1 argument, found {}", args.len()),
            ));
        }
        let value = rt.resolve(&args[0], scopes)?;
        let length: i64 = match &value {
            Some(Value::Array(items)) => items.len() as i64,
            Some(Value::Object(entries)) => entries.len() as i64,
            Some(Value::String(text)) => text.chars().count() as i64,
            Some(Value::Null) => 0,
            // Numbers, booleans and elided values have no length.
            _ => -1,
        };
        Ok(Some(Value::from(length)))
    }
}

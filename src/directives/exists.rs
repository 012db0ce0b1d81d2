//! `exists` — probe whether a parameter reference can be resolved

use serde_json::Value;

use crate::error::TemplateError;
use crate::resolver::Resolver;
use crate::scope::ScopeChain;

use super::Directive;

const NAME: &str = "exists";

/// Returns a genuine boolean; only an exhausted scope chain counts as
/// "does not exist", every other failure still propagates.
pub struct Exists;

impl Directive for Exists {
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
        match rt.resolve(&args[0], scopes) {
            Ok(_) => Ok(Some(Value::Bool(true))),
            Err(TemplateError::UnresolvableParameter(_)) => Ok(Some(Value::Bool(false))),
            Err(error) => Err(error),
        }
    }
}

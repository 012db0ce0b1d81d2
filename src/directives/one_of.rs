//! `one-of` — select the value paired with the first true condition

use serde_json::Value;

use crate::error::TemplateError;
use crate::resolver::Resolver;
use crate::scope::ScopeChain;

use super::{eval_condition, Directive};

const NAME: &str = "one-of";

/// Arguments are `[condition, value]` pairs evaluated in order, optionally
/// followed by one bare default. No match and no default elides the result.
pub struct OneOf;

impl Directive for OneOf {
    fn process(
        &self,
        args: &[Value],
        rt: &mut Resolver<'_>,
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError> {
        if args.is_empty() {
            return Err(TemplateError::directive(
                NAME,
                "requires at least 1 argument",
            ));
        }
        let last = args.len() - 1;
        for (position, arg) in args.iter().enumerate() {
            match arg {
                Value::Array(pair) if pair.len() == 2 => {
                    let condition = rt.resolve(&pair[0], scopes)?.ok_or_else(|| {
                        TemplateError::directive(NAME, "condition produced no value")
                    })?;
                    if eval_condition(&condition, NAME)? {
                        return rt.resolve(&pair[1], scopes);
                    }
                }
                Value::Array(items) => {
                    return Err(TemplateError::directive(
                        NAME,
                        format!(
                            "expected a [condition, value] pair, found a list of {} elements",
                            items.len()
                        ),
                    ));
                }
                default if position == last => return rt.resolve(default, scopes),
                unexpected => {
                    return Err(TemplateError::directive(
                        NAME,
                        format!(
                            "bare value {} is only allowed as the final default",
                            unexpected
                        ),
                    ));
                }
            }
        }
        Ok(None)
    }
}

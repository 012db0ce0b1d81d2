//! `at` — index into a resolved array or object

use serde_json::Value;

use crate::error::TemplateError;
use crate::resolver::Resolver;
use crate::scope::ScopeChain;

use super::Directive;

const NAME: &str = "at";

pub struct At;

impl Directive for At {
    fn process(
        &self,
        args: &[Value],
        rt: &mut Resolver<'_>,
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError> {
        if args.len() != 2 {
            return Err(TemplateError::directive(
                NAME,
                format!("requires 2 arguments, found {}", args.len()),
            ));
        }
        let data = rt.resolve(&args[0], scopes)?;
        let key = rt
            .resolve(&args[1], scopes)?
            .ok_or_else(|| TemplateError::directive(NAME, "key argument produced no value"))?;
        match data {
            Some(Value::Array(items)) => {
                let index = integer_key(&key)?;
                match items.get(index) {
                    Some(value) => Ok(Some(value.clone())),
                    None => Err(TemplateError::directive(
                        NAME,
                        format!(
                            "index {} out of range for array of {} elements",
                            index,
                            items.len()
                        ),
                    )),
                }
            }
            Some(Value::Object(entries)) => {
                let name = key.as_str().ok_or_else(|| {
                    TemplateError::directive(
                        NAME,
                        format!("object access requires a string key, found {}", key),
                    )
                })?;
                match entries.get(name) {
                    Some(value) => Ok(Some(value.clone())),
                    None => Err(TemplateError::directive(
                        NAME,
                        format!("key \"{}\" not found", name),
                    )),
                }
            }
            // Anything else has no addressable elements.
            _ => Ok(None),
        }
    }
}

fn integer_key(key: &Value) -> Result<usize, TemplateError> {
    let index = match key {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    match index {
        Some(index) if index >= 0 => Ok(index as usize),
        Some(index) => Err(TemplateError::directive(
            NAME,
            format!("negative index {}", index),
        )),
        None => Err(TemplateError::directive(
            NAME,
            format!("array access requires an integer index, found {}", key),
        )),
    }
}

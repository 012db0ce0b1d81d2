//! `for-each` — resolve a template once per element of a source array

use serde_json::{json, Value};

use crate::error::TemplateError;
use crate::resolver::Resolver;
use crate::scope::ScopeChain;

use super::{eval_condition, Directive};

/// Binding name carrying the 0-based iteration position
pub const INDEX_PARAMETER: &str = "_index_";

const NAME: &str = "for-each";

/// `["#for-each", source, template, guard?]`: the source must resolve to an
/// array of objects, the template is loaded once through the resource loader,
/// and each element is resolved with itself and `{"_index_": i}` pushed at
/// the front of the chain. A falsy guard skips the iteration. Both the scope
/// pushes and the template load are released on every exit path.
pub struct ForEach;

impl Directive for ForEach {
    fn process(
        &self,
        args: &[Value],
        rt: &mut Resolver<'_>,
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError> {
        if args.len() < 2 || args.len() > 3 {
            return Err(TemplateError::directive(
                NAME,
                format!("requires 2 or 3 arguments, found {}", args.len()),
            ));
        }
        let source = rt
            .resolve(&args[0], scopes)?
            .ok_or_else(|| TemplateError::directive(NAME, "iteration source produced no value"))?;
        let items = match source {
            Value::Array(items) => items,
            other => {
                return Err(TemplateError::directive(
                    NAME,
                    format!("iteration source must be an array, found {}", other),
                ))
            }
        };
        let resource = template_name(&args[1], rt, scopes)?;
        rt.with_resource(&resource, |rt, template| {
            let mut output = Vec::with_capacity(items.len());
            for (position, item) in items.iter().enumerate() {
                if !item.is_object() {
                    return Err(TemplateError::directive(
                        NAME,
                        format!("iteration source elements must be objects, found {}", item),
                    ));
                }
                let front = vec![item.clone(), json!({ INDEX_PARAMETER: position })];
                let resolved = scopes.with_front_scopes(
                    front,
                    |scopes| -> Result<Option<Value>, TemplateError> {
                        if let Some(guard) = args.get(2) {
                            let condition = rt.resolve(guard, scopes)?.ok_or_else(|| {
                                TemplateError::directive(NAME, "guard produced no value")
                            })?;
                            if !eval_condition(&condition, NAME)? {
                                return Ok(None);
                            }
                        }
                        rt.resolve(template, scopes)
                    },
                )?;
                if let Some(value) = resolved {
                    output.push(value);
                }
            }
            Ok(Some(Value::Array(output)))
        })
    }
}

/// The template argument usually resolves to a resource name up front. When
/// that resolution needs per-iteration bindings it fails here; the raw text
/// is then handed to the loader, whose literal-string fallback defers the
/// expansion to each iteration.
fn template_name(
    arg: &Value,
    rt: &mut Resolver<'_>,
    scopes: &mut ScopeChain,
) -> Result<String, TemplateError> {
    match rt.resolve(arg, scopes) {
        Ok(Some(Value::String(name))) => Ok(name),
        Ok(Some(other)) => Err(TemplateError::directive(
            NAME,
            format!("template argument must be a resource name, found {}", other),
        )),
        Ok(None) => Err(TemplateError::directive(
            NAME,
            "template argument produced no value",
        )),
        Err(_) => match arg {
            Value::String(name) => Ok(name.clone()),
            other => Err(TemplateError::directive(
                NAME,
                format!("template argument must be a resource name, found {}", other),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directives::DirectiveRegistry;
    use crate::loader::{FileLoader, ResourceLoader};
    use crate::stats::UsageStats;
    use serde_json::json;

    #[test]
    fn test_scope_chain_restored_after_failed_iteration() {
        let registry = DirectiveRegistry::with_builtins();
        let mut loader = FileLoader::new();
        let mut usage = UsageStats::new();
        let mut resolver = Resolver::new(&registry, &mut loader, &mut usage);
        let mut chain = ScopeChain::new(vec![json!({"list": [{"z": 1}, {"z": 2}]})]);

        // The template references a parameter no scope provides, so the
        // first iteration fails mid-loop.
        let args = vec![json!("${list}"), json!(r#"{"v": "${no_such_param}"}"#)];
        let result = ForEach.process(&args, &mut resolver, &mut chain);
        assert!(matches!(
            result,
            Err(TemplateError::UnresolvableParameter(_))
        ));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_guard_error_restores_chain_and_loader() {
        let registry = DirectiveRegistry::with_builtins();
        let mut loader = FileLoader::new();
        let mut usage = UsageStats::new();
        let mut resolver = Resolver::new(&registry, &mut loader, &mut usage);
        let mut chain = ScopeChain::new(vec![json!({"list": [{"z": 1}]})]);

        let args = vec![
            json!("${list}"),
            json!(r#"{"v": "${z}"}"#),
            json!("${z} =="),
        ];
        let result = ForEach.process(&args, &mut resolver, &mut chain);
        assert!(matches!(result, Err(TemplateError::Condition { .. })));
        assert_eq!(chain.len(), 1);
        drop(resolver);
        // The template was unloaded despite the error, so the loader's
        // context stack is balanced again.
        loader.load("{}").expect("Should load");
        loader.unload("{}").expect("Should unload");
        assert!(matches!(
            loader.unload("{}"),
            Err(TemplateError::UnloadOrder { .. })
        ));
    }
}

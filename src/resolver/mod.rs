//! Depth-first resolution of template values
//!
//! A [`Resolver`] ties the pieces together for one top-level resolve call:
//! strings go through the interpolation scanner, directive-shaped arrays and
//! object keys go through the dispatcher, and containers recurse with
//! sentinel-based elision. `Option<Value>` carries the sentinel: `None` means
//! "produce nothing here" and the enclosing container drops the entry.

mod string;

use serde_json::{Map, Value};

use crate::directives::{self, DirectiveRegistry};
use crate::error::TemplateError;
use crate::loader::ResourceLoader;
use crate::scope::ScopeChain;
use crate::stats::UsageStats;

pub struct Resolver<'a> {
    registry: &'a DirectiveRegistry,
    loader: &'a mut dyn ResourceLoader,
    usage: &'a mut UsageStats,
}

impl<'a> Resolver<'a> {
    pub fn new(
        registry: &'a DirectiveRegistry,
        loader: &'a mut dyn ResourceLoader,
        usage: &'a mut UsageStats,
    ) -> Self {
        Self {
            registry,
            loader,
            usage,
        }
    }

    /// Resolve one template value against the scope chain. `None` means the
    /// value is elided from its enclosing container.
    pub fn resolve(
        &mut self,
        element: &Value,
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError> {
        match element {
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(Some(element.clone())),
            Value::String(text) => self.resolve_string(text, scopes),
            Value::Array(items) => {
                if directives::is_invocation(items) {
                    return self.dispatch(items, scopes);
                }
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(value) = self.resolve(item, scopes)? {
                        out.push(value);
                    }
                }
                Ok(Some(Value::Array(out)))
            }
            Value::Object(entries) => self.resolve_object(entries, scopes),
        }
    }

    fn resolve_object(
        &mut self,
        entries: &Map<String, Value>,
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError> {
        let mut out = Map::new();
        for (key, value) in entries {
            if directives::is_directive_key(key) {
                let args = value
                    .as_array()
                    .ok_or_else(|| TemplateError::DirectiveKeyArgs {
                        key: key.clone(),
                        value: value.clone(),
                    })?;
                let mut invocation = Vec::with_capacity(args.len() + 1);
                invocation.push(Value::String(key.clone()));
                invocation.extend(args.iter().cloned());
                match self.dispatch(&invocation, scopes)? {
                    // Entries merge into the enclosing object; later keys win.
                    Some(Value::Object(merged)) => {
                        for (merged_key, merged_value) in merged {
                            out.insert(merged_key, merged_value);
                        }
                    }
                    Some(other) => {
                        return Err(TemplateError::DirectiveKeyResult {
                            key: key.clone(),
                            value: other,
                        })
                    }
                    None => {}
                }
                continue;
            }
            let new_key = self.resolve_string(key, scopes)?;
            let new_value = self.resolve(value, scopes)?;
            // Keep the entry only when the key resolved back to a string and
            // the value was not elided.
            if let (Some(Value::String(new_key)), Some(new_value)) = (new_key, new_value) {
                out.insert(new_key, new_value);
            }
        }
        Ok(Some(Value::Object(out)))
    }

    fn dispatch(
        &mut self,
        invocation: &[Value],
        scopes: &mut ScopeChain,
    ) -> Result<Option<Value>, TemplateError> {
        let head = match invocation.first() {
            Some(Value::String(head)) => head,
            _ => return Err(TemplateError::UnknownDirective(String::new())),
        };
        let name = directives::dispatch_name(head);
        let registry = self.registry;
        let handler = registry
            .get(name)
            .ok_or_else(|| TemplateError::UnknownDirective(name.to_string()))?;
        handler.process(&invocation[1..], self, scopes)
    }

    /// Load a resource, run `f` with it, and unload it again. The unload
    /// happens on every exit path, so a resolution error cannot leave the
    /// loader's context stack out of balance.
    pub fn with_resource<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Self, &Value) -> Result<T, TemplateError>,
    ) -> Result<T, TemplateError> {
        let resource = self.loader.load(name)?;
        let result = f(self, &resource);
        let unloaded = self.loader.unload(name);
        match result {
            Ok(value) => {
                unloaded?;
                Ok(value)
            }
            // The resolution error takes precedence over an unload failure.
            Err(error) => Err(error),
        }
    }
}

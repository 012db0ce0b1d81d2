//! jsonweave - resolve JSON-shaped templates against layered binding data
//!
//! Templates are ordinary JSON values carrying `${path.to.value}` placeholders
//! and `#`-marked directives (`["#one-of", ...]` in a list, `"#for-each": [...]`
//! as an object key). Resolution walks the template depth first, expanding
//! placeholders against an ordered chain of binding scopes in which earlier
//! entries shadow later ones.
//!
//! # Example
//!
//! ```rust
//! use jsonweave::Engine;
//! use serde_json::json;
//!
//! let mut engine = Engine::new();
//! let resolved = engine
//!     .resolve(r#"{"greeting": "hello ${name}"}"#, vec![json!({"name": "world"})])
//!     .unwrap();
//! assert_eq!(resolved, json!({"greeting": "hello world"}));
//! ```

pub mod config;
pub mod directives;
pub mod error;
pub mod expr;
pub mod loader;
pub mod path;
pub mod resolver;
pub mod scope;
pub mod stats;
pub mod unescape;

pub use config::{ConfigError, EngineConfig};
pub use directives::{Directive, DirectiveRegistry};
pub use error::TemplateError;
pub use expr::ExprError;
pub use loader::{FileLoader, ResourceLoader};
pub use resolver::Resolver;
pub use scope::ScopeChain;
pub use stats::{DuplicateMap, UsageStats};

use std::collections::BTreeMap;

use serde_json::Value;

/// The template engine: owns the resource loader, the directive registry, an
/// optional environment scope, and the diagnostics captured by the most
/// recent [`Engine::resolve`] call.
pub struct Engine {
    loader: Box<dyn ResourceLoader>,
    registry: DirectiveRegistry,
    env: Option<Value>,
    usage: UsageStats,
    duplicates: DuplicateMap,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with the default filesystem loader
    pub fn new() -> Self {
        Self::with_loader(Box::new(FileLoader::new()))
    }

    /// Create an engine with a custom resource loader
    pub fn with_loader(loader: Box<dyn ResourceLoader>) -> Self {
        Self {
            loader,
            registry: DirectiveRegistry::with_builtins(),
            env: None,
            usage: UsageStats::new(),
            duplicates: DuplicateMap::new(),
        }
    }

    /// Set an environment scope, consulted after every binding scope
    pub fn with_env(mut self, env: Value) -> Self {
        self.env = Some(env);
        self
    }

    /// Register a directive, shadowing any built-in of the same name
    pub fn register(&mut self, name: impl Into<String>, handler: Box<dyn Directive>) {
        self.registry.register(name, handler);
    }

    /// Register the extension directives named in a configuration
    pub fn apply_config(&mut self, config: &EngineConfig) -> Result<(), ConfigError> {
        for name in &config.extras {
            let handler = directives::extension(name)
                .ok_or_else(|| ConfigError::UnknownExtension(name.clone()))?;
            self.registry.register(name.clone(), handler);
        }
        Ok(())
    }

    /// Names of all registered directives, sorted
    pub fn directive_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Resolve a main template against binding scopes ordered outermost last.
    ///
    /// `main_template` is a resource name for the loader: a file path, inline
    /// JSON text, or a bare template string. Usage counts and the duplicate
    /// map are rebuilt on every call and readable afterwards through
    /// [`Engine::usage`] and [`Engine::duplicates`].
    pub fn resolve(
        &mut self,
        main_template: &str,
        bindings: Vec<Value>,
    ) -> Result<Value, TemplateError> {
        self.usage.clear();
        let mut scopes = bindings;
        if let Some(env) = &self.env {
            scopes.push(env.clone());
        }
        for scope in &scopes {
            if !scope.is_object() {
                return Err(TemplateError::InvalidBindingScope(scope.clone()));
            }
        }
        self.duplicates = stats::find_duplicates(&scopes);

        let mut chain = ScopeChain::new(scopes);
        let mut resolver = Resolver::new(&self.registry, self.loader.as_mut(), &mut self.usage);
        let resolved = resolver.with_resource(main_template, |resolver, template| {
            resolver.resolve(template, &mut chain)
        })?;
        Ok(unescape::unescape_value(resolved.unwrap_or(Value::Null)))
    }

    /// Parameter usage counts captured by the most recent resolve
    pub fn usage(&self) -> &BTreeMap<String, u64> {
        self.usage.counts()
    }

    /// Parameters bound in more than one scope during the most recent resolve
    pub fn duplicates(&self) -> &DuplicateMap {
        &self.duplicates
    }
}

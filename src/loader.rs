//! Loading template resources by name
//!
//! The engine and the iteration directive load nested templates through a
//! [`ResourceLoader`]. Loads and unloads must pair up in strict LIFO order so
//! that relative resource names resolve against the directory of the resource
//! that referenced them.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::TemplateError;

pub trait ResourceLoader {
    /// Resolve `name` against the active load context, parse it, and push a
    /// new context scoped to the resource's origin.
    fn load(&mut self, name: &str) -> Result<Value, TemplateError>;

    /// Pop the active context. The popped context must have been created by a
    /// `load` of the same `name`.
    fn unload(&mut self, name: &str) -> Result<(), TemplateError>;
}

/// Filesystem-backed loader with a stack of origin directories.
///
/// A name that does not match a readable file is tried as inline JSON text
/// and finally kept as a literal string value; this lets callers pass whole
/// templates on the command line and lets `for-each` defer placeholder-bearing
/// template arguments to per-iteration resolution. A file that exists but
/// does not parse is a fatal load error.
#[derive(Debug, Default)]
pub struct FileLoader {
    root: Option<PathBuf>,
    stack: Vec<Context>,
}

#[derive(Debug)]
struct Context {
    name: String,
    dir: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader whose first load resolves relative to `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            stack: Vec::new(),
        }
    }

    fn current_dir(&self) -> Option<&PathBuf> {
        match self.stack.last() {
            Some(context) => context.dir.as_ref(),
            None => self.root.as_ref(),
        }
    }
}

impl ResourceLoader for FileLoader {
    fn load(&mut self, name: &str) -> Result<Value, TemplateError> {
        let path = match self.current_dir() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        };
        if path.is_file() {
            let text = fs::read_to_string(&path).map_err(|e| TemplateError::ResourceLoad {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
            let value =
                serde_json::from_str(&text).map_err(|e| TemplateError::ResourceLoad {
                    name: name.to_string(),
                    reason: format!("invalid JSON: {}", e),
                })?;
            self.stack.push(Context {
                name: name.to_string(),
                dir: path.parent().map(|dir| dir.to_path_buf()),
            });
            return Ok(value);
        }
        let value =
            serde_json::from_str(name).unwrap_or_else(|_| Value::String(name.to_string()));
        self.stack.push(Context {
            name: name.to_string(),
            dir: None,
        });
        Ok(value)
    }

    fn unload(&mut self, name: &str) -> Result<(), TemplateError> {
        match self.stack.pop() {
            Some(context) if context.name == name => Ok(()),
            Some(context) => Err(TemplateError::UnloadOrder {
                expected: context.name,
                requested: name.to_string(),
            }),
            None => Err(TemplateError::UnloadOrder {
                expected: "(no loaded resource)".to_string(),
                requested: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "jsonweave-loader-{}-{}",
            label,
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("Should create temp dir");
        dir
    }

    #[test]
    fn test_inline_json_fallback() {
        let mut loader = FileLoader::new();
        let value = loader.load(r#"{"x": 1}"#).expect("Should load");
        assert_eq!(value, json!({"x": 1}));
        loader.unload(r#"{"x": 1}"#).expect("Should unload");
    }

    #[test]
    fn test_literal_string_fallback() {
        let mut loader = FileLoader::new();
        let value = loader.load("no ${such} file").expect("Should load");
        assert_eq!(value, json!("no ${such} file"));
    }

    #[test]
    fn test_unload_out_of_order_is_error() {
        let mut loader = FileLoader::new();
        loader.load("{}").expect("Should load");
        loader.load("[]").expect("Should load");
        let result = loader.unload("{}");
        assert!(matches!(result, Err(TemplateError::UnloadOrder { .. })));
    }

    #[test]
    fn test_unload_without_load_is_error() {
        let mut loader = FileLoader::new();
        let result = loader.unload("{}");
        assert!(matches!(result, Err(TemplateError::UnloadOrder { .. })));
    }

    #[test]
    fn test_file_load_and_relative_resolution() {
        let dir = temp_dir("relative");
        fs::write(dir.join("outer.json"), r#"{"inner": "inner.json"}"#)
            .expect("Should write outer");
        fs::write(dir.join("inner.json"), r#"{"z": 9}"#).expect("Should write inner");

        let mut loader = FileLoader::with_root(&dir);
        let outer = loader.load("outer.json").expect("Should load outer");
        assert_eq!(outer, json!({"inner": "inner.json"}));
        // A nested load resolves against the directory of the loaded resource.
        let inner = loader.load("inner.json").expect("Should load inner");
        assert_eq!(inner, json!({"z": 9}));
        loader.unload("inner.json").expect("Should unload inner");
        loader.unload("outer.json").expect("Should unload outer");
    }

    #[test]
    fn test_unparseable_file_is_fatal() {
        let dir = temp_dir("badjson");
        let path = dir.join("bad.json");
        fs::write(&path, "{not json").expect("Should write file");

        let mut loader = FileLoader::new();
        let result = loader.load(path.to_str().expect("Should be utf-8"));
        assert!(matches!(result, Err(TemplateError::ResourceLoad { .. })));
        assert!(Path::new(&path).is_file());
    }
}

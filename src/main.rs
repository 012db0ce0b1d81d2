//! jsonweave CLI
//!
//! Usage:
//!   jsonweave [OPTIONS] <MAIN_TEMPLATE>
//!
//! The main template and every binding resource may be a file path or inline
//! JSON text. Binding resources are separated by semicolons, outermost last.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use serde_json::Value;

use jsonweave::{Engine, EngineConfig, TemplateError};

#[derive(Parser)]
#[command(name = "jsonweave")]
#[command(about = "Resolve JSON templates against layered binding data")]
struct Cli {
    /// Main template: a file path or inline JSON text
    main_template: Option<String>,

    /// Semicolon-separated binding data resources, outermost last
    #[arg(short, long)]
    bindings: Option<String>,

    /// Global binding data consulted after all bindings
    #[arg(short, long)]
    env: Option<String>,

    /// Extension directive configuration (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compact output instead of pretty-printed
    #[arg(short, long)]
    raw: bool,

    /// Print parameter usage counts to stderr
    #[arg(short, long)]
    stats: bool,

    /// Warn about parameters bound in more than one scope
    #[arg(short, long)]
    verbose: bool,

    /// List registered directive names and exit
    #[arg(short, long)]
    list_directives: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut engine = Engine::new();

    if let Some(path) = &cli.config {
        let config = match EngineConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        };
        if let Err(e) = engine.apply_config(&config) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    if cli.list_directives {
        for name in engine.directive_names() {
            println!("{}", name);
        }
        return;
    }

    let main_template = match &cli.main_template {
        Some(template) => template,
        None => {
            eprintln!("Error: no main template given");
            process::exit(1);
        }
    };

    let mut bindings = Vec::new();
    if let Some(list) = &cli.bindings {
        for resource in list.split(';') {
            match load_json_arg(resource) {
                Ok(value) => bindings.push(value),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            }
        }
    }

    if let Some(env) = &cli.env {
        match load_json_arg(env) {
            Ok(value) => engine = engine.with_env(value),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }

    let result = engine.resolve(main_template, bindings);

    if cli.verbose {
        for (parameter, values) in engine.duplicates() {
            eprintln!(
                "Warning: parameter \"{}\" is bound in more than one scope: {}",
                parameter,
                Value::Array(values.clone())
            );
        }
    }

    match result {
        Ok(resolved) => {
            if cli.stats {
                for (parameter, count) in engine.usage() {
                    eprintln!("{}: {}", parameter, count);
                }
            }
            let output = if cli.raw {
                resolved.to_string()
            } else {
                serde_json::to_string_pretty(&resolved).unwrap_or_else(|_| resolved.to_string())
            };
            println!("{}", output);
        }
        Err(TemplateError::Condition { expr, source }) => {
            eprint!("{}", source.format(&expr));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// A resource argument is a file path when such a file exists, inline JSON
/// text otherwise.
fn load_json_arg(resource: &str) -> Result<Value, String> {
    let path = Path::new(resource);
    if path.is_file() {
        let text =
            fs::read_to_string(path).map_err(|e| format!("reading '{}': {}", resource, e))?;
        serde_json::from_str(&text).map_err(|e| format!("parsing '{}': {}", resource, e))
    } else {
        serde_json::from_str(resource)
            .map_err(|e| format!("parsing binding data '{}': {}", resource, e))
    }
}

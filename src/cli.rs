//! CLI: routes → (openapi | components | schema)
use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, Args};
use colored::Colorize;
use serde::Deserialize;
use serde_json::Value;

use crate::document::{DocumentBuilder, DocumentOptions};
use crate::operation::RouteDescriptor;
use crate::validation::ValidationNode;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert validation-schema route descriptors into an OpenAPI document with shared components
#[derive(Parser, Debug)]
#[command(version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit the full OpenAPI document
    Openapi(OpenApiOut),
    /// emit only `components.schemas`
    Components(ComponentsOut),
    /// translate a single validation node and print its inline schema
    Schema(SchemaOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JQ pre-process filter for each document; every output must be a routes document
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more route files. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct OpenApiOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// JSON file with envelope settings (info, servers, tags, securitySchemes, security)
    #[arg(long)]
    options: Option<PathBuf>,

    /// overrides `openapiVersion` from the options file
    #[arg(long)]
    openapi_version: Option<String>,

    /// overrides `info.title` from the options file
    #[arg(long)]
    title: Option<String>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// print the parsed arguments to stderr and exit without reading any input
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct ComponentsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    /// file holding one validation node ('-' for stdin)
    #[arg(long, short)]
    input: String,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// `{ "routes": [...] }`; a bare array of routes is accepted as well.
#[derive(Deserialize)]
struct RoutesFile {
    routes: Vec<RouteDescriptor>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Every route from every input, in argument order.
    fn load_routes(&self) -> Result<Vec<RouteDescriptor>> {
        let mut routes = Vec::new();
        for source_path in resolve_file_path_patterns(&self.input)? {
            let origin = source_path.to_string_lossy().to_string();
            let source = read_source(&source_path)?;
            match self.jq_expr.as_ref() {
                None => {
                    let json_value: Value = crate::path_de::from_str_with_path(&source, &origin)?;
                    routes.extend(routes_from_value(json_value, &origin)?);
                }
                Some(jq_expr) => {
                    let json_value = serde_json::from_str::<Value>(&source)
                        .with_context(|| format!("failed to parse JSON source file ({origin})"))?;
                    let outputs = crate::jq_exec::run_jaq(jq_expr, &json_value)
                        .with_context(|| format!("failed to apply jq expression to source file ({origin})"))?;
                    for value in outputs {
                        routes.extend(routes_from_value(value, &origin)?);
                    }
                }
            }
        }
        tracing::info!(routes = routes.len(), "routes loaded");
        Ok(routes)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Openapi(target) => {
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }

                let mut options = match target.options.as_ref() {
                    Some(path) => {
                        let origin = path.to_string_lossy().to_string();
                        crate::path_de::from_str_with_path::<DocumentOptions>(&read_source(path)?, &origin)?
                    }
                    None => DocumentOptions::default(),
                };
                if let Some(v) = target.openapi_version.as_ref() {
                    options.openapi_version = Some(v.clone());
                }
                if let Some(title) = target.title.as_ref() {
                    options.set_title(title);
                }

                // 1) routes → operations
                let routes = target.input_settings.load_routes()?;
                let mut builder = DocumentBuilder::new();
                builder.add_routes(&routes)?;

                // 2) components + refs
                let doc = builder.finish();

                // 3) envelope
                let json = doc.to_json(&options);
                write_output(target.out.as_deref(), &json)?;
                eprintln!(
                    "{} {} operations, {} components",
                    "✔".green().bold(),
                    doc.operation_count(),
                    doc.components.len(),
                );
            }
            Command::Components(target) => {
                let routes = target.input_settings.load_routes()?;
                let doc = crate::document::generate(&routes)?;
                let json = crate::emit::components_to_json(&doc.components);
                write_output(target.out.as_deref(), &json)?;
            }
            Command::Schema(target) => {
                let source = read_source(Path::new(&target.input))?;
                let node: ValidationNode = crate::path_de::from_str_with_path(&source, &target.input)?;
                let schema = crate::lower::translate(&node)?;
                write_output(target.out.as_deref(), &crate::emit::schema_to_json(&schema))?;
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn routes_from_value(value: Value, origin: &str) -> Result<Vec<RouteDescriptor>> {
    if value.is_array() {
        crate::path_de::from_value_with_path(value, origin)
    } else {
        Ok(crate::path_de::from_value_with_path::<RoutesFile>(value, origin)?.routes)
    }
}

fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin()).context("failed to read stdin");
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read source file {}", path.display()))
}

fn write_output(out: Option<&Path>, json: &Value) -> Result<()> {
    let src = serde_json::to_string_pretty(json)?;
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, &src)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), "document written");
        }
        None => println!("{src}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

//! Whole-document assembly.
//!
//! Runs the passes in the only order that is correct:
//! build every operation → extract everywhere → rewrite live trees →
//! rewrite the component table. Routes are processed in input order so
//! duplicate component names resolve the same way on every run.
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::components::{extract, rewrite, ComponentTable};
use crate::emit::components_to_json;
use crate::error::Result;
use crate::operation::{build_operation, Operation, RouteDescriptor};

pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.0";

// ————————————————————————————————————————————————————————————————————————————
// OPTIONS
// ————————————————————————————————————————————————————————————————————————————

/// Envelope settings. Anything left out falls back to the example envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOptions {
    pub openapi_version: Option<String>,
    pub info: Option<Value>,
    pub servers: Option<Value>,
    pub tags: Option<Value>,
    #[serde(default)]
    pub components: ComponentOptions,
    pub security: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentOptions {
    pub security_schemes: Option<Value>,
}

impl DocumentOptions {
    /// Override the info title, keeping the rest of `info`.
    pub fn set_title(&mut self, title: &str) {
        let mut info = self.info.take().unwrap_or_else(default_info);
        if let Some(obj) = info.as_object_mut() {
            obj.insert("title".into(), Value::from(title));
        } else {
            info = json!({ "title": title });
        }
        self.info = Some(info);
    }
}

fn default_info() -> Value {
    json!({
        "title": "Example API",
        "description": "Example API docs",
        "version": "1.0.0",
        "contact": { "url": "https://github.com/example/example" }
    })
}

fn default_servers() -> Value {
    json!([{ "url": "https://example.com" }])
}

fn default_tags() -> Value {
    json!([{
        "name": "Example tag",
        "description": "This is an example tag provided if you do not specify any tags yourself in the options"
    }])
}

// ————————————————————————————————————————————————————————————————————————————
// BUILDER
// ————————————————————————————————————————————————————————————————————————————

/// path → method → operation
pub type Paths = IndexMap<String, IndexMap<String, Operation>>;

#[derive(Debug, Default)]
pub struct DocumentBuilder {
    paths: Paths,
    components: ComponentTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub paths: Paths,
    pub components: ComponentTable,
}

impl DocumentBuilder {
    pub fn new() -> Self { Self::default() }

    /// Start from an existing table (components shared with another document
    /// build, or pre-seeded definitions).
    pub fn with_components(components: ComponentTable) -> Self {
        Self { paths: Paths::new(), components }
    }

    /// Translate one route. Excluded routes are skipped; a second route on
    /// the same path+method replaces the first.
    pub fn add_route(&mut self, route: &RouteDescriptor) -> Result<()> {
        if route.exclude {
            tracing::debug!(method = %route.method, path = %route.path, "route excluded");
            return Ok(());
        }
        let op = build_operation(route)?;
        tracing::trace!(method = %route.method, path = %route.path, "operation built");
        self.paths
            .entry(route.openapi_path())
            .or_default()
            .insert(route.method_key(), op);
        Ok(())
    }

    pub fn add_routes<'a, I>(&mut self, routes: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a RouteDescriptor>,
    {
        for route in routes {
            self.add_route(route)?;
        }
        Ok(())
    }

    /// Run the component passes and hand back the finished document.
    pub fn finish(self) -> Document {
        let Self { mut paths, mut components } = self;

        // 1) harvest named objects from every live tree
        for op in paths.values().flat_map(IndexMap::values) {
            for root in op.schema_roots() {
                extract(root, &mut components);
            }
        }

        // 2) collapse them into refs
        for op in paths.values_mut().flat_map(IndexMap::values_mut) {
            for root in op.schema_roots_mut() {
                rewrite(root);
            }
        }

        // 3) components that embed components
        components.rewrite_entries();

        tracing::debug!(paths = paths.len(), components = components.len(), "document assembled");
        Document { paths, components }
    }
}

/// Convenience: routes → finished document.
pub fn generate<'a, I>(routes: I) -> Result<Document>
where
    I: IntoIterator<Item = &'a RouteDescriptor>,
{
    let mut builder = DocumentBuilder::new();
    builder.add_routes(routes)?;
    Ok(builder.finish())
}

// ————————————————————————————————————————————————————————————————————————————
// EMISSION
// ————————————————————————————————————————————————————————————————————————————

impl Document {
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(IndexMap::len).sum()
    }

    pub fn paths_to_json(&self) -> Value {
        let paths: Map<String, Value> = self.paths.iter()
            .map(|(path, methods)| {
                let methods: Map<String, Value> = methods.iter()
                    .map(|(m, op)| (m.clone(), op.to_json()))
                    .collect();
                (path.clone(), Value::Object(methods))
            })
            .collect();
        Value::Object(paths)
    }

    /// Full OpenAPI document with the envelope from `options`.
    pub fn to_json(&self, options: &DocumentOptions) -> Value {
        let mut components = Map::new();
        components.insert("schemas".into(), components_to_json(&self.components));
        if let Some(s) = &options.components.security_schemes {
            components.insert("securitySchemes".into(), s.clone());
        }

        let mut doc = Map::new();
        doc.insert(
            "openapi".into(),
            Value::from(options.openapi_version.clone().unwrap_or_else(|| DEFAULT_OPENAPI_VERSION.to_string())),
        );
        doc.insert("info".into(), options.info.clone().unwrap_or_else(default_info));
        doc.insert("servers".into(), options.servers.clone().unwrap_or_else(default_servers));
        doc.insert("tags".into(), options.tags.clone().unwrap_or_else(default_tags));
        doc.insert("paths".into(), self.paths_to_json());
        doc.insert("components".into(), Value::Object(components));
        if let Some(s) = &options.security {
            doc.insert("security".into(), s.clone());
        }
        Value::Object(doc)
    }
}

// ------------------------------- Tests ------------------------------------ //

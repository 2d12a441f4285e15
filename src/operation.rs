//! Route descriptors in, operation descriptors out.
//!
//! This is glue around the translator: it knows where request bodies,
//! parameters and responses live on a route, and nothing about components.
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::emit::{flat_param_schema, schema_to_json};
use crate::error::Result;
use crate::ir::{ObjectNode, Schema};
use crate::lower::translate;
use crate::validation::ValidationNode;

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

static PATH_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("static regex")
});

// ————————————————————————————————————————————————————————————————————————————
// INPUT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// becomes the operationId
    pub name: Option<String>,
    #[serde(default)]
    pub exclude: bool,
    pub application_type: Option<String>,
    pub response_type: Option<String>,
    #[serde(default)]
    pub validation: ValidationBundle,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationBundle {
    #[serde(default)]
    pub path_params: IndexMap<String, ValidationNode>,
    #[serde(default)]
    pub query_params: IndexMap<String, ValidationNode>,
    #[serde(default)]
    pub request_body: IndexMap<String, ValidationNode>,
    #[serde(default)]
    pub response: IndexMap<String, ResponseSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseSpec {
    pub description: Option<String>,
    pub model: Option<ValidationNode>,
}

// ————————————————————————————————————————————————————————————————————————————
// OUTPUT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
}

impl ParamLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    pub description: Option<String>,
    pub required: bool,
    pub schema: Schema,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    pub content_type: String,
    pub schema: Schema,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub description: Option<String>,
    pub content_type: String,
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    pub request_body: Option<RequestBody>,
    pub parameters: Vec<Parameter>,
    pub responses: IndexMap<String, Response>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

/// `/items/:id` → `/items/{id}`
pub fn openapi_path(template: &str) -> String {
    PATH_PARAM.replace_all(template, "{$1}").into_owned()
}

impl RouteDescriptor {
    pub fn openapi_path(&self) -> String { openapi_path(&self.path) }
    pub fn method_key(&self) -> String { self.method.to_lowercase() }
}

pub fn build_operation(route: &RouteDescriptor) -> Result<Operation> {
    build_operation_inner(route).map_err(|e| e.in_route(&route.method, &route.path))
}

fn build_operation_inner(route: &RouteDescriptor) -> Result<Operation> {
    let v = &route.validation;

    let request_body = if v.request_body.is_empty() {
        None
    } else {
        let root = ValidationNode::implicit_object(v.request_body.clone());
        Some(RequestBody {
            content_type: route.application_type.clone()
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            schema: translate(&root)?,
        })
    };

    let mut parameters = Vec::with_capacity(v.path_params.len() + v.query_params.len());
    let located = v.path_params.iter().map(|p| (ParamLocation::Path, p))
        .chain(v.query_params.iter().map(|p| (ParamLocation::Query, p)));
    for (location, (name, node)) in located {
        parameters.push(Parameter {
            name: name.clone(),
            location,
            description: node.flags.description.clone(),
            required: node.is_required(),
            schema: translate(node)?,
        });
    }

    let response_type = route.response_type.clone()
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let mut responses = IndexMap::new();
    for (status, spec) in &v.response {
        let schema = spec.model.as_ref().map(translate).transpose()?;
        responses.insert(status.clone(), Response {
            description: spec.description.clone(),
            content_type: response_type.clone(),
            schema,
        });
    }

    Ok(Operation {
        tags: route.tags.clone(),
        summary: route.summary.clone(),
        description: route.description.clone(),
        operation_id: route.name.clone(),
        request_body,
        parameters,
        responses,
    })
}

impl Operation {
    /// Live schema roots the component passes run over, in a fixed order:
    /// request-body properties, then each response root.
    pub fn schema_roots(&self) -> impl Iterator<Item = &Schema> {
        self.request_body.iter()
            .flat_map(|rb| body_roots(&rb.schema))
            .chain(self.responses.values().filter_map(|r| r.schema.as_ref()))
    }

    pub fn schema_roots_mut(&mut self) -> impl Iterator<Item = &mut Schema> {
        self.request_body.iter_mut()
            .flat_map(|rb| body_roots_mut(&mut rb.schema))
            .chain(self.responses.values_mut().filter_map(|r| r.schema.as_mut()))
    }

    pub fn to_json(&self) -> Value {
        let mut o = Map::new();
        o.insert("tags".into(), Value::from(self.tags.clone()));
        if let Some(s) = &self.summary { o.insert("summary".into(), Value::from(s.clone())); }
        if let Some(d) = &self.description { o.insert("description".into(), Value::from(d.clone())); }
        if let Some(id) = &self.operation_id { o.insert("operationId".into(), Value::from(id.clone())); }

        if let Some(rb) = &self.request_body {
            let mut content = Map::new();
            content.insert(rb.content_type.clone(), serde_json::json!({ "schema": schema_to_json(&rb.schema) }));
            o.insert("requestBody".into(), serde_json::json!({ "content": content, "required": true }));
        }

        o.insert(
            "parameters".into(),
            Value::Array(self.parameters.iter().map(Parameter::to_json).collect()),
        );

        let mut responses = Map::new();
        for (status, r) in &self.responses {
            let mut ro = Map::new();
            if let Some(d) = &r.description { ro.insert("description".into(), Value::from(d.clone())); }
            if let Some(schema) = &r.schema {
                let mut content = Map::new();
                content.insert(r.content_type.clone(), serde_json::json!({ "schema": schema_to_json(schema) }));
                ro.insert("content".into(), Value::Object(content));
            }
            responses.insert(status.clone(), Value::Object(ro));
        }
        o.insert("responses".into(), Value::Object(responses));
        Value::Object(o)
    }
}

impl Parameter {
    pub fn to_json(&self) -> Value {
        let mut o = Map::new();
        o.insert("name".into(), Value::from(self.name.clone()));
        o.insert("in".into(), Value::from(self.location.as_str()));
        if let Some(d) = &self.description { o.insert("description".into(), Value::from(d.clone())); }
        o.insert("required".into(), Value::from(self.required));
        o.insert("schema".into(), flat_param_schema(&self.schema));
        Value::Object(o)
    }
}

// request bodies are anonymous objects: their properties are the roots
fn body_roots(schema: &Schema) -> Box<dyn Iterator<Item = &Schema> + '_> {
    match schema {
        Schema::Object(ObjectNode { name: None, properties, .. }) => Box::new(properties.values()),
        other => Box::new(std::iter::once(other)),
    }
}

fn body_roots_mut(schema: &mut Schema) -> Box<dyn Iterator<Item = &mut Schema> + '_> {
    match schema {
        Schema::Object(ObjectNode { name: None, properties, .. }) => Box::new(properties.values_mut()),
        other => Box::new(std::iter::once(other)),
    }
}

// ------------------------------- Tests ------------------------------------ //

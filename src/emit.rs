// src/emit.rs
//! Canonical IR → OpenAPI JSON.
//!
//! Key order in the output follows insertion order (`preserve_order`), so the
//! emitted objects read `type`, `format`, `description`, ... in a stable way.
use serde_json::{json, Map, Value};

use crate::components::ComponentTable;
use crate::ir::{ObjectNode, Schema};

// ————————————————————————————————————————————————————————————————————————————
// SCHEMA
// ————————————————————————————————————————————————————————————————————————————

pub fn schema_to_json(n: &Schema) -> Value {
    fn put_opt(map: &mut Map<String, Value>, key: &str, v: Option<Value>) {
        if let Some(v) = v {
            map.insert(key.into(), v);
        }
    }

    match n {
        Schema::Object(obj) => object_to_json(obj),

        Schema::Array(arr) => {
            let mut o = Map::new();
            o.insert("type".into(), Value::from("array"));
            put_opt(&mut o, "description", arr.description.clone().map(Value::from));
            o.insert("items".into(), schema_to_json(&arr.items));
            Value::Object(o)
        }

        Schema::Union(u) => {
            let mut o = Map::new();
            put_opt(&mut o, "description", u.description.clone().map(Value::from));
            o.insert(
                "oneOf".into(),
                Value::Array(u.alternatives.iter().map(schema_to_json).collect()),
            );
            Value::Object(o)
        }

        Schema::Scalar(s) => {
            let mut o = Map::new();
            o.insert("type".into(), Value::from(s.ty.clone()));
            put_opt(&mut o, "format", s.format.clone().map(Value::from));
            put_opt(&mut o, "description", s.description.clone().map(Value::from));
            o.insert("required".into(), Value::from(s.required));
            put_opt(&mut o, "enum", s.enum_.clone().map(Value::Array));
            put_opt(&mut o, "example", s.example.clone());
            put_opt(&mut o, "default", s.default.clone());
            Value::Object(o)
        }

        Schema::Ref(r) => json!({ "$ref": r.target }),
    }
}

fn object_to_json(obj: &ObjectNode) -> Value {
    let mut o = Map::new();
    o.insert("type".into(), Value::from("object"));
    if let Some(d) = &obj.description {
        o.insert("description".into(), Value::from(d.clone()));
    }
    let props: Map<String, Value> = obj.properties.iter()
        .map(|(k, v)| (k.clone(), schema_to_json(v)))
        .collect();
    o.insert("properties".into(), Value::Object(props));
    // OpenAPI 3.0 wants a non-empty list or nothing
    if !obj.required.is_empty() {
        o.insert(
            "required".into(),
            Value::Array(obj.required.iter().cloned().map(Value::from).collect()),
        );
    }
    Value::Object(o)
}

/// `components.schemas` body.
pub fn components_to_json(table: &ComponentTable) -> Value {
    Value::Object(table.iter().map(|(k, v)| (k.clone(), object_to_json(v))).collect())
}

// ————————————————————————————————————————————————————————————————————————————
// PARAMETERS
// ————————————————————————————————————————————————————————————————————————————

/// Parameters only take a flat schema: `{type, format?, enum?, example?, default?}`.
/// Structured kinds collapse to their bare type; a union stands in for its
/// first branch.
pub fn flat_param_schema(n: &Schema) -> Value {
    match n {
        Schema::Scalar(s) => {
            let mut o = Map::new();
            o.insert("type".into(), Value::from(s.ty.clone()));
            if let Some(f) = &s.format { o.insert("format".into(), Value::from(f.clone())); }
            if let Some(e) = &s.enum_ { o.insert("enum".into(), Value::Array(e.clone())); }
            if let Some(x) = &s.example { o.insert("example".into(), x.clone()); }
            if let Some(d) = &s.default { o.insert("default".into(), d.clone()); }
            Value::Object(o)
        }
        Schema::Array(_) => json!({ "type": "array" }),
        Schema::Union(u) => match u.alternatives.first() {
            Some(first) => flat_param_schema(first),
            None => json!({ "type": "object" }),
        },
        Schema::Object(_) | Schema::Ref(_) => json!({ "type": "object" }),
    }
}

// ------------------------------- Tests ------------------------------------ //

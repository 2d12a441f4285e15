//! Translator: validation node → canonical schema IR.
//!
//! Pure recursive descent. The only failure is a scalar kind with no entry
//! in `TYPE_MAP`.
use crate::error::{ConvertError, Result};
use crate::ir::{ArrayNode, ObjectNode, Schema, ScalarNode, UnionNode};
use crate::validation::{NodeKind, ValidationNode};

// ------------------------------- Policy ---------------------------------- //

/// scalar kind → OpenAPI type. function/symbol kinds are deliberately absent.
const TYPE_MAP: &[(&str, &str)] = &[
    ("any", "object"),
    ("number", "number"),
    ("link", "string"),
    ("boolean", "boolean"),
    ("date", "string"),
    ("string", "string"),
    ("binary", "string"),
];

/// item kind used when an array declares no item node
const UNTYPED_ITEM_KIND: &str = "any";

pub fn openapi_type(kind: &str) -> Option<&'static str> {
    TYPE_MAP.iter().find(|(k, _)| *k == kind).map(|(_, t)| *t)
}

// ------------------------------ Translate -------------------------------- //

pub fn translate(node: &ValidationNode) -> Result<Schema> {
    let description = node.flags.description.clone();
    match node.kind() {
        NodeKind::Object => {
            let mut out = ObjectNode {
                name: node.flags.object_name.clone(),
                description,
                ..ObjectNode::default()
            };
            for (key, field) in &node.keys {
                if field.is_required() {
                    out.required.insert(key.clone());
                }
                out.properties.insert(key.clone(), translate(field)?);
            }
            Ok(Schema::Object(out))
        }
        NodeKind::Array => {
            let items = match node.items.first() {
                Some(item) => translate(item)?,
                None => translate_scalar(&ValidationNode {
                    kind: UNTYPED_ITEM_KIND.to_string(),
                    ..ValidationNode::default()
                }, UNTYPED_ITEM_KIND)?,
            };
            Ok(Schema::Array(ArrayNode { items: Box::new(items), description }))
        }
        NodeKind::Alternatives => {
            let alternatives = node.branches()
                .map(translate)
                .collect::<Result<Vec<_>>>()?;
            Ok(Schema::Union(UnionNode { alternatives, description }))
        }
        NodeKind::Scalar(kind) => translate_scalar(node, kind),
    }
}

fn translate_scalar(node: &ValidationNode, kind: &str) -> Result<Schema> {
    let ty = openapi_type(kind)
        .ok_or_else(|| ConvertError::UnsupportedType { kind: kind.to_string() })?;

    // type changed → the original kind survives as the format
    let format = if kind != ty {
        Some(if kind == "date" { "date-time".to_string() } else { kind.to_string() })
    } else {
        None
    };

    let enum_ = if node.allow.is_empty() { None } else { Some(node.allow.clone()) };

    tracing::trace!(kind, ty, "scalar");
    Ok(Schema::Scalar(ScalarNode {
        ty: ty.to_string(),
        format,
        enum_,
        example: node.examples.first().cloned(),
        default: node.flags.default.clone(),
        required: node.is_required(),
        description: node.flags.description.clone(),
    }))
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn node(v: Value) -> ValidationNode {
        serde_json::from_value(v).unwrap()
    }

    fn scalar(s: Schema) -> ScalarNode {
        match s {
            Schema::Scalar(x) => x,
            other => panic!("expected scalar, got {other:?}"),
        }
    }

    #[test]
    fn type_map_table() {
        let table = [
            ("any", "object", Some("any")),
            ("number", "number", None),
            ("link", "string", Some("link")),
            ("boolean", "boolean", None),
            ("date", "string", Some("date-time")),
            ("string", "string", None),
            ("binary", "string", Some("binary")),
        ];
        for (kind, ty, format) in table {
            let s = scalar(translate(&node(json!({ "type": kind }))).unwrap());
            assert_eq!(s.ty, ty, "type for {kind}");
            assert_eq!(s.format.as_deref(), format, "format for {kind}");
        }
    }

    #[test]
    fn unmapped_scalar_kinds_fail() {
        for kind in ["function", "symbol", "custom"] {
            let err = translate(&node(json!({ "type": kind }))).unwrap_err();
            assert!(matches!(err, ConvertError::UnsupportedType { kind: ref k } if k == kind));
        }
    }

    #[test]
    fn unsupported_kind_deep_in_tree_fails_whole_translation() {
        let n = node(json!({
            "type": "object",
            "keys": { "cb": { "type": "array", "items": [{ "type": "function" }] } }
        }));
        assert!(translate(&n).is_err());
    }

    #[test]
    fn required_fields_propagate() {
        let n = node(json!({
            "type": "object",
            "keys": {
                "id": { "type": "string", "flags": { "presence": "required" } },
                "label": { "type": "string", "flags": { "presence": "optional" } }
            }
        }));
        let Schema::Object(obj) = translate(&n).unwrap() else { panic!("object") };
        assert_eq!(obj.required.iter().collect::<Vec<_>>(), ["id"]);
        assert_eq!(obj.properties.keys().collect::<Vec<_>>(), ["id", "label"]);
        assert!(obj.name.is_none());
        assert!(scalar(obj.properties["id"].clone()).required);
        assert!(!scalar(obj.properties["label"].clone()).required);
    }

    #[test]
    fn enum_example_default_preserved() {
        let n = node(json!({
            "type": "number",
            "flags": { "default": 1, "description": "level" },
            "allow": [1, 2, 3],
            "examples": [2, 3]
        }));
        let s = scalar(translate(&n).unwrap());
        assert_eq!(s.enum_, Some(vec![json!(1), json!(2), json!(3)]));
        assert_eq!(s.example, Some(json!(2)));
        assert_eq!(s.default, Some(json!(1)));
        assert_eq!(s.description.as_deref(), Some("level"));
    }

    #[test]
    fn null_default_survives_to_output() {
        let s = translate(&node(json!({ "type": "string", "flags": { "default": null } }))).unwrap();
        assert_eq!(scalar(s.clone()).default, Some(Value::Null));
        let out = crate::emit::schema_to_json(&s);
        assert_eq!(out.get("default"), Some(&Value::Null));
    }

    #[test]
    fn empty_allow_list_is_not_an_enum() {
        let s = scalar(translate(&node(json!({ "type": "string", "allow": [] }))).unwrap());
        assert!(s.enum_.is_none());
        assert!(s.example.is_none());
    }

    #[test]
    fn named_object_keeps_name() {
        let n = node(json!({ "type": "object", "flags": { "objectName": "Widget" } }));
        assert_eq!(translate(&n).unwrap().as_object().unwrap().name.as_deref(), Some("Widget"));
    }

    #[test]
    fn array_uses_first_item_and_defaults_to_any() {
        let n = node(json!({ "type": "array", "items": [{ "type": "boolean" }, { "type": "string" }] }));
        let Schema::Array(arr) = translate(&n).unwrap() else { panic!("array") };
        assert_eq!(scalar(*arr.items).ty, "boolean");

        let Schema::Array(arr) = translate(&node(json!({ "type": "array" }))).unwrap() else { panic!("array") };
        let item = scalar(*arr.items);
        assert_eq!((item.ty.as_str(), item.format.as_deref()), ("object", Some("any")));
    }

    #[test]
    fn union_keeps_branch_order() {
        let n = node(json!({
            "type": "alternatives",
            "flags": { "description": "either" },
            "matches": [
                { "schema": { "type": "number" } },
                { "schema": { "type": "object", "flags": { "objectName": "Thing" } } },
                { "schema": { "type": "string" } }
            ]
        }));
        let Schema::Union(u) = translate(&n).unwrap() else { panic!("union") };
        assert_eq!(u.description.as_deref(), Some("either"));
        assert_eq!(u.alternatives.len(), 3);
        assert!(matches!(&u.alternatives[0], Schema::Scalar(s) if s.ty == "number"));
        assert!(matches!(&u.alternatives[1], Schema::Object(o) if o.name.as_deref() == Some("Thing")));
        assert!(matches!(&u.alternatives[2], Schema::Scalar(s) if s.ty == "string"));
    }

    #[test]
    fn union_without_branches_is_degenerate_not_an_error() {
        let n = node(json!({ "type": "alternatives", "flags": { "presence": "required" } }));
        let Schema::Union(u) = translate(&n).unwrap() else { panic!("union") };
        assert!(u.alternatives.is_empty());
    }
}

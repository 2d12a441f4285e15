//! Validation-schema input tree.
//!
//! This is the shape a validation library hands out from `describe()`: a
//! `type` discriminator, a `flags` bag, and kind-specific children. Only the
//! parts the converter reads are modeled; everything else is ignored on
//! deserialization.
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub flags: Flags,
    /// object fields, declaration order preserved
    #[serde(default)]
    pub keys: IndexMap<String, ValidationNode>,
    /// array item nodes; only the first one is ever used
    #[serde(default)]
    pub items: Vec<ValidationNode>,
    /// union branches
    #[serde(default)]
    pub matches: Vec<Match>,
    /// allowed values (enumeration)
    #[serde(default)]
    pub allow: Vec<Value>,
    #[serde(default)]
    pub examples: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    pub presence: Option<Presence>,
    pub description: Option<String>,
    /// `null` is a real default; only an absent key means "no default"
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
    /// reusable type name; set means "lift me into components"
    pub object_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Required,
    Optional,
    Forbidden,
}

/// One union branch. Plain branches carry `schema`; conditional ones carry
/// `then` and/or `otherwise`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Match {
    pub schema: Option<ValidationNode>,
    pub then: Option<ValidationNode>,
    pub otherwise: Option<ValidationNode>,
}

/// Structural view over `ValidationNode::kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    Object,
    Array,
    Alternatives,
    Scalar(&'a str),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ValidationNode {
    pub fn kind(&self) -> NodeKind<'_> {
        match self.kind.as_str() {
            "object" => NodeKind::Object,
            "array" => NodeKind::Array,
            "alternatives" => NodeKind::Alternatives,
            other => NodeKind::Scalar(other),
        }
    }

    pub fn is_required(&self) -> bool {
        self.flags.presence == Some(Presence::Required)
    }

    /// Wrap a field map as an anonymous object node (request bodies arrive
    /// this way).
    pub fn implicit_object(keys: IndexMap<String, ValidationNode>) -> Self {
        Self { kind: "object".to_string(), keys, ..Self::default() }
    }

    /// Branch nodes in declaration order, conditional arms flattened in.
    pub fn branches(&self) -> impl Iterator<Item = &ValidationNode> {
        self.matches.iter().flat_map(|m| {
            m.schema.iter().chain(m.then.iter()).chain(m.otherwise.iter())
        })
    }
}

fn present<'de, D>(de: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(de).map(Some)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn describe_output_deserializes() {
        let node: ValidationNode = serde_json::from_value(json!({
            "type": "object",
            "flags": { "presence": "required", "objectName": "Widget", "description": "a widget" },
            "keys": {
                "zeta": { "type": "string" },
                "alpha": { "type": "number", "allow": [1, 2], "examples": [2] }
            }
        })).unwrap();
        assert_eq!(node.kind(), NodeKind::Object);
        assert!(node.is_required());
        assert_eq!(node.flags.object_name.as_deref(), Some("Widget"));
        // declaration order, not alphabetical
        let names: Vec<_> = node.keys.keys().cloned().collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(node.keys["alpha"].allow, vec![json!(1), json!(2)]);
    }

    #[test]
    fn null_default_is_kept_apart_from_no_default() {
        let with_null: ValidationNode = serde_json::from_value(json!({
            "type": "string", "flags": { "default": null }
        })).unwrap();
        let without: ValidationNode = serde_json::from_value(json!({
            "type": "string", "flags": {}
        })).unwrap();
        assert_eq!(with_null.flags.default, Some(Value::Null));
        assert_eq!(without.flags.default, None);
    }

    #[test]
    fn unknown_describe_fields_are_ignored() {
        let node: ValidationNode = serde_json::from_value(json!({
            "type": "string",
            "rules": [{ "name": "min", "args": { "limit": 3 } }],
            "preferences": { "convert": false }
        })).unwrap();
        assert_eq!(node.kind(), NodeKind::Scalar("string"));
        assert!(!node.is_required());
    }

    #[test]
    fn branches_flatten_conditionals_in_order() {
        let node: ValidationNode = serde_json::from_value(json!({
            "type": "alternatives",
            "matches": [
                { "schema": { "type": "string" } },
                { "ref": "other", "then": { "type": "number" }, "otherwise": { "type": "boolean" } }
            ]
        })).unwrap();
        let kinds: Vec<_> = node.branches().map(|b| b.kind.as_str()).collect();
        assert_eq!(kinds, ["string", "number", "boolean"]);
    }
}

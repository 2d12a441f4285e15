// Canonical schema IR. Produced by `lower`, reshaped by `components`,
// serialized by `emit`. No validation-library concepts leak past `lower`.
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

pub const COMPONENT_REF_PREFIX: &str = "#/components/schemas/";

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Object(ObjectNode),
    Array(ArrayNode),
    Union(UnionNode),
    Scalar(ScalarNode),
    Ref(RefNode),             // only ever produced by the rewriter
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    pub properties: IndexMap<String, Schema>,
    pub required: IndexSet<String>,
    pub name: Option<String>, // Some iff the input declared a reusable type name
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    pub items: Box<Schema>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnionNode {
    pub alternatives: Vec<Schema>, // order is oneOf order
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScalarNode {
    pub ty: String,
    pub format: Option<String>,
    pub enum_: Option<Vec<Value>>,
    pub example: Option<Value>,
    pub default: Option<Value>,
    pub required: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefNode {
    pub target: String,
}

impl RefNode {
    pub fn component(name: &str) -> Self {
        Self { target: format!("{COMPONENT_REF_PREFIX}{name}") }
    }
}

impl Schema {
    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Schema::Object(o) => Some(o),
            _ => None,
        }
    }
    pub fn as_ref_target(&self) -> Option<&str> {
        match self {
            Schema::Ref(r) => Some(r.target.as_str()),
            _ => None,
        }
    }
}

//! Component extraction and `$ref` rewriting.
//!
//! Two passes over the canonical IR, always in this order:
//!
//! 1. `extract` reads a live tree and lifts a *clone* of every named object
//!    into the `ComponentTable`. The live tree is not touched, so its `name`
//!    fields are still there for pass 2.
//! 2. `rewrite` collapses every named object in a live tree into a `Ref`.
//!
//! Once all operations are done, `ComponentTable::rewrite_entries` runs pass 2
//! over the stored definitions so components point at each other instead of
//! inlining copies.
use indexmap::IndexMap;
use crate::ir::{ObjectNode, RefNode, Schema};

// ————————————————————————————————————————————————————————————————————————————
// TABLE
// ————————————————————————————————————————————————————————————————————————————

/// name → object definition (stored with `name` cleared).
/// Insertion order is kept so emitted documents are reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentTable {
    schemas: IndexMap<String, ObjectNode>,
}

impl ComponentTable {
    pub fn new() -> Self { Self::default() }

    /// Last write wins on a duplicate name.
    pub fn insert(&mut self, name: String, mut def: ObjectNode) {
        def.name = None;
        if let Some(prev) = self.schemas.insert(name.clone(), def) {
            if Some(&prev) != self.schemas.get(&name) {
                tracing::debug!(component = %name, "component redefined; keeping the later definition");
            }
        } else {
            tracing::debug!(component = %name, "component registered");
        }
    }

    pub fn get(&self, name: &str) -> Option<&ObjectNode> { self.schemas.get(name) }
    pub fn contains(&self, name: &str) -> bool { self.schemas.contains_key(name) }
    pub fn len(&self) -> usize { self.schemas.len() }
    pub fn is_empty(&self) -> bool { self.schemas.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ObjectNode)> {
        self.schemas.iter()
    }

    /// Final pass: nested named objects inside stored definitions become refs.
    pub fn rewrite_entries(&mut self) {
        for def in self.schemas.values_mut() {
            rewrite_object_properties(def);
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EXTRACT
// ————————————————————————————————————————————————————————————————————————————

/// Lift every named object reachable from `node` into `table`, innermost
/// first. `node` itself is only read.
pub fn extract(node: &Schema, table: &mut ComponentTable) {
    match node {
        Schema::Array(arr) => extract(&arr.items, table),
        Schema::Object(obj) => {
            for prop in obj.properties.values() {
                extract(prop, table);
            }
            if let Some(name) = &obj.name {
                table.insert(name.clone(), obj.clone());
            }
        }
        Schema::Union(u) => {
            for alt in &u.alternatives {
                extract(alt, table);
            }
        }
        Schema::Scalar(_) | Schema::Ref(_) => {}
    }
}

// ————————————————————————————————————————————————————————————————————————————
// REWRITE
// ————————————————————————————————————————————————————————————————————————————

/// Replace every named object in `node` with a component `$ref`.
/// Anonymous structure stays inline. Running it twice is a no-op.
pub fn rewrite(node: &mut Schema) {
    match node {
        Schema::Array(arr) => rewrite(&mut arr.items),
        Schema::Object(obj) => match obj.name.take() {
            // description goes too; a ref carries nothing but its target
            Some(name) => *node = Schema::Ref(RefNode::component(&name)),
            None => rewrite_object_properties(obj),
        },
        Schema::Union(u) => {
            for alt in &mut u.alternatives {
                rewrite(alt);
            }
        }
        Schema::Scalar(_) | Schema::Ref(_) => {}
    }
}

fn rewrite_object_properties(obj: &mut ObjectNode) {
    for prop in obj.properties.values_mut() {
        rewrite(prop);
    }
}

// ------------------------------- Tests ------------------------------------ //

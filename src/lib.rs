//! Validation-schema route descriptors → OpenAPI, with named object types
//! deduplicated into `components.schemas`.
//!
//! Pipeline: `lower` (validation node → IR) → `components` (extract, then
//! rewrite to `$ref`) → `emit` (IR → JSON). `operation` and `document` wire
//! that pipeline to routes and the document envelope.
pub mod validation;
pub mod ir;
pub mod error;
pub mod lower;
pub mod components;
pub mod emit;
pub mod operation;
pub mod document;
pub mod path_de;
pub mod jq_exec;
pub mod cli;

pub use components::{extract, rewrite, ComponentTable};
pub use document::{generate, Document, DocumentBuilder, DocumentOptions};
pub use error::ConvertError;
pub use ir::Schema;
pub use lower::translate;

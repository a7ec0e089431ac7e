//! Payload validation: declarative rules and the per-resource schemas built from them.

pub mod schemas;
mod validation;
pub use validation::{FieldKind, FieldRule, RequestValidator, Schema, ValidationErrors, SCHEMA_KEY};

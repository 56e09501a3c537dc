//! Declarative record schemas and the validator used on request bodies.

pub mod types;
pub mod validator;

pub use types::{FieldDef, FieldType, Format, Schema};
pub use validator::{SchemaValidator, ValidationReport, Validator};

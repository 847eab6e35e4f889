//! Validate loosely-typed JSON data against a declarative object schema.
//!
//! ```
//! use json_gate::{SchemaNode, Validator};
//! use serde_json::json;
//!
//! let schema = SchemaNode::from_value(&json!({
//!     "type": "object",
//!     "required": ["email"],
//!     "properties": { "email": { "type": "string", "format": "email" } }
//! })).unwrap();
//!
//! let result = Validator::standard().validate_value(&schema, &json!({}));
//! assert!(!result.status);
//! assert_eq!(result.errors, ["Field 'email' is required"]);
//! ```
pub mod schema;
pub mod path_de;
pub mod registry;
pub mod report;
pub mod engine;
pub mod jq_exec;
pub mod logging;
pub mod cli;

pub use engine::{Validator, ValidatorOptions};
pub use registry::{FormatFn, FormatRegistry};
pub use report::{ErrorCategory, Report, ValidationResult, Violation};
pub use schema::{SchemaError, SchemaNode, ValueKind};

//! Validation outcome: a structured violation tree, rendered to strings only
//! at the outer boundary.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::schema::ValueKind;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// One data-level problem. `Display` is the human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("Field '{field}' is required")]
    RequiredFieldMissing { field: String },

    #[error("Field '{field}' must be {}", .expected.with_article())]
    TypeMismatch { field: String, expected: ValueKind },

    #[error("Item {index} in '{field}' must be {}", .expected.with_article())]
    ItemTypeMismatch { field: String, index: usize, expected: ValueKind },

    #[error("Data must be an object")]
    DataNotObject,

    #[error("Field '{field}' must be at least {min_length} characters")]
    MinLength { field: String, min_length: u64 },

    #[error("Field '{field}' does not match the pattern")]
    PatternMismatch { field: String, pattern: String },

    #[error("Field '{field}' must be >= {minimum}")]
    BelowMinimum { field: String, minimum: f64 },

    #[error("Field '{field}' must be <= {maximum}")]
    AboveMaximum { field: String, maximum: f64 },

    #[error("Field '{field}' must be one of {}", render_values(.allowed))]
    NotInEnum { field: String, allowed: Vec<Value> },

    #[error("Field '{field}' must be a valid {format}")]
    FormatMismatch { field: String, format: String },

    #[error("Field '{field}' uses unknown format '{format}'")]
    UnknownFormat { field: String, format: String },

    #[error("Field '{field}' object validation failed: {}", render_nested(.errors))]
    NestedObject { field: String, errors: Vec<Violation> },

    #[error("Item {index} in '{field}' failed: {}", render_nested(.errors))]
    NestedItem { field: String, index: usize, errors: Vec<Violation> },

    #[error("Schema must define an object with properties")]
    SchemaMalformed,

    #[error("Schema nesting exceeds maximum depth of {max_depth}")]
    SchemaTooDeep { max_depth: usize },
}

/// Coarse taxonomy over [`Violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    RequiredFieldMissing,
    TypeMismatch,
    ConstraintViolation,
    FormatViolation,
    NestedValidationFailure,
    SchemaMalformed,
}

/// The structured result of one validate call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    violations: Vec<Violation>,
}

/// The flat boundary form: `status` is true iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: bool,
    pub errors: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Violation {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Violation::RequiredFieldMissing { .. } => ErrorCategory::RequiredFieldMissing,
            Violation::TypeMismatch { .. }
            | Violation::ItemTypeMismatch { .. }
            | Violation::DataNotObject => ErrorCategory::TypeMismatch,
            Violation::MinLength { .. }
            | Violation::PatternMismatch { .. }
            | Violation::BelowMinimum { .. }
            | Violation::AboveMaximum { .. }
            | Violation::NotInEnum { .. } => ErrorCategory::ConstraintViolation,
            Violation::FormatMismatch { .. } | Violation::UnknownFormat { .. } => {
                ErrorCategory::FormatViolation
            }
            Violation::NestedObject { .. } | Violation::NestedItem { .. } => {
                ErrorCategory::NestedValidationFailure
            }
            Violation::SchemaMalformed | Violation::SchemaTooDeep { .. } => {
                ErrorCategory::SchemaMalformed
            }
        }
    }

    /// The property this violation is attached to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Violation::RequiredFieldMissing { field }
            | Violation::TypeMismatch { field, .. }
            | Violation::ItemTypeMismatch { field, .. }
            | Violation::MinLength { field, .. }
            | Violation::PatternMismatch { field, .. }
            | Violation::BelowMinimum { field, .. }
            | Violation::AboveMaximum { field, .. }
            | Violation::NotInEnum { field, .. }
            | Violation::FormatMismatch { field, .. }
            | Violation::UnknownFormat { field, .. }
            | Violation::NestedObject { field, .. }
            | Violation::NestedItem { field, .. } => Some(field),
            Violation::DataNotObject
            | Violation::SchemaMalformed
            | Violation::SchemaTooDeep { .. } => None,
        }
    }

    /// Child violations for nested failures; empty otherwise.
    pub fn children(&self) -> &[Violation] {
        match self {
            Violation::NestedObject { errors, .. } | Violation::NestedItem { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    pub fn into_result(self) -> ValidationResult {
        ValidationResult::from(self)
    }
}

impl From<Violation> for Report {
    fn from(violation: Violation) -> Self {
        Self { violations: vec![violation] }
    }
}

impl From<Report> for ValidationResult {
    fn from(report: Report) -> Self {
        let errors = report.messages();
        ValidationResult { status: errors.is_empty(), errors }
    }
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self { status: true, errors: Vec::new() }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Nested messages are quoted inside the parent message as a JSON array.
fn render_nested(errors: &[Violation]) -> String {
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    serde_json::to_string(&messages).unwrap_or_default()
}

fn render_values(values: &[Value]) -> String {
    Value::Array(values.to_vec()).to_string()
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_render_like_the_boundary_contract() {
        let v = Violation::RequiredFieldMissing { field: "email".into() };
        assert_eq!(v.to_string(), "Field 'email' is required");

        let v = Violation::TypeMismatch { field: "tags".into(), expected: ValueKind::Array };
        assert_eq!(v.to_string(), "Field 'tags' must be an array");

        let v = Violation::AboveMaximum { field: "age".into(), maximum: 65.0 };
        assert_eq!(v.to_string(), "Field 'age' must be <= 65");

        let v = Violation::BelowMinimum { field: "score".into(), minimum: 0.5 };
        assert_eq!(v.to_string(), "Field 'score' must be >= 0.5");

        let v = Violation::NotInEnum {
            field: "gender".into(),
            allowed: vec![json!("M"), json!("F")],
        };
        assert_eq!(v.to_string(), r#"Field 'gender' must be one of ["M","F"]"#);
    }

    #[test]
    fn nested_errors_are_embedded_not_flattened() {
        let v = Violation::NestedObject {
            field: "address".into(),
            errors: vec![Violation::RequiredFieldMissing { field: "zip".into() }],
        };
        assert_eq!(
            v.to_string(),
            r#"Field 'address' object validation failed: ["Field 'zip' is required"]"#
        );
        assert_eq!(v.category(), ErrorCategory::NestedValidationFailure);
        assert_eq!(v.children().len(), 1);

        let v = Violation::NestedItem {
            field: "items".into(),
            index: 0,
            errors: vec![Violation::SchemaMalformed],
        };
        assert_eq!(
            v.to_string(),
            r#"Item 0 in 'items' failed: ["Schema must define an object with properties"]"#
        );
    }

    #[test]
    fn report_converts_to_flat_result() {
        let mut report = Report::new();
        assert!(report.is_valid());
        assert_eq!(report.clone().into_result(), ValidationResult::ok());

        report.push(Violation::FormatMismatch { field: "email".into(), format: "email".into() });
        assert!(!report.is_valid());
        assert_eq!(report.violations().len(), 1);
        let result = report.into_result();
        assert!(!result.status);
        assert_eq!(result.errors, ["Field 'email' must be a valid email"]);
    }

    #[test]
    fn violations_serialize_with_kind_tag() {
        let v = Violation::MinLength { field: "password".into(), min_length: 8 };
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            json!({ "kind": "min_length", "field": "password", "min_length": 8 })
        );
        assert_eq!(v.field(), Some("password"));
        assert_eq!(Violation::SchemaMalformed.field(), None);
    }
}

//! Recursive schema validation engine.
//!
//! Walks an object schema and a data mapping in lockstep and collects every
//! violation it finds. Nested objects and arrays of objects recurse through
//! the same entry point; their failures come back as a single wrapped entry
//! on the parent.
//!
//! Policy summary:
//! - absence (missing key or `null`) is only ever reported by `required`
//! - type-specific constraints run only once the type matches
//! - `enum` runs for every present value, on top of everything else
//! - a malformed nested schema fails that subtree, never the whole call
use serde_json::{Map, Number, Value};
use tracing::{debug, trace, warn};

use crate::registry::FormatRegistry;
use crate::report::{Report, ValidationResult, Violation};
use crate::schema::{ArrayRules, NumberRules, ObjectRules, SchemaNode, StringRules, ValueKind};

// ------------------------------- Policy ---------------------------------- //

/// Default bound on object/array nesting before a subtree is rejected.
pub const DEFAULT_MAX_DEPTH: usize = 64;

// ------------------------------- Types ----------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub max_depth: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// A validation engine bound to one format registry.
///
/// Holds no mutable state; a single instance can serve any number of
/// concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    registry: FormatRegistry,
    options: ValidatorOptions,
}

// ------------------------------ Front API -------------------------------- //

impl Validator {
    pub fn new(registry: FormatRegistry) -> Self {
        Self { registry, options: ValidatorOptions::default() }
    }

    /// Engine over [`FormatRegistry::standard`].
    pub fn standard() -> Self {
        Self::new(FormatRegistry::standard())
    }

    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn options(&self) -> ValidatorOptions {
        self.options
    }

    /// Validate a data mapping and render the flat result.
    pub fn validate(&self, schema: &SchemaNode, data: &Map<String, Value>) -> ValidationResult {
        self.check(schema, data).into_result()
    }

    /// Like [`Validator::validate`] for an arbitrary JSON value; non-objects
    /// are rejected with a single violation.
    pub fn validate_value(&self, schema: &SchemaNode, data: &Value) -> ValidationResult {
        self.check_value(schema, data).into_result()
    }

    /// Structured form of [`Validator::validate`].
    pub fn check(&self, schema: &SchemaNode, data: &Map<String, Value>) -> Report {
        self.check_object(schema, data, 0)
    }

    pub fn check_value(&self, schema: &SchemaNode, data: &Value) -> Report {
        match data {
            Value::Object(map) => self.check(schema, map),
            _ => match object_rules(schema) {
                Some(_) => Report::from(Violation::DataNotObject),
                None => Report::from(Violation::SchemaMalformed),
            },
        }
    }

    pub fn is_valid(&self, schema: &SchemaNode, data: &Value) -> bool {
        self.check_value(schema, data).is_valid()
    }
}

// ------------------------------- Objects --------------------------------- //

impl Validator {
    fn check_object(&self, schema: &SchemaNode, data: &Map<String, Value>, depth: usize) -> Report {
        trace!(depth, fields = data.len(), "validate object");

        let Some((rules, properties)) = object_rules(schema) else {
            return Report::from(Violation::SchemaMalformed);
        };
        if depth > self.options.max_depth {
            warn!(max_depth = self.options.max_depth, "schema nesting limit reached");
            return Report::from(Violation::SchemaTooDeep { max_depth: self.options.max_depth });
        }

        let mut report = Report::new();

        for name in &rules.required {
            if !data.contains_key(name) {
                report.push(Violation::RequiredFieldMissing { field: name.clone() });
            }
        }

        for (field, field_schema) in properties {
            let value = match data.get(field) {
                None | Some(Value::Null) => continue,
                Some(value) => value,
            };
            self.check_field(field, field_schema, value, depth, &mut report);
        }

        report
    }

    /// Single dispatch point over the declared type.
    fn check_field(
        &self,
        field: &str,
        schema: &SchemaNode,
        value: &Value,
        depth: usize,
        report: &mut Report,
    ) {
        match schema {
            SchemaNode::String(rules) => self.check_string(field, rules, value, report),
            SchemaNode::Number(rules) => self.check_number(field, rules, value, report),
            SchemaNode::Boolean(_) => {
                if !value.is_boolean() {
                    report.push(type_mismatch(field, ValueKind::Boolean));
                }
            }
            SchemaNode::Object(_) => match value {
                Value::Object(map) => {
                    let nested = self.check_object(schema, map, depth + 1);
                    if !nested.is_valid() {
                        debug!(field, errors = nested.violations().len(), "nested object failed");
                        report.push(Violation::NestedObject {
                            field: field.to_owned(),
                            errors: nested.into_violations(),
                        });
                    }
                }
                _ => report.push(type_mismatch(field, ValueKind::Object)),
            },
            SchemaNode::Array(rules) => self.check_array(field, rules, value, depth, report),
        }

        if let Some(allowed) = schema.enum_values() {
            if !allowed.iter().any(|candidate| json_eq(candidate, value)) {
                report.push(Violation::NotInEnum {
                    field: field.to_owned(),
                    allowed: allowed.to_vec(),
                });
            }
        }
    }
}

// ------------------------------ Primitives ------------------------------- //

impl Validator {
    fn check_string(&self, field: &str, rules: &StringRules, value: &Value, report: &mut Report) {
        let Some(s) = value.as_str() else {
            report.push(type_mismatch(field, ValueKind::String));
            return;
        };

        if let Some(min_length) = rules.min_length {
            if (s.chars().count() as u64) < min_length {
                report.push(Violation::MinLength { field: field.to_owned(), min_length });
            }
        }
        if let Some(pattern) = &rules.pattern {
            if !pattern.is_match(s) {
                report.push(Violation::PatternMismatch {
                    field: field.to_owned(),
                    pattern: pattern.as_str().to_owned(),
                });
            }
        }
        if let Some(format) = &rules.format {
            self.check_format(field, format, value, report);
        }
    }

    fn check_number(&self, field: &str, rules: &NumberRules, value: &Value, report: &mut Report) {
        let Some(n) = value.as_f64() else {
            report.push(type_mismatch(field, ValueKind::Number));
            return;
        };

        if let Some(minimum) = rules.minimum {
            if n < minimum {
                report.push(Violation::BelowMinimum { field: field.to_owned(), minimum });
            }
        }
        if let Some(maximum) = rules.maximum {
            if n > maximum {
                report.push(Violation::AboveMaximum { field: field.to_owned(), maximum });
            }
        }
        if let Some(format) = &rules.format {
            self.check_format(field, format, value, report);
        }
    }

    fn check_format(&self, field: &str, format: &str, value: &Value, report: &mut Report) {
        match self.registry.check(format, value) {
            Some(true) => {}
            Some(false) => report.push(Violation::FormatMismatch {
                field: field.to_owned(),
                format: format.to_owned(),
            }),
            None => report.push(Violation::UnknownFormat {
                field: field.to_owned(),
                format: format.to_owned(),
            }),
        }
    }
}

// -------------------------------- Arrays --------------------------------- //

impl Validator {
    fn check_array(
        &self,
        field: &str,
        rules: &ArrayRules,
        value: &Value,
        depth: usize,
        report: &mut Report,
    ) {
        let Some(items) = value.as_array() else {
            report.push(type_mismatch(field, ValueKind::Array));
            return;
        };
        let Some(item_schema) = rules.items.as_deref() else {
            return;
        };

        for (index, item) in items.iter().enumerate() {
            match item_schema {
                SchemaNode::Object(_) => {
                    let nested = match item {
                        Value::Object(map) => self.check_object(item_schema, map, depth + 1),
                        _ => {
                            report.push(item_mismatch(field, index, ValueKind::Object));
                            continue;
                        }
                    };
                    if !nested.is_valid() {
                        let errors = nested.violations().len();
                        debug!(field, index, errors, "array item failed");
                        report.push(Violation::NestedItem {
                            field: field.to_owned(),
                            index,
                            errors: nested.into_violations(),
                        });
                    }
                }
                // primitive (and nested array) items get a type check only
                other => {
                    let expected = other.kind();
                    if !expected.matches(item) {
                        report.push(item_mismatch(field, index, expected));
                    }
                }
            }
        }
    }
}

// ------------------------------- Utilities ------------------------------- //

fn object_rules(
    schema: &SchemaNode,
) -> Option<(&ObjectRules, &indexmap::IndexMap<String, SchemaNode>)> {
    match schema {
        SchemaNode::Object(rules) => rules.properties.as_ref().map(|props| (rules, props)),
        _ => None,
    }
}

fn type_mismatch(field: &str, expected: ValueKind) -> Violation {
    Violation::TypeMismatch { field: field.to_owned(), expected }
}

fn item_mismatch(field: &str, index: usize, expected: ValueKind) -> Violation {
    Violation::ItemTypeMismatch { field: field.to_owned(), index, expected }
}

/// JSON equality where numbers compare by value (`1 == 1.0`).
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => number_eq(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

/// Integers compare exactly; floats only widen when one side is a float.
fn number_eq(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    if x.is_f64() || y.is_f64() {
        return matches!((x.as_f64(), y.as_f64()), (Some(a), Some(b)) if a == b);
    }
    // one side negative i64, the other a u64 beyond i64::MAX
    false
}

// ------------------------------- Tests ------------------------------------ //

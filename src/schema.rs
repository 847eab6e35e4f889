//! Schema description: a closed tagged union over the five supported types.
//!
//! Parsed straight from JSON with serde's internally-tagged form, keyed on
//! `"type"`. Each variant carries only the constraints meaningful for it; keys
//! that belong to other types (or to nobody) are dropped on the floor.
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaNode {
    String(StringRules),
    Number(NumberRules),
    Boolean(BooleanRules),
    Object(ObjectRules),
    Array(ArrayRules),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StringRules {
    #[serde(rename = "minLength")]
    pub min_length: Option<u64>,
    pub pattern: Option<Pattern>,
    pub format: Option<String>,
    #[serde(rename = "enum")]
    pub enum_: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NumberRules {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// numeric predicates (latitude, longitude, ...) from the registry
    pub format: Option<String>,
    #[serde(rename = "enum")]
    pub enum_: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BooleanRules {
    #[serde(rename = "enum")]
    pub enum_: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ObjectRules {
    #[serde(default, deserialize_with = "unique_names")]
    pub required: IndexSet<String>,
    /// Left optional on purpose: an object node without properties parses,
    /// and the engine reports it as a malformed subtree.
    pub properties: Option<IndexMap<String, SchemaNode>>,
    #[serde(rename = "enum")]
    pub enum_: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArrayRules {
    pub items: Option<Box<SchemaNode>>,
    #[serde(rename = "enum")]
    pub enum_: Option<Vec<Value>>,
}

/// The runtime shape of a JSON value, restricted to what a schema can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

/// A leading-anchored regular expression.
///
/// Matches when the expression matches starting at offset 0; trailing input
/// after the match is allowed.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema at {path}: {message}")]
    Invalid { path: String, message: String },
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaNode {
    /// Parse from JSON text; errors carry the JSON path of the bad node.
    pub fn from_json_str(src: &str) -> Result<Self, SchemaError> {
        crate::path_de::from_str_with_path(src).map_err(SchemaError::from_path_error)
    }

    /// Parse from an already-decoded JSON value.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        crate::path_de::from_value_with_path(value).map_err(SchemaError::from_path_error)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            SchemaNode::String(_) => ValueKind::String,
            SchemaNode::Number(_) => ValueKind::Number,
            SchemaNode::Boolean(_) => ValueKind::Boolean,
            SchemaNode::Object(_) => ValueKind::Object,
            SchemaNode::Array(_) => ValueKind::Array,
        }
    }

    /// `enum` is the one constraint every variant carries.
    pub fn enum_values(&self) -> Option<&[Value]> {
        let values = match self {
            SchemaNode::String(r) => &r.enum_,
            SchemaNode::Number(r) => &r.enum_,
            SchemaNode::Boolean(r) => &r.enum_,
            SchemaNode::Object(r) => &r.enum_,
            SchemaNode::Array(r) => &r.enum_,
        };
        values.as_deref()
    }
}

impl ValueKind {
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Boolean),
            Value::Number(_) => Some(ValueKind::Number),
            Value::String(_) => Some(ValueKind::String),
            Value::Array(_) => Some(ValueKind::Array),
            Value::Object(_) => Some(ValueKind::Object),
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        Self::of(value) == Some(self)
    }

    /// "a string", "an object", ... for error messages.
    pub fn with_article(self) -> &'static str {
        match self {
            ValueKind::String => "a string",
            ValueKind::Number => "a number",
            ValueKind::Boolean => "a boolean",
            ValueKind::Object => "an object",
            ValueKind::Array => "an array",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        };
        f.write_str(name)
    }
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        // `\A` pins the match to the start; the tail stays unanchored.
        let regex = Regex::new(&format!(r"\A(?:{source})"))?;
        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let source = String::deserialize(de)?;
        Pattern::new(source).map_err(serde::de::Error::custom)
    }
}

impl SchemaError {
    fn from_path_error(err: crate::path_de::PathError) -> Self {
        SchemaError::Invalid { path: err.path, message: err.message }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn unique_names<'de, D>(de: D) -> Result<IndexSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(de)?;
    let mut out = IndexSet::with_capacity(names.len());
    for name in names {
        if out.contains(&name) {
            return Err(serde::de::Error::custom(format!("duplicate required field '{name}'")));
        }
        out.insert(name);
    }
    Ok(out)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

//! Failure descriptions produced by the validation layer
//!
//! [`FailureValue`] is a closed union over the shapes a field failure can
//! take. Adapters at the bottom of this file build it from loosely typed JSON
//! and from `validator::ValidationErrors`, so the tree builder never has to
//! inspect runtime shapes itself.

use indexmap::IndexMap;
use serde_json::Value;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Field key `validator` uses for struct-level (schema) failures
const VALIDATOR_SCHEMA_KEY: &str = "__all__";

/// Field key used for whole-object failures
pub const NON_FIELD_ERRORS_KEY: &str = "non_field_errors";

/// The failure attached to one field
#[derive(Debug, Clone, PartialEq)]
pub enum FailureValue {
    /// Scalar failure messages (or a list-level failure with no item breakdown)
    Messages(Vec<String>),
    /// The field holds a single nested object with its own failures
    Nested(FailureMap),
    /// The field holds a list of objects; `None` marks items that passed
    List(Vec<Option<FailureMap>>),
    /// Anything the validation layer produced that fits none of the above
    Other(Value),
}

impl FailureValue {
    pub fn message(message: impl Into<String>) -> Self {
        FailureValue::Messages(vec![message.into()])
    }

    /// Build from an upstream JSON failure description
    ///
    /// Dispatch follows the shape of the value: objects nest, arrays of
    /// strings are messages, arrays of objects (or nulls) are per-item
    /// failures. Everything else is kept as [`FailureValue::Other`].
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(_) => FailureValue::Nested(FailureMap::from_json(value)),
            Value::Array(items) => match items.first() {
                None => FailureValue::Messages(Vec::new()),
                Some(Value::String(_)) => {
                    FailureValue::Messages(items.iter().map(scalar_to_string).collect())
                }
                Some(Value::Object(_)) | Some(Value::Null) => FailureValue::List(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::Object(map) if !map.is_empty() => {
                                Some(FailureMap::from_json(item))
                            }
                            _ => None,
                        })
                        .collect(),
                ),
                Some(_) => FailureValue::Other(value.clone()),
            },
            other => FailureValue::Other(other.clone()),
        }
    }
}

/// Ordered mapping of field name to failure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureMap(IndexMap<String, FailureValue>);

impl FailureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a failure for `field`, replacing any previous one
    pub fn insert(&mut self, field: impl Into<String>, failure: FailureValue) {
        self.0.insert(field.into(), failure);
    }

    /// Append a message to `field`, creating a messages failure if needed
    pub fn push_message(&mut self, field: &str, message: impl Into<String>) {
        match self.0.get_mut(field) {
            Some(FailureValue::Messages(messages)) => messages.push(message.into()),
            _ => {
                self.0
                    .insert(field.to_string(), FailureValue::message(message));
            }
        }
    }

    pub fn with(mut self, field: impl Into<String>, failure: FailureValue) -> Self {
        self.insert(field, failure);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FailureValue> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FailureValue)> {
        self.0.iter()
    }

    /// Build from a JSON object of field failures
    ///
    /// Non-objects produce an empty map; `null` failures are skipped.
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::new();
        };

        Self(
            object
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(field, v)| (field.clone(), FailureValue::from_json(v)))
                .collect(),
        )
    }
}

impl FromIterator<(String, FailureValue)> for FailureMap {
    fn from_iter<I: IntoIterator<Item = (String, FailureValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&ValidationErrors> for FailureMap {
    /// Adapt derive-based validation output
    ///
    /// Fields are emitted in name order since `validator` stores them in a
    /// hash map.
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields: Vec<(String, &ValidationErrorsKind)> = errors
            .errors()
            .iter()
            .map(|(field, kind)| (field.to_string(), kind))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        fields
            .into_iter()
            .map(|(field, kind)| {
                let field = if field == VALIDATOR_SCHEMA_KEY {
                    NON_FIELD_ERRORS_KEY.to_string()
                } else {
                    field
                };
                (field, failure_from_kind(kind))
            })
            .collect()
    }
}

impl From<ValidationErrors> for FailureMap {
    fn from(errors: ValidationErrors) -> Self {
        FailureMap::from(&errors)
    }
}

fn failure_from_kind(kind: &ValidationErrorsKind) -> FailureValue {
    match kind {
        ValidationErrorsKind::Field(errors) => FailureValue::Messages(
            errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect(),
        ),
        ValidationErrorsKind::Struct(inner) => FailureValue::Nested(FailureMap::from(&**inner)),
        ValidationErrorsKind::List(items) => {
            let len = items.keys().next_back().map(|last| last + 1).unwrap_or(0);
            let mut list = vec![None; len];
            for (index, inner) in items {
                let map = FailureMap::from(&**inner);
                if !map.is_empty() {
                    list[*index] = Some(map);
                }
            }
            FailureValue::List(list)
        }
    }
}

/// Render one JSON value as message text
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

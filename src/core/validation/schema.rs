//! Declarative input schemas
//!
//! An [`InputSchema`] validates a JSON payload field by field, recursing into
//! nested objects and lists of objects, and reports failures as a
//! [`FailureMap`] ready for the [`ErrorTreeBuilder`](super::ErrorTreeBuilder).
//!
//! ```rust,ignore
//! let option = InputSchema::new()
//!     .field("label", FieldRule::scalar().filter(trim()).validate(required()));
//!
//! let question = InputSchema::new()
//!     .field("title", FieldRule::scalar().validate(required()))
//!     .field("options", FieldRule::list(option).min_items(1));
//!
//! match question.validate(&payload) {
//!     Ok(clean) => save(clean),
//!     Err(failures) => ErrorTreeBuilder::build(&failures, Some(&payload)),
//! }
//! ```

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::failure::{FailureMap, FailureValue, NON_FIELD_ERRORS_KEY};
use crate::core::case::to_camel_case;

/// Boxed field validator
pub type FieldValidator = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Boxed field filter
pub type FieldFilter = Arc<dyn Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync>;

#[derive(Clone)]
enum FieldKind {
    Scalar,
    Object(InputSchema),
    List {
        item: InputSchema,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
}

/// Rules for one field
#[derive(Clone)]
pub struct FieldRule {
    filters: Vec<FieldFilter>,
    validators: Vec<FieldValidator>,
    kind: FieldKind,
}

impl FieldRule {
    /// A plain value field
    pub fn scalar() -> Self {
        Self::with_kind(FieldKind::Scalar)
    }

    /// A field holding a single nested object
    pub fn object(schema: InputSchema) -> Self {
        Self::with_kind(FieldKind::Object(schema))
    }

    /// A field holding a list of objects
    pub fn list(item: InputSchema) -> Self {
        Self::with_kind(FieldKind::List {
            item,
            min_items: None,
            max_items: None,
        })
    }

    fn with_kind(kind: FieldKind) -> Self {
        Self {
            filters: Vec::new(),
            validators: Vec::new(),
            kind,
        }
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn validate<V>(mut self, validator: V) -> Self
    where
        V: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Minimum list length (list fields only)
    pub fn min_items(mut self, min: usize) -> Self {
        if let FieldKind::List { min_items, .. } = &mut self.kind {
            *min_items = Some(min);
        }
        self
    }

    /// Maximum list length (list fields only)
    pub fn max_items(mut self, max: usize) -> Self {
        if let FieldKind::List { max_items, .. } = &mut self.kind {
            *max_items = Some(max);
        }
        self
    }
}

/// Ordered set of field rules for one object
#[derive(Clone, Default)]
pub struct InputSchema {
    fields: IndexMap<String, FieldRule>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule for `name` (snake_case; camelCase payload keys also match)
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(name.into(), rule);
        self
    }

    /// Validate `payload`, returning the filtered payload or the failures
    ///
    /// Fields without a rule are passed through untouched.
    pub fn validate(&self, payload: &Value) -> Result<Value, FailureMap> {
        let Some(input) = payload.as_object() else {
            return Err(FailureMap::new().with(
                NON_FIELD_ERRORS_KEY,
                FailureValue::message(format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_type_name(payload)
                )),
            ));
        };

        let mut output: Map<String, Value> = input.clone();
        let mut failures = FailureMap::new();

        for (name, rule) in &self.fields {
            let key = resolve_key(input, name);
            let present = input.contains_key(&key);
            let raw = input.get(&key).cloned().unwrap_or(Value::Null);

            match Self::validate_field(name, rule, raw) {
                Ok(value) => {
                    if present {
                        output.insert(key, value);
                    }
                }
                Err(failure) => failures.insert(name.clone(), failure),
            }
        }

        if failures.is_empty() {
            Ok(Value::Object(output))
        } else {
            Err(failures)
        }
    }

    fn validate_field(name: &str, rule: &FieldRule, raw: Value) -> Result<Value, FailureValue> {
        let mut value = raw;
        if !value.is_null() {
            for filter in &rule.filters {
                value = filter(name, value)
                    .map_err(|e| FailureValue::message(e.to_string()))?;
            }
        }

        let messages: Vec<String> = rule
            .validators
            .iter()
            .filter_map(|validator| validator(name, &value).err())
            .collect();
        if !messages.is_empty() {
            return Err(FailureValue::Messages(messages));
        }

        if value.is_null() {
            return Ok(value);
        }

        match &rule.kind {
            FieldKind::Scalar => Ok(value),
            FieldKind::Object(schema) => {
                if !value.is_object() {
                    return Err(FailureValue::message(format!(
                        "Invalid data. Expected a dictionary, but got {}.",
                        json_type_name(&value)
                    )));
                }
                schema.validate(&value).map_err(FailureValue::Nested)
            }
            FieldKind::List {
                item,
                min_items,
                max_items,
            } => {
                let Some(items) = value.as_array() else {
                    return Err(FailureValue::message(format!(
                        "Expected a list of items but got type \"{}\".",
                        json_type_name(&value)
                    )));
                };

                if let Some(min) = min_items.filter(|min| items.len() < *min) {
                    return Err(FailureValue::message(format!(
                        "Ensure this field has at least {} elements.",
                        min
                    )));
                }
                if let Some(max) = max_items.filter(|max| items.len() > *max) {
                    return Err(FailureValue::message(format!(
                        "Ensure this field has no more than {} elements.",
                        max
                    )));
                }

                let mut cleaned = Vec::with_capacity(items.len());
                let mut item_failures = Vec::with_capacity(items.len());
                for entry in items {
                    match item.validate(entry) {
                        Ok(clean) => {
                            cleaned.push(clean);
                            item_failures.push(None);
                        }
                        Err(failure) => {
                            cleaned.push(entry.clone());
                            item_failures.push(Some(failure));
                        }
                    }
                }

                if item_failures.iter().any(Option::is_some) {
                    Err(FailureValue::List(item_failures))
                } else {
                    Ok(Value::Array(cleaned))
                }
            }
        }
    }
}

fn resolve_key(input: &Map<String, Value>, name: &str) -> String {
    if input.contains_key(name) {
        return name.to_string();
    }
    let camel = to_camel_case(name);
    if input.contains_key(&camel) {
        camel
    } else {
        name.to_string()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

//! Reusable input filters
//!
//! Filters normalize submitted values before the field validators run.
//! Non-string values pass through every filter here untouched.

use anyhow::Result;
use serde_json::Value;

fn on_strings<F>(transform: F) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone
where
    F: Fn(&str) -> Value + Send + Sync + Clone,
{
    move |_: &str, value: Value| match value {
        Value::String(s) => Ok(transform(&s)),
        other => Ok(other),
    }
}

/// Strip leading and trailing whitespace
pub fn trim() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    on_strings(|s| Value::String(s.trim().to_string()))
}

/// Lowercase (emails, codes)
pub fn lowercase() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    on_strings(|s| Value::String(s.to_lowercase()))
}

/// Collapse runs of whitespace into single spaces
pub fn collapse_whitespace() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    on_strings(|s| Value::String(s.split_whitespace().collect::<Vec<_>>().join(" ")))
}

/// Empty strings become null so `required()` catches them
pub fn empty_as_null() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    on_strings(|s| {
        if s.is_empty() {
            Value::Null
        } else {
            Value::String(s.to_string())
        }
    })
}

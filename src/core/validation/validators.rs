//! Reusable field validators
//!
//! Each validator returns the message to report for the field, or `Ok(())`.
//! Validators other than [`required`] let values of other types pass so
//! they can be combined freely.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Field must be present and not null
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |_: &str, value: &Value| {
        if value.is_null() {
            Err("This field is required.".to_string())
        } else {
            Ok(())
        }
    }
}

/// Shallow address check, same as the signup form
pub fn email() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |_: &str, value: &Value| {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
                .expect("email pattern compiles")
        });
        if regex.is_match(s) {
            Ok(())
        } else {
            Err("Enter a valid email address.".to_string())
        }
    }
}

pub fn positive() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |_: &str, value: &Value| match value.as_f64() {
        Some(num) if num <= 0.0 => Err("Ensure this value is greater than 0.".to_string()),
        _ => Ok(()),
    }
}

/// Length in characters, not bytes
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let len = s.chars().count();
        if len < min {
            Err(format!(
                "Ensure this field has at least {} characters.",
                min
            ))
        } else if len > max {
            Err(format!(
                "Ensure this field has no more than {} characters.",
                max
            ))
        } else {
            Ok(())
        }
    }
}

/// Inclusive upper bound
pub fn max_value(max: f64) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_f64() {
        Some(num) if num > max => Err(format!(
            "Ensure this value is less than or equal to {}.",
            max
        )),
        _ => Ok(()),
    }
}

/// Choice among a fixed set, e.g. question types
pub fn in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if !allowed.iter().any(|a| a == s) => {
            Err(format!("\"{}\" is not a valid choice.", s))
        }
        _ => Ok(()),
    }
}

/// `format` uses chrono strftime syntax
pub fn date_format(
    format: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        match chrono::NaiveDate::parse_from_str(s, format) {
            Ok(_) => Ok(()),
            Err(_) => Err(format!(
                "Date has wrong format. Use one of these formats instead: {}.",
                format
            )),
        }
    }
}

//! Field-name case conversion
//!
//! The validation layer speaks snake_case (Rust field names), while clients
//! submit and expect camelCase. These helpers convert at the boundary.

use regex::Regex;
use std::sync::OnceLock;

/// Convert a snake_case name to camelCase
///
/// Every component after the first is capitalized and the rest of it
/// lowercased. Empty components (double underscores) are kept as `_`.
///
/// # Examples
///
/// ```
/// use qbuilder::core::case::to_camel_case;
///
/// assert_eq!(to_camel_case("new_password"), "newPassword");
/// assert_eq!(to_camel_case("email"), "email");
/// assert_eq!(to_camel_case("clientId"), "clientId");
/// ```
pub fn to_camel_case(name: &str) -> String {
    let mut components = name.split('_');
    let mut out = components.next().unwrap_or_default().to_string();

    for component in components {
        if component.is_empty() {
            out.push('_');
            continue;
        }
        let mut chars = component.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }

    out
}

/// Convert a camelCase (or PascalCase) name to snake_case
///
/// # Examples
///
/// ```
/// use qbuilder::core::case::to_snake_case;
///
/// assert_eq!(to_snake_case("newPassword"), "new_password");
/// assert_eq!(to_snake_case("objectErrors"), "object_errors");
/// assert_eq!(to_snake_case("HTTPResponse"), "http_response");
/// ```
pub fn to_snake_case(name: &str) -> String {
    static WORD_START: OnceLock<Regex> = OnceLock::new();
    static LOWER_UPPER: OnceLock<Regex> = OnceLock::new();

    let word_start = WORD_START.get_or_init(|| {
        Regex::new(r"(.)([A-Z][a-z]+)").expect("static regex is valid")
    });
    let lower_upper = LOWER_UPPER.get_or_init(|| {
        Regex::new(r"([a-z0-9])([A-Z])").expect("static regex is valid")
    });

    let s1 = word_start.replace_all(name, "${1}_${2}");
    lower_upper.replace_all(&s1, "${1}_${2}").to_lowercase()
}

//! Conversion of nested failures into a client-consumable error tree

use serde_json::Value;

use super::failure::{FailureMap, FailureValue, scalar_to_string};
use super::node::{ArrayErrorNode, ErrorNode, NON_FIELD_ERRORS, missing_client_id};
use crate::core::case::{to_camel_case, to_snake_case};

/// Message reported when something failed without a structured failure
pub const DEFAULT_ERROR_MESSAGE: &str =
    "Something unexpected has occured. Please contact an admin to fix this issue.";

/// Separator between messages of one field
const MESSAGE_SEPARATOR: &str = ", ";

/// Builds error trees from failure maps
///
/// Correlation ids are always read from the caller's original payload so the
/// client can map each error back to the element that produced it.
pub struct ErrorTreeBuilder;

impl ErrorTreeBuilder {
    /// Build the ordered error tree for `failures`
    ///
    /// `original_input` is the payload as submitted, used to recover
    /// `clientId`s and to tell list fields from scalar ones. Total over its
    /// inputs: unrecognized failure shapes become scalar messages.
    ///
    /// # Examples
    ///
    /// ```
    /// use qbuilder::core::validation::{ErrorTreeBuilder, FailureMap};
    /// use serde_json::json;
    ///
    /// let failures = FailureMap::from_json(&json!({"email": ["Enter a valid email"]}));
    /// let tree = ErrorTreeBuilder::build(&failures, Some(&json!({"email": "bad"})));
    ///
    /// assert_eq!(tree.len(), 1);
    /// assert_eq!(tree[0].get_messages(), Some("Enter a valid email"));
    /// ```
    pub fn build(failures: &FailureMap, original_input: Option<&Value>) -> Vec<ErrorNode> {
        let node_client_id = original_input.and_then(client_id_of);

        failures
            .iter()
            .map(|(field, failure)| {
                let field_input = original_input.and_then(|input| input_field(input, field));
                Self::build_node(field, failure, field_input, node_client_id.clone())
            })
            .collect()
    }

    fn build_node(
        field: &str,
        failure: &FailureValue,
        field_input: Option<&Value>,
        client_id: Option<String>,
    ) -> ErrorNode {
        let name = to_camel_case(field);

        match failure {
            FailureValue::Nested(inner) => {
                ErrorNode::object_errors(name, client_id, Self::build(inner, field_input))
            }
            FailureValue::Messages(messages) => {
                let joined = messages.join(MESSAGE_SEPARATOR);
                if matches!(field_input, Some(Value::Array(_))) {
                    // the list itself failed (length, uniqueness...), not one of its items
                    ErrorNode::array_errors(
                        name,
                        client_id,
                        vec![ArrayErrorNode::non_member(joined)],
                    )
                } else {
                    ErrorNode::messages(name, client_id, joined)
                }
            }
            FailureValue::List(items) => {
                let item_inputs = field_input.and_then(Value::as_array);
                let array_errors = items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| {
                        let item_failures = item.as_ref().filter(|m| !m.is_empty())?;
                        let item_input = item_inputs.and_then(|inputs| inputs.get(index));
                        let item_client_id = item_input
                            .and_then(client_id_of)
                            .unwrap_or_else(|| missing_client_id(index));
                        Some(ArrayErrorNode::item(
                            item_client_id,
                            Self::build(item_failures, item_input),
                        ))
                    })
                    .collect();
                ErrorNode::array_errors(name, client_id, array_errors)
            }
            FailureValue::Other(value) => {
                tracing::debug!(field = %name, "unrecognized failure shape reported as message");
                ErrorNode::messages(name, client_id, fallback_message(value))
            }
        }
    }

    /// A single whole-request error node
    ///
    /// Used when no structured failure exists but the caller must still
    /// report that something went wrong. Falls back to
    /// [`DEFAULT_ERROR_MESSAGE`].
    pub fn generate_message(message: Option<&str>) -> Vec<ErrorNode> {
        vec![ErrorNode::messages(
            NON_FIELD_ERRORS,
            None,
            message.unwrap_or(DEFAULT_ERROR_MESSAGE),
        )]
    }
}

/// Read the correlation id of an input object
///
/// Accepts `clientId` or `client_id`, as a string or a number.
fn client_id_of(input: &Value) -> Option<String> {
    let object = input.as_object()?;
    let raw = object.get("clientId").or_else(|| object.get("client_id"))?;
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Look up `field` in an input object, tolerating case differences
fn input_field<'a>(input: &'a Value, field: &str) -> Option<&'a Value> {
    let object = input.as_object()?;
    object
        .get(field)
        .or_else(|| object.get(&to_camel_case(field)))
        .or_else(|| object.get(&to_snake_case(field)))
}

fn fallback_message(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(" "),
        other => scalar_to_string(other),
    }
}

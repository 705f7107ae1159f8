//! Error tree node types
//!
//! On the wire every node carries all of `messages`, `objectErrors` and
//! `arrayErrors`, with exactly one of them non-null. In memory that
//! exclusivity is carried by [`ErrorContent`] so it cannot be violated.

use serde::{Deserialize, Serialize};

/// Reserved array client id for failures that apply to the whole list
pub const ARRAY_NON_MEMBER_ERRORS: &str = "nonMemberErrors";

/// Field name used for whole-request (non-field) errors
pub const NON_FIELD_ERRORS: &str = "nonFieldErrors";

/// Placeholder client id for a failing list item that carried none
pub fn missing_client_id(index: usize) -> String {
    format!("NOT_FOUND_{}", index)
}

/// The error content of a node
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorContent {
    /// Scalar, field-level failure
    Messages(String),
    /// The field holds a single nested object with its own failures
    ObjectErrors(Vec<ErrorNode>),
    /// The field holds a list of objects, some of which failed
    ArrayErrors(Vec<ArrayErrorNode>),
}

/// One reported validation failure, attached to a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ErrorNodeWire", try_from = "ErrorNodeWire")]
pub struct ErrorNode {
    /// camelCase name of the offending field
    pub field: String,
    /// Correlation id of the input object owning the field
    pub client_id: Option<String>,
    pub content: ErrorContent,
}

impl ErrorNode {
    pub fn messages(
        field: impl Into<String>,
        client_id: Option<String>,
        messages: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            client_id,
            content: ErrorContent::Messages(messages.into()),
        }
    }

    pub fn object_errors(
        field: impl Into<String>,
        client_id: Option<String>,
        errors: Vec<ErrorNode>,
    ) -> Self {
        Self {
            field: field.into(),
            client_id,
            content: ErrorContent::ObjectErrors(errors),
        }
    }

    pub fn array_errors(
        field: impl Into<String>,
        client_id: Option<String>,
        errors: Vec<ArrayErrorNode>,
    ) -> Self {
        Self {
            field: field.into(),
            client_id,
            content: ErrorContent::ArrayErrors(errors),
        }
    }

    pub fn get_messages(&self) -> Option<&str> {
        match &self.content {
            ErrorContent::Messages(m) => Some(m),
            _ => None,
        }
    }

    pub fn get_object_errors(&self) -> Option<&[ErrorNode]> {
        match &self.content {
            ErrorContent::ObjectErrors(e) => Some(e),
            _ => None,
        }
    }

    pub fn get_array_errors(&self) -> Option<&[ArrayErrorNode]> {
        match &self.content {
            ErrorContent::ArrayErrors(e) => Some(e),
            _ => None,
        }
    }

    /// Find the node reported for `field` in a list of nodes
    pub fn find<'a>(errors: &'a [ErrorNode], field: &str) -> Option<&'a ErrorNode> {
        errors.iter().find(|e| e.field == field)
    }
}

/// Content of one array entry
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayErrorContent {
    /// List-level failure (only with the non-member sentinel id)
    Messages(String),
    /// Failures inside the list item
    ObjectErrors(Vec<ErrorNode>),
}

/// Errors for one item of a list field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ArrayErrorNodeWire", try_from = "ArrayErrorNodeWire")]
pub struct ArrayErrorNode {
    pub client_id: String,
    pub content: ArrayErrorContent,
}

impl ArrayErrorNode {
    pub fn item(client_id: impl Into<String>, errors: Vec<ErrorNode>) -> Self {
        Self {
            client_id: client_id.into(),
            content: ArrayErrorContent::ObjectErrors(errors),
        }
    }

    /// The synthetic entry for a failure of the list as a whole
    pub fn non_member(messages: impl Into<String>) -> Self {
        Self {
            client_id: ARRAY_NON_MEMBER_ERRORS.to_string(),
            content: ArrayErrorContent::Messages(messages.into()),
        }
    }

    pub fn is_non_member(&self) -> bool {
        self.client_id == ARRAY_NON_MEMBER_ERRORS
    }

    pub fn get_messages(&self) -> Option<&str> {
        match &self.content {
            ArrayErrorContent::Messages(m) => Some(m),
            ArrayErrorContent::ObjectErrors(_) => None,
        }
    }

    pub fn get_object_errors(&self) -> Option<&[ErrorNode]> {
        match &self.content {
            ArrayErrorContent::ObjectErrors(e) => Some(e),
            ArrayErrorContent::Messages(_) => None,
        }
    }
}

// =============================================================================
// Wire representation
// =============================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorNodeWire {
    field: String,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    messages: Option<String>,
    #[serde(default)]
    object_errors: Option<Vec<ErrorNode>>,
    #[serde(default)]
    array_errors: Option<Vec<ArrayErrorNode>>,
}

impl From<ErrorNode> for ErrorNodeWire {
    fn from(node: ErrorNode) -> Self {
        let (messages, object_errors, array_errors) = match node.content {
            ErrorContent::Messages(m) => (Some(m), None, None),
            ErrorContent::ObjectErrors(e) => (None, Some(e), None),
            ErrorContent::ArrayErrors(e) => (None, None, Some(e)),
        };
        Self {
            field: node.field,
            client_id: node.client_id,
            messages,
            object_errors,
            array_errors,
        }
    }
}

impl TryFrom<ErrorNodeWire> for ErrorNode {
    type Error = String;

    fn try_from(wire: ErrorNodeWire) -> Result<Self, Self::Error> {
        let content = match (wire.messages, wire.object_errors, wire.array_errors) {
            (Some(m), None, None) => ErrorContent::Messages(m),
            (None, Some(e), None) => ErrorContent::ObjectErrors(e),
            (None, None, Some(e)) => ErrorContent::ArrayErrors(e),
            _ => {
                return Err(format!(
                    "error node '{}' must carry exactly one of messages, objectErrors, arrayErrors",
                    wire.field
                ));
            }
        };
        Ok(Self {
            field: wire.field,
            client_id: wire.client_id,
            content,
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrayErrorNodeWire {
    client_id: String,
    #[serde(default)]
    messages: Option<String>,
    #[serde(default)]
    object_errors: Option<Vec<ErrorNode>>,
}

impl From<ArrayErrorNode> for ArrayErrorNodeWire {
    fn from(node: ArrayErrorNode) -> Self {
        let (messages, object_errors) = match node.content {
            ArrayErrorContent::Messages(m) => (Some(m), None),
            ArrayErrorContent::ObjectErrors(e) => (None, Some(e)),
        };
        Self {
            client_id: node.client_id,
            messages,
            object_errors,
        }
    }
}

impl TryFrom<ArrayErrorNodeWire> for ArrayErrorNode {
    type Error = String;

    fn try_from(wire: ArrayErrorNodeWire) -> Result<Self, Self::Error> {
        let content = match (wire.messages, wire.object_errors) {
            (Some(m), None) => ArrayErrorContent::Messages(m),
            (None, Some(e)) => ArrayErrorContent::ObjectErrors(e),
            _ => {
                return Err(format!(
                    "array error '{}' must carry exactly one of messages, objectErrors",
                    wire.client_id
                ));
            }
        };
        Ok(Self {
            client_id: wire.client_id,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_node_serializes_all_keys() {
        let node = ErrorNode::messages("email", None, "Enter a valid email");
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "field": "email",
                "clientId": null,
                "messages": "Enter a valid email",
                "objectErrors": null,
                "arrayErrors": null
            })
        );
    }

    #[test]
    fn test_array_node_wire_shape() {
        let node = ErrorNode::array_errors(
            "items",
            Some("c-1".to_string()),
            vec![ArrayErrorNode::item(
                "c-9",
                vec![ErrorNode::messages("title", None, "Required")],
            )],
        );
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["arrayErrors"][0]["clientId"], "c-9");
        assert_eq!(value["arrayErrors"][0]["messages"], json!(null));
        assert_eq!(
            value["arrayErrors"][0]["objectErrors"][0]["messages"],
            "Required"
        );
        assert_eq!(value["messages"], json!(null));
        assert_eq!(value["objectErrors"], json!(null));
    }

    #[test]
    fn test_deserialize_rejects_two_contents() {
        let result = serde_json::from_value::<ErrorNode>(json!({
            "field": "email",
            "clientId": null,
            "messages": "a",
            "objectErrors": [],
            "arrayErrors": null
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_no_content() {
        let result = serde_json::from_value::<ErrorNode>(json!({ "field": "email" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_member_entry() {
        let entry = ArrayErrorNode::non_member("Ensure this field has at least 1 elements.");
        assert!(entry.is_non_member());
        assert_eq!(
            entry.get_messages(),
            Some("Ensure this field has at least 1 elements.")
        );
        assert!(entry.get_object_errors().is_none());
    }

    #[test]
    fn test_missing_client_id_embeds_index() {
        assert_eq!(missing_client_id(3), "NOT_FOUND_3");
    }
}

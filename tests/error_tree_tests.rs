//! Tests for the structured validation-error protocol
//!
//! These tests verify that:
//! - Every node carries exactly one kind of content
//! - List failures keep their order, skip clean items and carry client ids
//! - Whole-list failures surface as a non-member entry
//! - The wire format is stable

use qbuilder::core::validation::{ARRAY_NON_MEMBER_ERRORS, ErrorContent, NON_FIELD_ERRORS};
use qbuilder::prelude::*;
use serde_json::{Value, json};

fn build(failures: Value, input: Value) -> Vec<ErrorNode> {
    ErrorTreeBuilder::build(&FailureMap::from_json(&failures), Some(&input))
}

fn content_count(node: &ErrorNode) -> usize {
    [
        node.get_messages().is_some(),
        node.get_object_errors().is_some(),
        node.get_array_errors().is_some(),
    ]
    .into_iter()
    .filter(|present| *present)
    .count()
}

fn assert_exclusive(nodes: &[ErrorNode]) {
    for node in nodes {
        assert_eq!(content_count(node), 1, "node {} is not exclusive", node.field);
        if let Some(children) = node.get_object_errors() {
            assert_exclusive(children);
        }
        for entry in node.get_array_errors().unwrap_or_default() {
            if let Some(children) = entry.get_object_errors() {
                assert_exclusive(children);
            }
        }
    }
}

// =============================================================================
// Documented Scenarios
// =============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn test_single_scalar_field() {
        let tree = build(
            json!({"email": ["Enter a valid email"]}),
            json!({"email": "bad"}),
        );

        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!([{
                "field": "email",
                "clientId": null,
                "messages": "Enter a valid email",
                "objectErrors": null,
                "arrayErrors": null
            }])
        );
    }

    #[test]
    fn test_list_with_one_failing_item() {
        let tree = build(
            json!({"items": [{}, {"title": ["Required"]}]}),
            json!({"items": [{"clientId": "a"}, {"clientId": "b"}]}),
        );

        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!([{
                "field": "items",
                "clientId": null,
                "messages": null,
                "objectErrors": null,
                "arrayErrors": [{
                    "clientId": "b",
                    "messages": null,
                    "objectErrors": [{
                        "field": "title",
                        "clientId": "b",
                        "messages": "Required",
                        "objectErrors": null,
                        "arrayErrors": null
                    }]
                }]
            }])
        );
    }
}

// =============================================================================
// Structural Properties
// =============================================================================

mod property_tests {
    use super::*;

    #[test]
    fn test_nodes_are_exclusive_at_every_depth() {
        let tree = build(
            json!({
                "name": ["Required"],
                "address": {"city": ["Required"], "zip": ["Invalid"]},
                "items": ["At least one item is required"],
                "lines": [null, {"qty": ["Must be positive"], "tags": [{"label": ["Too long"]}]}],
                "non_field_errors": ["Totals do not match"]
            }),
            json!({
                "name": "",
                "address": {"city": ""},
                "items": [],
                "lines": [{"clientId": "l1"}, {"clientId": "l2", "tags": [{"clientId": "t1"}]}]
            }),
        );

        assert_eq!(tree.len(), 5);
        assert_exclusive(&tree);
    }

    #[test]
    fn test_array_entries_follow_input_order() {
        let tree = build(
            json!({"rows": [{"a": ["x"]}, null, {"a": ["y"]}, {}, {"a": ["z"]}]}),
            json!({"rows": [
                {"clientId": "r0"},
                {"clientId": "r1"},
                {"clientId": "r2"},
                {"clientId": "r3"},
                {"clientId": "r4"}
            ]}),
        );

        let ids: Vec<_> = tree[0]
            .get_array_errors()
            .unwrap()
            .iter()
            .map(|entry| entry.client_id.clone())
            .collect();
        assert_eq!(ids, vec!["r0", "r2", "r4"]);
    }

    #[test]
    fn test_missing_client_ids_get_placeholders() {
        let tree = build(
            json!({"rows": [null, {"a": ["x"]}, {"a": ["y"]}]}),
            json!({"rows": [{}, {}, {"clientId": 7}]}),
        );

        let ids: Vec<_> = tree[0]
            .get_array_errors()
            .unwrap()
            .iter()
            .map(|entry| entry.client_id.clone())
            .collect();
        assert_eq!(ids, vec!["NOT_FOUND_1", "7"]);
    }

    #[test]
    fn test_whole_list_failure_is_non_member() {
        let tree = build(
            json!({"items": ["Ensure this field has at least 1 elements."]}),
            json!({"items": []}),
        );

        let entries = tree[0].get_array_errors().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_non_member());
        assert_eq!(entries[0].client_id, ARRAY_NON_MEMBER_ERRORS);
        assert_eq!(
            entries[0].get_messages(),
            Some("Ensure this field has at least 1 elements.")
        );
    }

    #[test]
    fn test_field_names_are_camel_cased() {
        let tree = build(
            json!({"new_password": ["Too short"], "non_field_errors": ["Nope"]}),
            json!({"newPassword": "x"}),
        );
        assert!(ErrorNode::find(&tree, "newPassword").is_some());
        assert!(ErrorNode::find(&tree, NON_FIELD_ERRORS).is_some());
    }

    #[test]
    fn test_unrecognized_shape_becomes_message() {
        let tree = build(json!({"count": 42}), json!({"count": "a", "clientId": "form"}));
        assert_eq!(tree[0].get_messages(), Some("42"));
        assert_eq!(tree[0].client_id.as_deref(), Some("form"));
    }

    #[test]
    fn test_empty_failures_give_empty_tree() {
        assert!(build(json!({}), json!({"a": 1})).is_empty());
    }
}

// =============================================================================
// Wire Format
// =============================================================================

mod wire_tests {
    use super::*;

    #[test]
    fn test_wire_round_trip() {
        let tree = build(
            json!({"lines": [{"qty": ["Must be positive"]}]}),
            json!({"lines": [{"clientId": "l1"}]}),
        );
        let wire = serde_json::to_string(&tree).unwrap();
        let parsed: Vec<ErrorNode> = serde_json::from_str(&wire).unwrap();
        assert_eq!(parsed, tree);
    }

    #[test]
    fn test_wire_rejects_ambiguous_node() {
        let result = serde_json::from_value::<ErrorNode>(json!({
            "field": "x",
            "clientId": null,
            "messages": "a",
            "objectErrors": [],
            "arrayErrors": null
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_generated_message_node() {
        let tree = ErrorTreeBuilder::generate_message(None);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].field, NON_FIELD_ERRORS);
        assert!(matches!(tree[0].content, ErrorContent::Messages(_)));
    }
}

//! Mutation response envelope
//!
//! Every mutation answers with `ok`, an optional error tree and an optional
//! result. Validation failures travel inside this envelope, never as HTTP
//! errors.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::failure::FailureMap;
use super::node::ErrorNode;
use super::schema::InputSchema;
use super::tree::ErrorTreeBuilder;

/// Envelope returned by mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse<T> {
    pub ok: bool,
    pub errors: Option<Vec<ErrorNode>>,
    pub result: Option<T>,
}

impl<T> MutationResponse<T> {
    pub fn success(result: T) -> Self {
        Self {
            ok: true,
            errors: None,
            result: Some(result),
        }
    }

    pub fn invalid(errors: Vec<ErrorNode>) -> Self {
        Self {
            ok: false,
            errors: Some(errors),
            result: None,
        }
    }

    /// Failure carrying a single whole-request message
    pub fn message(message: Option<&str>) -> Self {
        Self::invalid(ErrorTreeBuilder::generate_message(message))
    }

    /// Failure built from a failure map and the submitted payload
    pub fn from_failures(failures: &FailureMap, original_input: Option<&Value>) -> Self {
        Self::invalid(ErrorTreeBuilder::build(failures, original_input))
    }
}

/// Envelope for mutations without a result payload
pub type MutationEmptyResponse = MutationResponse<()>;

impl MutationEmptyResponse {
    pub fn done() -> Self {
        Self {
            ok: true,
            errors: None,
            result: None,
        }
    }
}

impl<T: Serialize> IntoResponse for MutationResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Run `schema` over `input`, returning the cleaned payload or the error tree
pub fn mutation_is_not_valid(schema: &InputSchema, input: &Value) -> Result<Value, Vec<ErrorNode>> {
    schema.validate(input).map_err(|failures| {
        tracing::debug!(fields = failures.len(), "mutation input failed validation");
        ErrorTreeBuilder::build(&failures, Some(input))
    })
}

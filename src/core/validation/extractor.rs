//! Axum extractor for validated mutation input
//!
//! `ValidatedInput<T>` deserializes the JSON body into `T`, runs `T`'s
//! `validator::Validate` rules and, on failure, short-circuits the handler
//! with a `{ok: false, errors: [...]}` envelope whose tree correlates back to
//! the submitted payload. A body that is JSON but not the expected shape
//! gets the application's [`FallbackMessage`] instead of parser details.

use axum::{
    Json,
    extract::{FromRef, FromRequest, Request},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use super::failure::FailureMap;
use super::response::MutationEmptyResponse;
use super::tree::DEFAULT_ERROR_MESSAGE;
use crate::core::error::{QbError, RequestError};

/// Whole-request message for failures with nothing field-specific to say
///
/// Read from router state through [`FromRef`]; stateless routers get
/// [`DEFAULT_ERROR_MESSAGE`].
#[derive(Debug, Clone)]
pub struct FallbackMessage(pub Arc<str>);

impl FallbackMessage {
    pub fn new(message: &str) -> Self {
        Self(Arc::from(message))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FallbackMessage {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_MESSAGE)
    }
}

impl FromRef<()> for FallbackMessage {
    fn from_ref(_: &()) -> Self {
        Self::default()
    }
}

/// Validated request body
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn confirm(
///     ValidatedInput { data, .. }: ValidatedInput<PasswordResetConfirmInput>,
/// ) -> MutationEmptyResponse {
///     // data passed validation
/// }
/// ```
pub struct ValidatedInput<T> {
    /// The typed, validated input
    pub data: T,
    /// The payload as submitted
    pub raw: Value,
}

impl<T> ValidatedInput<T> {
    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T> std::ops::Deref for ValidatedInput<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<S, T> FromRequest<S> for ValidatedInput<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
    FallbackMessage: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let fallback = FallbackMessage::from_ref(state);
        let Json(raw): Json<Value> = match Json::from_request(req, state).await {
            Ok(json) => json,
            Err(e) => {
                return Err(QbError::Request(RequestError::InvalidBody {
                    message: e.body_text(),
                })
                .into_response());
            }
        };

        let data: T = match serde_json::from_value(raw.clone()) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = %e, "mutation input does not match the expected shape");
                return Err(MutationEmptyResponse::message(Some(fallback.as_str())).into_response());
            }
        };

        if let Err(errors) = data.validate() {
            let failures = FailureMap::from(&errors);
            return Err(MutationEmptyResponse::from_failures(&failures, Some(&raw)).into_response());
        }

        Ok(ValidatedInput { data, raw })
    }
}

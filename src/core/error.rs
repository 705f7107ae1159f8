//! Typed error handling for qbuilder
//!
//! Expected, user-driven failures (invalid input, bad or expired tokens) are
//! never errors in this crate: they are returned as data (error trees and
//! `false` verification results). The types below cover everything else,
//! chiefly wiring bugs and collaborator failures that should fail loudly.
//!
//! # Error Categories
//!
//! - [`TokenError`]: Errors related to the token purpose registry
//! - [`ConfigError`]: Errors related to configuration parsing and validation
//! - [`ValidationError`]: Request payloads that could not be turned into an error tree
//! - [`StoreError`]: Errors raised by the account store collaborator
//! - [`RequestError`]: Errors related to HTTP request decoding
//!
//! # Example
//!
//! ```rust,ignore
//! use qbuilder::prelude::*;
//!
//! match registry.get("invite") {
//!     Ok(codec) => codec.issue(&account, now),
//!     Err(QbError::Token(TokenError::UnknownPurpose { purpose })) => {
//!         panic!("token purpose {purpose} was never registered")
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::core::validation::ErrorNode;

/// The main error type for qbuilder
#[derive(Debug, thiserror::Error)]
pub enum QbError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Validation errors that escape the mutation envelope
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Account store failures
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Request(#[from] RequestError),

    /// Should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of a failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl QbError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QbError::Validation(_) => StatusCode::BAD_REQUEST,
            QbError::Request(e) => e.status_code(),
            QbError::Token(_) | QbError::Config(_) | QbError::Store(_) | QbError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code, e.g. `UNKNOWN_TOKEN_PURPOSE`
    pub fn error_code(&self) -> &'static str {
        match self {
            QbError::Token(e) => e.error_code(),
            QbError::Config(_) => "CONFIG_ERROR",
            QbError::Validation(_) => "VALIDATION_ERROR",
            QbError::Store(_) => "STORE_ERROR",
            QbError::Request(e) => e.error_code(),
            QbError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let details = match self {
            QbError::Token(TokenError::UnknownPurpose { purpose }) => {
                Some(serde_json::json!({ "purpose": purpose }))
            }
            QbError::Validation(ValidationError::Tree(errors)) => {
                Some(serde_json::json!({ "errors": errors }))
            }
            _ => None,
        };
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for QbError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Token Errors
// =============================================================================

/// Errors related to the token purpose registry
///
/// Token *verification* never produces one of these; a bad token is simply
/// `false`. These indicate wiring bugs.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The requested purpose was never registered
    #[error("Token purpose '{purpose}' is not registered")]
    UnknownPurpose { purpose: String },
}

impl TokenError {
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::UnknownPurpose { .. } => "UNKNOWN_TOKEN_PURPOSE",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not parse config{}: {message}", source_suffix(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    #[error("'{field}' is required in {context}")]
    MissingField { field: String, context: String },

    #[error("{field} = '{value}' is invalid: {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("No config file at {path}")]
    FileNotFound { path: String },

    #[error("Could not read config: {message}")]
    IoError { message: String },
}

fn source_suffix(file: &Option<String>) -> String {
    file.as_deref()
        .map(|f| format!(" file '{f}'"))
        .unwrap_or_default()
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Validation problems that must leave the normal mutation envelope
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Validation failed for: {}", tree_fields(.0))]
    Tree(Vec<ErrorNode>),

    #[error("Body is not valid JSON: {message}")]
    InvalidJson { message: String },
}

fn tree_fields(errors: &[ErrorNode]) -> String {
    errors
        .iter()
        .map(|e| e.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors raised by the account store collaborator
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A store operation failed
    #[error("Account store {operation} failed: {message}")]
    OperationFailed { operation: String, message: String },
}

impl StoreError {
    /// Wrap a collaborator error for the given operation
    pub fn operation(operation: &str, err: anyhow::Error) -> Self {
        StoreError::OperationFailed {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Bad path segment in '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("Unreadable request body: {message}")]
    InvalidBody { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidPath { .. } => "INVALID_PATH",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
        }
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for QbError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::InvalidJson {
            message: err.to_string(),
        }
        .into()
    }
}

impl From<std::io::Error> for QbError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError {
            message: err.to_string(),
        }
        .into()
    }
}

impl From<serde_yaml::Error> for QbError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
        .into()
    }
}

impl From<anyhow::Error> for QbError {
    fn from(err: anyhow::Error) -> Self {
        QbError::Internal(err.to_string())
    }
}

/// A specialized Result type for qbuilder operations
pub type QbResult<T> = Result<T, QbError>;

// =============================================================================
// Tests
// =============================================================================

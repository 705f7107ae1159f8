//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Error conversions work correctly
//! - Error matching allows callers to handle specific cases

use axum::http::StatusCode;
use axum::response::IntoResponse;
use qbuilder::core::error::{ConfigError, RequestError, StoreError, ValidationError};
use qbuilder::prelude::*;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_unknown_purpose_returns_500() {
        let err = QbError::Token(TokenError::UnknownPurpose {
            purpose: "invite".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_body_returns_400() {
        let err = QbError::Request(RequestError::InvalidBody {
            message: "expected value".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_tree_returns_400() {
        let err = QbError::Validation(ValidationError::Tree(vec![ErrorNode::messages(
            "email", None, "Required",
        )]));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_error_returns_500() {
        let err: QbError = StoreError::operation("save", anyhow::anyhow!("connection reset")).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_config_error_returns_500() {
        let err = QbError::Config(ConfigError::MissingField {
            field: "secret_key".to_string(),
            context: "token configuration".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let cases: Vec<(QbError, &str)> = vec![
            (
                TokenError::UnknownPurpose {
                    purpose: "x".to_string(),
                }
                .into(),
                "UNKNOWN_TOKEN_PURPOSE",
            ),
            (
                ConfigError::FileNotFound {
                    path: "a.yaml".to_string(),
                }
                .into(),
                "CONFIG_ERROR",
            ),
            (
                RequestError::InvalidPath {
                    path: "/x".to_string(),
                    message: "bad".to_string(),
                }
                .into(),
                "INVALID_PATH",
            ),
            (
                StoreError::operation("find_by_id", anyhow::anyhow!("boom")).into(),
                "STORE_ERROR",
            ),
            (QbError::Internal("oops".to_string()), "INTERNAL_ERROR"),
        ];

        for (err, code) in cases {
            assert_eq!(err.error_code(), code);
        }
    }
}

// =============================================================================
// Error Response Format Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_error_response_has_code_and_message() {
        let err = QbError::Config(ConfigError::InvalidValue {
            field: "tokens.password-reset.expiry_days".to_string(),
            value: "-1".to_string(),
            message: "expiry must not be negative".to_string(),
        });

        let response = err.to_response();

        assert_eq!(response.code, "CONFIG_ERROR");
        assert!(response.message.contains("expiry_days"));
        assert!(response.details.is_none());
    }

    #[test]
    fn test_validation_tree_is_carried_in_details() {
        let err = QbError::Validation(ValidationError::Tree(vec![
            ErrorNode::messages("email", None, "Enter a valid email address."),
            ErrorNode::messages("name", None, "This field is required."),
        ]));

        let response = err.to_response();

        let details = response.details.unwrap();
        let errors = details["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "email");
    }
}

// =============================================================================
// Error Conversion Tests
// =============================================================================

mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_serde_json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();

        let err: QbError = json_err.into();

        assert!(matches!(
            err,
            QbError::Validation(ValidationError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_io_error_converts_to_config_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");

        let err: QbError = io_err.into();

        assert!(matches!(err, QbError::Config(ConfigError::IoError { .. })));
    }

    #[test]
    fn test_anyhow_error_converts_to_internal() {
        let err: QbError = anyhow::anyhow!("unexpected").into();
        assert!(matches!(err, QbError::Internal(ref m) if m == "unexpected"));
    }
}

// =============================================================================
// Error Pattern Matching Tests
// =============================================================================

mod error_matching_tests {
    use super::*;

    #[test]
    fn test_can_match_unknown_purpose() {
        let registry = AppConfig::default_config().token_registry().unwrap();

        let purpose = match registry.get("invite") {
            Err(QbError::Token(TokenError::UnknownPurpose { purpose })) => Some(purpose),
            _ => None,
        };

        assert_eq!(purpose.as_deref(), Some("invite"));
    }
}

// =============================================================================
// IntoResponse Tests
// =============================================================================

mod into_response_tests {
    use super::*;

    #[test]
    fn test_error_into_response_status() {
        let err = QbError::Request(RequestError::InvalidBody {
            message: "EOF while parsing".to_string(),
        });

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_mutation_failure_is_not_an_http_error() {
        let response = MutationEmptyResponse::message(Some("Invalid or expired token")).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

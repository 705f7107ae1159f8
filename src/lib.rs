//! # qbuilder
//!
//! Building blocks for a form-driven web backend: structured validation
//! errors and signed, time-bounded link tokens.
//!
//! ## Features
//!
//! - **Error Trees**: Validation failures of any depth reported as one ordered tree, correlated to submitted objects by `clientId`
//! - **Mutation Envelope**: `{ok, errors, result}` responses with an axum extractor that validates input
//! - **Input Schemas**: Declarative field rules with filters and validators for dynamic payloads
//! - **Link Tokens**: Stateless HMAC-SHA256 tokens with per-purpose salts and day-granular expiry
//! - **Account Flows**: Registration, password reset and email unsubscribe routes
//! - **Configuration-Based**: Secrets, links and token purposes from YAML with env overrides
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use qbuilder::prelude::*;
//! use std::sync::Arc;
//!
//! let config = AppConfig::from_yaml_file("qbuilder.yaml")?.with_env_overrides()?;
//! let state = AppState::new(
//!     &config,
//!     Arc::new(InMemoryAccountStore::new()),
//!     Arc::new(LoggingNotifier),
//!     Arc::new(SystemClock),
//! )?;
//! let app = build_account_routes(state);
//! ```

pub mod accounts;
pub mod config;
pub mod core;
pub mod tokens;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Validation ===
    pub use crate::core::validation::{
        ArrayErrorNode, ErrorNode, ErrorTreeBuilder, FailureMap, FailureValue, FallbackMessage,
        FieldRule, InputSchema, MutationEmptyResponse, MutationResponse, ValidatedInput, filters,
        mutation_is_not_valid, validators,
    };

    // === Errors ===
    pub use crate::core::error::{QbError, QbResult, TokenError};

    // === Time ===
    pub use crate::core::clock::{Clock, FixedClock, SystemClock};

    // === Tokens ===
    pub use crate::tokens::{
        HashInputs, Permalink, TokenCodec, TokenPurpose, TokenRegistry, TokenSubject,
        decode_uid, encode_uid,
    };

    // === Accounts ===
    pub use crate::accounts::{
        Account, AccountStore, AppState, EmailNotificationType, InMemoryAccountStore,
        LinkNotifier, LoggingNotifier, RecordingNotifier, build_account_routes,
    };

    // === Config ===
    pub use crate::config::{AppConfig, LinksConfig, TokensConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}

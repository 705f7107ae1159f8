//! Configuration loading and management
//!
//! Configuration is read from YAML, optionally overridden from the
//! environment, and turned into an immutable [`TokenRegistry`] at startup.

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, QbResult};
use crate::core::validation::DEFAULT_ERROR_MESSAGE;
use crate::tokens::{HashInputsKind, TokenRegistry};

/// Default expiry of password reset links
pub const DEFAULT_RESET_TIMEOUT_DAYS: i64 = 7;

/// Default expiry of unsubscribe links
pub const DEFAULT_UNSUBSCRIBE_TIMEOUT_DAYS: i64 = 30;

/// Configuration for one token purpose
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurposeConfig {
    /// Salt isolating this purpose's tokens from every other purpose
    pub salt: String,

    /// Days a token stays valid after the day it was issued
    pub expiry_days: i64,

    /// What the digest is bound to
    pub hash_inputs: HashInputsKind,
}

/// An additional, application-defined token purpose
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedPurposeConfig {
    pub name: String,

    #[serde(flatten)]
    pub purpose: PurposeConfig,
}

/// Token purposes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokensConfig {
    #[serde(default = "default_password_reset")]
    pub password_reset: PurposeConfig,

    #[serde(default = "default_unsubscribe_email")]
    pub unsubscribe_email: PurposeConfig,

    #[serde(default)]
    pub extra: Vec<NamedPurposeConfig>,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            password_reset: default_password_reset(),
            unsubscribe_email: default_unsubscribe_email(),
            extra: Vec::new(),
        }
    }
}

fn default_password_reset() -> PurposeConfig {
    PurposeConfig {
        salt: "PasswordResetToken".to_string(),
        expiry_days: DEFAULT_RESET_TIMEOUT_DAYS,
        hash_inputs: HashInputsKind::CredentialBound,
    }
}

fn default_unsubscribe_email() -> PurposeConfig {
    PurposeConfig {
        salt: "UnsubscribeEmailToken".to_string(),
        expiry_days: DEFAULT_UNSUBSCRIBE_TIMEOUT_DAYS,
        hash_inputs: HashInputsKind::SubjectId,
    }
}

/// Where generated links point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinksConfig {
    /// Frontend origin (e.g., "https://app.example.com")
    pub frontend_url: String,

    /// Public API origin (e.g., "https://api.example.com")
    pub api_url: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            api_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Error reporting settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorsConfig {
    /// Message used when a request fails without a structured failure
    pub default_message: String,
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            default_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Server secret mixed into every token key
    pub secret_key: String,

    #[serde(default)]
    pub links: LinksConfig,

    #[serde(default)]
    pub tokens: TokensConfig,

    #[serde(default)]
    pub errors: ErrorsConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> QbResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> QbResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply `QB_*` environment overrides
    ///
    /// Recognised: `QB_SECRET_KEY`, `QB_FRONTEND_URL`, `QB_API_URL`,
    /// `QB_TOKEN_RESET_TIMEOUT_DAYS`.
    pub fn with_env_overrides(self) -> QbResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> QbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("QB_SECRET_KEY") {
            self.secret_key = secret;
        }
        if let Some(url) = lookup("QB_FRONTEND_URL") {
            self.links.frontend_url = url;
        }
        if let Some(url) = lookup("QB_API_URL") {
            self.links.api_url = url;
        }
        if let Some(days) = lookup("QB_TOKEN_RESET_TIMEOUT_DAYS") {
            self.tokens.password_reset.expiry_days =
                days.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "QB_TOKEN_RESET_TIMEOUT_DAYS".to_string(),
                    value: days.clone(),
                    message: "expected a whole number of days".to_string(),
                })?;
        }
        Ok(self)
    }

    /// Build the token registry described by this configuration
    pub fn token_registry(&self) -> QbResult<TokenRegistry> {
        TokenRegistry::from_config(&self.secret_key, &self.tokens)
    }

    /// Create a default configuration for testing
    pub fn default_config() -> Self {
        Self {
            secret_key: "insecure-test-secret".to_string(),
            links: LinksConfig::default(),
            tokens: TokensConfig::default(),
            errors: ErrorsConfig::default(),
        }
    }
}

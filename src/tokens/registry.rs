//! Named, immutable token codecs
//!
//! The registry is built once at startup and shared read-only (usually as
//! `Arc<TokenRegistry>` inside the application state). Each purpose has its
//! own salt, so a token minted for one purpose never verifies for another.

use indexmap::IndexMap;
use std::collections::HashSet;

use super::codec::TokenCodec;
use crate::config::{PurposeConfig, TokensConfig};
use crate::core::error::{ConfigError, QbResult, TokenError};

/// Purposes the account flows depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    /// Password reset and account activation links
    PasswordReset,
    /// Email unsubscribe links
    UnsubscribeEmail,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::PasswordReset => "password-reset",
            TokenPurpose::UnsubscribeEmail => "unsubscribe-email",
        }
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-wide collection of token codecs
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    password_reset: TokenCodec,
    unsubscribe_email: TokenCodec,
    extra: IndexMap<String, TokenCodec>,
}

impl TokenRegistry {
    /// Build every configured codec
    ///
    /// Fails on an empty secret, a negative expiry, an empty or duplicated
    /// salt, or a purpose name registered twice.
    pub fn from_config(secret: &str, config: &TokensConfig) -> QbResult<Self> {
        if secret.is_empty() {
            return Err(ConfigError::MissingField {
                field: "secret_key".to_string(),
                context: "token configuration".to_string(),
            }
            .into());
        }

        let mut seen_salts = HashSet::new();
        let mut seen_names: HashSet<&str> = [
            TokenPurpose::PasswordReset.as_str(),
            TokenPurpose::UnsubscribeEmail.as_str(),
        ]
        .into_iter()
        .collect();

        let password_reset = build_codec(
            TokenPurpose::PasswordReset.as_str(),
            &config.password_reset,
            secret,
            &mut seen_salts,
        )?;
        let unsubscribe_email = build_codec(
            TokenPurpose::UnsubscribeEmail.as_str(),
            &config.unsubscribe_email,
            secret,
            &mut seen_salts,
        )?;

        let mut extra = IndexMap::new();
        for named in &config.extra {
            if !seen_names.insert(named.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "tokens.extra.name".to_string(),
                    value: named.name.clone(),
                    message: "token purpose is registered twice".to_string(),
                }
                .into());
            }
            let codec = build_codec(&named.name, &named.purpose, secret, &mut seen_salts)?;
            extra.insert(named.name.clone(), codec);
        }

        let registry = Self {
            password_reset,
            unsubscribe_email,
            extra,
        };
        tracing::info!(
            purposes = ?registry.purposes().collect::<Vec<_>>(),
            "token registry initialized"
        );
        Ok(registry)
    }

    /// Codec for password reset / account activation
    pub fn password_reset(&self) -> &TokenCodec {
        &self.password_reset
    }

    /// Codec for unsubscribe links
    pub fn unsubscribe_email(&self) -> &TokenCodec {
        &self.unsubscribe_email
    }

    pub fn purpose(&self, purpose: TokenPurpose) -> &TokenCodec {
        match purpose {
            TokenPurpose::PasswordReset => &self.password_reset,
            TokenPurpose::UnsubscribeEmail => &self.unsubscribe_email,
        }
    }

    /// Look up a codec by purpose name
    ///
    /// An unknown name is a wiring bug: it is logged at `error` and returned
    /// as [`TokenError::UnknownPurpose`].
    pub fn get(&self, name: &str) -> QbResult<&TokenCodec> {
        if name == TokenPurpose::PasswordReset.as_str() {
            return Ok(&self.password_reset);
        }
        if name == TokenPurpose::UnsubscribeEmail.as_str() {
            return Ok(&self.unsubscribe_email);
        }
        self.extra.get(name).ok_or_else(|| {
            tracing::error!(purpose = %name, "token purpose is not registered");
            TokenError::UnknownPurpose {
                purpose: name.to_string(),
            }
            .into()
        })
    }

    /// Registered purpose names, built-ins first
    pub fn purposes(&self) -> impl Iterator<Item = &str> {
        [
            self.password_reset.purpose(),
            self.unsubscribe_email.purpose(),
        ]
        .into_iter()
        .chain(self.extra.keys().map(String::as_str))
    }
}

fn build_codec(
    name: &str,
    config: &PurposeConfig,
    secret: &str,
    seen_salts: &mut HashSet<String>,
) -> QbResult<TokenCodec> {
    if config.expiry_days < 0 {
        return Err(ConfigError::InvalidValue {
            field: format!("tokens.{}.expiry_days", name),
            value: config.expiry_days.to_string(),
            message: "expiry must not be negative".to_string(),
        }
        .into());
    }
    if config.salt.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: format!("tokens.{}.salt", name),
            value: String::new(),
            message: "salt must not be empty".to_string(),
        }
        .into());
    }
    if !seen_salts.insert(config.salt.clone()) {
        return Err(ConfigError::InvalidValue {
            field: format!("tokens.{}.salt", name),
            value: config.salt.clone(),
            message: "salt is already used by another purpose".to_string(),
        }
        .into());
    }

    Ok(TokenCodec::new(
        name,
        config.salt.clone(),
        secret,
        config.expiry_days as u64,
        config.hash_inputs.into(),
    ))
}

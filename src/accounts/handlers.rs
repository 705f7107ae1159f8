//! HTTP handlers for account flows
//!
//! Every handler answers with the mutation envelope. User mistakes (unknown
//! email, bad or expired token) come back as `ok: false` with an error tree;
//! only collaborator failures become HTTP errors.

use axum::extract::{FromRef, Path, State};
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::model::{Account, EmailNotificationType};
use super::notifier::{LinkNotifier, Mailer};
use super::store::{AccountStore, EmailTaken};
use crate::config::AppConfig;
use crate::core::clock::Clock;
use crate::core::error::{QbResult, StoreError};
use crate::core::validation::failure::NON_FIELD_ERRORS_KEY;
use crate::core::validation::{
    FailureMap, FailureValue, FallbackMessage, MutationEmptyResponse, MutationResponse,
    ValidatedInput,
};
use crate::tokens::{Permalink, TokenRegistry, TokenSubject, decode_uid};

pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";
pub const UNKNOWN_EMAIL_MESSAGE: &str = "User with that email doesn't exist";
pub const EMAIL_TAKEN_MESSAGE: &str = "User with that email already exists";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub mailer: Arc<Mailer>,
    pub tokens: Arc<TokenRegistry>,
    pub clock: Arc<dyn Clock>,
    /// Frontend origin allowed to call the API from a browser
    pub allowed_origin: Option<HeaderValue>,
    /// `errors.default_message` from configuration
    pub fallback_message: FallbackMessage,
}

impl FromRef<AppState> for FallbackMessage {
    fn from_ref(state: &AppState) -> Self {
        state.fallback_message.clone()
    }
}

impl AppState {
    /// Wire the state from configuration and collaborators
    ///
    /// Fails when the token configuration is invalid.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn AccountStore>,
        notifier: Arc<dyn LinkNotifier>,
        clock: Arc<dyn Clock>,
    ) -> QbResult<Self> {
        let tokens = Arc::new(config.token_registry()?);
        let mailer = Mailer::new(
            notifier,
            tokens.clone(),
            Permalink::new(&config.links),
            clock.clone(),
        );
        let allowed_origin =
            HeaderValue::from_str(config.links.frontend_url.trim_end_matches('/')).ok();
        Ok(Self {
            store,
            mailer: Arc::new(mailer),
            tokens,
            clock,
            allowed_origin,
            fallback_message: FallbackMessage::new(&config.errors.default_message),
        })
    }

    /// Resolve a base64url subject id to an account, failing closed
    async fn account_from_uid(&self, uidb64: &str) -> QbResult<Option<Account>> {
        let Some(id) = decode_uid(uidb64).and_then(|uid| Uuid::parse_str(&uid).ok()) else {
            return Ok(None);
        };
        let account = self
            .store
            .find_by_id(&id)
            .await
            .map_err(|e| StoreError::operation("find_by_id", e))?;
        Ok(account)
    }
}

/// Request body for registration
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
}

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub email_opt_outs: Vec<EmailNotificationType>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            email_opt_outs: account.email_opt_outs.iter().copied().collect(),
        }
    }
}

/// Request body for triggering a password reset
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetTriggerInput {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
}

/// Request body for confirming a password reset
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirmInput {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub uuid: String,

    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub token: String,

    #[validate(length(
        min = 8,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    pub new_password: String,
}

/// Create an account and send the welcome (activation) link
///
/// POST /register
pub async fn register(
    State(state): State<AppState>,
    ValidatedInput { data, raw }: ValidatedInput<RegisterInput>,
) -> QbResult<MutationResponse<AccountView>> {
    let email = data.email.to_lowercase();
    let existing = state
        .store
        .find_by_email(&email)
        .await
        .map_err(|e| StoreError::operation("find_by_email", e))?;
    if existing.is_some() {
        return Ok(email_taken(&raw));
    }

    // Unusable until the owner follows the welcome link
    let account = Account::new(email, &Uuid::new_v4().to_string());
    let account = match state.store.save(account).await {
        Ok(account) => account,
        // another registration for the same email won the race
        Err(e) if e.is::<EmailTaken>() => return Ok(email_taken(&raw)),
        Err(e) => return Err(StoreError::operation("save", e).into()),
    };
    tracing::info!(account = %account.id, "account registered");

    state.mailer.send_password_reset(&account, true).await?;

    Ok(MutationResponse::success(AccountView::from(&account)))
}

/// Email a password reset link
///
/// POST /password-reset/trigger
pub async fn password_reset_trigger(
    State(state): State<AppState>,
    ValidatedInput { data, .. }: ValidatedInput<PasswordResetTriggerInput>,
) -> QbResult<MutationEmptyResponse> {
    let account = state
        .store
        .find_by_email(&data.email)
        .await
        .map_err(|e| StoreError::operation("find_by_email", e))?;
    let Some(account) = account else {
        return Ok(non_field_error(UNKNOWN_EMAIL_MESSAGE));
    };

    state.mailer.send_password_reset(&account, false).await?;
    tracing::info!(account = %account.id, "password reset requested");

    Ok(MutationEmptyResponse::done())
}

/// Set a new password using a reset token
///
/// POST /password-reset/confirm
pub async fn password_reset_confirm(
    State(state): State<AppState>,
    ValidatedInput { data, .. }: ValidatedInput<PasswordResetConfirmInput>,
) -> QbResult<MutationEmptyResponse> {
    let account = state.account_from_uid(&data.uuid).await?;
    let valid = state.tokens.password_reset().verify(
        account.as_ref().map(|a| a as &dyn TokenSubject),
        &data.token,
        state.clock.now(),
    );
    let Some(mut account) = account.filter(|_| valid) else {
        return Ok(non_field_error(INVALID_TOKEN_MESSAGE));
    };

    account.set_password(&data.new_password);
    let account = state
        .store
        .save(account)
        .await
        .map_err(|e| StoreError::operation("save", e))?;
    tracing::info!(account = %account.id, "password reset confirmed");

    if let Err(e) = state.mailer.send_password_changed(&account).await {
        tracing::error!(account = %account.id, error = %e, "failed to send password changed notification");
    }

    Ok(MutationEmptyResponse::done())
}

/// Opt out of an email kind using the link from an email footer
///
/// GET /unsubscribe/{uidb64}/{token}/{email_type}
pub async fn unsubscribe_email(
    State(state): State<AppState>,
    Path((uidb64, token, email_type)): Path<(String, String, String)>,
) -> QbResult<MutationEmptyResponse> {
    let kind = match email_type.parse::<EmailNotificationType>() {
        Ok(kind) if kind.is_optional() => kind,
        Ok(kind) => {
            return Ok(non_field_error(&format!(
                "Email type '{}' cannot be unsubscribed",
                kind
            )));
        }
        Err(message) => return Ok(non_field_error(&message)),
    };

    let account = state.account_from_uid(&uidb64).await?;
    let valid = state.tokens.unsubscribe_email().verify(
        account.as_ref().map(|a| a as &dyn TokenSubject),
        &token,
        state.clock.now(),
    );
    let Some(mut account) = account.filter(|_| valid) else {
        return Ok(non_field_error(INVALID_TOKEN_MESSAGE));
    };

    account.unsubscribe(kind);
    state
        .store
        .save(account)
        .await
        .map_err(|e| StoreError::operation("save", e))?;
    tracing::info!(%kind, "email unsubscribed");

    Ok(MutationEmptyResponse::done())
}

fn email_taken(raw: &serde_json::Value) -> MutationResponse<AccountView> {
    let failures = FailureMap::new().with("email", FailureValue::message(EMAIL_TAKEN_MESSAGE));
    MutationResponse::from_failures(&failures, Some(raw))
}

fn non_field_error(message: &str) -> MutationEmptyResponse {
    let failures = FailureMap::new().with(NON_FIELD_ERRORS_KEY, FailureValue::message(message));
    MutationEmptyResponse::from_failures(&failures, None)
}

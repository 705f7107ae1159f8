//! Links embedding signed tokens

use super::uid::encode_uid;
use crate::config::LinksConfig;

/// Builds the links sent to users
#[derive(Debug, Clone)]
pub struct Permalink {
    base_url: String,
    api_url: String,
}

impl Permalink {
    pub fn new(config: &LinksConfig) -> Self {
        Self {
            base_url: format!("{}/permalink", config.frontend_url.trim_end_matches('/')),
            api_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Frontend page where the user can request a new reset link
    pub fn forgot_password(&self) -> String {
        format!("{}/forgot-password", self.base_url)
    }

    /// Frontend page confirming a password reset
    pub fn password_reset(&self, subject_id: &str, token: &str) -> String {
        format!(
            "{}/password-reset/{}/{}",
            self.base_url,
            encode_uid(subject_id),
            token
        )
    }

    /// API endpoint that unsubscribes the user from `email_type`
    pub fn unsubscribe_email(&self, subject_id: &str, token: &str, email_type: &str) -> String {
        format!(
            "{}/unsubscribe/{}/{}/{}",
            self.api_url,
            encode_uid(subject_id),
            token,
            email_type
        )
    }
}

//! Account model and email preferences

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::tokens::TokenSubject;

/// Kinds of email the system sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailNotificationType {
    AccountActivation,
    PasswordReset,
    PasswordChanged,
    NewsAndOffers,
}

impl EmailNotificationType {
    pub const ALL: [EmailNotificationType; 4] = [
        EmailNotificationType::AccountActivation,
        EmailNotificationType::PasswordReset,
        EmailNotificationType::PasswordChanged,
        EmailNotificationType::NewsAndOffers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmailNotificationType::AccountActivation => "account_activation",
            EmailNotificationType::PasswordReset => "password_reset",
            EmailNotificationType::PasswordChanged => "password_changed",
            EmailNotificationType::NewsAndOffers => "news_and_offers",
        }
    }

    /// Whether users may opt out of this kind
    ///
    /// Activation and reset mails are always sent.
    pub fn is_optional(&self) -> bool {
        matches!(self, EmailNotificationType::NewsAndOffers)
    }

    /// Kinds a user can unsubscribe from
    pub fn optional() -> impl Iterator<Item = EmailNotificationType> {
        Self::ALL.into_iter().filter(|kind| kind.is_optional())
    }
}

impl fmt::Display for EmailNotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailNotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown email type '{}'", s))
    }
}

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,

    /// Always stored lowercase
    pub email: String,

    /// `sha256$<salt>$<hex digest>`
    pub password_hash: String,

    pub last_login: Option<DateTime<Utc>>,

    /// Set when mail to this address bounced; no email is sent
    pub invalid_email: bool,

    pub email_opt_outs: BTreeSet<EmailNotificationType>,

    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(email: impl Into<String>, password: &str) -> Self {
        let mut account = Self {
            id: Uuid::new_v4(),
            email: email.into().to_lowercase(),
            password_hash: String::new(),
            last_login: None,
            invalid_email: false,
            email_opt_outs: BTreeSet::new(),
            created_at: Utc::now(),
        };
        account.set_password(password);
        account
    }

    /// Replace the password, re-hashing with a fresh salt
    pub fn set_password(&mut self, password: &str) {
        let salt = Uuid::new_v4().simple().to_string();
        self.password_hash = format!("sha256${}${}", salt, hash_password(&salt, password));
    }

    pub fn check_password(&self, password: &str) -> bool {
        let mut parts = self.password_hash.splitn(3, '$');
        let (Some("sha256"), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        let actual = hash_password(salt, password);
        actual.as_bytes().ct_eq(expected.as_bytes()).into()
    }

    /// Opt out of `kind`; opting out twice is a no-op
    pub fn unsubscribe(&mut self, kind: EmailNotificationType) {
        self.email_opt_outs.insert(kind);
    }

    pub fn is_subscribed_for(&self, kind: EmailNotificationType) -> bool {
        !(kind.is_optional() && self.email_opt_outs.contains(&kind))
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl TokenSubject for Account {
    fn subject_id(&self) -> String {
        self.id.to_string()
    }

    fn credential_state(&self) -> Option<String> {
        Some(self.password_hash.clone())
    }

    fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }

    fn email(&self) -> Option<String> {
        Some(self.email.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_lowercases_email() {
        let account = Account::new("Ada@Example.COM", "correct horse");
        assert_eq!(account.email, "ada@example.com");
    }

    #[test]
    fn test_password_check() {
        let account = Account::new("ada@example.com", "correct horse");
        assert!(account.check_password("correct horse"));
        assert!(!account.check_password("battery staple"));
    }

    #[test]
    fn test_set_password_changes_credential_state() {
        let mut account = Account::new("ada@example.com", "one");
        let before = account.credential_state();
        account.set_password("one");
        assert_ne!(account.credential_state(), before);
        assert!(account.check_password("one"));
    }

    #[test]
    fn test_unsubscribe_only_affects_optional_kinds() {
        let mut account = Account::new("ada@example.com", "pw");
        account.unsubscribe(EmailNotificationType::NewsAndOffers);
        account.unsubscribe(EmailNotificationType::PasswordReset);
        assert!(!account.is_subscribed_for(EmailNotificationType::NewsAndOffers));
        assert!(account.is_subscribed_for(EmailNotificationType::PasswordReset));
    }

    #[test]
    fn test_email_type_parsing() {
        assert_eq!(
            "news_and_offers".parse::<EmailNotificationType>(),
            Ok(EmailNotificationType::NewsAndOffers)
        );
        assert!("spam".parse::<EmailNotificationType>().is_err());
        assert_eq!(
            EmailNotificationType::optional().collect::<Vec<_>>(),
            vec![EmailNotificationType::NewsAndOffers]
        );
    }
}

//! Outgoing account notifications
//!
//! [`Mailer`] decides whether and what to send and mints the links;
//! a [`LinkNotifier`] delivers the result.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::model::{Account, EmailNotificationType};
use crate::core::clock::Clock;
use crate::tokens::{Permalink, TokenRegistry};

/// A rendered notification ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub to: String,
    pub kind: EmailNotificationType,
    pub subject: String,

    /// Primary call to action (reset link, forgot-password page)
    pub link: String,

    /// One unsubscribe link per optional email kind
    pub unsubscribe_links: BTreeMap<EmailNotificationType, String>,
}

/// Delivery channel for notifications
#[async_trait]
pub trait LinkNotifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<()>;
}

/// Notifier that only logs
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl LinkNotifier for LoggingNotifier {
    async fn send(&self, notification: Notification) -> Result<()> {
        tracing::info!(
            to = %notification.to,
            kind = %notification.kind,
            subject = %notification.subject,
            "notification sent"
        );
        Ok(())
    }
}

/// Notifier that keeps every notification in memory
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    pub async fn last(&self) -> Option<Notification> {
        self.sent.lock().await.last().cloned()
    }
}

#[async_trait]
impl LinkNotifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> Result<()> {
        self.sent.lock().await.push(notification);
        Ok(())
    }
}

/// Builds account notifications and hands them to a [`LinkNotifier`]
#[derive(Clone)]
pub struct Mailer {
    notifier: Arc<dyn LinkNotifier>,
    tokens: Arc<TokenRegistry>,
    permalink: Permalink,
    clock: Arc<dyn Clock>,
}

impl Mailer {
    pub fn new(
        notifier: Arc<dyn LinkNotifier>,
        tokens: Arc<TokenRegistry>,
        permalink: Permalink,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifier,
            tokens,
            permalink,
            clock,
        }
    }

    /// Send a single-use password reset link
    ///
    /// With `welcome` set the mail doubles as account activation.
    /// Returns `false` when the mail was suppressed.
    pub async fn send_password_reset(&self, account: &Account, welcome: bool) -> Result<bool> {
        let token = self
            .tokens
            .password_reset()
            .issue(account, self.clock.now());
        let link = self
            .permalink
            .password_reset(&account.id.to_string(), &token);
        let subject = if welcome {
            "QB: Welcome"
        } else {
            "QB Password Reset"
        };
        self.send(account, EmailNotificationType::PasswordReset, subject, link)
            .await
    }

    /// Tell the account owner their password changed
    pub async fn send_password_changed(&self, account: &Account) -> Result<bool> {
        let link = self.permalink.forgot_password();
        self.send(
            account,
            EmailNotificationType::PasswordChanged,
            "QB Password Changed",
            link,
        )
        .await
    }

    async fn send(
        &self,
        account: &Account,
        kind: EmailNotificationType,
        subject: &str,
        link: String,
    ) -> Result<bool> {
        if account.invalid_email {
            tracing::warn!(account = %account.id, %kind, "email not sent: address flagged as invalid");
            return Ok(false);
        }
        if !account.is_subscribed_for(kind) {
            tracing::warn!(account = %account.id, %kind, "email not sent: user unsubscribed");
            return Ok(false);
        }

        self.notifier
            .send(Notification {
                to: account.email.clone(),
                kind,
                subject: subject.to_string(),
                link,
                unsubscribe_links: self.unsubscribe_links(account),
            })
            .await?;
        Ok(true)
    }

    fn unsubscribe_links(&self, account: &Account) -> BTreeMap<EmailNotificationType, String> {
        let token = self
            .tokens
            .unsubscribe_email()
            .issue(account, self.clock.now());
        let id = account.id.to_string();
        EmailNotificationType::optional()
            .map(|kind| {
                let url = self.permalink.unsubscribe_email(&id, &token, kind.as_str());
                (kind, url)
            })
            .collect()
    }
}

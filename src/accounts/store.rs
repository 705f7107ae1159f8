//! Account persistence

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::Account;

/// `save` refused an email that belongs to another account
///
/// Stores return this inside their `anyhow::Error` so callers can tell a
/// lost registration race from a backend failure.
#[derive(Debug, thiserror::Error)]
#[error("email {email} is already taken")]
pub struct EmailTaken {
    pub email: String,
}

/// Storage backend for accounts
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Account>>;

    /// Look up by email, ignoring case
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Insert or replace an account
    ///
    /// Fails with [`EmailTaken`] when another account owns the email.
    async fn save(&self, account: Account) -> Result<Account>;
}

/// In-memory account store for testing and development
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `accounts`
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts.into_iter().map(|a| (a.id, a)).collect();
        Self {
            accounts: Arc::new(RwLock::new(accounts)),
        }
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let email = email.to_lowercase();
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn save(&self, mut account: Account) -> Result<Account> {
        account.email = account.email.to_lowercase();

        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|other| other.id != account.id && other.email == account.email)
        {
            return Err(EmailTaken {
                email: account.email,
            }
            .into());
        }
        accounts.insert(account.id, account.clone());

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_find() {
        let store = InMemoryAccountStore::new();
        let account = store
            .save(Account::new("ada@example.com", "pw"))
            .await
            .unwrap();

        let by_id = store.find_by_id(&account.id).await.unwrap();
        assert_eq!(by_id, Some(account.clone()));

        let by_email = store.find_by_email("ADA@example.com").await.unwrap();
        assert_eq!(by_email.map(|a| a.id), Some(account.id));
    }

    #[tokio::test]
    async fn test_find_missing() {
        let store = InMemoryAccountStore::new();
        assert!(store.find_by_id(&Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces() {
        let store = InMemoryAccountStore::new();
        let mut account = store.save(Account::new("ada@example.com", "pw")).await.unwrap();
        account.set_password("new");
        store.save(account.clone()).await.unwrap();

        assert_eq!(store.len().await, 1);
        let stored = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert!(stored.check_password("new"));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryAccountStore::new();
        store.save(Account::new("ada@example.com", "pw")).await.unwrap();
        let err = store
            .save(Account::new("Ada@example.com", "pw"))
            .await
            .unwrap_err();
        assert!(err.is::<EmailTaken>());
    }
}

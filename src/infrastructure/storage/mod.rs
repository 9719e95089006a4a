// In-memory storage backing all repositories

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{Credential, Subscription, TradeRecord};
use crate::domain::repository::{CredentialRepository, SubscriptionRepository, TradeRepository};

/// Process-local store. Each table sits behind its own lock; multi-row
/// writes take the lock once so they land atomically.
#[derive(Default)]
pub struct InMemoryStorage {
    credentials: RwLock<HashMap<Uuid, Credential>>,
    // keyed by user id: one subscription per user
    subscriptions: RwLock<HashMap<Uuid, Subscription>>,
    trades: RwLock<Vec<TradeRecord>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryStorage {
    async fn create(&self, credential: &Credential) -> StorageResult<()> {
        let mut table = self.credentials.write().await;
        if table.contains_key(&credential.id) {
            return Err(StorageError::Conflict(format!(
                "credential {} already exists",
                credential.id
            )));
        }
        table.insert(credential.id, credential.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: Uuid) -> StorageResult<Vec<Credential>> {
        let table = self.credentials.read().await;
        let mut creds: Vec<Credential> = table
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        creds.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(creds)
    }

    async fn save_all(&self, credentials: &[Credential]) -> StorageResult<()> {
        let mut table = self.credentials.write().await;
        for credential in credentials {
            table.insert(credential.id, credential.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStorage {
    async fn create(&self, subscription: &Subscription) -> StorageResult<()> {
        let mut table = self.subscriptions.write().await;
        if table.contains_key(&subscription.user_id) {
            return Err(StorageError::Conflict(format!(
                "user {} already has a subscription",
                subscription.user_id
            )));
        }
        table.insert(subscription.user_id, subscription.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: Uuid) -> StorageResult<Option<Subscription>> {
        Ok(self.subscriptions.read().await.get(&user_id).cloned())
    }

    async fn save(&self, subscription: &Subscription) -> StorageResult<()> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.user_id, subscription.clone());
        Ok(())
    }
}

#[async_trait]
impl TradeRepository for InMemoryStorage {
    async fn create(&self, record: &TradeRecord) -> StorageResult<()> {
        let mut table = self.trades.write().await;
        if table.iter().any(|r| r.id == record.id) {
            return Err(StorageError::Conflict(format!("trade {} already recorded", record.id)));
        }
        table.push(record.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: Uuid) -> StorageResult<Vec<TradeRecord>> {
        Ok(self
            .trades
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

// Repository interfaces for domain entities

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::StorageResult;
use crate::domain::models::{Credential, Subscription, TradeRecord};

/// Persistence for per-user venue credentials.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Insert a new credential. Fails with `Conflict` if the id is taken.
    async fn create(&self, credential: &Credential) -> StorageResult<()>;

    async fn find_by_user(&self, user_id: Uuid) -> StorageResult<Vec<Credential>>;

    /// Insert or update every credential in one atomic write: either all
    /// rows are stored or none are.
    async fn save_all(&self, credentials: &[Credential]) -> StorageResult<()>;
}

/// Persistence for subscriptions. At most one subscription per user.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn create(&self, subscription: &Subscription) -> StorageResult<()>;
    async fn find_by_user(&self, user_id: Uuid) -> StorageResult<Option<Subscription>>;
    async fn save(&self, subscription: &Subscription) -> StorageResult<()>;
}

/// Write-once trade history.
#[async_trait]
pub trait TradeRepository: Send + Sync {
    async fn create(&self, record: &TradeRecord) -> StorageResult<()>;
    async fn find_by_user(&self, user_id: Uuid) -> StorageResult<Vec<TradeRecord>>;
}

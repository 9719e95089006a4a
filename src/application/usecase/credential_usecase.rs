// Venue credential management use case

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::models::{Credential, Venue};
use crate::domain::repository::CredentialRepository;
use crate::domain::service::Clock;

#[async_trait]
pub trait CredentialUseCase: Send + Sync {
    /// Store a new credential and make it the user's active one.
    async fn add_credential(
        &self,
        user_id: Uuid,
        venue: Venue,
        api_key: &str,
        api_secret: &str,
    ) -> CoreResult<Credential>;

    async fn get_credentials(&self, user_id: Uuid) -> CoreResult<Vec<Credential>>;

    /// Make `credential_id` the only active credential of the user.
    async fn switch_active(&self, user_id: Uuid, credential_id: Uuid) -> CoreResult<Credential>;

    async fn active_credential(&self, user_id: Uuid) -> CoreResult<Option<Credential>>;
}

/// Per-user credential bookkeeping. At most one credential of a user is
/// active after every completed operation; writes for one user are
/// serialized and each lands as a single batch.
pub struct CredentialStore {
    repo: Arc<dyn CredentialRepository>,
    clock: Arc<dyn Clock>,
    user_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn CredentialRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.user_locks
            .lock()
            .await
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the user's lock entry once no other task holds or awaits it.
    /// Handles are only cloned under the map lock, so the count is exact here.
    async fn release_lock(&self, user_id: Uuid, lock: Arc<Mutex<()>>) {
        let mut locks = self.user_locks.lock().await;
        // one handle in the map, one owned by this call
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&user_id);
        }
    }

    #[cfg(test)]
    async fn tracked_users(&self) -> usize {
        self.user_locks.lock().await.len()
    }

    async fn add_locked(
        &self,
        user_id: Uuid,
        venue: Venue,
        api_key: &str,
        api_secret: &str,
    ) -> CoreResult<Credential> {
        let now = self.clock.now();
        let credential = Credential {
            id: Uuid::new_v4(),
            user_id,
            venue,
            encrypted_key: api_key.to_string(),
            encrypted_secret: api_secret.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut batch: Vec<Credential> = self
            .repo
            .find_by_user(user_id)
            .await?
            .into_iter()
            .filter(|c| c.is_active)
            .map(|mut c| {
                c.is_active = false;
                c.updated_at = now;
                c
            })
            .collect();

        if batch.is_empty() {
            self.repo.create(&credential).await?;
        } else {
            batch.push(credential.clone());
            self.repo.save_all(&batch).await?;
        }

        log::info!(
            "Added {} credential {} for user {}",
            venue,
            credential.id,
            user_id
        );
        Ok(credential)
    }

    async fn switch_locked(&self, user_id: Uuid, credential_id: Uuid) -> CoreResult<Credential> {
        let credentials = self.repo.find_by_user(user_id).await?;
        if !credentials.iter().any(|c| c.id == credential_id) {
            log::warn!(
                "User {} tried to activate unknown credential {}",
                user_id,
                credential_id
            );
            return Err(CoreError::NotFound(format!(
                "credential {} not found",
                credential_id
            )));
        }

        let now = self.clock.now();
        let mut activated = None;
        let mut changed = Vec::new();
        for mut credential in credentials {
            let should_be_active = credential.id == credential_id;
            if credential.is_active != should_be_active {
                credential.is_active = should_be_active;
                credential.updated_at = now;
                changed.push(credential.clone());
            }
            if should_be_active {
                activated = Some(credential);
            }
        }

        if !changed.is_empty() {
            self.repo.save_all(&changed).await?;
        }

        log::info!("User {} switched to credential {}", user_id, credential_id);
        activated.ok_or_else(|| CoreError::NotFound(format!("credential {} not found", credential_id)))
    }
}

#[async_trait]
impl CredentialUseCase for CredentialStore {
    async fn add_credential(
        &self,
        user_id: Uuid,
        venue: Venue,
        api_key: &str,
        api_secret: &str,
    ) -> CoreResult<Credential> {
        if api_key.trim().is_empty() || api_secret.trim().is_empty() {
            return Err(CoreError::Validation(
                "api_key and api_secret are required".to_string(),
            ));
        }

        let lock = self.user_lock(user_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.add_locked(user_id, venue, api_key, api_secret).await
        };
        self.release_lock(user_id, lock).await;
        result
    }

    async fn get_credentials(&self, user_id: Uuid) -> CoreResult<Vec<Credential>> {
        Ok(self.repo.find_by_user(user_id).await?)
    }

    async fn switch_active(&self, user_id: Uuid, credential_id: Uuid) -> CoreResult<Credential> {
        let lock = self.user_lock(user_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.switch_locked(user_id, credential_id).await
        };
        self.release_lock(user_id, lock).await;
        result
    }

    async fn active_credential(&self, user_id: Uuid) -> CoreResult<Option<Credential>> {
        Ok(self
            .repo
            .find_by_user(user_id)
            .await?
            .into_iter()
            .find(|c| c.is_active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{ErrorKind, StorageError, StorageResult};
    use crate::infrastructure::runtime::FixedClock;
    use crate::infrastructure::storage::InMemoryStorage;
    use chrono::{Duration, TimeZone, Utc};

    fn store() -> (CredentialStore, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
        let store = CredentialStore::new(Arc::new(InMemoryStorage::new()), clock.clone());
        (store, clock)
    }

    fn active_count(credentials: &[Credential]) -> usize {
        credentials.iter().filter(|c| c.is_active).count()
    }

    #[tokio::test]
    async fn newest_credential_becomes_active() {
        let (store, clock) = store();
        let user = Uuid::new_v4();

        let first = store.add_credential(user, Venue::Crypto, "k1", "s1").await.unwrap();
        clock.advance(Duration::minutes(1));
        let second = store.add_credential(user, Venue::Forex, "k2", "s2").await.unwrap();

        let all = store.get_credentials(user).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(active_count(&all), 1);
        assert_eq!(store.active_credential(user).await.unwrap().unwrap().id, second.id);
        assert!(!all.iter().find(|c| c.id == first.id).unwrap().is_active);
    }

    #[tokio::test]
    async fn switching_moves_the_active_flag() {
        let (store, clock) = store();
        let user = Uuid::new_v4();

        let first = store.add_credential(user, Venue::Crypto, "k1", "s1").await.unwrap();
        clock.advance(Duration::minutes(1));
        store.add_credential(user, Venue::Cfd, "k2", "s2").await.unwrap();

        let activated = store.switch_active(user, first.id).await.unwrap();
        assert_eq!(activated.id, first.id);
        assert!(activated.is_active);

        let all = store.get_credentials(user).await.unwrap();
        assert_eq!(active_count(&all), 1);
        assert_eq!(store.active_credential(user).await.unwrap().unwrap().id, first.id);

        // switching to the already active credential is a no-op
        store.switch_active(user, first.id).await.unwrap();
        assert_eq!(store.get_credentials(user).await.unwrap(), all);
    }

    #[tokio::test]
    async fn unknown_credential_leaves_state_unchanged() {
        let (store, _) = store();
        let user = Uuid::new_v4();
        store.add_credential(user, Venue::Crypto, "k1", "s1").await.unwrap();
        let before = store.get_credentials(user).await.unwrap();

        let err = store.switch_active(user, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(store.get_credentials(user).await.unwrap(), before);
    }

    #[tokio::test]
    async fn another_users_credential_is_not_found() {
        let (store, _) = store();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let bobs = store.add_credential(bob, Venue::Forex, "k", "s").await.unwrap();
        store.add_credential(alice, Venue::Crypto, "k", "s").await.unwrap();

        let err = store.switch_active(alice, bobs.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(store.active_credential(bob).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn blank_key_material_is_rejected() {
        let (store, _) = store();
        let user = Uuid::new_v4();
        let err = store.add_credential(user, Venue::Crypto, "  ", "s").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(store.get_credentials(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_without_credentials_has_none_active() {
        let (store, _) = store();
        assert!(store.active_credential(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lock_table_is_emptied_after_unknown_switches() {
        let (store, _) = store();
        for _ in 0..1_000 {
            let err = store
                .switch_active(Uuid::new_v4(), Uuid::new_v4())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
        assert_eq!(store.tracked_users().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn lock_table_is_emptied_after_contended_writes() {
        let (store, _) = store();
        let store = Arc::new(store);
        let user = Uuid::new_v4();

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..32 {
            let store = store.clone();
            tasks.spawn(async move {
                let key = format!("k{}", i);
                store.add_credential(user, Venue::Crypto, &key, "s").await
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap().unwrap();
        }

        let all = store.get_credentials(user).await.unwrap();
        assert_eq!(all.len(), 32);
        assert_eq!(active_count(&all), 1);
        assert_eq!(store.tracked_users().await, 0);
    }

    struct ReadOnlyCredentials(InMemoryStorage);

    #[async_trait]
    impl CredentialRepository for ReadOnlyCredentials {
        async fn create(&self, credential: &Credential) -> StorageResult<()> {
            CredentialRepository::create(&self.0, credential).await
        }

        async fn find_by_user(&self, user_id: Uuid) -> StorageResult<Vec<Credential>> {
            CredentialRepository::find_by_user(&self.0, user_id).await
        }

        async fn save_all(&self, _credentials: &[Credential]) -> StorageResult<()> {
            Err(StorageError::Unavailable("read-only".into()))
        }
    }

    #[tokio::test]
    async fn failed_batch_write_is_a_persistence_error() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let store = CredentialStore::new(Arc::new(ReadOnlyCredentials(InMemoryStorage::new())), clock);
        let user = Uuid::new_v4();

        let first = store.add_credential(user, Venue::Crypto, "k", "s").await.unwrap();
        let err = store.add_credential(user, Venue::Forex, "k", "s").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);

        let all = store.get_credentials(user).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, first.id);
        assert!(all[0].is_active);
    }
}

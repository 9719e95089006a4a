// src/adapter/coordinator.rs
// Composition root wiring the use cases to their collaborators

use std::sync::Arc;
use uuid::Uuid;

use crate::application::dto::parser::TradeOrder;
use crate::application::usecase::{
    CredentialStore, CredentialUseCase, SubscriptionGate, SubscriptionUseCase,
    TradeExecutionUseCase, TradeOrchestrator,
};
use crate::config::Config;
use crate::domain::errors::CoreResult;
use crate::domain::models::TradeResult;
use crate::domain::repository::{CredentialRepository, SubscriptionRepository, TradeRepository};
use crate::domain::service::{Clock, RandomSource};
use crate::infrastructure::prediction::MockProfitEstimator;
use crate::infrastructure::runtime::{SeededRandom, SystemClock, ThreadRandom};
use crate::infrastructure::storage::InMemoryStorage;
use crate::infrastructure::venue::VenueRegistry;

/// Holds one instance of every use case for the lifetime of the process.
/// Request handlers share it behind an `Arc`.
pub struct TradingCoordinator {
    trades: Arc<dyn TradeExecutionUseCase>,
    credentials: Arc<dyn CredentialUseCase>,
    subscriptions: Arc<dyn SubscriptionUseCase>,
}

impl TradingCoordinator {
    pub fn new(
        trades: Arc<dyn TradeExecutionUseCase>,
        credentials: Arc<dyn CredentialUseCase>,
        subscriptions: Arc<dyn SubscriptionUseCase>,
    ) -> Self {
        Self {
            trades,
            credentials,
            subscriptions,
        }
    }

    /// Production wiring: wall clock, in-memory storage and the simulated
    /// venues. A configured seed makes quotes and estimates reproducible.
    pub fn from_config(config: &Config) -> Self {
        let rng: Arc<dyn RandomSource> = match config.prediction.random_seed {
            Some(seed) => {
                log::info!("Using fixed random seed {}", seed);
                Arc::new(SeededRandom::new(seed))
            }
            None => Arc::new(ThreadRandom),
        };

        Self::with_storage(
            config,
            Arc::new(SystemClock),
            rng,
            Arc::new(InMemoryStorage::new()),
        )
    }

    /// Wire the simulated venues over a caller-supplied storage backend.
    pub fn with_storage<S>(
        config: &Config,
        clock: Arc<dyn Clock>,
        rng: Arc<dyn RandomSource>,
        storage: Arc<S>,
    ) -> Self
    where
        S: CredentialRepository + SubscriptionRepository + TradeRepository + 'static,
    {
        let venues = Arc::new(VenueRegistry::simulated(
            &config.venues,
            rng.clone(),
            clock.clone(),
        ));
        log::info!(
            "Venues ready: {}",
            venues
                .venues()
                .iter()
                .map(|v| v.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let trades = TradeOrchestrator::new(
            venues,
            Arc::new(MockProfitEstimator::new(rng)),
            storage.clone(),
            clock.clone(),
        );
        let credentials = CredentialStore::new(storage.clone(), clock.clone());
        let subscriptions =
            SubscriptionGate::new(storage, clock, config.subscription.clone());

        Self::new(
            Arc::new(trades),
            Arc::new(credentials),
            Arc::new(subscriptions),
        )
    }

    pub fn trades(&self) -> &dyn TradeExecutionUseCase {
        self.trades.as_ref()
    }

    pub fn credentials(&self) -> &dyn CredentialUseCase {
        self.credentials.as_ref()
    }

    pub fn subscriptions(&self) -> &dyn SubscriptionUseCase {
        self.subscriptions.as_ref()
    }

    /// Gate a trade on the user's subscription, then execute it.
    pub async fn place_trade(&self, user_id: Uuid, order: TradeOrder) -> CoreResult<TradeResult> {
        self.subscriptions.require_active(user_id).await?;
        self.trades
            .execute_trade(user_id, order.venue, &order.symbol, order.side, order.quantity)
            .await
    }
}

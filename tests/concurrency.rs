//! Concurrent access to shared venue balances and credential sets.

use chrono::Utc;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;
use voltix_trade::application::usecase::{CredentialStore, CredentialUseCase};
use voltix_trade::config::VenueConfig;
use voltix_trade::domain::errors::VenueError;
use voltix_trade::domain::models::{OrderSide, OrderType, Venue};
use voltix_trade::infrastructure::runtime::{FixedClock, SystemClock, ThreadRandom};
use voltix_trade::infrastructure::storage::InMemoryStorage;
use voltix_trade::infrastructure::venue::VenueRegistry;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_buys_never_overspend() {
    let venues = VenueRegistry::simulated(
        &VenueConfig::default(),
        Arc::new(ThreadRandom),
        Arc::new(SystemClock),
    );
    let crypto = venues.resolve(Venue::Crypto).unwrap();

    // each buy costs 3000 against 10000: exactly three can fill
    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let crypto = crypto.clone();
        tasks.spawn(async move {
            crypto
                .place_order("BTCUSDT", OrderSide::Buy, OrderType::Market, dec!(0.06), dec!(50000))
                .await
        });
    }

    let mut filled = 0;
    let mut rejected = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => filled += 1,
            Err(VenueError::InsufficientFunds { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(filled, 3);
    assert_eq!(rejected, 13);
    assert_eq!(crypto.get_balance("USDT").await.unwrap(), dec!(1000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_traffic_balances_out() {
    let venues = VenueRegistry::simulated(
        &VenueConfig::default(),
        Arc::new(ThreadRandom),
        Arc::new(SystemClock),
    );
    let cfd = venues.resolve(Venue::Cfd).unwrap();

    let mut tasks = JoinSet::new();
    for i in 0..50 {
        let cfd = cfd.clone();
        let side = if i % 2 == 0 { OrderSide::Buy } else { OrderSide::Sell };
        tasks.spawn(async move {
            cfd.place_order("US500", side, OrderType::Market, dec!(1), dec!(150))
                .await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    // 25 buys and 25 sells of equal size cancel out
    assert_eq!(cfd.get_balance("USDT").await.unwrap(), dec!(7500));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_switches_keep_one_active() {
    let store = Arc::new(CredentialStore::new(
        Arc::new(InMemoryStorage::new()),
        Arc::new(FixedClock::new(Utc::now())),
    ));
    let user = Uuid::new_v4();

    let mut ids = Vec::new();
    for venue in Venue::ALL {
        ids.push(store.add_credential(user, venue, "k", "s").await.unwrap().id);
    }

    let mut tasks = JoinSet::new();
    for round in 0..60 {
        let store = store.clone();
        let target = ids[round % ids.len()];
        tasks.spawn(async move { store.switch_active(user, target).await });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    let creds = store.get_credentials(user).await.unwrap();
    assert_eq!(creds.len(), 3);
    assert_eq!(creds.iter().filter(|c| c.is_active).count(), 1);
}

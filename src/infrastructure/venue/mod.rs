// Simulated trading venues and the registry that owns them

pub mod account;
pub mod cfd;
pub mod crypto;
pub mod forex;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::VenueConfig;
use crate::domain::errors::{CoreError, CoreResult, VenueError, VenueResult};
use crate::domain::models::{Ticker, Venue};
use crate::domain::service::{Clock, RandomSource, VenueAdapter};

pub use account::SimulatedAccount;
pub use cfd::CfdVenue;
pub use crypto::CryptoVenue;
pub use forex::ForexVenue;

/// Draw a price in `[base, base + range)` truncated to `scale` decimal places.
pub(crate) fn quote(
    symbol: &str,
    base: f64,
    range: f64,
    scale: u32,
    rng: &dyn RandomSource,
) -> VenueResult<Ticker> {
    let raw = rng.uniform(base, base + range);
    let price = Decimal::from_f64(raw)
        .ok_or_else(|| VenueError::Upstream(format!("unrepresentable price {} for {}", raw, symbol)))?
        .round_dp_with_strategy(scale, RoundingStrategy::ToZero);

    log::debug!("Quote {} = {}", symbol, price);

    Ok(Ticker {
        symbol: symbol.to_string(),
        price,
    })
}

/// One long-lived adapter per venue. Balances live inside the adapters, so
/// the registry must outlive individual requests.
pub struct VenueRegistry {
    adapters: HashMap<Venue, Arc<dyn VenueAdapter>>,
}

impl VenueRegistry {
    /// Build the simulated adapter set.
    pub fn simulated(config: &VenueConfig, rng: Arc<dyn RandomSource>, clock: Arc<dyn Clock>) -> Self {
        let adapters = Venue::ALL
            .iter()
            .map(|venue| {
                let adapter: Arc<dyn VenueAdapter> = match venue {
                    Venue::Crypto => Arc::new(CryptoVenue::new(
                        config.crypto_balance,
                        rng.clone(),
                        clock.clone(),
                    )),
                    Venue::Forex => Arc::new(ForexVenue::new(
                        config.forex_balance,
                        rng.clone(),
                        clock.clone(),
                    )),
                    Venue::Cfd => Arc::new(CfdVenue::new(
                        config.cfd_balance,
                        rng.clone(),
                        clock.clone(),
                    )),
                };
                (*venue, adapter)
            })
            .collect();

        Self { adapters }
    }

    /// Registry without adapters; populate with [`VenueRegistry::with_adapter`].
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Register (or replace) the adapter for `adapter.venue()`.
    pub fn with_adapter(mut self, adapter: Arc<dyn VenueAdapter>) -> Self {
        self.adapters.insert(adapter.venue(), adapter);
        self
    }

    pub fn resolve(&self, venue: Venue) -> CoreResult<Arc<dyn VenueAdapter>> {
        self.adapters
            .get(&venue)
            .cloned()
            .ok_or_else(|| CoreError::Validation("Unknown exchange".to_string()))
    }

    pub async fn balance(&self, venue: Venue) -> CoreResult<Decimal> {
        let adapter = self.resolve(venue)?;
        Ok(adapter.get_balance("USDT").await?)
    }

    pub fn venues(&self) -> Vec<Venue> {
        Venue::ALL
            .iter()
            .copied()
            .filter(|v| self.adapters.contains_key(v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{OrderSide, OrderType};
    use crate::infrastructure::runtime::{ScriptedRandom, SystemClock, ThreadRandom};
    use rust_decimal_macros::dec;

    fn registry(rng: Arc<dyn RandomSource>) -> VenueRegistry {
        VenueRegistry::simulated(&VenueConfig::default(), rng, Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn opening_balances_differ_per_venue() {
        let venues = registry(Arc::new(ThreadRandom));
        assert_eq!(venues.balance(Venue::Crypto).await.unwrap(), dec!(10000));
        assert_eq!(venues.balance(Venue::Forex).await.unwrap(), dec!(5000));
        assert_eq!(venues.balance(Venue::Cfd).await.unwrap(), dec!(7500));
    }

    #[tokio::test]
    async fn quotes_fall_in_venue_ranges() {
        let venues = registry(Arc::new(ThreadRandom));
        let ranges = [
            (Venue::Crypto, dec!(50000), dec!(51000)),
            (Venue::Forex, dec!(1.1), dec!(1.11)),
            (Venue::Cfd, dec!(150), dec!(155)),
        ];

        for (venue, low, high) in ranges {
            let adapter = venues.resolve(venue).unwrap();
            for _ in 0..500 {
                let ticker = adapter.get_ticker("SYM").await.unwrap();
                assert!(ticker.price >= low && ticker.price < high, "{} {}", venue, ticker.price);
            }
        }
    }

    #[tokio::test]
    async fn scripted_quotes_are_exact() {
        // crypto, forex, cfd draw in that order
        let venues = registry(Arc::new(ScriptedRandom::new(vec![0.5, 0.0, 0.5])));

        let crypto = venues.resolve(Venue::Crypto).unwrap();
        assert_eq!(crypto.get_ticker("BTCUSDT").await.unwrap().price, dec!(50500));

        let forex = venues.resolve(Venue::Forex).unwrap();
        assert_eq!(forex.get_ticker("EURUSD").await.unwrap().price, dec!(1.1));

        let cfd = venues.resolve(Venue::Cfd).unwrap();
        assert_eq!(cfd.get_ticker("US500").await.unwrap().price, dec!(152.5));
    }

    #[tokio::test]
    async fn adapters_keep_isolated_balances() {
        let venues = registry(Arc::new(ThreadRandom));
        let crypto = venues.resolve(Venue::Crypto).unwrap();
        crypto
            .place_order("BTCUSDT", OrderSide::Buy, OrderType::Market, dec!(0.1), dec!(50000))
            .await
            .unwrap();

        assert_eq!(venues.balance(Venue::Crypto).await.unwrap(), dec!(5000));
        assert_eq!(venues.balance(Venue::Forex).await.unwrap(), dec!(5000));
        assert_eq!(venues.balance(Venue::Cfd).await.unwrap(), dec!(7500));
    }

    #[test]
    fn adapter_names_match_venues() {
        let venues = registry(Arc::new(ThreadRandom));
        assert_eq!(venues.resolve(Venue::Crypto).unwrap().name(), "Binance");
        assert_eq!(venues.resolve(Venue::Forex).unwrap().name(), "MetaTrader 5");
        assert_eq!(venues.resolve(Venue::Cfd).unwrap().name(), "cTrader");
        assert_eq!(venues.venues(), Venue::ALL.to_vec());
    }

    #[test]
    fn empty_registry_rejects_every_venue() {
        let venues = VenueRegistry::empty();
        let err = venues.resolve(Venue::Forex).err().unwrap();
        assert_eq!(err, CoreError::Validation("Unknown exchange".to_string()));
    }
}

// Crypto spot venue simulation

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::account::SimulatedAccount;
use super::quote;
use crate::domain::errors::VenueResult;
use crate::domain::models::{Order, OrderSide, OrderType, Ticker, Venue};
use crate::domain::service::{Clock, RandomSource, VenueAdapter};

// Quotes in [50_000, 51_000), cents precision
const BASE_PRICE: f64 = 50_000.0;
const PRICE_RANGE: f64 = 1_000.0;
const PRICE_SCALE: u32 = 2;

pub struct CryptoVenue {
    account: SimulatedAccount,
    rng: Arc<dyn RandomSource>,
}

impl CryptoVenue {
    pub fn new(opening_balance: Decimal, rng: Arc<dyn RandomSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            account: SimulatedAccount::new(Venue::Crypto, opening_balance, clock),
            rng,
        }
    }
}

#[async_trait]
impl VenueAdapter for CryptoVenue {
    fn venue(&self) -> Venue {
        Venue::Crypto
    }

    async fn get_balance(&self, _asset: &str) -> VenueResult<Decimal> {
        Ok(self.account.balance().await)
    }

    async fn get_ticker(&self, symbol: &str) -> VenueResult<Ticker> {
        quote(symbol, BASE_PRICE, PRICE_RANGE, PRICE_SCALE, self.rng.as_ref())
    }

    async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Decimal,
    ) -> VenueResult<Order> {
        self.account.fill(symbol, side, order_type, quantity, price).await
    }
}

// Forex venue simulation (MetaTrader-style account)

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::account::SimulatedAccount;
use super::quote;
use crate::domain::errors::VenueResult;
use crate::domain::models::{Order, OrderSide, OrderType, Ticker, Venue};
use crate::domain::service::{Clock, RandomSource, VenueAdapter};

// Major-pair quotes in [1.1000, 1.1100), to the pipette
const BASE_PRICE: f64 = 1.1;
const PRICE_RANGE: f64 = 0.01;
const PRICE_SCALE: u32 = 5;

pub struct ForexVenue {
    account: SimulatedAccount,
    rng: Arc<dyn RandomSource>,
}

impl ForexVenue {
    pub fn new(opening_balance: Decimal, rng: Arc<dyn RandomSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            account: SimulatedAccount::new(Venue::Forex, opening_balance, clock),
            rng,
        }
    }
}

#[async_trait]
impl VenueAdapter for ForexVenue {
    fn venue(&self) -> Venue {
        Venue::Forex
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

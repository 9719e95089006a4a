// CFD venue simulation (cTrader-style account)

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::account::SimulatedAccount;
use super::quote;
use crate::domain::errors::VenueResult;
use crate::domain::models::{Order, OrderSide, OrderType, Ticker, Venue};
use crate::domain::service::{Clock, RandomSource, VenueAdapter};

const BASE_PRICE: f64 = 150.0;
const PRICE_RANGE: f64 = 5.0;
const PRICE_SCALE: u32 = 3;

pub struct CfdVenue {
    account: SimulatedAccount,
    rng: Arc<dyn RandomSource>,
}

impl CfdVenue {
    pub fn new(opening_balance: Decimal, rng: Arc<dyn RandomSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            account: SimulatedAccount::new(Venue::Cfd, opening_balance, clock),
            rng,
        }
    }
}

#[async_trait]
impl VenueAdapter for CfdVenue {
    fn venue(&self) -> Venue {
        Venue::Cfd
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

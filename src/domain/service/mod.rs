// Domain service interfaces

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::errors::VenueResult;
use crate::domain::models::{Order, OrderSide, OrderType, ProfitPrediction, Ticker, Venue};

/// Capability contract every trading venue connector implements.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    /// Which venue this adapter serves
    fn venue(&self) -> Venue;

    /// Human-readable venue name
    fn name(&self) -> &'static str {
        self.venue().display_name()
    }

    /// Current account balance. A single scalar balance per adapter: `asset`
    /// is accepted for interface compatibility but does not select a sub-balance.
    async fn get_balance(&self, asset: &str) -> VenueResult<Decimal>;

    /// Latest price for a symbol
    async fn get_ticker(&self, symbol: &str) -> VenueResult<Ticker>;

    /// Fill an order immediately and completely at `price`.
    async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Decimal,
    ) -> VenueResult<Order>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;

    /// Uniform draw in `[low, high)`.
    fn uniform(&self, low: f64, high: f64) -> f64 {
        let value = low + self.next_f64() * (high - low);
        if value < high {
            value
        } else {
            // rounding can land exactly on the upper bound
            next_below(high).max(low)
        }
    }
}

fn next_below(x: f64) -> f64 {
    if x > 0.0 {
        f64::from_bits(x.to_bits() - 1)
    } else if x < 0.0 {
        f64::from_bits(x.to_bits() + 1)
    } else {
        -f64::MIN_POSITIVE
    }
}

/// Estimates the profit of a trade at the moment it is placed.
pub trait ProfitEstimator: Send + Sync {
    /// Infallible: every input yields a prediction.
    fn predict_profit(&self, symbol: &str, current_price: Decimal) -> ProfitPrediction;
}

// Trade execution use case

use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::models::{
    OrderSide, OrderStatus, OrderType, TradeRecord, TradeResult, TradeStatus, Venue,
};
use crate::domain::repository::TradeRepository;
use crate::domain::service::{Clock, ProfitEstimator};
use crate::infrastructure::venue::VenueRegistry;

const MAX_SYMBOL_LEN: usize = 20;

/// Upper-cased symbol, or a validation error if it is not 1-20 ASCII alphanumerics.
pub fn normalize_symbol(symbol: &str) -> CoreResult<String> {
    let symbol = symbol.trim();
    if symbol.is_empty()
        || symbol.len() > MAX_SYMBOL_LEN
        || !symbol.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(CoreError::Validation(format!("Invalid symbol: {:?}", symbol)));
    }
    Ok(symbol.to_ascii_uppercase())
}

/// `notional * percent / 100`, dividing first so the product cannot overflow.
pub fn predicted_profit(notional: Decimal, profit_percent: f64) -> Decimal {
    let percent = Decimal::from_f64(profit_percent).unwrap_or(Decimal::ZERO);
    (notional / Decimal::ONE_HUNDRED * percent).round_dp(8)
}

/// Trade execution use case
#[async_trait]
pub trait TradeExecutionUseCase: Send + Sync {
    /// Execute a market order on `venue` at its current quote.
    async fn execute_trade(
        &self,
        user_id: Uuid,
        venue: Venue,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
    ) -> CoreResult<TradeResult>;

    /// Recorded trades of a user, oldest first.
    async fn history(&self, user_id: Uuid) -> CoreResult<Vec<TradeRecord>>;

    async fn balance(&self, venue: Venue) -> CoreResult<Decimal>;
}

/// Composes quote, fill, profit estimate and persistence into one trade.
pub struct TradeOrchestrator {
    venues: Arc<VenueRegistry>,
    estimator: Arc<dyn ProfitEstimator>,
    trades: Arc<dyn TradeRepository>,
    clock: Arc<dyn Clock>,
}

impl TradeOrchestrator {
    pub fn new(
        venues: Arc<VenueRegistry>,
        estimator: Arc<dyn ProfitEstimator>,
        trades: Arc<dyn TradeRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            venues,
            estimator,
            trades,
            clock,
        }
    }
}

#[async_trait]
impl TradeExecutionUseCase for TradeOrchestrator {
    /// Validation, quote and fill failures abort before anything is recorded.
    /// Once the venue has filled, the trade cannot be undone: a failure to
    /// write the record is reported as [`TradeStatus::FilledUnrecorded`]
    /// instead of an error.
    async fn execute_trade(
        &self,
        user_id: Uuid,
        venue: Venue,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
    ) -> CoreResult<TradeResult> {
        let symbol = normalize_symbol(symbol)?;
        if quantity <= Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "Quantity must be positive: {}",
                quantity
            )));
        }

        let adapter = self.venues.resolve(venue)?;

        let ticker = adapter
            .get_ticker(&symbol)
            .await
            .map_err(|e| CoreError::Upstream(e.to_string()))?;

        let order = adapter
            .place_order(&symbol, side, OrderType::Market, quantity, ticker.price)
            .await?;

        let prediction = self.estimator.predict_profit(&symbol, ticker.price);
        let profit = predicted_profit(quantity * ticker.price, prediction.profit_percent);

        let record = TradeRecord {
            id: Uuid::new_v4(),
            user_id,
            order_id: order.id.clone(),
            venue,
            symbol: symbol.clone(),
            side,
            price: ticker.price,
            quantity,
            predicted_profit: profit,
            confidence: prediction.confidence,
            status: OrderStatus::Filled,
            created_at: self.clock.now(),
        };

        let status = match self.trades.create(&record).await {
            Ok(()) => TradeStatus::Success,
            Err(e) => {
                log::error!(
                    "Order {} filled on {} but the trade record was not saved: {}",
                    order.id,
                    venue,
                    e
                );
                TradeStatus::FilledUnrecorded(e.to_string())
            }
        };

        log::info!(
            "Trade {} for user {}: {} {} {} @ {} on {}, predicted profit {}",
            status.as_str(),
            user_id,
            side,
            quantity,
            symbol,
            ticker.price,
            venue,
            profit
        );

        Ok(TradeResult {
            order_id: order.id,
            venue,
            symbol,
            side,
            price: ticker.price,
            quantity,
            predicted_profit: profit,
            confidence: prediction.confidence,
            status,
        })
    }

    async fn history(&self, user_id: Uuid) -> CoreResult<Vec<TradeRecord>> {
        let mut records = self.trades.find_by_user(user_id).await?;
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    async fn balance(&self, venue: Venue) -> CoreResult<Decimal> {
        self.venues.balance(venue).await
    }
}

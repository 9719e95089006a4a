// Simulated cash account shared by the mock venues

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::errors::{VenueError, VenueResult};
use crate::domain::models::{Order, OrderSide, OrderStatus, OrderType, Venue};
use crate::domain::service::Clock;

/// One scalar cash balance. Every fill takes the lock, checks and mutates
/// the balance without yielding, then releases it, so concurrent fills on
/// the same account serialize and a dropped fill future leaves no
/// half-applied change.
pub struct SimulatedAccount {
    venue: Venue,
    balance: Mutex<Decimal>,
    clock: Arc<dyn Clock>,
}

impl SimulatedAccount {
    pub fn new(venue: Venue, opening_balance: Decimal, clock: Arc<dyn Clock>) -> Self {
        Self {
            venue,
            balance: Mutex::new(opening_balance),
            clock,
        }
    }

    pub async fn balance(&self) -> Decimal {
        *self.balance.lock().await
    }

    pub async fn fill(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Decimal,
    ) -> VenueResult<Order> {
        if quantity < Decimal::ZERO {
            return Err(VenueError::InvalidOrder(format!(
                "quantity must not be negative: {}",
                quantity
            )));
        }
        if price <= Decimal::ZERO {
            return Err(VenueError::InvalidOrder(format!(
                "price must be positive: {}",
                price
            )));
        }

        let cost = quantity
            .checked_mul(price)
            .ok_or_else(|| VenueError::InvalidOrder("order value overflow".to_string()))?;

        let mut balance = self.balance.lock().await;
        let updated = match side {
            OrderSide::Buy => {
                if *balance < cost {
                    log::warn!(
                        "{}: rejected {} {} {}: cost {} exceeds balance {}",
                        self.venue,
                        side,
                        quantity,
                        symbol,
                        cost,
                        *balance
                    );
                    return Err(VenueError::InsufficientFunds {
                        required: cost.to_string(),
                        available: balance.to_string(),
                    });
                }
                *balance - cost
            }
            // No asset ledger: a sell only credits cash.
            OrderSide::Sell => balance
                .checked_add(cost)
                .ok_or_else(|| VenueError::InvalidOrder("balance overflow".to_string()))?,
        };
        *balance = updated;
        drop(balance);

        let order = Order {
            id: Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            side,
            order_type,
            price,
            quantity,
            status: OrderStatus::Filled,
            timestamp: self.clock.now(),
        };

        log::info!(
            "{}: filled {} {} {} @ {} (order {})",
            self.venue,
            order.side,
            order.quantity,
            order.symbol,
            order.price,
            order.id
        );

        Ok(order)
    }
}

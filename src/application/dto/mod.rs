// src/application/dto/mod.rs
// Request and response bodies of the HTTP surface

pub mod parser;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::{
    Plan, PlanStatus, Subscription, SubscriptionEvent, SubscriptionSummary,
    TradeResult, TradeStatus,
};

#[derive(Debug, Clone, Deserialize)]
pub struct TradeRequest {
    pub exchange: String,
    pub symbol: String,
    pub side: String,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeResponse {
    pub status: &'static str,
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub price: Decimal,
    pub profit_prediction: Decimal,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<TradeResult> for TradeResponse {
    fn from(result: TradeResult) -> Self {
        let warning = match &result.status {
            TradeStatus::Success => None,
            TradeStatus::FilledUnrecorded(reason) => Some(format!(
                "order filled but the trade record was not saved: {}",
                reason
            )),
        };
        Self {
            status: result.status.as_str(),
            order_id: result.order_id,
            price: result.price,
            profit_prediction: result.predicted_profit,
            confidence: result.confidence,
            warning,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub exchange: &'static str,
    pub name: &'static str,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddCredentialRequest {
    pub exchange_type: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwitchCredentialRequest {
    pub credential_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Subscription as reported to its owner.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub plan_type: Plan,
    pub status: PlanStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub days_remaining: i64,
}

impl SubscriptionResponse {
    pub fn new(subscription: &Subscription, days_remaining: i64) -> Self {
        Self {
            id: subscription.id,
            plan_type: subscription.plan,
            status: subscription.status,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            days_remaining,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub subscription: SubscriptionSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<SubscriptionEvent>,
}

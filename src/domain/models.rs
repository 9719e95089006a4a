// src/domain/models.rs
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::CoreError;

/// Trading venues known to the platform. Wire ids follow the deployed
/// connectors: `binance`, `mt5`, `ctrader`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    #[serde(rename = "binance", alias = "crypto")]
    Crypto,
    #[serde(rename = "mt5", alias = "forex")]
    Forex,
    #[serde(rename = "ctrader", alias = "cfd")]
    Cfd,
}

impl Venue {
    pub const ALL: [Venue; 3] = [Venue::Crypto, Venue::Forex, Venue::Cfd];

    pub fn id(&self) -> &'static str {
        match self {
            Venue::Crypto => "binance",
            Venue::Forex => "mt5",
            Venue::Cfd => "ctrader",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Venue::Crypto => "Binance",
            Venue::Forex => "MetaTrader 5",
            Venue::Cfd => "cTrader",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Venue {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binance" | "crypto" => Ok(Venue::Crypto),
            "mt5" | "forex" => Ok(Venue::Forex),
            "ctrader" | "cfd" => Ok(Venue::Cfd),
            _ => Err(CoreError::Validation("Unknown exchange".to_string())),
        }
    }
}

/// Latest quote for a symbol. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    pub symbol: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(CoreError::Validation(format!("Unknown side: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
        }
    }
}

/// Only the terminal fill state is modeled; simulated venues fill immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Filled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrderStatus::Filled => write!(f, "FILLED"),
        }
    }
}

/// A fill produced by a venue adapter. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub price: Decimal,
    pub quantity: Decimal,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

/// Stored venue API credentials for a user. Key material never leaves
/// the process through serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credential {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "exchange_type")]
    pub venue: Venue,
    #[serde(skip_serializing)]
    pub encrypted_key: String,
    #[serde(skip_serializing)]
    pub encrypted_secret: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Trial,
    Premium,
    Enterprise,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Plan::Trial => write!(f, "trial"),
            Plan::Premium => write!(f, "premium"),
            Plan::Enterprise => write!(f, "enterprise"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Active,
    Expired,
    Canceled,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlanStatus::Active => write!(f, "active"),
            PlanStatus::Expired => write!(f, "expired"),
            PlanStatus::Canceled => write!(f, "canceled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "plan_type")]
    pub plan: Plan,
    pub status: PlanStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Active status and `now` inside the half-open window `[start_date, end_date)`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PlanStatus::Active && now >= self.start_date && now < self.end_date
    }

    /// Whole days left, rounded down. Zero whenever the subscription is not active.
    pub fn days_remaining_at(&self, now: DateTime<Utc>) -> i64 {
        if !self.is_active_at(now) {
            return 0;
        }
        (self.end_date - now).num_hours() / 24
    }

    pub fn window_ended_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_date
    }

    pub fn length(&self) -> Duration {
        self.end_date - self.start_date
    }
}

/// Notifications raised while re-evaluating a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionEvent {
    TrialExpiring,
    TrialExpired,
    SubscriptionExpired,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionSummary {
    pub plan: Plan,
    pub status: PlanStatus,
    pub days_remaining: i64,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitPrediction {
    pub profit_percent: f64,
    pub confidence: f64,
}

/// Persisted outcome of one executed trade. Write-once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_id: String,
    #[serde(rename = "exchange")]
    pub venue: Venue,
    pub symbol: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub predicted_profit: Decimal,
    pub confidence: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeStatus {
    Success,
    /// The venue filled the order but the trade record could not be written.
    FilledUnrecorded(String),
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Success => "success",
            TradeStatus::FilledUnrecorded(_) => "filled_unrecorded",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeResult {
    pub order_id: String,
    pub venue: Venue,
    pub symbol: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub predicted_profit: Decimal,
    pub confidence: f64,
    pub status: TradeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn trial_from(start: DateTime<Utc>) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan: Plan::Trial,
            status: PlanStatus::Active,
            start_date: start,
            end_date: start + Duration::days(7),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn venue_ids_parse_case_insensitively() {
        assert_eq!("BINANCE".parse::<Venue>().unwrap(), Venue::Crypto);
        assert_eq!("forex".parse::<Venue>().unwrap(), Venue::Forex);
        assert_eq!(" ctrader ".parse::<Venue>().unwrap(), Venue::Cfd);

        let err = "kraken".parse::<Venue>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown exchange");
    }

    #[test]
    fn order_side_rejects_unknown_values() {
        assert_eq!("buy".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("SELL".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert!("HOLD".parse::<OrderSide>().is_err());
    }

    #[test]
    fn subscription_window_is_half_open() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let sub = trial_from(t0);

        assert!(sub.is_active_at(t0));
        assert!(sub.is_active_at(t0 + Duration::days(7) - Duration::seconds(1)));
        assert!(!sub.is_active_at(t0 + Duration::days(7)));
        assert!(!sub.is_active_at(t0 - Duration::seconds(1)));
    }

    #[test]
    fn days_remaining_rounds_down() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let sub = trial_from(t0);

        assert_eq!(sub.days_remaining_at(t0), 7);
        assert_eq!(sub.days_remaining_at(t0 + Duration::hours(1)), 6);
        assert_eq!(sub.days_remaining_at(t0 + Duration::days(6)), 1);
        assert_eq!(sub.days_remaining_at(t0 + Duration::days(6) + Duration::hours(1)), 0);
        assert_eq!(sub.days_remaining_at(t0 + Duration::days(8)), 0);
    }

    #[test]
    fn canceled_subscription_has_no_days_left() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut sub = trial_from(t0);
        sub.status = PlanStatus::Canceled;

        assert!(!sub.is_active_at(t0 + Duration::days(1)));
        assert_eq!(sub.days_remaining_at(t0 + Duration::days(1)), 0);
    }

    #[test]
    fn credential_serialization_hides_key_material() {
        let now = Utc::now();
        let cred = Credential {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            venue: Venue::Forex,
            encrypted_key: "key-123".into(),
            encrypted_secret: "secret-456".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&cred).unwrap();
        assert!(!json.contains("key-123"));
        assert!(!json.contains("secret-456"));
        assert!(json.contains("\"exchange_type\":\"mt5\""));
    }
}

// src/application/dto/parser.rs
// Parsers turning wire strings into domain values

use rust_decimal::Decimal;
use uuid::Uuid;

use super::{AddCredentialRequest, SwitchCredentialRequest, TradeRequest};
use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::models::{OrderSide, Venue};

/// A trade request with every field in domain form.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOrder {
    pub venue: Venue,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
}

pub fn parse_venue(raw: &str) -> CoreResult<Venue> {
    raw.parse()
}

pub fn parse_side(raw: &str) -> CoreResult<OrderSide> {
    raw.parse()
}

pub fn parse_id(raw: &str, field: &str) -> CoreResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| CoreError::Validation(format!("Invalid {}: {}", field, raw)))
}

impl TradeRequest {
    /// Symbol shape and quantity sign are checked by the orchestrator.
    pub fn parse(&self) -> CoreResult<TradeOrder> {
        Ok(TradeOrder {
            venue: parse_venue(&self.exchange)?,
            symbol: self.symbol.clone(),
            side: parse_side(&self.side)?,
            quantity: self.quantity,
        })
    }
}

impl AddCredentialRequest {
    pub fn venue(&self) -> CoreResult<Venue> {
        parse_venue(&self.exchange_type)
    }
}

impl SwitchCredentialRequest {
    pub fn credential_id(&self) -> CoreResult<Uuid> {
        parse_id(&self.credential_id, "credential_id")
    }
}

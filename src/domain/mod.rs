// src/domain/mod.rs
pub mod errors;
pub mod models;
pub mod repository;
pub mod service;

// Re-export common types for convenience
pub use errors::{
    AppError, AppResult, CoreError, CoreResult, ErrorKind, StorageError, StorageResult, VenueError,
    VenueResult,
};
pub use models::{
    Credential, Order, OrderSide, OrderStatus, OrderType, Plan, PlanStatus, ProfitPrediction,
    Subscription, SubscriptionEvent, SubscriptionSummary, Ticker, TradeRecord, TradeResult,
    TradeStatus, Venue,
};

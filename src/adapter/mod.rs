// src/adapter/mod.rs
pub mod coordinator;
pub mod http;

pub use coordinator::TradingCoordinator;

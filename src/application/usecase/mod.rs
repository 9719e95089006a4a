pub mod credential_usecase;
pub mod subscription_usecase;
pub mod trade_usecase;

// Re-export public API
pub use credential_usecase::{CredentialStore, CredentialUseCase};
pub use subscription_usecase::{SubscriptionGate, SubscriptionUseCase};
pub use trade_usecase::{TradeExecutionUseCase, TradeOrchestrator};

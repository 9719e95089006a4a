// src/domain/errors.rs
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Failures raised by a venue adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VenueError {
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: String, available: String },

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("venue unavailable: {0}")]
    Upstream(String),
}

/// Failures raised by the storage collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Caller-facing error taxonomy of the trading core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("insufficient funds")]
    InsufficientFunds { required: String, available: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("subscription required: {0}")]
    SubscriptionRequired(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Upstream,
    InsufficientFunds,
    NotFound,
    Persistence,
    SubscriptionRequired,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "VALIDATION"),
            ErrorKind::Upstream => write!(f, "UPSTREAM"),
            ErrorKind::InsufficientFunds => write!(f, "INSUFFICIENT_FUNDS"),
            ErrorKind::NotFound => write!(f, "NOT_FOUND"),
            ErrorKind::Persistence => write!(f, "PERSISTENCE"),
            ErrorKind::SubscriptionRequired => write!(f, "SUBSCRIPTION_REQUIRED"),
        }
    }
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::Upstream(_) => ErrorKind::Upstream,
            CoreError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::Persistence(_) => ErrorKind::Persistence,
            CoreError::SubscriptionRequired(_) => ErrorKind::SubscriptionRequired,
        }
    }
}

impl From<VenueError> for CoreError {
    fn from(error: VenueError) -> Self {
        match error {
            VenueError::InsufficientFunds { required, available } => {
                CoreError::InsufficientFunds { required, available }
            }
            VenueError::InvalidOrder(msg) => CoreError::Validation(msg),
            VenueError::Upstream(msg) => CoreError::Upstream(msg),
        }
    }
}

/// Every storage failure reaches callers as a persistence error. Missing
/// records are an `Option`/empty result at the repository seam, and the use
/// cases decide when that is a `NotFound`.
impl From<StorageError> for CoreError {
    fn from(error: StorageError) -> Self {
        CoreError::Persistence(error.to_string())
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type CoreResult<T> = Result<T, CoreError>;
pub type VenueResult<T> = Result<T, VenueError>;
pub type StorageResult<T> = Result<T, StorageError>;

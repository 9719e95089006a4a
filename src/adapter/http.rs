// src/adapter/http.rs
// HTTP surface over the trading coordinator

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::adapter::coordinator::TradingCoordinator;
use crate::application::dto::parser::{parse_id, parse_venue};
use crate::application::dto::{
    AddCredentialRequest, BalanceResponse, ErrorResponse, MeResponse, MessageResponse,
    SubscriptionResponse, SwitchCredentialRequest, TradeRequest, TradeResponse,
};
use crate::domain::errors::{CoreError, ErrorKind};
use crate::domain::models::{Credential, TradeRecord};

/// Header carrying the authenticated caller's id.
pub const USER_ID_HEADER: &str = "x-user-id";

pub type SharedCoordinator = Arc<TradingCoordinator>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid request")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::InsufficientFunds => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::SubscriptionRequired => StatusCode::PAYMENT_REQUIRED,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Core(err) => {
                let status = status_for(err.kind());
                match err.kind() {
                    ErrorKind::Persistence => {
                        log::error!("Request failed on storage: {}", err);
                        (status, "An internal storage error occurred".to_string())
                    }
                    ErrorKind::Upstream => {
                        log::warn!("Request failed upstream: {}", err);
                        (status, err.to_string())
                    }
                    _ => (status, err.to_string()),
                }
            }
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::BadRequest(detail) => {
                log::debug!("Rejected request body: {}", detail);
                (StatusCode::BAD_REQUEST, "Invalid request".to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

fn caller_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| ApiError::Unauthorized("Missing user id".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid user id".to_string()))?;

    parse_id(raw, "user id").map_err(|_| ApiError::Unauthorized("Invalid user id".to_string()))
}

pub fn router(coordinator: SharedCoordinator) -> Router {
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/trade", post(post_trade))
        .route("/api/trades", get(get_trades))
        .route("/api/balance/:exchange", get(get_balance))
        .route("/api/v1/exchange", post(add_credential).get(list_credentials))
        .route("/api/v1/exchange/switch", post(switch_credential))
        .route("/api/v1/subscription/trial", post(start_trial))
        .route("/api/v1/user/me", get(get_me))
        .with_state(coordinator)
}

/// # POST /api/trade
async fn post_trade(
    State(coordinator): State<SharedCoordinator>,
    headers: HeaderMap,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Result<Json<TradeResponse>, ApiError> {
    let user_id = caller_id(&headers)?;
    let Json(request) = payload?;
    let order = request.parse()?;

    let result = coordinator.place_trade(user_id, order).await?;
    Ok(Json(TradeResponse::from(result)))
}

/// # GET /api/trades
async fn get_trades(
    State(coordinator): State<SharedCoordinator>,
    headers: HeaderMap,
) -> Result<Json<Vec<TradeRecord>>, ApiError> {
    let user_id = caller_id(&headers)?;
    Ok(Json(coordinator.trades().history(user_id).await?))
}

/// # GET /api/balance/:exchange
async fn get_balance(
    State(coordinator): State<SharedCoordinator>,
    headers: HeaderMap,
    Path(exchange): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    caller_id(&headers)?;
    let venue = parse_venue(&exchange)?;
    let balance = coordinator.trades().balance(venue).await?;

    Ok(Json(BalanceResponse {
        exchange: venue.id(),
        name: venue.display_name(),
        balance,
    }))
}

/// # POST /api/v1/exchange
async fn add_credential(
    State(coordinator): State<SharedCoordinator>,
    headers: HeaderMap,
    payload: Result<Json<AddCredentialRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Credential>), ApiError> {
    let user_id = caller_id(&headers)?;
    let Json(request) = payload?;
    let venue = request.venue()?;

    let credential = coordinator
        .credentials()
        .add_credential(user_id, venue, &request.api_key, &request.api_secret)
        .await?;
    Ok((StatusCode::CREATED, Json(credential)))
}

/// # GET /api/v1/exchange
async fn list_credentials(
    State(coordinator): State<SharedCoordinator>,
    headers: HeaderMap,
) -> Result<Json<Vec<Credential>>, ApiError> {
    let user_id = caller_id(&headers)?;
    Ok(Json(coordinator.credentials().get_credentials(user_id).await?))
}

/// # POST /api/v1/exchange/switch
async fn switch_credential(
    State(coordinator): State<SharedCoordinator>,
    headers: HeaderMap,
    payload: Result<Json<SwitchCredentialRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = caller_id(&headers)?;
    let Json(request) = payload?;
    let credential_id = request.credential_id()?;

    coordinator
        .credentials()
        .switch_active(user_id, credential_id)
        .await?;
    Ok(Json(MessageResponse { message: "switched" }))
}

/// # POST /api/v1/subscription/trial
async fn start_trial(
    State(coordinator): State<SharedCoordinator>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let user_id = caller_id(&headers)?;
    let subscriptions = coordinator.subscriptions();

    let trial = subscriptions.create_trial(user_id).await?;
    let body = SubscriptionResponse::new(&trial, subscriptions.days_remaining(&trial));
    Ok((StatusCode::CREATED, Json(body)))
}

/// # GET /api/v1/user/me
async fn get_me(
    State(coordinator): State<SharedCoordinator>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError> {
    let user_id = caller_id(&headers)?;
    let subscriptions = coordinator.subscriptions();

    let (subscription, notice) = subscriptions.refresh(user_id).await?;
    Ok(Json(MeResponse {
        id: user_id,
        subscription: subscriptions.summary(&subscription),
        notice,
    }))
}

//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path, State,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Account, AccountDraft, OperationContext, Service, ServiceDraft, TransactionRecord,
    DEFAULT_DURATION_MINUTES,
};
use crate::error::AppError;
use crate::handlers::{ServiceHandler, TransferCommand, TransferHandler, UserHandler};

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

/// Body of `POST /users` and `PUT /users/:user_id`
#[derive(Debug, Serialize, Deserialize)]
pub struct UserRequest {
    pub name: String,
    #[serde(default, alias = "minutesBalance")]
    pub minutes_balance: i64,
}

impl From<UserRequest> for AccountDraft {
    fn from(request: UserRequest) -> Self {
        AccountDraft::new(request.name).with_balance(request.minutes_balance)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "providerUserId")]
    pub provider_user_id: i64,
    #[serde(default = "default_duration", alias = "durationMinutes")]
    pub duration_minutes: i64,
}

fn default_duration() -> i64 {
    DEFAULT_DURATION_MINUTES
}

impl From<ServiceRequest> for ServiceDraft {
    fn from(request: ServiceRequest) -> Self {
        ServiceDraft {
            title: request.title,
            description: request.description,
            provider_user_id: request.provider_user_id,
            duration_minutes: request.duration_minutes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(alias = "providerUserId")]
    pub provider_user_id: i64,
    #[serde(alias = "recipientUserId")]
    pub recipient_user_id: i64,
    pub minutes: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/services", get(list_services).post(create_service))
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/:transaction_id", get(get_transaction))
}

// =========================================================================
// Users
// =========================================================================

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<Account>, AppError> {
    let Json(request) = payload?;
    let account = UserHandler::new(state.store).create(request.into()).await?;
    Ok(Json(account))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = UserHandler::new(state.store).list().await?;
    Ok(Json(accounts))
}

async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Account>, AppError> {
    let Path(user_id) = path?;
    let account = UserHandler::new(state.store).get(user_id).await?;
    Ok(Json(account))
}

/// Full replacement: an omitted balance resets it to zero
async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<Account>, AppError> {
    let Path(user_id) = path?;
    let Json(request) = payload?;
    let account = UserHandler::new(state.store)
        .update(user_id, request.into())
        .await?;
    Ok(Json(account))
}

async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(user_id) = path?;
    UserHandler::new(state.store).delete(user_id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted".to_string(),
    }))
}

// =========================================================================
// Services
// =========================================================================

async fn create_service(
    State(state): State<AppState>,
    payload: Result<Json<ServiceRequest>, JsonRejection>,
) -> Result<Json<Service>, AppError> {
    let Json(request) = payload?;
    let service = ServiceHandler::new(state.store).create(request.into()).await?;
    Ok(Json(service))
}

async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<Service>>, AppError> {
    let services = ServiceHandler::new(state.store).list().await?;
    Ok(Json(services))
}

// =========================================================================
// Transactions
// =========================================================================

/// Transfer minutes from the recipient to the provider
async fn create_transaction(
    State(state): State<AppState>,
    context: Option<Extension<OperationContext>>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionRecord>, AppError> {
    let Json(request) = payload?;
    let context = context.map(|Extension(ctx)| ctx).unwrap_or_default();

    let command = TransferCommand::new(
        request.provider_user_id,
        request.recipient_user_id,
        request.minutes,
    );
    let command = if let Some(description) = request.description {
        command.with_description(description)
    } else {
        command
    };

    let handler = TransferHandler::new(state.store, state.transfer_policy);
    let record = handler.execute(command, &context).await?;

    Ok(Json(record))
}

async fn list_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<TransactionRecord>>, AppError> {
    let handler = TransferHandler::new(state.store, state.transfer_policy);
    Ok(Json(handler.list().await?))
}

async fn get_transaction(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<TransactionRecord>, AppError> {
    let Path(transaction_id) = path?;
    let handler = TransferHandler::new(state.store, state.transfer_policy);
    Ok(Json(handler.get(transaction_id).await?))
}

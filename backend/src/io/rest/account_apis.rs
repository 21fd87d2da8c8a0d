//! # REST API for Accounts
//!
//! Account CRUD plus the two read-only views the ledger maintains:
//!
//! - `GET /api/accounts/:id/balance-history` - daily closing balances,
//!   ascending by date, cursor paginated
//! - `GET /api/accounts/:id/audit` - stored balance against
//!   `opening + Σ income − Σ expense`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::{BalanceHistoryRequest, CreateAccountRequest, UpdateAccountRequest};
use tracing::{error, info};

use crate::io::rest::mappers::AccountMapper;
use crate::io::rest::CurrentUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route(
            "/:id",
            get(get_account)
                .put(update_account)
                .patch(update_account)
                .delete(delete_account),
        )
        .route("/:id/balance-history", get(get_balance_history))
        .route("/:id/audit", get(audit_balance))
}

pub async fn list_accounts(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    info!("GET /api/accounts");

    match state.account_service.list_accounts(user.id()).await {
        Ok(accounts) => {
            let body: Vec<shared::Account> = accounts.into_iter().map(AccountMapper::to_dto).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!("Failed to list accounts: {}", e);
            e.into_response()
        }
    }
}

pub async fn create_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    info!("POST /api/accounts - request: {:?}", request);

    match state.account_service.create_account(user.id(), request).await {
        Ok(account) => (StatusCode::CREATED, Json(AccountMapper::to_dto(account))).into_response(),
        Err(e) => {
            error!("Failed to create account: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/accounts/{}", id);

    match state.account_service.get_account(user.id(), &id).await {
        Ok(account) => (StatusCode::OK, Json(AccountMapper::to_dto(account))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Partial update, served on both PUT and PATCH
pub async fn update_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateAccountRequest>,
) -> impl IntoResponse {
    info!("Update /api/accounts/{} - request: {:?}", id, request);

    match state.account_service.update_account(user.id(), &id, request).await {
        Ok(account) => (StatusCode::OK, Json(AccountMapper::to_dto(account))).into_response(),
        Err(e) => {
            error!("Failed to update account {}: {}", id, e);
            e.into_response()
        }
    }
}

pub async fn delete_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/accounts/{}", id);

    match state.account_service.delete_account(user.id(), &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete account {}: {}", id, e);
            e.into_response()
        }
    }
}

pub async fn get_balance_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Query(request): Query<BalanceHistoryRequest>,
) -> impl IntoResponse {
    info!("GET /api/accounts/{}/balance-history - query: {:?}", id, request);

    match state.account_service.balance_history(user.id(), &id, request).await {
        Ok(page) => (StatusCode::OK, Json(AccountMapper::to_history_response(page))).into_response(),
        Err(e) => {
            error!("Failed to load balance history for {}: {}", id, e);
            e.into_response()
        }
    }
}

pub async fn audit_balance(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/accounts/{}/audit", id);

    match state.account_service.audit_balance(user.id(), &id).await {
        Ok(audit) => (StatusCode::OK, Json(AccountMapper::to_audit_response(audit))).into_response(),
        Err(e) => {
            error!("Failed to audit account {}: {}", id, e);
            e.into_response()
        }
    }
}

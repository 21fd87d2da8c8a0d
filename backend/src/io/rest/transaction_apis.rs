//! # REST API for Transactions
//!
//! Expenses and incomes are served from `/api/expenses` and `/api/incomes`
//! by one handler set parameterised by kind. Every write goes through the
//! transaction service, which applies the balance and history effects in
//! the same database transaction as the row change.
//!
//! `GET /api/transactions` lists both kinds together with the full filter
//! set, newest first.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{CreateTransactionRequest, TransactionListRequest, UpdateTransactionRequest};
use tracing::{error, info};

use crate::domain::models::TransactionKind;
use crate::io::rest::mappers::TransactionMapper;
use crate::io::rest::CurrentUser;
use crate::AppState;

/// List filters for a single-kind endpoint; the kind comes from the path
#[derive(Debug, Default, Deserialize)]
pub struct KindListQuery {
    pub account: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub after: Option<String>,
    pub limit: Option<u32>,
}

impl KindListQuery {
    fn into_request(self, kind: TransactionKind) -> TransactionListRequest {
        TransactionListRequest {
            kind: Some(TransactionMapper::to_dto_kind(kind)),
            account: self.account,
            category: self.category,
            description: self.description,
            date_from: self.date_from,
            date_to: self.date_to,
            after: self.after,
            limit: self.limit,
        }
    }
}

pub fn router(kind: TransactionKind) -> Router<AppState> {
    Router::new()
        .route("/", get(list_kind).post(create_transaction))
        .route(
            "/:id",
            get(get_transaction)
                .put(update_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .layer(Extension(kind))
}

/// Combined listing across both kinds
pub fn combined_router() -> Router<AppState> {
    Router::new().route("/", get(list_transactions))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(request): Query<TransactionListRequest>,
) -> impl IntoResponse {
    info!("GET /api/transactions - query: {:?}", request);

    match state.transaction_service.list_transactions(user.id(), request).await {
        Ok(page) => (StatusCode::OK, Json(TransactionMapper::to_list_response(page))).into_response(),
        Err(e) => {
            error!("Failed to list transactions: {}", e);
            e.into_response()
        }
    }
}

pub async fn list_kind(
    State(state): State<AppState>,
    Extension(kind): Extension<TransactionKind>,
    user: CurrentUser,
    Query(query): Query<KindListQuery>,
) -> impl IntoResponse {
    info!("GET {} list - query: {:?}", kind.as_str(), query);

    match state
        .transaction_service
        .list_transactions(user.id(), query.into_request(kind))
        .await
    {
        Ok(page) => (StatusCode::OK, Json(TransactionMapper::to_list_response(page))).into_response(),
        Err(e) => {
            error!("Failed to list {} transactions: {}", kind.as_str(), e);
            e.into_response()
        }
    }
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(kind): Extension<TransactionKind>,
    user: CurrentUser,
    Json(request): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    info!("POST {} - request: {:?}", kind.as_str(), request);

    match state.transaction_service.create_transaction(user.id(), kind, request).await {
        Ok(transaction) => (StatusCode::CREATED, Json(TransactionMapper::to_dto(transaction))).into_response(),
        Err(e) => {
            error!("Failed to create {}: {}", kind.as_str(), e);
            e.into_response()
        }
    }
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(kind): Extension<TransactionKind>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.transaction_service.get_transaction(user.id(), kind, &id).await {
        Ok(transaction) => (StatusCode::OK, Json(TransactionMapper::to_dto(transaction))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(kind): Extension<TransactionKind>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateTransactionRequest>,
) -> impl IntoResponse {
    info!("Update {} {} - request: {:?}", kind.as_str(), id, request);

    match state
        .transaction_service
        .update_transaction(user.id(), kind, &id, request)
        .await
    {
        Ok(transaction) => (StatusCode::OK, Json(TransactionMapper::to_dto(transaction))).into_response(),
        Err(e) => {
            error!("Failed to update {} {}: {}", kind.as_str(), id, e);
            e.into_response()
        }
    }
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(kind): Extension<TransactionKind>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE {} {}", kind.as_str(), id);

    match state.transaction_service.delete_transaction(user.id(), kind, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete {} {}: {}", kind.as_str(), id, e);
            e.into_response()
        }
    }
}

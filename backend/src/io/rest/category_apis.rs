//! # REST API for Categories
//!
//! Expense and income categories share one handler set. The router is
//! built once per kind and the kind reaches handlers as an extension, so
//! `/api/expense-categories/:id` never serves an income category.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use serde::Serialize;
use shared::CategoryRequest;
use tracing::{error, info};

use crate::domain::models::TransactionKind;
use crate::io::rest::mappers::ReferenceMapper;
use crate::io::rest::CurrentUser;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CategoryDeletedResponse {
    pub deleted_transactions: usize,
}

pub fn router(kind: TransactionKind) -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .layer(Extension(kind))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(kind): Extension<TransactionKind>,
    user: CurrentUser,
) -> impl IntoResponse {
    info!("GET {} categories", kind.as_str());

    match state.category_service.list_categories(user.id(), kind).await {
        Ok(categories) => {
            let body: Vec<shared::Category> = categories.into_iter().map(ReferenceMapper::to_category_dto).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!("Failed to list {} categories: {}", kind.as_str(), e);
            e.into_response()
        }
    }
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(kind): Extension<TransactionKind>,
    user: CurrentUser,
    Json(request): Json<CategoryRequest>,
) -> impl IntoResponse {
    info!("POST {} category - request: {:?}", kind.as_str(), request);

    match state.category_service.create_category(user.id(), kind, request).await {
        Ok(category) => (StatusCode::CREATED, Json(ReferenceMapper::to_category_dto(category))).into_response(),
        Err(e) => {
            error!("Failed to create {} category: {}", kind.as_str(), e);
            e.into_response()
        }
    }
}

pub async fn get_category(
    State(state): State<AppState>,
    Extension(kind): Extension<TransactionKind>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.category_service.get_category(user.id(), kind, &id).await {
        Ok(category) => (StatusCode::OK, Json(ReferenceMapper::to_category_dto(category))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_category(
    State(state): State<AppState>,
    Extension(kind): Extension<TransactionKind>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<CategoryRequest>,
) -> impl IntoResponse {
    info!("PUT {} category {} - request: {:?}", kind.as_str(), id, request);

    match state.category_service.update_category(user.id(), kind, &id, request).await {
        Ok(category) => (StatusCode::OK, Json(ReferenceMapper::to_category_dto(category))).into_response(),
        Err(e) => {
            error!("Failed to update category {}: {}", id, e);
            e.into_response()
        }
    }
}

/// Removes the category and reverses every transaction filed under it
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(kind): Extension<TransactionKind>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE {} category {}", kind.as_str(), id);

    match state.category_service.delete_category(user.id(), kind, &id).await {
        Ok(deleted_transactions) => (
            StatusCode::OK,
            Json(CategoryDeletedResponse { deleted_transactions }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to delete category {}: {}", id, e);
            e.into_response()
        }
    }
}

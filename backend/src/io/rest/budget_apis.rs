//! # REST API for Budgets

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::BudgetRequest;
use tracing::{error, info};

use crate::io::rest::mappers::BudgetMapper;
use crate::io::rest::CurrentUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_budgets).post(create_budget))
        .route("/:id", get(get_budget).put(update_budget).delete(delete_budget))
}

pub async fn list_budgets(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    info!("GET /api/budgets");

    match state.budget_service.list_budgets(user.id()).await {
        Ok(summaries) => {
            let body: Vec<shared::Budget> = summaries.into_iter().map(BudgetMapper::to_dto).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!("Failed to list budgets: {}", e);
            e.into_response()
        }
    }
}

pub async fn create_budget(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<BudgetRequest>,
) -> impl IntoResponse {
    info!("POST /api/budgets - request: {:?}", request);

    match state.budget_service.create_budget(user.id(), request).await {
        Ok(summary) => (StatusCode::CREATED, Json(BudgetMapper::to_dto(summary))).into_response(),
        Err(e) => {
            error!("Failed to create budget: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_budget(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.budget_service.get_budget(user.id(), &id).await {
        Ok(summary) => (StatusCode::OK, Json(BudgetMapper::to_dto(summary))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_budget(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<BudgetRequest>,
) -> impl IntoResponse {
    info!("PUT /api/budgets/{} - request: {:?}", id, request);

    match state.budget_service.update_budget(user.id(), &id, request).await {
        Ok(summary) => (StatusCode::OK, Json(BudgetMapper::to_dto(summary))).into_response(),
        Err(e) => {
            error!("Failed to update budget {}: {}", id, e);
            e.into_response()
        }
    }
}

pub async fn delete_budget(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/budgets/{}", id);

    match state.budget_service.delete_budget(user.id(), &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete budget {}: {}", id, e);
            e.into_response()
        }
    }
}

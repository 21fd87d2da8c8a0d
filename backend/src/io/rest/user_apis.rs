//! # REST API for Users

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::CreateUserRequest;
use tracing::{error, info};

use crate::io::rest::mappers::ReferenceMapper;
use crate::io::rest::CurrentUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/me", get(get_current_user))
}

/// Register a user. This is the only write that needs no caller.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> impl IntoResponse {
    info!("POST /api/users - username: {}", request.username);

    match state.user_service.create_user(request).await {
        Ok(user) => (StatusCode::CREATED, Json(ReferenceMapper::to_user_dto(user))).into_response(),
        Err(e) => {
            error!("Failed to create user: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_current_user(user: CurrentUser) -> impl IntoResponse {
    info!("GET /api/users/me - user: {}", user.id());
    (StatusCode::OK, Json(ReferenceMapper::to_user_dto(user.0)))
}

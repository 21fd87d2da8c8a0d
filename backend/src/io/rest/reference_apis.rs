//! # REST API for Reference Data
//!
//! Currencies, banks and account types. Each gets list/create on the
//! collection and get/update/delete on `/:id`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::{AccountTypeRequest, BankRequest, CurrencyRequest};
use tracing::{error, info};

use crate::io::rest::mappers::ReferenceMapper;
use crate::io::rest::CurrentUser;
use crate::AppState;

pub fn currency_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_currencies).post(create_currency))
        .route("/:id", get(get_currency).put(update_currency).delete(delete_currency))
}

pub fn bank_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_banks).post(create_bank))
        .route("/:id", get(get_bank).put(update_bank).delete(delete_bank))
}

pub fn account_type_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_account_types).post(create_account_type))
        .route(
            "/:id",
            get(get_account_type).put(update_account_type).delete(delete_account_type),
        )
}

pub async fn list_currencies(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    info!("GET /api/currencies");

    match state.reference_service.list_currencies(user.id()).await {
        Ok(currencies) => {
            let body: Vec<shared::Currency> = currencies.into_iter().map(ReferenceMapper::to_currency_dto).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!("Failed to list currencies: {}", e);
            e.into_response()
        }
    }
}

pub async fn create_currency(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CurrencyRequest>,
) -> impl IntoResponse {
    info!("POST /api/currencies - request: {:?}", request);

    match state.reference_service.create_currency(user.id(), request).await {
        Ok(currency) => (StatusCode::CREATED, Json(ReferenceMapper::to_currency_dto(currency))).into_response(),
        Err(e) => {
            error!("Failed to create currency: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_currency(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/currencies/{}", id);

    match state.reference_service.get_currency(user.id(), &id).await {
        Ok(currency) => (StatusCode::OK, Json(ReferenceMapper::to_currency_dto(currency))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_currency(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<CurrencyRequest>,
) -> impl IntoResponse {
    info!("PUT /api/currencies/{} - request: {:?}", id, request);

    match state.reference_service.update_currency(user.id(), &id, request).await {
        Ok(currency) => (StatusCode::OK, Json(ReferenceMapper::to_currency_dto(currency))).into_response(),
        Err(e) => {
            error!("Failed to update currency {}: {}", id, e);
            e.into_response()
        }
    }
}

pub async fn delete_currency(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/currencies/{}", id);

    match state.reference_service.delete_currency(user.id(), &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete currency {}: {}", id, e);
            e.into_response()
        }
    }
}

pub async fn list_banks(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    info!("GET /api/banks");

    match state.reference_service.list_banks(user.id()).await {
        Ok(banks) => {
            let body: Vec<shared::Bank> = banks.into_iter().map(ReferenceMapper::to_bank_dto).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!("Failed to list banks: {}", e);
            e.into_response()
        }
    }
}

pub async fn create_bank(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<BankRequest>,
) -> impl IntoResponse {
    info!("POST /api/banks - request: {:?}", request);

    match state.reference_service.create_bank(user.id(), request).await {
        Ok(bank) => (StatusCode::CREATED, Json(ReferenceMapper::to_bank_dto(bank))).into_response(),
        Err(e) => {
            error!("Failed to create bank: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_bank(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/banks/{}", id);

    match state.reference_service.get_bank(user.id(), &id).await {
        Ok(bank) => (StatusCode::OK, Json(ReferenceMapper::to_bank_dto(bank))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_bank(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<BankRequest>,
) -> impl IntoResponse {
    info!("PUT /api/banks/{} - request: {:?}", id, request);

    match state.reference_service.update_bank(user.id(), &id, request).await {
        Ok(bank) => (StatusCode::OK, Json(ReferenceMapper::to_bank_dto(bank))).into_response(),
        Err(e) => {
            error!("Failed to update bank {}: {}", id, e);
            e.into_response()
        }
    }
}

pub async fn delete_bank(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/banks/{}", id);

    match state.reference_service.delete_bank(user.id(), &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete bank {}: {}", id, e);
            e.into_response()
        }
    }
}

pub async fn list_account_types(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    info!("GET /api/account-types");

    match state.reference_service.list_account_types(user.id()).await {
        Ok(account_types) => {
            let body: Vec<shared::AccountType> = account_types
                .into_iter()
                .map(ReferenceMapper::to_account_type_dto)
                .collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!("Failed to list account types: {}", e);
            e.into_response()
        }
    }
}

pub async fn create_account_type(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<AccountTypeRequest>,
) -> impl IntoResponse {
    info!("POST /api/account-types - request: {:?}", request);

    match state.reference_service.create_account_type(user.id(), request).await {
        Ok(account_type) => (
            StatusCode::CREATED,
            Json(ReferenceMapper::to_account_type_dto(account_type)),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to create account type: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_account_type(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/account-types/{}", id);

    match state.reference_service.get_account_type(user.id(), &id).await {
        Ok(account_type) => (StatusCode::OK, Json(ReferenceMapper::to_account_type_dto(account_type))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_account_type(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<AccountTypeRequest>,
) -> impl IntoResponse {
    info!("PUT /api/account-types/{} - request: {:?}", id, request);

    match state.reference_service.update_account_type(user.id(), &id, request).await {
        Ok(account_type) => (StatusCode::OK, Json(ReferenceMapper::to_account_type_dto(account_type))).into_response(),
        Err(e) => {
            error!("Failed to update account type {}: {}", id, e);
            e.into_response()
        }
    }
}

pub async fn delete_account_type(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/account-types/{}", id);

    match state.reference_service.delete_account_type(user.id(), &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete account type {}: {}", id, e);
            e.into_response()
        }
    }
}

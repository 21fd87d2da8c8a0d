//! # Finance Tracker Backend
//!
//! REST backend for personal finances: accounts, categorised expenses and
//! incomes, budgets, and a daily balance history per account.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers, mappers)
//!     ↓
//! Domain Layer (services, ledger maintainer)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! Every transaction write goes through the ledger maintainer, which keeps
//! `Account.balance` and the balance history consistent with the
//! transaction set inside the same database transaction.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::models::TransactionKind;
use crate::domain::{
    AccountLocks, AccountService, BalanceLedger, BudgetService, CategoryService, LedgerMaintainer, PropagationMode,
    ReferenceService, TransactionService, UserService,
};
use crate::io::rest::{
    account_apis, budget_apis, category_apis, health_apis, reference_apis, transaction_apis, user_apis,
};
use crate::storage::{
    AccountRepository, BalanceHistoryRepository, BudgetRepository, CategoryRepository, DbConnection,
    ReferenceRepository, TransactionRepository, UserRepository,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub db: DbConnection,
    pub user_service: UserService,
    pub reference_service: ReferenceService,
    pub account_service: AccountService,
    pub category_service: CategoryService,
    pub transaction_service: TransactionService,
    pub budget_service: BudgetService,
}

/// Open the configured database and wire up every service
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database");
    let db = DbConnection::init(config)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    info!("Setting up domain model (history propagation: {})", config.propagation);
    Ok(build_state(db, config.propagation))
}

/// Wire services over an already opened database
pub fn build_state(db: DbConnection, propagation: PropagationMode) -> AppState {
    let accounts = AccountRepository::new(db.clone());
    let history = BalanceHistoryRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());
    let locks = AccountLocks::new();

    let ledger: Arc<dyn BalanceLedger> = Arc::new(LedgerMaintainer::new(
        accounts.clone(),
        history.clone(),
        propagation,
    ));

    let user_service = UserService::new(UserRepository::new(db.clone()));
    let reference_service = ReferenceService::new(ReferenceRepository::new(db.clone()));
    let category_service = CategoryService::new(
        db.clone(),
        CategoryRepository::new(db.clone()),
        transactions.clone(),
        accounts.clone(),
        ledger.clone(),
        locks.clone(),
    );
    let account_service = AccountService::new(
        db.clone(),
        accounts.clone(),
        history,
        transactions.clone(),
        reference_service.clone(),
        locks.clone(),
    );
    let transaction_service = TransactionService::new(
        db.clone(),
        transactions.clone(),
        accounts,
        category_service.clone(),
        reference_service.clone(),
        ledger,
        locks,
    );
    let budget_service = BudgetService::new(
        BudgetRepository::new(db.clone()),
        transactions,
        category_service.clone(),
    );

    AppState {
        db,
        user_service,
        reference_service,
        account_service,
        category_service,
        transaction_service,
        budget_service,
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin {}", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/health", health_apis::router())
        .nest("/users", user_apis::router())
        .nest("/currencies", reference_apis::currency_router())
        .nest("/banks", reference_apis::bank_router())
        .nest("/account-types", reference_apis::account_type_router())
        .nest("/accounts", account_apis::router())
        .nest("/expense-categories", category_apis::router(TransactionKind::Expense))
        .nest("/income-categories", category_apis::router(TransactionKind::Income))
        .nest("/expenses", transaction_apis::router(TransactionKind::Expense))
        .nest("/incomes", transaction_apis::router(TransactionKind::Income))
        .nest("/transactions", transaction_apis::combined_router())
        .nest("/budgets", budget_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}

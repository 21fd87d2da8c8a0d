//! Helpers for driving the full router in-process.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use finance_tracker_backend::domain::PropagationMode;
use finance_tracker_backend::io::rest::USER_ID_HEADER;
use finance_tracker_backend::storage::DbConnection;
use finance_tracker_backend::{build_state, create_router};

pub const CORS_ORIGIN: &str = "http://localhost:8080";

pub async fn app() -> Router {
    let db = DbConnection::in_memory().await.expect("Failed to create test database");
    app_on(db, PropagationMode::Replay)
}

pub fn app_on(db: DbConnection, propagation: PropagationMode) -> Router {
    create_router(build_state(db, propagation), CORS_ORIGIN).expect("Failed to build router")
}

/// Send one request and return the status with the parsed JSON body
/// (`Value::Null` for an empty body)
pub async fn send(router: &Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user {
        builder = builder.header(USER_ID_HEADER, user_id);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Ids of everything `seed_user` creates
pub struct Seeded {
    pub user_id: String,
    pub currency_id: String,
    pub bank_id: String,
    pub account_type_id: String,
    pub account_id: String,
    pub expense_category_id: String,
    pub income_category_id: String,
}

/// Register a user and give them one account opened at 1000.00 plus a
/// category of each kind
pub async fn seed_user(router: &Router, username: &str) -> Seeded {
    let (status, user) = send(
        router,
        "POST",
        "/api/users",
        None,
        Some(json!({ "username": username, "email": format!("{}@example.com", username) })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create user: {}", user);
    let user_id = id_of(&user);
    let me = Some(user_id.as_str());

    let (_, currency) = send(
        router,
        "POST",
        "/api/currencies",
        me,
        Some(json!({ "name": "Euro", "code": "EUR", "symbol": "€" })),
    )
    .await;
    let (_, bank) = send(
        router,
        "POST",
        "/api/banks",
        me,
        Some(json!({ "name": "Bank", "country": "NL" })),
    )
    .await;
    let (_, account_type) = send(router, "POST", "/api/account-types", me, Some(json!({ "name": "Checking" }))).await;

    let (status, account) = send(
        router,
        "POST",
        "/api/accounts",
        me,
        Some(json!({
            "name": "Main",
            "account_type_id": id_of(&account_type),
            "bank_id": id_of(&bank),
            "currency_id": id_of(&currency),
            "balance": "1000.00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create account: {}", account);

    let (_, expense_category) = send(
        router,
        "POST",
        "/api/expense-categories",
        me,
        Some(json!({ "name": "Groceries" })),
    )
    .await;
    let (_, income_category) = send(
        router,
        "POST",
        "/api/income-categories",
        me,
        Some(json!({ "name": "Salary" })),
    )
    .await;

    Seeded {
        user_id: user_id.clone(),
        currency_id: id_of(&currency),
        bank_id: id_of(&bank),
        account_type_id: id_of(&account_type),
        account_id: id_of(&account),
        expense_category_id: id_of(&expense_category),
        income_category_id: id_of(&income_category),
    }
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("response has no id").to_string()
}

/// Decimal fields serialize as strings; compare them numerically
pub fn amount(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(raw) => raw.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

pub fn dec(raw: &str) -> rust_decimal::Decimal {
    raw.parse().unwrap()
}

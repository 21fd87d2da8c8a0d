mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{amount, app, dec, id_of, seed_user, send};

#[tokio::test]
async fn test_health_reports_ok() {
    let router = app().await;
    let (status, body) = send(&router, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ledger_keeps_balance_and_history_in_step() {
    let router = app().await;
    let seeded = seed_user(&router, "alice").await;
    let me = Some(seeded.user_id.as_str());
    let account_uri = format!("/api/accounts/{}", seeded.account_id);

    let (status, expense) = send(
        &router,
        "POST",
        "/api/expenses",
        me,
        Some(json!({
            "account_id": seeded.account_id,
            "category_id": seeded.expense_category_id,
            "amount": "25.00",
            "date": "2024-03-10T12:00:00Z",
            "description": "Weekly shop",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", expense);
    assert_eq!(expense["currency_id"], seeded.currency_id.as_str());

    // Backdated income shifts the later history entry
    let (status, income) = send(
        &router,
        "POST",
        "/api/incomes",
        me,
        Some(json!({
            "account_id": seeded.account_id,
            "category_id": seeded.income_category_id,
            "amount": "100",
            "date": "2024-03-05T09:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", income);

    let (_, account) = send(&router, "GET", &account_uri, me, None).await;
    assert_eq!(amount(&account["balance"]), dec("1075.00"));

    let (status, history) = send(&router, "GET", &format!("{}/balance-history", account_uri), me, None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = history["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["date"], "2024-03-05");
    assert_eq!(entries[1]["date"], "2024-03-10");
    assert_eq!(amount(&entries[1]["balance"]), dec("1075.00"));

    // Amount edit on the same day is a single movement of the difference
    let (status, updated) = send(
        &router,
        "PATCH",
        &format!("/api/expenses/{}", id_of(&expense)),
        me,
        Some(json!({ "amount": "40.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(amount(&updated["amount"]), dec("40.00"));

    let (status, _) = send(&router, "DELETE", &format!("/api/incomes/{}", id_of(&income)), me, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, account) = send(&router, "GET", &account_uri, me, None).await;
    assert_eq!(amount(&account["balance"]), dec("960.00"));

    let (_, history) = send(&router, "GET", &format!("{}/balance-history", account_uri), me, None).await;
    let entries = history["entries"].as_array().unwrap();
    assert_eq!(amount(&entries[0]["balance"]), dec("960.00"));
    assert_eq!(amount(&entries[1]["balance"]), dec("960.00"));

    let (status, audit) = send(&router, "GET", &format!("{}/audit", account_uri), me, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit["consistent"], true);
    assert_eq!(audit["transaction_count"], 1);
    assert_eq!(amount(&audit["expected_balance"]), dec("960.00"));
}

#[tokio::test]
async fn test_requests_need_a_known_user() {
    let router = app().await;
    seed_user(&router, "alice").await;

    let (status, body) = send(&router, "GET", "/api/accounts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&router, "GET", "/api/accounts", Some("no-such-user"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_resources_are_hidden_and_unusable() {
    let router = app().await;
    let alice = seed_user(&router, "alice").await;
    let bob = seed_user(&router, "bob").await;
    let as_bob = Some(bob.user_id.as_str());

    let (status, _) = send(&router, "GET", &format!("/api/accounts/{}", alice.account_id), as_bob, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        "PATCH",
        &format!("/api/accounts/{}", alice.account_id),
        as_bob,
        Some(json!({ "name": "Mine now" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Filing an expense against someone else's account is a validation error
    let (status, _) = send(
        &router,
        "POST",
        "/api/expenses",
        as_bob,
        Some(json!({
            "account_id": alice.account_id,
            "category_id": bob.expense_category_id,
            "amount": "5.00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, accounts) = send(&router, "GET", "/api/accounts", as_bob, None).await;
    assert_eq!(accounts.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_transactions_are_rejected() {
    let router = app().await;
    let seeded = seed_user(&router, "alice").await;
    let me = Some(seeded.user_id.as_str());

    let (status, _) = send(
        &router,
        "POST",
        "/api/expenses",
        me,
        Some(json!({
            "account_id": seeded.account_id,
            "category_id": seeded.expense_category_id,
            "amount": "0",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // An income category cannot carry an expense
    let (status, body) = send(
        &router,
        "POST",
        "/api/expenses",
        me,
        Some(json!({
            "account_id": seeded.account_id,
            "category_id": seeded.income_category_id,
            "amount": "10.00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);

    let (status, _) = send(
        &router,
        "GET",
        "/api/transactions?date_from=2024-03-10T00:00:00Z&date_to=2024-03-01T00:00:00Z",
        me,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, account) = send(&router, "GET", &format!("/api/accounts/{}", seeded.account_id), me, None).await;
    assert_eq!(amount(&account["balance"]), dec("1000.00"));
}

#[tokio::test]
async fn test_listings_filter_by_kind_and_paginate() {
    let router = app().await;
    let seeded = seed_user(&router, "alice").await;
    let me = Some(seeded.user_id.as_str());

    for (uri, category, day) in [
        ("/api/expenses", &seeded.expense_category_id, 1),
        ("/api/expenses", &seeded.expense_category_id, 2),
        ("/api/incomes", &seeded.income_category_id, 3),
    ] {
        let (status, _) = send(
            &router,
            "POST",
            uri,
            me,
            Some(json!({
                "account_id": seeded.account_id,
                "category_id": category,
                "amount": "10.00",
                "date": format!("2024-03-0{}T12:00:00Z", day),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, expenses) = send(&router, "GET", "/api/expenses", me, None).await;
    assert_eq!(expenses["transactions"].as_array().unwrap().len(), 2);

    let (_, first) = send(&router, "GET", "/api/transactions?limit=2", me, None).await;
    let page = first["transactions"].as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["kind"], "income");
    assert_eq!(first["pagination"]["has_more"], true);
    let cursor = first["pagination"]["next_cursor"].as_str().unwrap().to_string();

    let (_, second) = send(&router, "GET", &format!("/api/transactions?limit=2&after={}", cursor), me, None).await;
    let page = second["transactions"].as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(second["pagination"]["has_more"], false);
    assert!(second["pagination"]["next_cursor"].is_null());
}

#[tokio::test]
async fn test_deleting_a_category_reverses_its_transactions() {
    let router = app().await;
    let seeded = seed_user(&router, "alice").await;
    let me = Some(seeded.user_id.as_str());

    for cents in ["12.50", "7.50"] {
        send(
            &router,
            "POST",
            "/api/expenses",
            me,
            Some(json!({
                "account_id": seeded.account_id,
                "category_id": seeded.expense_category_id,
                "amount": cents,
            })),
        )
        .await;
    }

    let (status, body) = send(
        &router,
        "DELETE",
        &format!("/api/expense-categories/{}", seeded.expense_category_id),
        me,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_transactions"], 2);

    let (_, account) = send(&router, "GET", &format!("/api/accounts/{}", seeded.account_id), me, None).await;
    assert_eq!(amount(&account["balance"]), dec("1000.00"));
}

#[tokio::test]
async fn test_budget_reports_spending() {
    let router = app().await;
    let seeded = seed_user(&router, "alice").await;
    let me = Some(seeded.user_id.as_str());

    send(
        &router,
        "POST",
        "/api/expenses",
        me,
        Some(json!({
            "account_id": seeded.account_id,
            "category_id": seeded.expense_category_id,
            "amount": "30.00",
            "date": "2024-03-31T23:30:00Z",
        })),
    )
    .await;

    let (status, budget) = send(
        &router,
        "POST",
        "/api/budgets",
        me,
        Some(json!({
            "name": "March",
            "total_amount": "500.00",
            "start_date": "2024-03-01",
            "end_date": "2024-03-31",
            "categories": [{ "category_id": seeded.expense_category_id, "amount": "100.00" }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", budget);
    assert_eq!(amount(&budget["total_spent"]), dec("30.00"));
    assert_eq!(amount(&budget["categories"][0]["spent"]), dec("30.00"));

    let (status, _) = send(&router, "DELETE", &format!("/api/budgets/{}", id_of(&budget)), me, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

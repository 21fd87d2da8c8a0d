//! Request and response types exchanged between the finance tracker backend
//! and its clients.
//!
//! Money travels as decimal strings (`"100.00"`), calendar dates as
//! `YYYY-MM-DD` and timestamps as RFC 3339.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of an amount movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money leaving the account
    Expense,
    /// Money entering the account
    Income,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: String,
    pub name: String,
    /// ISO 4217 style code, three uppercase letters
    pub code: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRequest {
    pub name: String,
    pub code: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub id: String,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRequest {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountType {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountTypeRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_type_id: String,
    pub bank_id: String,
    pub currency_id: String,
    /// Current running balance
    pub balance: Decimal,
    /// Balance the ledger starts counting from
    pub opening_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    pub account_type_id: String,
    pub bank_id: String,
    pub currency_id: String,
    /// Starting balance, may be negative
    pub balance: Decimal,
}

/// Partial account update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub account_type_id: Option<String>,
    pub bank_id: Option<String>,
    pub currency_id: Option<String>,
    /// Direct balance correction, bypassing the transaction ledger
    pub balance: Option<Decimal>,
}

/// Balance of an account at the end of one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceHistoryEntry {
    pub date: NaiveDate,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceHistoryRequest {
    /// Inclusive lower bound
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound
    pub to: Option<NaiveDate>,
    /// Cursor: the last date of the previous page
    pub after: Option<NaiveDate>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceHistoryResponse {
    pub account_id: String,
    pub entries: Vec<BalanceHistoryEntry>,
    pub pagination: PaginationInfo,
}

/// Result of replaying an account's transactions against its stored balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceAuditResponse {
    pub account_id: String,
    pub expected_balance: Decimal,
    pub actual_balance: Decimal,
    pub consistent: bool,
    pub transaction_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub kind: TransactionKind,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub account_id: String,
    pub category_id: String,
    pub currency_id: String,
    /// Always positive; `kind` gives the direction
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub account_id: String,
    pub category_id: String,
    /// Defaults to the account's currency
    pub currency_id: Option<String>,
    pub amount: Decimal,
    /// Defaults to the current time
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

/// Partial transaction update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub currency_id: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionListRequest {
    pub kind: Option<TransactionKind>,
    pub account: Option<String>,
    pub category: Option<String>,
    /// Case-insensitive substring of the description
    pub description: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// Cursor for pagination - transaction ID to start after
    pub after: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub name: String,
    pub total_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Sum of the owner's expenses inside the period
    pub total_spent: Decimal,
    pub categories: Vec<BudgetCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub id: String,
    pub category_id: String,
    pub amount: Decimal,
    pub spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRequest {
    pub name: String,
    pub total_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub categories: Vec<BudgetCategoryRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategoryRequest {
    pub category_id: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transaction_kind_serializes_lowercase() {
        let json = serde_json::to_string(&TransactionKind::Expense).unwrap();
        assert_eq!(json, "\"expense\"");

        let kind: TransactionKind = serde_json::from_str("\"income\"").unwrap();
        assert_eq!(kind, TransactionKind::Income);
    }

    #[test]
    fn test_amount_accepts_string_and_number() {
        let from_string: CreateTransactionRequest = serde_json::from_str(
            r#"{"account_id":"a","category_id":"c","currency_id":null,"amount":"100.50","date":null,"description":null}"#,
        )
        .unwrap();
        assert_eq!(from_string.amount, Decimal::from_str("100.50").unwrap());

        let from_number: CreateTransactionRequest = serde_json::from_str(
            r#"{"account_id":"a","category_id":"c","amount":42,"date":"2024-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(from_number.amount, Decimal::from(42));
        assert!(from_number.currency_id.is_none());
        assert!(from_number.date.is_some());
    }

    #[test]
    fn test_budget_request_categories_default_to_empty() {
        let request: BudgetRequest = serde_json::from_str(
            r#"{"name":"March","total_amount":"500.00","start_date":"2024-03-01","end_date":"2024-03-31"}"#,
        )
        .unwrap();
        assert!(request.categories.is_empty());
        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}

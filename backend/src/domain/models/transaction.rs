//! Domain model for an amount movement.
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "expense" => Some(TransactionKind::Expense),
            "income" => Some(TransactionKind::Income),
            _ => None,
        }
    }
}

impl From<shared::TransactionKind> for TransactionKind {
    fn from(kind: shared::TransactionKind) -> Self {
        match kind {
            shared::TransactionKind::Expense => TransactionKind::Expense,
            shared::TransactionKind::Income => TransactionKind::Income,
        }
    }
}

/// Signed balance effect of moving `amount` in the direction of `kind`
pub fn signed_delta(kind: TransactionKind, amount: Money) -> Money {
    match kind {
        TransactionKind::Income => amount,
        TransactionKind::Expense => -amount,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub owner_id: String,
    pub kind: TransactionKind,
    pub account_id: String,
    pub category_id: String,
    pub currency_id: String,
    /// Always positive
    pub amount: Money,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn signed_amount(&self) -> Money {
        signed_delta(self.kind, self.amount)
    }

    /// The date whose balance history entry this transaction belongs to
    pub fn calendar_date(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

use chrono::{DateTime, Utc};

use crate::domain::money::Money;

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub account_type_id: String,
    pub bank_id: String,
    pub currency_id: String,
    pub balance: Money,
    /// Balance before any recorded transaction. Direct balance corrections
    /// move this by the same amount.
    pub opening_balance: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

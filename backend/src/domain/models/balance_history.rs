use chrono::NaiveDate;

use crate::domain::money::Money;

/// One row of the per-account daily balance series
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSnapshot {
    pub account_id: String,
    pub date: NaiveDate,
    pub balance: Money,
}

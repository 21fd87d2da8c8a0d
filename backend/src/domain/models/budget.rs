use chrono::NaiveDate;

use crate::domain::money::Money;

#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub total_amount: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub allocations: Vec<BudgetAllocation>,
}

/// Part of a budget earmarked for one expense category
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAllocation {
    pub id: String,
    pub category_id: String,
    pub amount: Money,
}

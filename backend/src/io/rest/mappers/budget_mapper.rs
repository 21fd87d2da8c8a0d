use crate::domain::BudgetSummary;
use shared::{Budget as SharedBudget, BudgetCategory};

pub struct BudgetMapper;

impl BudgetMapper {
    pub fn to_dto(summary: BudgetSummary) -> SharedBudget {
        let categories = summary
            .budget
            .allocations
            .into_iter()
            .zip(summary.allocation_spent)
            .map(|(allocation, spent)| BudgetCategory {
                id: allocation.id,
                category_id: allocation.category_id,
                amount: allocation.amount.to_decimal(),
                spent: spent.to_decimal(),
            })
            .collect();

        SharedBudget {
            id: summary.budget.id,
            name: summary.budget.name,
            total_amount: summary.budget.total_amount.to_decimal(),
            start_date: summary.budget.start_date,
            end_date: summary.budget.end_date,
            total_spent: summary.total_spent.to_decimal(),
            categories,
        }
    }
}

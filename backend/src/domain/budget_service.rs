use chrono::Utc;
use shared::BudgetRequest;
use tracing::info;
use uuid::Uuid;

use crate::domain::category_service::CategoryService;
use crate::domain::error::{ServiceError, ServiceResult, ValidationError};
use crate::domain::models::{Budget, BudgetAllocation, TransactionKind};
use crate::domain::money::Money;
use crate::domain::validation::{required_text, NAME_MAX_LEN};
use crate::storage::{BudgetRepository, TransactionRepository};

/// A budget together with what has been spent against it
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSummary {
    pub budget: Budget,
    pub total_spent: Money,
    /// Spent per allocation, in the order of `budget.allocations`
    pub allocation_spent: Vec<Money>,
}

#[derive(Clone)]
pub struct BudgetService {
    budgets: BudgetRepository,
    transactions: TransactionRepository,
    categories: CategoryService,
}

impl BudgetService {
    pub fn new(budgets: BudgetRepository, transactions: TransactionRepository, categories: CategoryService) -> Self {
        Self {
            budgets,
            transactions,
            categories,
        }
    }

    pub async fn create_budget(&self, owner_id: &str, request: BudgetRequest) -> ServiceResult<BudgetSummary> {
        let budget = self.build_budget(owner_id, Uuid::new_v4().to_string(), request).await?;
        self.budgets.store_budget(&budget, Utc::now()).await?;
        info!(
            "Created budget {} ({} to {}) for user {}",
            budget.name, budget.start_date, budget.end_date, owner_id
        );
        self.summarize(budget).await
    }

    pub async fn get_budget(&self, owner_id: &str, budget_id: &str) -> ServiceResult<BudgetSummary> {
        let budget = self.find_owned(owner_id, budget_id).await?;
        self.summarize(budget).await
    }

    pub async fn list_budgets(&self, owner_id: &str) -> ServiceResult<Vec<BudgetSummary>> {
        let budgets = self.budgets.list_budgets(owner_id).await?;
        let mut summaries = Vec::with_capacity(budgets.len());
        for budget in budgets {
            summaries.push(self.summarize(budget).await?);
        }
        Ok(summaries)
    }

    /// Replace name, amount, period and the whole allocation set
    pub async fn update_budget(
        &self,
        owner_id: &str,
        budget_id: &str,
        request: BudgetRequest,
    ) -> ServiceResult<BudgetSummary> {
        self.find_owned(owner_id, budget_id).await?;
        let budget = self.build_budget(owner_id, budget_id.to_string(), request).await?;
        if !self.budgets.update_budget(&budget, Utc::now()).await? {
            return Err(ServiceError::not_found("Budget", budget_id));
        }
        info!("Updated budget {}", budget_id);
        self.summarize(budget).await
    }

    pub async fn delete_budget(&self, owner_id: &str, budget_id: &str) -> ServiceResult<()> {
        if !self.budgets.delete_budget(owner_id, budget_id).await? {
            return Err(ServiceError::not_found("Budget", budget_id));
        }
        info!("Deleted budget {} of user {}", budget_id, owner_id);
        Ok(())
    }

    async fn find_owned(&self, owner_id: &str, budget_id: &str) -> ServiceResult<Budget> {
        match self.budgets.find_budget(budget_id).await? {
            Some(budget) if budget.owner_id == owner_id => Ok(budget),
            _ => Err(ServiceError::not_found("Budget", budget_id)),
        }
    }

    async fn build_budget(&self, owner_id: &str, budget_id: String, request: BudgetRequest) -> ServiceResult<Budget> {
        let name = required_text(&request.name, "name", NAME_MAX_LEN)?;
        let total_amount = Money::positive(request.total_amount, "total_amount")?;
        if request.start_date > request.end_date {
            return Err(ValidationError::InvalidPeriod.into());
        }

        let mut allocations = Vec::with_capacity(request.categories.len());
        for allocation in request.categories {
            self.categories
                .resolve_category(owner_id, &allocation.category_id, TransactionKind::Expense)
                .await?;
            allocations.push(BudgetAllocation {
                id: Uuid::new_v4().to_string(),
                category_id: allocation.category_id,
                amount: Money::positive(allocation.amount, "amount")?,
            });
        }

        Ok(Budget {
            id: budget_id,
            owner_id: owner_id.to_string(),
            name,
            total_amount,
            start_date: request.start_date,
            end_date: request.end_date,
            allocations,
        })
    }

    async fn summarize(&self, budget: Budget) -> ServiceResult<BudgetSummary> {
        let total_spent = self
            .transactions
            .sum_expenses(&budget.owner_id, budget.start_date, budget.end_date, None)
            .await?;

        let mut allocation_spent = Vec::with_capacity(budget.allocations.len());
        for allocation in &budget.allocations {
            let spent = self
                .transactions
                .sum_expenses(
                    &budget.owner_id,
                    budget.start_date,
                    budget.end_date,
                    Some(&allocation.category_id),
                )
                .await?;
            allocation_spent.push(spent);
        }

        Ok(BudgetSummary {
            budget,
            total_spent,
            allocation_spent,
        })
    }
}

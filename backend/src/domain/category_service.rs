use chrono::Utc;
use shared::CategoryRequest;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::account_locks::AccountLocks;
use crate::domain::error::{ServiceError, ServiceResult, ValidationError};
use crate::domain::ledger::BalanceLedger;
use crate::domain::models::{Category, TransactionKind};
use crate::domain::validation::{optional_text, required_text, DESCRIPTION_MAX_LEN, NAME_MAX_LEN};
use crate::storage::{AccountRepository, CategoryRepository, DbConnection, TransactionRepository};

/// Expense and income categories. Deleting a category removes its
/// transactions through the ledger so account balances are reversed.
#[derive(Clone)]
pub struct CategoryService {
    db: DbConnection,
    categories: CategoryRepository,
    transactions: TransactionRepository,
    accounts: AccountRepository,
    ledger: Arc<dyn BalanceLedger>,
    locks: AccountLocks,
}

impl CategoryService {
    pub fn new(
        db: DbConnection,
        categories: CategoryRepository,
        transactions: TransactionRepository,
        accounts: AccountRepository,
        ledger: Arc<dyn BalanceLedger>,
        locks: AccountLocks,
    ) -> Self {
        Self {
            db,
            categories,
            transactions,
            accounts,
            ledger,
            locks,
        }
    }

    pub async fn create_category(
        &self,
        owner_id: &str,
        kind: TransactionKind,
        request: CategoryRequest,
    ) -> ServiceResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind,
            name: required_text(&request.name, "name", NAME_MAX_LEN)?,
            description: optional_text(request.description.as_deref(), "description", DESCRIPTION_MAX_LEN)?,
        };

        self.categories
            .store_category(&category)
            .await
            .map_err(|e| ServiceError::from_constraint(e, "A category with this name already exists"))?;

        info!("Created {} category {} for user {}", kind.as_str(), category.name, owner_id);
        Ok(category)
    }

    pub async fn list_categories(&self, owner_id: &str, kind: TransactionKind) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.list_categories(owner_id, kind).await?)
    }

    pub async fn get_category(
        &self,
        owner_id: &str,
        kind: TransactionKind,
        category_id: &str,
    ) -> ServiceResult<Category> {
        match self.categories.find_category(category_id).await? {
            Some(category) if category.owner_id == owner_id && category.kind == kind => Ok(category),
            _ => Err(ServiceError::not_found("Category", category_id)),
        }
    }

    pub async fn update_category(
        &self,
        owner_id: &str,
        kind: TransactionKind,
        category_id: &str,
        request: CategoryRequest,
    ) -> ServiceResult<Category> {
        let mut category = self.get_category(owner_id, kind, category_id).await?;
        category.name = required_text(&request.name, "name", NAME_MAX_LEN)?;
        category.description = optional_text(request.description.as_deref(), "description", DESCRIPTION_MAX_LEN)?;

        let updated = self
            .categories
            .update_category(&category)
            .await
            .map_err(|e| ServiceError::from_constraint(e, "A category with this name already exists"))?;
        if !updated {
            return Err(ServiceError::not_found("Category", category_id));
        }
        Ok(category)
    }

    /// Delete the category and every transaction filed under it, reversing
    /// their balance effects. Returns the number of transactions removed.
    pub async fn delete_category(
        &self,
        owner_id: &str,
        kind: TransactionKind,
        category_id: &str,
    ) -> ServiceResult<usize> {
        self.get_category(owner_id, kind, category_id).await?;
        let account_ids = self.transactions.account_ids_for_category(category_id).await?;

        let _guard = self.locks.lock_all(account_ids.iter().cloned()).await;
        let mut tx = self.db.pool().begin().await?;
        let now = Utc::now();
        for account_id in &account_ids {
            self.accounts.touch(&mut *tx, account_id, now).await?;
        }

        let doomed = self.transactions.list_for_category_in(&mut *tx, category_id).await?;
        if doomed.iter().any(|t| !account_ids.contains(&t.account_id)) {
            return Err(ServiceError::Conflict(
                "Category received new transactions while being deleted, retry".to_string(),
            ));
        }

        for transaction in &doomed {
            self.transactions.delete_transaction(&mut *tx, &transaction.id).await?;
            self.ledger.apply_delete(&mut *tx, transaction).await?;
        }

        if !self.categories.delete_category(&mut *tx, owner_id, category_id).await? {
            return Err(ServiceError::not_found("Category", category_id));
        }
        tx.commit().await?;

        info!(
            "Deleted category {} of user {} with {} transactions",
            category_id,
            owner_id,
            doomed.len()
        );
        Ok(doomed.len())
    }

    /// Check that a category named in a transaction or budget belongs to the
    /// caller and has the expected kind
    pub async fn resolve_category(
        &self,
        owner_id: &str,
        category_id: &str,
        kind: TransactionKind,
    ) -> ServiceResult<Category> {
        let category = self
            .categories
            .find_category(category_id)
            .await?
            .ok_or_else(|| ValidationError::UnknownReference {
                resource: "category",
                id: category_id.to_string(),
            })?;
        if category.owner_id != owner_id {
            return Err(ValidationError::NotOwned { resource: "Category" }.into());
        }
        if category.kind != kind {
            return Err(ValidationError::CategoryKindMismatch {
                expected: kind.as_str(),
                actual: category.kind.as_str(),
            }
            .into());
        }
        Ok(category)
    }
}

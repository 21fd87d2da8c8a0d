//! Expense and income CRUD. Every write runs the same shape:
//!
//! 1. validate the request against the pool (ownership, kinds, amounts)
//! 2. lock the affected accounts
//! 3. open a database transaction and touch the account rows first, so the
//!    SQLite write lock is taken before anything is read
//! 4. write the row, hand it to the [`BalanceLedger`], commit
//!
//! Any error after step 3 drops the database transaction, which rolls back
//! the row write and every balance and history change with it.

use chrono::{DateTime, Utc};
use shared::{CreateTransactionRequest, TransactionListRequest, UpdateTransactionRequest};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::account_locks::AccountLocks;
use crate::domain::category_service::CategoryService;
use crate::domain::error::{ServiceError, ServiceResult, ValidationError};
use crate::domain::ledger::BalanceLedger;
use crate::domain::models::{Account, Transaction, TransactionKind};
use crate::domain::money::Money;
use crate::domain::pagination::{page_size, split_page};
use crate::domain::reference_service::ReferenceService;
use crate::domain::validation::{optional_text, DESCRIPTION_MAX_LEN};
use crate::storage::{AccountRepository, DbConnection, TransactionFilter, TransactionRepository};

const CONCURRENT_EDIT: &str = "Transaction was changed by another request, retry";

/// One page of transactions, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Clone)]
pub struct TransactionService {
    db: DbConnection,
    transactions: TransactionRepository,
    accounts: AccountRepository,
    categories: CategoryService,
    references: ReferenceService,
    ledger: Arc<dyn BalanceLedger>,
    locks: AccountLocks,
}

impl TransactionService {
    pub fn new(
        db: DbConnection,
        transactions: TransactionRepository,
        accounts: AccountRepository,
        categories: CategoryService,
        references: ReferenceService,
        ledger: Arc<dyn BalanceLedger>,
        locks: AccountLocks,
    ) -> Self {
        Self {
            db,
            transactions,
            accounts,
            categories,
            references,
            ledger,
            locks,
        }
    }

    pub async fn create_transaction(
        &self,
        owner_id: &str,
        kind: TransactionKind,
        request: CreateTransactionRequest,
    ) -> ServiceResult<Transaction> {
        let amount = Money::positive(request.amount, "amount")?;
        let description = optional_text(request.description.as_deref(), "description", DESCRIPTION_MAX_LEN)?;
        let account = self.resolve_account(owner_id, &request.account_id).await?;
        self.categories.resolve_category(owner_id, &request.category_id, kind).await?;
        let currency_id = match request.currency_id {
            Some(currency_id) => self.references.resolve_currency(owner_id, &currency_id).await?.id,
            None => account.currency_id.clone(),
        };

        let now = Utc::now();
        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind,
            account_id: account.id,
            category_id: request.category_id,
            currency_id,
            amount,
            date: request.date.unwrap_or(now),
            description,
            created_at: now,
            updated_at: now,
        };

        let _guard = self.locks.lock(&transaction.account_id).await;
        let mut tx = self.db.pool().begin().await?;
        self.touch_accounts(&mut tx, [transaction.account_id.as_str()], now).await?;

        self.transactions
            .insert_transaction(&mut *tx, &transaction)
            .await
            .map_err(|e| ServiceError::from_constraint(e, "Category or currency no longer exists"))?;
        self.ledger.apply_create(&mut *tx, &transaction).await?;
        tx.commit().await?;

        info!(
            "Created {} {} of {} on account {}",
            kind.as_str(),
            transaction.id,
            transaction.amount,
            transaction.account_id
        );
        Ok(transaction)
    }

    pub async fn get_transaction(
        &self,
        owner_id: &str,
        kind: TransactionKind,
        transaction_id: &str,
    ) -> ServiceResult<Transaction> {
        match self.transactions.find_transaction(transaction_id).await? {
            Some(transaction) if transaction.owner_id == owner_id && transaction.kind == kind => Ok(transaction),
            _ => Err(ServiceError::not_found(resource_name(kind), transaction_id)),
        }
    }

    /// List the caller's transactions, newest first. `request.kind` narrows
    /// the combined listing to one kind.
    pub async fn list_transactions(
        &self,
        owner_id: &str,
        request: TransactionListRequest,
    ) -> ServiceResult<TransactionPage> {
        if let (Some(from), Some(to)) = (request.date_from, request.date_to) {
            if from > to {
                return Err(ValidationError::InvalidPeriod.into());
            }
        }

        // A cursor row that is gone would make the keyset comparison NULL
        // and end the listing with an empty page
        if let Some(after) = &request.after {
            match self.transactions.find_transaction(after).await? {
                Some(cursor) if cursor.owner_id == owner_id => {}
                _ => {
                    return Err(ValidationError::UnknownReference {
                        resource: "cursor",
                        id: after.clone(),
                    }
                    .into())
                }
            }
        }

        let limit = page_size(request.limit);
        let filter = TransactionFilter {
            owner_id: owner_id.to_string(),
            kind: request.kind.map(TransactionKind::from),
            account_id: request.account,
            category_id: request.category,
            description: request.description.filter(|text| !text.trim().is_empty()),
            date_from: request.date_from,
            date_to: request.date_to,
            after: request.after,
            limit: limit + 1,
        };

        let rows = self.transactions.list_transactions(&filter).await?;
        let (transactions, has_more) = split_page(rows, limit);
        let next_cursor = if has_more {
            transactions.last().map(|t| t.id.clone())
        } else {
            None
        };

        Ok(TransactionPage {
            transactions,
            has_more,
            next_cursor,
        })
    }

    /// Apply a partial update. The row is re-read inside the database
    /// transaction and that copy is what the ledger reverses.
    pub async fn update_transaction(
        &self,
        owner_id: &str,
        kind: TransactionKind,
        transaction_id: &str,
        request: UpdateTransactionRequest,
    ) -> ServiceResult<Transaction> {
        let current = self.get_transaction(owner_id, kind, transaction_id).await?;

        let amount = request
            .amount
            .map(|amount| Money::positive(amount, "amount"))
            .transpose()?;
        let description = match request.description.as_deref() {
            Some(text) => Some(optional_text(Some(text), "description", DESCRIPTION_MAX_LEN)?),
            None => None,
        };
        let target_account_id = match &request.account_id {
            Some(account_id) => self.resolve_account(owner_id, account_id).await?.id,
            None => current.account_id.clone(),
        };
        if let Some(category_id) = &request.category_id {
            self.categories.resolve_category(owner_id, category_id, kind).await?;
        }
        if let Some(currency_id) = &request.currency_id {
            self.references.resolve_currency(owner_id, currency_id).await?;
        }

        let _guard = self
            .locks
            .lock_all([current.account_id.clone(), target_account_id.clone()])
            .await;
        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;
        self.touch_accounts(&mut tx, [current.account_id.as_str(), target_account_id.as_str()], now)
            .await?;

        let old = self.reload_locked(&mut tx, &current).await?;
        let mut new = old.clone();
        new.account_id = target_account_id;
        if let Some(category_id) = request.category_id {
            new.category_id = category_id;
        }
        if let Some(currency_id) = request.currency_id {
            new.currency_id = currency_id;
        }
        if let Some(amount) = amount {
            new.amount = amount;
        }
        if let Some(date) = request.date {
            new.date = date;
        }
        if let Some(description) = description {
            new.description = description;
        }
        new.updated_at = now;

        let updated = self
            .transactions
            .update_transaction(&mut *tx, &new)
            .await
            .map_err(|e| ServiceError::from_constraint(e, "Category or currency no longer exists"))?;
        if !updated {
            return Err(ServiceError::not_found(resource_name(kind), transaction_id));
        }
        self.ledger.apply_update(&mut *tx, &old, &new).await?;
        tx.commit().await?;

        info!(
            "Updated {} {}: {} on {} -> {} on {}",
            kind.as_str(),
            new.id,
            old.amount,
            old.account_id,
            new.amount,
            new.account_id
        );
        Ok(new)
    }

    pub async fn delete_transaction(
        &self,
        owner_id: &str,
        kind: TransactionKind,
        transaction_id: &str,
    ) -> ServiceResult<()> {
        let current = self.get_transaction(owner_id, kind, transaction_id).await?;

        let _guard = self.locks.lock(&current.account_id).await;
        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;
        self.touch_accounts(&mut tx, [current.account_id.as_str()], now).await?;

        let old = self.reload_locked(&mut tx, &current).await?;
        if !self.transactions.delete_transaction(&mut *tx, &old.id).await? {
            return Err(ServiceError::not_found(resource_name(kind), transaction_id));
        }
        self.ledger.apply_delete(&mut *tx, &old).await?;
        tx.commit().await?;

        info!("Deleted {} {} from account {}", kind.as_str(), old.id, old.account_id);
        Ok(())
    }

    async fn resolve_account(&self, owner_id: &str, account_id: &str) -> ServiceResult<Account> {
        let account = self
            .accounts
            .find_account(account_id)
            .await?
            .ok_or_else(|| ValidationError::UnknownReference {
                resource: "account",
                id: account_id.to_string(),
            })?;
        if account.owner_id != owner_id {
            return Err(ValidationError::NotOwned { resource: "Account" }.into());
        }
        Ok(account)
    }

    async fn touch_accounts<'a, I>(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        account_ids: I,
        now: DateTime<Utc>,
    ) -> ServiceResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ids: Vec<&str> = account_ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        for account_id in ids {
            if !self.accounts.touch(&mut **tx, account_id, now).await? {
                return Err(ServiceError::not_found("Account", account_id));
            }
        }
        Ok(())
    }

    /// Re-read `current` under the account lock. The account it was locked
    /// for must still be the one it sits on.
    async fn reload_locked(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        current: &Transaction,
    ) -> ServiceResult<Transaction> {
        let old = self
            .transactions
            .find_transaction_in(&mut **tx, &current.id)
            .await?
            .ok_or_else(|| ServiceError::not_found(resource_name(current.kind), &current.id))?;
        if old.account_id != current.account_id {
            return Err(ServiceError::Conflict(CONCURRENT_EDIT.to_string()));
        }
        Ok(old)
    }
}

fn resource_name(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "Expense",
        TransactionKind::Income => "Income",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::{LedgerMaintainer, PropagationMode};
    use crate::storage::{BalanceHistoryRepository, CategoryRepository, HistoryRange, ReferenceRepository};
    use crate::test_support::{at_noon, create_user, day, setup, setup_on, Fixture, OPENING_CENTS};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use sqlx::SqliteConnection;
    use std::str::FromStr;

    /// A ledger that always fails after the row has been written
    struct FailingLedger;

    #[async_trait]
    impl BalanceLedger for FailingLedger {
        async fn apply_create(&self, _: &mut SqliteConnection, _: &Transaction) -> ServiceResult<()> {
            Err(ServiceError::Storage(sqlx::Error::PoolClosed))
        }

        async fn apply_update(&self, _: &mut SqliteConnection, _: &Transaction, _: &Transaction) -> ServiceResult<()> {
            Err(ServiceError::Storage(sqlx::Error::PoolClosed))
        }

        async fn apply_delete(&self, _: &mut SqliteConnection, _: &Transaction) -> ServiceResult<()> {
            Err(ServiceError::Storage(sqlx::Error::PoolClosed))
        }
    }

    fn service_with(fixture: &Fixture, ledger: Arc<dyn BalanceLedger>) -> TransactionService {
        let db = fixture.db.clone();
        let locks = AccountLocks::new();
        let references = ReferenceService::new(ReferenceRepository::new(db.clone()));
        let categories = CategoryService::new(
            db.clone(),
            CategoryRepository::new(db.clone()),
            TransactionRepository::new(db.clone()),
            AccountRepository::new(db.clone()),
            ledger.clone(),
            locks.clone(),
        );
        TransactionService::new(
            db.clone(),
            TransactionRepository::new(db.clone()),
            AccountRepository::new(db),
            categories,
            references,
            ledger,
            locks,
        )
    }

    fn service(fixture: &Fixture) -> TransactionService {
        service_with(
            fixture,
            Arc::new(LedgerMaintainer::new(
                AccountRepository::new(fixture.db.clone()),
                BalanceHistoryRepository::new(fixture.db.clone()),
                PropagationMode::Replay,
            )),
        )
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn expense(fixture: &Fixture, amount: &str, date: Option<DateTime<Utc>>) -> CreateTransactionRequest {
        CreateTransactionRequest {
            account_id: fixture.account_id.clone(),
            category_id: fixture.expense_category_id.clone(),
            currency_id: None,
            amount: dec(amount),
            date,
            description: Some("Grocery shopping".to_string()),
        }
    }

    fn income(fixture: &Fixture, amount: &str, date: Option<DateTime<Utc>>) -> CreateTransactionRequest {
        CreateTransactionRequest {
            account_id: fixture.account_id.clone(),
            category_id: fixture.income_category_id.clone(),
            currency_id: None,
            amount: dec(amount),
            date,
            description: Some("Salary".to_string()),
        }
    }

    async fn history(fixture: &Fixture) -> Vec<(chrono::NaiveDate, i64)> {
        BalanceHistoryRepository::new(fixture.db.clone())
            .list_history(
                &fixture.account_id,
                &HistoryRange {
                    limit: 100,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .into_iter()
            .map(|entry| (entry.date, entry.balance.cents()))
            .collect()
    }

    #[tokio::test]
    async fn test_monthly_scenario() {
        let fixture = setup().await;
        let service = service(&fixture);

        service
            .create_transaction(
                &fixture.owner_id,
                TransactionKind::Expense,
                expense(&fixture, "100.00", Some(at_noon(day(2024, 1, 1)))),
            )
            .await
            .unwrap();
        assert_eq!(fixture.balance_of(&fixture.account_id).await.cents(), 90_000);
        assert_eq!(history(&fixture).await, vec![(day(2024, 1, 1), 90_000)]);

        service
            .create_transaction(
                &fixture.owner_id,
                TransactionKind::Income,
                income(&fixture, "3000.00", Some(at_noon(day(2024, 1, 15)))),
            )
            .await
            .unwrap();
        assert_eq!(fixture.balance_of(&fixture.account_id).await.cents(), 390_000);
        assert_eq!(
            history(&fixture).await,
            vec![(day(2024, 1, 1), 90_000), (day(2024, 1, 15), 390_000)]
        );
    }

    #[tokio::test]
    async fn test_create_defaults_currency_and_date() {
        let fixture = setup().await;
        let service = service(&fixture);

        let before = Utc::now();
        let created = service
            .create_transaction(&fixture.owner_id, TransactionKind::Expense, expense(&fixture, "1", None))
            .await
            .unwrap();

        assert_eq!(created.currency_id, fixture.currency_id);
        assert!(created.date >= before);
        assert_eq!(created.amount, Money::from_cents(100));
    }

    #[tokio::test]
    async fn test_invalid_requests_never_reach_the_ledger() {
        let fixture = setup().await;
        let service = service(&fixture);
        let owner = fixture.owner_id.clone();

        let zero = service
            .create_transaction(&owner, TransactionKind::Expense, expense(&fixture, "0", None))
            .await;
        assert!(matches!(
            zero,
            Err(ServiceError::Validation(ValidationError::NonPositiveAmount { .. }))
        ));

        let sub_cent = service
            .create_transaction(&owner, TransactionKind::Expense, expense(&fixture, "1.005", None))
            .await;
        assert!(matches!(
            sub_cent,
            Err(ServiceError::Validation(ValidationError::TooManyFractionDigits { .. }))
        ));

        let mut wrong_kind = expense(&fixture, "5", None);
        wrong_kind.category_id = fixture.income_category_id.clone();
        let mismatch = service
            .create_transaction(&owner, TransactionKind::Expense, wrong_kind)
            .await;
        assert!(matches!(
            mismatch,
            Err(ServiceError::Validation(ValidationError::CategoryKindMismatch { .. }))
        ));

        let mut long = expense(&fixture, "5", None);
        long.description = Some("x".repeat(256));
        let too_long = service.create_transaction(&owner, TransactionKind::Expense, long).await;
        assert!(matches!(
            too_long,
            Err(ServiceError::Validation(ValidationError::TooLong { field: "description", .. }))
        ));

        let intruder = create_user(&fixture.db, "intruder").await;
        let foreign = service
            .create_transaction(&intruder, TransactionKind::Expense, expense(&fixture, "5", None))
            .await;
        assert!(matches!(
            foreign,
            Err(ServiceError::Validation(ValidationError::NotOwned { .. }))
        ));

        assert_eq!(fixture.balance_of(&fixture.account_id).await.cents(), OPENING_CENTS);
        assert!(history(&fixture).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_amount_and_backdate() {
        let fixture = setup().await;
        let service = service(&fixture);
        let owner = fixture.owner_id.clone();

        let groceries = service
            .create_transaction(
                &owner,
                TransactionKind::Expense,
                expense(&fixture, "100.00", Some(at_noon(day(2024, 1, 10)))),
            )
            .await
            .unwrap();
        service
            .create_transaction(
                &owner,
                TransactionKind::Income,
                income(&fixture, "50.00", Some(at_noon(day(2024, 1, 20)))),
            )
            .await
            .unwrap();

        let updated = service
            .update_transaction(
                &owner,
                TransactionKind::Expense,
                &groceries.id,
                UpdateTransactionRequest {
                    amount: Some(dec("50.00")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.amount, Money::from_cents(5_000));
        assert_eq!(updated.description.as_deref(), Some("Grocery shopping"));
        assert_eq!(fixture.balance_of(&fixture.account_id).await.cents(), 100_000);
        assert_eq!(
            history(&fixture).await,
            vec![(day(2024, 1, 10), 100_000), (day(2024, 1, 20), 100_000)]
        );

        service
            .update_transaction(
                &owner,
                TransactionKind::Expense,
                &groceries.id,
                UpdateTransactionRequest {
                    date: Some(at_noon(day(2024, 1, 5))),
                    description: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let reloaded = service
            .get_transaction(&owner, TransactionKind::Expense, &groceries.id)
            .await
            .unwrap();
        assert_eq!(reloaded.description, None);
        assert_eq!(fixture.balance_of(&fixture.account_id).await.cents(), 100_000);
        assert_eq!(history(&fixture).await.first(), Some(&(day(2024, 1, 5), 100_000)));
    }

    #[tokio::test]
    async fn test_update_can_move_to_another_account() {
        let fixture = setup().await;
        let service = service(&fixture);
        let savings_id = fixture.create_account("Savings", 0).await;

        let salary = service
            .create_transaction(&fixture.owner_id, TransactionKind::Income, income(&fixture, "200.00", None))
            .await
            .unwrap();

        service
            .update_transaction(
                &fixture.owner_id,
                TransactionKind::Income,
                &salary.id,
                UpdateTransactionRequest {
                    account_id: Some(savings_id.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(fixture.balance_of(&fixture.account_id).await.cents(), OPENING_CENTS);
        assert_eq!(fixture.balance_of(&savings_id).await.cents(), 20_000);
    }

    #[tokio::test]
    async fn test_delete_reverses_and_hides_other_kind() {
        let fixture = setup().await;
        let service = service(&fixture);

        let groceries = service
            .create_transaction(&fixture.owner_id, TransactionKind::Expense, expense(&fixture, "100.00", None))
            .await
            .unwrap();

        // An expense id is not an income
        let wrong_kind = service
            .delete_transaction(&fixture.owner_id, TransactionKind::Income, &groceries.id)
            .await;
        assert!(matches!(wrong_kind, Err(ServiceError::NotFound { resource: "Income", .. })));

        service
            .delete_transaction(&fixture.owner_id, TransactionKind::Expense, &groceries.id)
            .await
            .unwrap();
        assert_eq!(fixture.balance_of(&fixture.account_id).await.cents(), OPENING_CENTS);
    }

    #[tokio::test]
    async fn test_ledger_failure_rolls_back_the_row() {
        let fixture = setup().await;
        let service = service_with(&fixture, Arc::new(FailingLedger));

        let result = service
            .create_transaction(&fixture.owner_id, TransactionKind::Expense, expense(&fixture, "100.00", None))
            .await;
        assert!(matches!(result, Err(ServiceError::Storage(_))));

        let page = service
            .list_transactions(&fixture.owner_id, TransactionListRequest::default())
            .await
            .unwrap();
        assert!(page.transactions.is_empty());
        assert_eq!(fixture.balance_of(&fixture.account_id).await.cents(), OPENING_CENTS);
    }

    #[tokio::test]
    async fn test_ledger_failure_on_update_keeps_old_row() {
        let fixture = setup().await;
        let created = service(&fixture)
            .create_transaction(&fixture.owner_id, TransactionKind::Expense, expense(&fixture, "100.00", None))
            .await
            .unwrap();

        let failing = service_with(&fixture, Arc::new(FailingLedger));
        let result = failing
            .update_transaction(
                &fixture.owner_id,
                TransactionKind::Expense,
                &created.id,
                UpdateTransactionRequest {
                    amount: Some(dec("1.00")),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_err());

        let stored = failing
            .get_transaction(&fixture.owner_id, TransactionKind::Expense, &created.id)
            .await
            .unwrap();
        assert_eq!(stored.amount, Money::from_cents(10_000));
        assert_eq!(fixture.balance_of(&fixture.account_id).await.cents(), 90_000);
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let fixture = setup().await;
        let service = service(&fixture);
        let owner = fixture.owner_id.clone();

        for offset in 1..=3 {
            service
                .create_transaction(
                    &owner,
                    TransactionKind::Expense,
                    expense(&fixture, "1.00", Some(at_noon(day(2024, 2, offset)))),
                )
                .await
                .unwrap();
        }
        service
            .create_transaction(
                &owner,
                TransactionKind::Income,
                income(&fixture, "9.00", Some(at_noon(day(2024, 2, 4)))),
            )
            .await
            .unwrap();

        let first = service
            .list_transactions(
                &owner,
                TransactionListRequest {
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(first.transactions.len(), 2);
        assert_eq!(first.transactions[0].kind, TransactionKind::Income);
        assert!(first.has_more);

        let second = service
            .list_transactions(
                &owner,
                TransactionListRequest {
                    after: first.next_cursor.clone(),
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(second.transactions.len(), 2);
        assert!(!second.has_more);
        assert_eq!(second.transactions[1].date, at_noon(day(2024, 2, 1)));

        let expenses_only = service
            .list_transactions(
                &owner,
                TransactionListRequest {
                    kind: Some(shared::TransactionKind::Expense),
                    description: Some("GROCERY".to_string()),
                    date_from: Some(at_noon(day(2024, 2, 2))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(expenses_only.transactions.len(), 2);
        assert!(expenses_only.transactions.iter().all(|t| t.kind == TransactionKind::Expense));

        let intruder = create_user(&fixture.db, "intruder").await;
        let foreign = service
            .list_transactions(&intruder, TransactionListRequest::default())
            .await
            .unwrap();
        assert!(foreign.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_deleted_cursor_is_rejected() {
        let fixture = setup().await;
        let service = service(&fixture);
        let owner = fixture.owner_id.clone();

        let mut created = Vec::new();
        for offset in 1..=3 {
            let transaction = service
                .create_transaction(
                    &owner,
                    TransactionKind::Expense,
                    expense(&fixture, "1.00", Some(at_noon(day(2024, 2, offset)))),
                )
                .await
                .unwrap();
            created.push(transaction);
        }

        let first = service
            .list_transactions(
                &owner,
                TransactionListRequest {
                    limit: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let cursor = first.next_cursor.clone().unwrap();
        service
            .delete_transaction(&owner, TransactionKind::Expense, &cursor)
            .await
            .unwrap();

        let next = service
            .list_transactions(
                &owner,
                TransactionListRequest {
                    after: Some(cursor),
                    limit: Some(1),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            next,
            Err(ServiceError::Validation(ValidationError::UnknownReference { resource: "cursor", .. }))
        ));

        // Someone else's id is no cursor either
        let intruder = create_user(&fixture.db, "intruder").await;
        let foreign = service
            .list_transactions(
                &intruder,
                TransactionListRequest {
                    after: Some(created[0].id.clone()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(foreign, Err(ServiceError::Validation(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_lose_no_update() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
        let db = DbConnection::new(&url, 5).await.unwrap();
        let fixture = setup_on(db).await;
        let service = service(&fixture);

        let mut handles = Vec::new();
        for i in 0..20u32 {
            let service = service.clone();
            let owner = fixture.owner_id.clone();
            let request = if i % 2 == 0 {
                expense(&fixture, "10.00", Some(at_noon(day(2024, 3, 1 + i % 5))))
            } else {
                income(&fixture, "1.00", Some(at_noon(day(2024, 3, 1 + i % 5))))
            };
            let kind = if i % 2 == 0 {
                TransactionKind::Expense
            } else {
                TransactionKind::Income
            };
            handles.push(tokio::spawn(async move {
                service.create_transaction(&owner, kind, request).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // 10 expenses of 10.00 and 10 incomes of 1.00
        assert_eq!(
            fixture.balance_of(&fixture.account_id).await.cents(),
            OPENING_CENTS - 10 * 1_000 + 10 * 100
        );
    }
}

//! Account CRUD plus the two read models the ledger feeds: balance history
//! and the balance audit.

use chrono::{NaiveDate, Utc};
use shared::{BalanceHistoryRequest, CreateAccountRequest, UpdateAccountRequest};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::account_locks::AccountLocks;
use crate::domain::error::{ServiceError, ServiceResult, ValidationError};
use crate::domain::models::{Account, BalanceSnapshot};
use crate::domain::money::Money;
use crate::domain::pagination::{page_size, split_page};
use crate::domain::reference_service::ReferenceService;
use crate::domain::validation::{required_text, NAME_MAX_LEN};
use crate::storage::{AccountRepository, BalanceHistoryRepository, DbConnection, HistoryRange, TransactionRepository};

/// One page of an account's balance history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub account_id: String,
    pub entries: Vec<BalanceSnapshot>,
    pub has_more: bool,
    pub next_cursor: Option<NaiveDate>,
}

/// Stored balance compared with the balance implied by the transactions
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceAudit {
    pub account_id: String,
    pub expected: Money,
    pub actual: Money,
    pub transaction_count: i64,
}

impl BalanceAudit {
    pub fn is_consistent(&self) -> bool {
        self.expected == self.actual
    }
}

#[derive(Clone)]
pub struct AccountService {
    db: DbConnection,
    accounts: AccountRepository,
    history: BalanceHistoryRepository,
    transactions: TransactionRepository,
    references: ReferenceService,
    locks: AccountLocks,
}

impl AccountService {
    pub fn new(
        db: DbConnection,
        accounts: AccountRepository,
        history: BalanceHistoryRepository,
        transactions: TransactionRepository,
        references: ReferenceService,
        locks: AccountLocks,
    ) -> Self {
        Self {
            db,
            accounts,
            history,
            transactions,
            references,
            locks,
        }
    }

    pub async fn create_account(&self, owner_id: &str, request: CreateAccountRequest) -> ServiceResult<Account> {
        let name = required_text(&request.name, "name", NAME_MAX_LEN)?;
        let opening_balance = Money::try_from_decimal(request.balance, "balance")?;
        self.references.resolve_account_type(owner_id, &request.account_type_id).await?;
        self.references.resolve_bank(owner_id, &request.bank_id).await?;
        self.references.resolve_currency(owner_id, &request.currency_id).await?;

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name,
            account_type_id: request.account_type_id,
            bank_id: request.bank_id,
            currency_id: request.currency_id,
            balance: opening_balance,
            opening_balance,
            created_at: now,
            updated_at: now,
        };

        self.accounts.store_account(&account).await?;
        info!(
            "Created account {} ({}) for user {} with balance {}",
            account.name, account.id, owner_id, account.balance
        );
        Ok(account)
    }

    pub async fn get_account(&self, owner_id: &str, account_id: &str) -> ServiceResult<Account> {
        match self.accounts.find_account(account_id).await? {
            Some(account) if account.owner_id == owner_id => Ok(account),
            _ => Err(ServiceError::not_found("Account", account_id)),
        }
    }

    pub async fn list_accounts(&self, owner_id: &str) -> ServiceResult<Vec<Account>> {
        Ok(self.accounts.list_accounts(owner_id).await?)
    }

    /// Apply a partial update. A new `balance` is written as is and moves the
    /// opening balance by the same amount, so the audit keeps holding.
    pub async fn update_account(
        &self,
        owner_id: &str,
        account_id: &str,
        request: UpdateAccountRequest,
    ) -> ServiceResult<Account> {
        // Validate against the pool before taking the lock and opening the
        // write transaction
        self.get_account(owner_id, account_id).await?;
        let name = request
            .name
            .as_deref()
            .map(|name| required_text(name, "name", NAME_MAX_LEN))
            .transpose()?;
        let balance = request
            .balance
            .map(|balance| Money::try_from_decimal(balance, "balance"))
            .transpose()?;
        if let Some(account_type_id) = &request.account_type_id {
            self.references.resolve_account_type(owner_id, account_type_id).await?;
        }
        if let Some(bank_id) = &request.bank_id {
            self.references.resolve_bank(owner_id, bank_id).await?;
        }
        if let Some(currency_id) = &request.currency_id {
            self.references.resolve_currency(owner_id, currency_id).await?;
        }

        let _guard = self.locks.lock(account_id).await;
        let mut tx = self.db.pool().begin().await?;
        let now = Utc::now();

        self.accounts.touch(&mut *tx, account_id, now).await?;
        let mut account = match self.accounts.find_account_in(&mut *tx, account_id).await? {
            Some(account) if account.owner_id == owner_id => account,
            _ => return Err(ServiceError::not_found("Account", account_id)),
        };

        if let Some(name) = name {
            account.name = name;
        }
        if let Some(account_type_id) = request.account_type_id {
            account.account_type_id = account_type_id;
        }
        if let Some(bank_id) = request.bank_id {
            account.bank_id = bank_id;
        }
        if let Some(currency_id) = request.currency_id {
            account.currency_id = currency_id;
        }
        if let Some(balance) = balance {
            let correction = balance - account.balance;
            if !correction.is_zero() {
                warn!(
                    "Direct balance correction on account {}: {} -> {} (bypasses the transaction ledger)",
                    account.id, account.balance, balance
                );
                account.balance = balance;
                account.opening_balance += correction;
            }
        }
        account.updated_at = now;

        if !self.accounts.update_account(&mut *tx, &account).await? {
            return Err(ServiceError::not_found("Account", account_id));
        }
        tx.commit().await?;

        info!("Updated account {}", account.id);
        Ok(account)
    }

    /// Delete the account together with its transactions and history
    pub async fn delete_account(&self, owner_id: &str, account_id: &str) -> ServiceResult<()> {
        let _guard = self.locks.lock(account_id).await;
        if !self.accounts.delete_account(owner_id, account_id).await? {
            return Err(ServiceError::not_found("Account", account_id));
        }
        info!("Deleted account {} of user {}", account_id, owner_id);
        Ok(())
    }

    pub async fn balance_history(
        &self,
        owner_id: &str,
        account_id: &str,
        request: BalanceHistoryRequest,
    ) -> ServiceResult<HistoryPage> {
        self.get_account(owner_id, account_id).await?;
        if let (Some(from), Some(to)) = (request.from, request.to) {
            if from > to {
                return Err(ValidationError::InvalidPeriod.into());
            }
        }

        let limit = page_size(request.limit);
        let range = HistoryRange {
            from: request.from,
            to: request.to,
            after: request.after,
            limit: limit + 1,
        };
        let rows = self.history.list_history(account_id, &range).await?;
        let (entries, has_more) = split_page(rows, limit);
        let next_cursor = if has_more {
            entries.last().map(|entry| entry.date)
        } else {
            None
        };

        Ok(HistoryPage {
            account_id: account_id.to_string(),
            entries,
            has_more,
            next_cursor,
        })
    }

    /// Recompute `opening + Σ income − Σ expense` and compare it with the
    /// stored balance
    pub async fn audit_balance(&self, owner_id: &str, account_id: &str) -> ServiceResult<BalanceAudit> {
        // Hold the lock so no ledger write lands between the two reads
        let _guard = self.locks.lock(account_id).await;
        let account = self.get_account(owner_id, account_id).await?;
        let totals = self.transactions.totals_for_account(account_id).await?;

        let audit = BalanceAudit {
            account_id: account.id,
            expected: account.opening_balance + totals.income - totals.expense,
            actual: account.balance,
            transaction_count: totals.count,
        };
        if !audit.is_consistent() {
            warn!(
                "Balance audit failed for account {}: expected {}, stored {}",
                audit.account_id, audit.expected, audit.actual
            );
        }
        Ok(audit)
    }
}

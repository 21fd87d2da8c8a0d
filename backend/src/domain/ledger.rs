//! The ledger maintainer keeps `Account.balance` and the daily balance
//! history in step with the transaction log.
//!
//! Every transaction write calls exactly one [`BalanceLedger`] method on the
//! connection of the database transaction that also writes the transaction
//! row. Each call is broken into movements: a signed delta applied to one
//! account on one calendar date. A movement runs three steps in order:
//!
//! 1. the relative balance update on the account row
//! 2. an upsert of the history entry for the movement's date, holding the
//!    post-mutation balance
//! 3. forward propagation over history entries dated after the movement
//!
//! Callers serialize writes per account (see `AccountLocks`) and roll the
//! whole database transaction back on any error, so a partially applied
//! movement is never visible.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqliteConnection;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::models::Transaction;
use crate::domain::money::Money;
use crate::storage::{AccountRepository, BalanceHistoryRepository};

/// How history entries after a backdated movement are recomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropagationMode {
    /// Shift every later entry by the movement's delta
    #[default]
    Replay,
    /// Overwrite every later entry with the balance at the movement's date
    Flatten,
}

#[derive(Debug, Error)]
#[error("unknown history propagation mode '{0}', expected 'replay' or 'flatten'")]
pub struct UnknownPropagationMode(String);

impl FromStr for PropagationMode {
    type Err = UnknownPropagationMode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "replay" => Ok(PropagationMode::Replay),
            "flatten" => Ok(PropagationMode::Flatten),
            _ => Err(UnknownPropagationMode(raw.to_string())),
        }
    }
}

impl fmt::Display for PropagationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationMode::Replay => write!(f, "replay"),
            PropagationMode::Flatten => write!(f, "flatten"),
        }
    }
}

/// Transaction lifecycle hooks that keep balances consistent
#[async_trait]
pub trait BalanceLedger: Send + Sync {
    /// `transaction` has just been inserted
    async fn apply_create(&self, conn: &mut SqliteConnection, transaction: &Transaction) -> ServiceResult<()>;

    /// `old` is the row as it was before the edit, `new` the row as stored now
    async fn apply_update(
        &self,
        conn: &mut SqliteConnection,
        old: &Transaction,
        new: &Transaction,
    ) -> ServiceResult<()>;

    /// `transaction` has just been deleted
    async fn apply_delete(&self, conn: &mut SqliteConnection, transaction: &Transaction) -> ServiceResult<()>;
}

/// One signed change to one account's balance, dated
#[derive(Debug, Clone, PartialEq, Eq)]
struct Movement<'a> {
    account_id: &'a str,
    date: NaiveDate,
    delta: Money,
}

#[derive(Clone)]
pub struct LedgerMaintainer {
    accounts: AccountRepository,
    history: BalanceHistoryRepository,
    mode: PropagationMode,
}

impl LedgerMaintainer {
    pub fn new(accounts: AccountRepository, history: BalanceHistoryRepository, mode: PropagationMode) -> Self {
        Self { accounts, history, mode }
    }

    /// Recompute every history entry of `account_id` dated strictly after
    /// `start_date`. Returns the number of entries rewritten.
    pub async fn propagate_forward(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
        start_date: NaiveDate,
        delta: Money,
    ) -> ServiceResult<u64> {
        let rewritten = match self.mode {
            PropagationMode::Replay => {
                if delta.is_zero() {
                    return Ok(0);
                }
                self.history.shift_after(conn, account_id, start_date, delta).await?
            }
            PropagationMode::Flatten => {
                let anchor = match self.history.find_snapshot(conn, account_id, start_date).await? {
                    Some(balance) => balance,
                    None => self
                        .accounts
                        .current_balance(conn, account_id)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("Account", account_id))?,
                };
                self.history.flatten_after(conn, account_id, start_date, anchor).await?
            }
        };

        if rewritten > 0 {
            debug!(
                "Propagated {} history entries of account {} after {} ({})",
                rewritten, account_id, start_date, self.mode
            );
        }
        Ok(rewritten)
    }

    async fn apply_movement(&self, conn: &mut SqliteConnection, movement: Movement<'_>) -> ServiceResult<Money> {
        let balance = self
            .accounts
            .adjust_balance(conn, movement.account_id, movement.delta, Utc::now())
            .await?
            .ok_or_else(|| ServiceError::not_found("Account", movement.account_id))?;

        // The snapshot goes first so Flatten anchors on the refreshed entry
        self.history
            .upsert_snapshot(conn, movement.account_id, movement.date, balance)
            .await?;

        self.propagate_forward(conn, movement.account_id, movement.date, movement.delta)
            .await?;

        info!(
            "Applied {} to account {} on {}: balance now {}",
            movement.delta, movement.account_id, movement.date, balance
        );
        Ok(balance)
    }
}

/// Split an edit into the movements that undo `old` and apply `new`.
/// An edit that keeps account and date collapses into a single movement.
fn update_movements<'a>(old: &'a Transaction, new: &'a Transaction) -> Vec<Movement<'a>> {
    let old_date = old.calendar_date();
    let new_date = new.calendar_date();

    if old.account_id == new.account_id && old_date == new_date {
        return vec![Movement {
            account_id: &new.account_id,
            date: new_date,
            delta: new.signed_amount() - old.signed_amount(),
        }];
    }

    vec![
        Movement {
            account_id: &old.account_id,
            date: old_date,
            delta: -old.signed_amount(),
        },
        Movement {
            account_id: &new.account_id,
            date: new_date,
            delta: new.signed_amount(),
        },
    ]
}

#[async_trait]
impl BalanceLedger for LedgerMaintainer {
    async fn apply_create(&self, conn: &mut SqliteConnection, transaction: &Transaction) -> ServiceResult<()> {
        self.apply_movement(
            conn,
            Movement {
                account_id: &transaction.account_id,
                date: transaction.calendar_date(),
                delta: transaction.signed_amount(),
            },
        )
        .await?;
        Ok(())
    }

    async fn apply_update(
        &self,
        conn: &mut SqliteConnection,
        old: &Transaction,
        new: &Transaction,
    ) -> ServiceResult<()> {
        for movement in update_movements(old, new) {
            self.apply_movement(conn, movement).await?;
        }
        Ok(())
    }

    async fn apply_delete(&self, conn: &mut SqliteConnection, transaction: &Transaction) -> ServiceResult<()> {
        self.apply_movement(
            conn,
            Movement {
                account_id: &transaction.account_id,
                date: transaction.calendar_date(),
                delta: -transaction.signed_amount(),
            },
        )
        .await?;
        Ok(())
    }
}

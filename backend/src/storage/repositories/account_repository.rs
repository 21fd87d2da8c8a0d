//! Account rows. The running balance is only ever moved with a relative
//! `balance_cents = balance_cents + ?` update so concurrent ledger writes
//! cannot lose each other's deltas.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::domain::models::Account;
use crate::domain::money::Money;
use crate::storage::codec::{format_timestamp, parse_timestamp};
use crate::storage::connection::DbConnection;

const ACCOUNT_COLUMNS: &str = "id, owner_id, name, account_type_id, bank_id, currency_id, \
     balance_cents, opening_balance_cents, created_at, updated_at";

#[derive(Clone)]
pub struct AccountRepository {
    db: DbConnection,
}

impl AccountRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_account(&self, account: &Account) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, owner_id, name, account_type_id, bank_id, currency_id,
                                  balance_cents, opening_balance_cents, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.owner_id)
        .bind(&account.name)
        .bind(&account.account_type_id)
        .bind(&account.bank_id)
        .bind(&account.currency_id)
        .bind(account.balance.cents())
        .bind(account.opening_balance.cents())
        .bind(format_timestamp(&account.created_at))
        .bind(format_timestamp(&account.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Fetch an account by id without an owner check
    pub async fn find_account(&self, account_id: &str) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {} FROM accounts WHERE id = ?", ACCOUNT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(account_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(map_account).transpose()
    }

    /// Same as [`find_account`](Self::find_account) but on a connection that
    /// may be inside an open transaction
    pub async fn find_account_in(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {} FROM accounts WHERE id = ?", ACCOUNT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(account_id)
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref().map(map_account).transpose()
    }

    pub async fn list_accounts(&self, owner_id: &str) -> Result<Vec<Account>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM accounts WHERE owner_id = ? ORDER BY created_at, id",
            ACCOUNT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(owner_id)
            .fetch_all(self.db.pool())
            .await?;
        rows.iter().map(map_account).collect()
    }

    /// Write every column of the account, including a directly corrected
    /// balance. Returns false if the account is gone.
    pub async fn update_account(
        &self,
        conn: &mut SqliteConnection,
        account: &Account,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET name = ?, account_type_id = ?, bank_id = ?, currency_id = ?,
                balance_cents = ?, opening_balance_cents = ?, updated_at = ?
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(&account.name)
        .bind(&account.account_type_id)
        .bind(&account.bank_id)
        .bind(&account.currency_id)
        .bind(account.balance.cents())
        .bind(account.opening_balance.cents())
        .bind(format_timestamp(&account.updated_at))
        .bind(&account.id)
        .bind(&account.owner_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_account(&self, owner_id: &str, account_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ? AND owner_id = ?")
            .bind(account_id)
            .bind(owner_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add `delta` to the running balance and return the new balance.
    /// `None` means the account does not exist.
    pub async fn adjust_balance(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
        delta: Money,
        now: DateTime<Utc>,
    ) -> Result<Option<Money>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET balance_cents = balance_cents + ?, updated_at = ?
            WHERE id = ?
            RETURNING balance_cents
            "#,
        )
        .bind(delta.cents())
        .bind(format_timestamp(&now))
        .bind(account_id)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(|row| row.try_get::<i64, _>("balance_cents").map(Money::from_cents))
            .transpose()
    }

    /// Bump `updated_at` so the surrounding transaction holds the write lock
    /// before it reads anything. Returns false if the account is gone.
    pub async fn touch(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE accounts SET updated_at = ? WHERE id = ?")
            .bind(format_timestamp(&now))
            .bind(account_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn current_balance(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
    ) -> Result<Option<Money>, sqlx::Error> {
        let row = sqlx::query("SELECT balance_cents FROM accounts WHERE id = ?")
            .bind(account_id)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(|row| row.try_get::<i64, _>("balance_cents").map(Money::from_cents))
            .transpose()
    }
}

fn map_account(row: &SqliteRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        account_type_id: row.try_get("account_type_id")?,
        bank_id: row.try_get("bank_id")?,
        currency_id: row.try_get("currency_id")?,
        balance: Money::from_cents(row.try_get("balance_cents")?),
        opening_balance: Money::from_cents(row.try_get("opening_balance_cents")?),
        created_at: parse_timestamp(row.try_get("created_at")?)?,
        updated_at: parse_timestamp(row.try_get("updated_at")?)?,
    })
}

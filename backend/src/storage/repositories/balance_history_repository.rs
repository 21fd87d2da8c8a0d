//! Daily balance samples, one row per (account, date).

use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::domain::models::BalanceSnapshot;
use crate::domain::money::Money;
use crate::storage::codec::{format_date, parse_date};
use crate::storage::connection::DbConnection;

/// Date window and cursor for reading an account's history
#[derive(Debug, Clone, Default)]
pub struct HistoryRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Last date of the previous page
    pub after: Option<NaiveDate>,
    pub limit: u32,
}

#[derive(Clone)]
pub struct BalanceHistoryRepository {
    db: DbConnection,
}

impl BalanceHistoryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert or overwrite the entry for `(account_id, date)`
    pub async fn upsert_snapshot(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
        date: NaiveDate,
        balance: Money,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO balance_history (account_id, date, balance_cents)
            VALUES (?, ?, ?)
            ON CONFLICT (account_id, date) DO UPDATE SET balance_cents = excluded.balance_cents
            "#,
        )
        .bind(account_id)
        .bind(format_date(date))
        .bind(balance.cents())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn find_snapshot(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Money>, sqlx::Error> {
        let row = sqlx::query("SELECT balance_cents FROM balance_history WHERE account_id = ? AND date = ?")
            .bind(account_id)
            .bind(format_date(date))
            .fetch_optional(&mut *conn)
            .await?;
        row.map(|row| row.try_get::<i64, _>("balance_cents").map(Money::from_cents))
            .transpose()
    }

    /// Add `delta` to every entry dated strictly after `date`
    pub async fn shift_after(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
        date: NaiveDate,
        delta: Money,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE balance_history SET balance_cents = balance_cents + ? WHERE account_id = ? AND date > ?",
        )
        .bind(delta.cents())
        .bind(account_id)
        .bind(format_date(date))
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Overwrite every entry dated strictly after `date` with `balance`
    pub async fn flatten_after(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
        date: NaiveDate,
        balance: Money,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE balance_history SET balance_cents = ? WHERE account_id = ? AND date > ?",
        )
        .bind(balance.cents())
        .bind(account_id)
        .bind(format_date(date))
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Entries in ascending date order
    pub async fn list_history(
        &self,
        account_id: &str,
        range: &HistoryRange,
    ) -> Result<Vec<BalanceSnapshot>, sqlx::Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT account_id, date, balance_cents FROM balance_history WHERE account_id = ",
        );
        builder.push_bind(account_id.to_string());

        if let Some(from) = range.from {
            builder.push(" AND date >= ").push_bind(format_date(from));
        }
        if let Some(to) = range.to {
            builder.push(" AND date <= ").push_bind(format_date(to));
        }
        if let Some(after) = range.after {
            builder.push(" AND date > ").push_bind(format_date(after));
        }

        builder
            .push(" ORDER BY date ASC LIMIT ")
            .push_bind(i64::from(range.limit));

        let rows = builder.build().fetch_all(self.db.pool()).await?;
        rows.iter().map(map_snapshot).collect()
    }
}

fn map_snapshot(row: &SqliteRow) -> Result<BalanceSnapshot, sqlx::Error> {
    Ok(BalanceSnapshot {
        account_id: row.try_get("account_id")?,
        date: parse_date(row.try_get("date")?)?,
        balance: Money::from_cents(row.try_get("balance_cents")?),
    })
}

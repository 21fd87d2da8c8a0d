//! Expense and income rows live in one table, tagged by `kind`.
//!
//! Writes take a `&mut SqliteConnection` so they can share the database
//! transaction the ledger runs in. Reads that serve the REST layer go
//! through the pool.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::domain::models::{Transaction, TransactionKind};
use crate::domain::money::Money;
use crate::storage::codec::{end_of_day, format_timestamp, parse_kind, parse_timestamp, start_of_day};
use crate::storage::connection::DbConnection;

const TRANSACTION_COLUMNS: &str = "id, owner_id, kind, account_id, category_id, currency_id, \
     amount_cents, occurred_at, description, created_at, updated_at";

/// Filters for the combined listing. All set fields must match.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub owner_id: String,
    pub kind: Option<TransactionKind>,
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// Id of the last transaction of the previous page
    pub after: Option<String>,
    /// Maximum number of rows to return
    pub limit: u32,
}

/// Aggregate of the transactions recorded against one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionTotals {
    pub income: Money,
    pub expense: Money,
    pub count: i64,
}

#[derive(Clone)]
pub struct TransactionRepository {
    db: DbConnection,
}

impl TransactionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn insert_transaction(
        &self,
        conn: &mut SqliteConnection,
        transaction: &Transaction,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, owner_id, kind, account_id, category_id, currency_id,
                                      amount_cents, occurred_at, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.owner_id)
        .bind(transaction.kind.as_str())
        .bind(&transaction.account_id)
        .bind(&transaction.category_id)
        .bind(&transaction.currency_id)
        .bind(transaction.amount.cents())
        .bind(format_timestamp(&transaction.date))
        .bind(&transaction.description)
        .bind(format_timestamp(&transaction.created_at))
        .bind(format_timestamp(&transaction.updated_at))
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn find_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS);
        let row = sqlx::query(&query)
            .bind(transaction_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(map_transaction).transpose()
    }

    /// Read a row inside an open database transaction, used to get the
    /// pre-edit state the ledger reverses
    pub async fn find_transaction_in(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: &str,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS);
        let row = sqlx::query(&query)
            .bind(transaction_id)
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref().map(map_transaction).transpose()
    }

    pub async fn update_transaction(
        &self,
        conn: &mut SqliteConnection,
        transaction: &Transaction,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET account_id = ?, category_id = ?, currency_id = ?, amount_cents = ?,
                occurred_at = ?, description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&transaction.account_id)
        .bind(&transaction.category_id)
        .bind(&transaction.currency_id)
        .bind(transaction.amount.cents())
        .bind(format_timestamp(&transaction.date))
        .bind(&transaction.description)
        .bind(format_timestamp(&transaction.updated_at))
        .bind(&transaction.id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_transaction(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(transaction_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List transactions newest first. The result holds at most
    /// `filter.limit` rows; callers ask for one extra to detect more pages.
    pub async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, sqlx::Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM transactions WHERE owner_id = ",
            TRANSACTION_COLUMNS
        ));
        builder.push_bind(filter.owner_id.clone());

        if let Some(kind) = filter.kind {
            builder.push(" AND kind = ").push_bind(kind.as_str());
        }
        if let Some(account_id) = &filter.account_id {
            builder.push(" AND account_id = ").push_bind(account_id.clone());
        }
        if let Some(category_id) = &filter.category_id {
            builder.push(" AND category_id = ").push_bind(category_id.clone());
        }
        if let Some(description) = &filter.description {
            builder
                .push(" AND instr(LOWER(COALESCE(description, '')), LOWER(")
                .push_bind(description.clone())
                .push(")) > 0");
        }
        if let Some(date_from) = &filter.date_from {
            builder.push(" AND occurred_at >= ").push_bind(format_timestamp(date_from));
        }
        if let Some(date_to) = &filter.date_to {
            builder.push(" AND occurred_at <= ").push_bind(format_timestamp(date_to));
        }
        if let Some(after) = &filter.after {
            builder
                .push(" AND (occurred_at, id) < (SELECT occurred_at, id FROM transactions WHERE id = ")
                .push_bind(after.clone())
                .push(")");
        }

        builder
            .push(" ORDER BY occurred_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(filter.limit));

        let rows = builder.build().fetch_all(self.db.pool()).await?;
        rows.iter().map(map_transaction).collect()
    }

    /// Accounts touched by a category's transactions, sorted and distinct
    pub async fn account_ids_for_category(&self, category_id: &str) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT DISTINCT account_id FROM transactions WHERE category_id = ? ORDER BY account_id",
        )
        .bind(category_id)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(|row| row.try_get("account_id")).collect()
    }

    pub async fn list_for_category_in(
        &self,
        conn: &mut SqliteConnection,
        category_id: &str,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM transactions WHERE category_id = ? ORDER BY occurred_at, id",
            TRANSACTION_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(category_id)
            .fetch_all(&mut *conn)
            .await?;
        rows.iter().map(map_transaction).collect()
    }

    pub async fn totals_for_account(&self, account_id: &str) -> Result<TransactionTotals, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount_cents ELSE 0 END), 0) AS income_cents,
                COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount_cents ELSE 0 END), 0) AS expense_cents,
                COUNT(*) AS transaction_count
            FROM transactions
            WHERE account_id = ?
            "#,
        )
        .bind(account_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(TransactionTotals {
            income: Money::from_cents(row.try_get("income_cents")?),
            expense: Money::from_cents(row.try_get("expense_cents")?),
            count: row.try_get("transaction_count")?,
        })
    }

    /// Sum of the owner's expenses dated inside `[from, to]`, whole days,
    /// optionally limited to one category
    pub async fn sum_expenses(
        &self,
        owner_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        category_id: Option<&str>,
    ) -> Result<Money, sqlx::Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT COALESCE(SUM(amount_cents), 0) AS spent_cents FROM transactions \
             WHERE kind = 'expense' AND owner_id = ",
        );
        builder
            .push_bind(owner_id.to_string())
            .push(" AND occurred_at >= ")
            .push_bind(start_of_day(from))
            .push(" AND occurred_at <= ")
            .push_bind(end_of_day(to));
        if let Some(category_id) = category_id {
            builder.push(" AND category_id = ").push_bind(category_id.to_string());
        }

        let row = builder.build().fetch_one(self.db.pool()).await?;
        Ok(Money::from_cents(row.try_get("spent_cents")?))
    }
}

fn map_transaction(row: &SqliteRow) -> Result<Transaction, sqlx::Error> {
    Ok(Transaction {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        kind: parse_kind(row.try_get("kind")?)?,
        account_id: row.try_get("account_id")?,
        category_id: row.try_get("category_id")?,
        currency_id: row.try_get("currency_id")?,
        amount: Money::from_cents(row.try_get("amount_cents")?),
        date: parse_timestamp(row.try_get("occurred_at")?)?,
        description: row.try_get("description")?,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
        updated_at: parse_timestamp(row.try_get("updated_at")?)?,
    })
}

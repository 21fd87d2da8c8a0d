use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::domain::models::{Budget, BudgetAllocation};
use crate::domain::money::Money;
use crate::storage::codec::{format_date, format_timestamp, parse_date};
use crate::storage::connection::DbConnection;

/// Repository for budgets and their per-category allocations. A budget and
/// its allocations are always written together in one database transaction.
#[derive(Clone)]
pub struct BudgetRepository {
    db: DbConnection,
}

impl BudgetRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_budget(&self, budget: &Budget, now: DateTime<Utc>) -> Result<(), sqlx::Error> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO budgets (id, owner_id, name, total_amount_cents, start_date, end_date,
                                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&budget.id)
        .bind(&budget.owner_id)
        .bind(&budget.name)
        .bind(budget.total_amount.cents())
        .bind(format_date(budget.start_date))
        .bind(format_date(budget.end_date))
        .bind(format_timestamp(&now))
        .bind(format_timestamp(&now))
        .execute(&mut *tx)
        .await?;

        insert_allocations(&mut *tx, &budget.id, &budget.allocations).await?;

        tx.commit().await
    }

    pub async fn find_budget(&self, budget_id: &str) -> Result<Option<Budget>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, total_amount_cents, start_date, end_date FROM budgets WHERE id = ?",
        )
        .bind(budget_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => {
                let allocations = self.list_allocations(budget_id).await?;
                Ok(Some(map_budget(&row, allocations)?))
            }
            None => Ok(None),
        }
    }

    pub async fn list_budgets(&self, owner_id: &str) -> Result<Vec<Budget>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, name, total_amount_cents, start_date, end_date
            FROM budgets
            WHERE owner_id = ?
            ORDER BY start_date DESC, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut budgets = Vec::with_capacity(rows.len());
        for row in &rows {
            let budget_id: String = row.try_get("id")?;
            let allocations = self.list_allocations(&budget_id).await?;
            budgets.push(map_budget(row, allocations)?);
        }
        Ok(budgets)
    }

    /// Replace the budget's fields and its whole allocation set
    pub async fn update_budget(&self, budget: &Budget, now: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE budgets
            SET name = ?, total_amount_cents = ?, start_date = ?, end_date = ?, updated_at = ?
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(&budget.name)
        .bind(budget.total_amount.cents())
        .bind(format_date(budget.start_date))
        .bind(format_date(budget.end_date))
        .bind(format_timestamp(&now))
        .bind(&budget.id)
        .bind(&budget.owner_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM budget_categories WHERE budget_id = ?")
            .bind(&budget.id)
            .execute(&mut *tx)
            .await?;
        insert_allocations(&mut *tx, &budget.id, &budget.allocations).await?;

        tx.commit().await?;
        Ok(true)
    }

    pub async fn delete_budget(&self, owner_id: &str, budget_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = ? AND owner_id = ?")
            .bind(budget_id)
            .bind(owner_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_allocations(&self, budget_id: &str) -> Result<Vec<BudgetAllocation>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, category_id, amount_cents FROM budget_categories WHERE budget_id = ? ORDER BY id",
        )
        .bind(budget_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(BudgetAllocation {
                    id: row.try_get("id")?,
                    category_id: row.try_get("category_id")?,
                    amount: Money::from_cents(row.try_get("amount_cents")?),
                })
            })
            .collect()
    }
}

async fn insert_allocations(
    conn: &mut SqliteConnection,
    budget_id: &str,
    allocations: &[BudgetAllocation],
) -> Result<(), sqlx::Error> {
    for allocation in allocations {
        sqlx::query("INSERT INTO budget_categories (id, budget_id, category_id, amount_cents) VALUES (?, ?, ?, ?)")
            .bind(&allocation.id)
            .bind(budget_id)
            .bind(&allocation.category_id)
            .bind(allocation.amount.cents())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

fn map_budget(row: &SqliteRow, allocations: Vec<BudgetAllocation>) -> Result<Budget, sqlx::Error> {
    Ok(Budget {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
        start_date: parse_date(row.try_get("start_date")?)?,
        end_date: parse_date(row.try_get("end_date")?)?,
        allocations,
    })
}

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::domain::models::{Category, TransactionKind};
use crate::storage::codec::parse_kind;
use crate::storage::connection::DbConnection;

/// Repository for expense and income categories
#[derive(Clone)]
pub struct CategoryRepository {
    db: DbConnection,
}

impl CategoryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_category(&self, category: &Category) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO categories (id, owner_id, kind, name, description) VALUES (?, ?, ?, ?, ?)")
            .bind(&category.id)
            .bind(&category.owner_id)
            .bind(category.kind.as_str())
            .bind(&category.name)
            .bind(&category.description)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Look a category up by id only. Callers decide what a foreign owner or
    /// the wrong kind means.
    pub async fn find_category(&self, category_id: &str) -> Result<Option<Category>, sqlx::Error> {
        let row = sqlx::query("SELECT id, owner_id, kind, name, description FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(map_category).transpose()
    }

    pub async fn list_categories(
        &self,
        owner_id: &str,
        kind: TransactionKind,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, kind, name, description
            FROM categories
            WHERE owner_id = ? AND kind = ?
            ORDER BY name, id
            "#,
        )
        .bind(owner_id)
        .bind(kind.as_str())
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(map_category).collect()
    }

    pub async fn update_category(&self, category: &Category) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE categories SET name = ?, description = ? WHERE id = ? AND owner_id = ? AND kind = ?",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.id)
        .bind(&category.owner_id)
        .bind(category.kind.as_str())
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_category(
        &self,
        conn: &mut SqliteConnection,
        owner_id: &str,
        category_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ? AND owner_id = ?")
            .bind(category_id)
            .bind(owner_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_category(row: &SqliteRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        kind: parse_kind(row.try_get("kind")?)?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

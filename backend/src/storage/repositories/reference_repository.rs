//! Currencies, banks and account types. All three are small owned lookup
//! tables; deleting a row cascades to the accounts that use it.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{AccountType, Bank, Currency};
use crate::storage::connection::DbConnection;

#[derive(Clone)]
pub struct ReferenceRepository {
    db: DbConnection,
}

impl ReferenceRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn store_currency(&self, currency: &Currency) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO currencies (id, owner_id, name, code, symbol) VALUES (?, ?, ?, ?, ?)")
            .bind(&currency.id)
            .bind(&currency.owner_id)
            .bind(&currency.name)
            .bind(&currency.code)
            .bind(&currency.symbol)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Look a currency up by id regardless of owner, so callers can tell
    /// "unknown" apart from "not yours"
    pub async fn find_currency(&self, currency_id: &str) -> Result<Option<Currency>, sqlx::Error> {
        let row = sqlx::query("SELECT id, owner_id, name, code, symbol FROM currencies WHERE id = ?")
            .bind(currency_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(map_currency).transpose()
    }

    pub async fn list_currencies(&self, owner_id: &str) -> Result<Vec<Currency>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name, code, symbol FROM currencies WHERE owner_id = ? ORDER BY code, id",
        )
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(map_currency).collect()
    }

    /// Returns false when no currency with that id belongs to the owner
    pub async fn update_currency(&self, currency: &Currency) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE currencies SET name = ?, code = ?, symbol = ? WHERE id = ? AND owner_id = ?",
        )
        .bind(&currency.name)
        .bind(&currency.code)
        .bind(&currency.symbol)
        .bind(&currency.id)
        .bind(&currency.owner_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_currency(&self, owner_id: &str, currency_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM currencies WHERE id = ? AND owner_id = ?")
            .bind(currency_id)
            .bind(owner_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn store_bank(&self, bank: &Bank) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO banks (id, owner_id, name, country) VALUES (?, ?, ?, ?)")
            .bind(&bank.id)
            .bind(&bank.owner_id)
            .bind(&bank.name)
            .bind(&bank.country)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn find_bank(&self, bank_id: &str) -> Result<Option<Bank>, sqlx::Error> {
        let row = sqlx::query("SELECT id, owner_id, name, country FROM banks WHERE id = ?")
            .bind(bank_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(map_bank).transpose()
    }

    pub async fn list_banks(&self, owner_id: &str) -> Result<Vec<Bank>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name, country FROM banks WHERE owner_id = ? ORDER BY name, id",
        )
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(map_bank).collect()
    }

    pub async fn update_bank(&self, bank: &Bank) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE banks SET name = ?, country = ? WHERE id = ? AND owner_id = ?")
            .bind(&bank.name)
            .bind(&bank.country)
            .bind(&bank.id)
            .bind(&bank.owner_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_bank(&self, owner_id: &str, bank_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM banks WHERE id = ? AND owner_id = ?")
            .bind(bank_id)
            .bind(owner_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn store_account_type(&self, account_type: &AccountType) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO account_types (id, owner_id, name) VALUES (?, ?, ?)")
            .bind(&account_type.id)
            .bind(&account_type.owner_id)
            .bind(&account_type.name)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn find_account_type(&self, account_type_id: &str) -> Result<Option<AccountType>, sqlx::Error> {
        let row = sqlx::query("SELECT id, owner_id, name FROM account_types WHERE id = ?")
            .bind(account_type_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(map_account_type).transpose()
    }

    pub async fn list_account_types(&self, owner_id: &str) -> Result<Vec<AccountType>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name FROM account_types WHERE owner_id = ? ORDER BY name, id",
        )
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(map_account_type).collect()
    }

    pub async fn update_account_type(&self, account_type: &AccountType) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE account_types SET name = ? WHERE id = ? AND owner_id = ?")
            .bind(&account_type.name)
            .bind(&account_type.id)
            .bind(&account_type.owner_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_account_type(&self, owner_id: &str, account_type_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM account_types WHERE id = ? AND owner_id = ?")
            .bind(account_type_id)
            .bind(owner_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_currency(row: &SqliteRow) -> Result<Currency, sqlx::Error> {
    Ok(Currency {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        symbol: row.try_get("symbol")?,
    })
}

fn map_bank(row: &SqliteRow) -> Result<Bank, sqlx::Error> {
    Ok(Bank {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        country: row.try_get("country")?,
    })
}

fn map_account_type(row: &SqliteRow) -> Result<AccountType, sqlx::Error> {
    Ok(AccountType {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
    })
}

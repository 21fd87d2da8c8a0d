//! Currencies, banks and account types: owned lookup data for accounts.

use shared::{AccountTypeRequest, BankRequest, CurrencyRequest};
use tracing::info;
use uuid::Uuid;

use crate::domain::error::{ServiceError, ServiceResult, ValidationError};
use crate::domain::models::{AccountType, Bank, Currency};
use crate::domain::validation::{currency_code, required_text, NAME_MAX_LEN};
use crate::storage::ReferenceRepository;

const SYMBOL_MAX_LEN: usize = 3;
const IN_USE: &str = "Still referenced by transactions of another account";

#[derive(Clone)]
pub struct ReferenceService {
    references: ReferenceRepository,
}

impl ReferenceService {
    pub fn new(references: ReferenceRepository) -> Self {
        Self { references }
    }

    pub async fn create_currency(&self, owner_id: &str, request: CurrencyRequest) -> ServiceResult<Currency> {
        let currency = Currency {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: required_text(&request.name, "name", NAME_MAX_LEN)?,
            code: currency_code(&request.code)?,
            symbol: required_text(&request.symbol, "symbol", SYMBOL_MAX_LEN)?,
        };
        self.references.store_currency(&currency).await?;
        info!("Created currency {} for user {}", currency.code, owner_id);
        Ok(currency)
    }

    pub async fn list_currencies(&self, owner_id: &str) -> ServiceResult<Vec<Currency>> {
        Ok(self.references.list_currencies(owner_id).await?)
    }

    pub async fn get_currency(&self, owner_id: &str, currency_id: &str) -> ServiceResult<Currency> {
        match self.references.find_currency(currency_id).await? {
            Some(currency) if currency.owner_id == owner_id => Ok(currency),
            _ => Err(ServiceError::not_found("Currency", currency_id)),
        }
    }

    pub async fn update_currency(
        &self,
        owner_id: &str,
        currency_id: &str,
        request: CurrencyRequest,
    ) -> ServiceResult<Currency> {
        let mut currency = self.get_currency(owner_id, currency_id).await?;
        currency.name = required_text(&request.name, "name", NAME_MAX_LEN)?;
        currency.code = currency_code(&request.code)?;
        currency.symbol = required_text(&request.symbol, "symbol", SYMBOL_MAX_LEN)?;

        if !self.references.update_currency(&currency).await? {
            return Err(ServiceError::not_found("Currency", currency_id));
        }
        Ok(currency)
    }

    /// Deleting a currency also deletes the accounts that hold it
    pub async fn delete_currency(&self, owner_id: &str, currency_id: &str) -> ServiceResult<()> {
        let deleted = self
            .references
            .delete_currency(owner_id, currency_id)
            .await
            .map_err(|e| ServiceError::from_constraint(e, IN_USE))?;
        if !deleted {
            return Err(ServiceError::not_found("Currency", currency_id));
        }
        info!("Deleted currency {} of user {}", currency_id, owner_id);
        Ok(())
    }

    pub async fn create_bank(&self, owner_id: &str, request: BankRequest) -> ServiceResult<Bank> {
        let bank = Bank {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: required_text(&request.name, "name", NAME_MAX_LEN)?,
            country: required_text(&request.country, "country", NAME_MAX_LEN)?,
        };
        self.references.store_bank(&bank).await?;
        info!("Created bank {} for user {}", bank.name, owner_id);
        Ok(bank)
    }

    pub async fn list_banks(&self, owner_id: &str) -> ServiceResult<Vec<Bank>> {
        Ok(self.references.list_banks(owner_id).await?)
    }

    pub async fn get_bank(&self, owner_id: &str, bank_id: &str) -> ServiceResult<Bank> {
        match self.references.find_bank(bank_id).await? {
            Some(bank) if bank.owner_id == owner_id => Ok(bank),
            _ => Err(ServiceError::not_found("Bank", bank_id)),
        }
    }

    pub async fn update_bank(&self, owner_id: &str, bank_id: &str, request: BankRequest) -> ServiceResult<Bank> {
        let mut bank = self.get_bank(owner_id, bank_id).await?;
        bank.name = required_text(&request.name, "name", NAME_MAX_LEN)?;
        bank.country = required_text(&request.country, "country", NAME_MAX_LEN)?;

        if !self.references.update_bank(&bank).await? {
            return Err(ServiceError::not_found("Bank", bank_id));
        }
        Ok(bank)
    }

    pub async fn delete_bank(&self, owner_id: &str, bank_id: &str) -> ServiceResult<()> {
        let deleted = self
            .references
            .delete_bank(owner_id, bank_id)
            .await
            .map_err(|e| ServiceError::from_constraint(e, IN_USE))?;
        if !deleted {
            return Err(ServiceError::not_found("Bank", bank_id));
        }
        info!("Deleted bank {} of user {}", bank_id, owner_id);
        Ok(())
    }

    pub async fn create_account_type(&self, owner_id: &str, request: AccountTypeRequest) -> ServiceResult<AccountType> {
        let account_type = AccountType {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: required_text(&request.name, "name", NAME_MAX_LEN)?,
        };
        self.references.store_account_type(&account_type).await?;
        info!("Created account type {} for user {}", account_type.name, owner_id);
        Ok(account_type)
    }

    pub async fn list_account_types(&self, owner_id: &str) -> ServiceResult<Vec<AccountType>> {
        Ok(self.references.list_account_types(owner_id).await?)
    }

    pub async fn get_account_type(&self, owner_id: &str, account_type_id: &str) -> ServiceResult<AccountType> {
        match self.references.find_account_type(account_type_id).await? {
            Some(account_type) if account_type.owner_id == owner_id => Ok(account_type),
            _ => Err(ServiceError::not_found("Account type", account_type_id)),
        }
    }

    pub async fn update_account_type(
        &self,
        owner_id: &str,
        account_type_id: &str,
        request: AccountTypeRequest,
    ) -> ServiceResult<AccountType> {
        let mut account_type = self.get_account_type(owner_id, account_type_id).await?;
        account_type.name = required_text(&request.name, "name", NAME_MAX_LEN)?;

        if !self.references.update_account_type(&account_type).await? {
            return Err(ServiceError::not_found("Account type", account_type_id));
        }
        Ok(account_type)
    }

    pub async fn delete_account_type(&self, owner_id: &str, account_type_id: &str) -> ServiceResult<()> {
        let deleted = self
            .references
            .delete_account_type(owner_id, account_type_id)
            .await
            .map_err(|e| ServiceError::from_constraint(e, IN_USE))?;
        if !deleted {
            return Err(ServiceError::not_found("Account type", account_type_id));
        }
        info!("Deleted account type {} of user {}", account_type_id, owner_id);
        Ok(())
    }

    /// Check that a currency named in a request body exists and belongs to
    /// the caller
    pub async fn resolve_currency(&self, owner_id: &str, currency_id: &str) -> ServiceResult<Currency> {
        let currency = self
            .references
            .find_currency(currency_id)
            .await?
            .ok_or_else(|| unknown("currency", currency_id))?;
        if currency.owner_id != owner_id {
            return Err(ValidationError::NotOwned { resource: "Currency" }.into());
        }
        Ok(currency)
    }

    pub async fn resolve_bank(&self, owner_id: &str, bank_id: &str) -> ServiceResult<Bank> {
        let bank = self
            .references
            .find_bank(bank_id)
            .await?
            .ok_or_else(|| unknown("bank", bank_id))?;
        if bank.owner_id != owner_id {
            return Err(ValidationError::NotOwned { resource: "Bank" }.into());
        }
        Ok(bank)
    }

    pub async fn resolve_account_type(&self, owner_id: &str, account_type_id: &str) -> ServiceResult<AccountType> {
        let account_type = self
            .references
            .find_account_type(account_type_id)
            .await?
            .ok_or_else(|| unknown("account type", account_type_id))?;
        if account_type.owner_id != owner_id {
            return Err(ValidationError::NotOwned { resource: "Account type" }.into());
        }
        Ok(account_type)
    }
}

fn unknown(resource: &'static str, id: &str) -> ServiceError {
    ValidationError::UnknownReference {
        resource,
        id: id.to_string(),
    }
    .into()
}

use crate::domain::models::{AccountType, Bank, Category, Currency, User};
use crate::io::rest::mappers::TransactionMapper;

/// Owned lookup data has no owner field on the wire: callers only ever see
/// their own rows.
pub struct ReferenceMapper;

impl ReferenceMapper {
    pub fn to_user_dto(user: User) -> shared::User {
        shared::User {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }

    pub fn to_currency_dto(currency: Currency) -> shared::Currency {
        shared::Currency {
            id: currency.id,
            name: currency.name,
            code: currency.code,
            symbol: currency.symbol,
        }
    }

    pub fn to_bank_dto(bank: Bank) -> shared::Bank {
        shared::Bank {
            id: bank.id,
            name: bank.name,
            country: bank.country,
        }
    }

    pub fn to_account_type_dto(account_type: AccountType) -> shared::AccountType {
        shared::AccountType {
            id: account_type.id,
            name: account_type.name,
        }
    }

    pub fn to_category_dto(category: Category) -> shared::Category {
        shared::Category {
            id: category.id,
            kind: TransactionMapper::to_dto_kind(category.kind),
            name: category.name,
            description: category.description,
        }
    }
}

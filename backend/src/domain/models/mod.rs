//! Domain models. Storage rows map into these and the REST mappers turn
//! them into `shared` DTOs.

pub mod account;
pub mod balance_history;
pub mod budget;
pub mod category;
pub mod reference;
pub mod transaction;
pub mod user;

pub use account::Account;
pub use balance_history::BalanceSnapshot;
pub use budget::{Budget, BudgetAllocation};
pub use category::Category;
pub use reference::{AccountType, Bank, Currency};
pub use transaction::{signed_delta, Transaction, TransactionKind};
pub use user::User;

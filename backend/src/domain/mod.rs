//! # Domain Module
//!
//! Business logic of the finance tracker. Services validate requests,
//! enforce ownership and drive the repositories. Every transaction write
//! goes through the [`ledger`], which keeps account balances and the
//! daily balance history consistent with the transaction log.

pub mod account_locks;
pub mod account_service;
pub mod budget_service;
pub mod category_service;
pub mod error;
pub mod ledger;
pub mod models;
pub mod money;
pub mod pagination;
pub mod reference_service;
pub mod transaction_service;
pub mod user_service;
pub mod validation;

pub use account_locks::AccountLocks;
pub use account_service::{AccountService, BalanceAudit, HistoryPage};
pub use budget_service::{BudgetService, BudgetSummary};
pub use category_service::CategoryService;
pub use error::{ServiceError, ServiceResult, ValidationError};
pub use ledger::{BalanceLedger, LedgerMaintainer, PropagationMode};
pub use money::Money;
pub use reference_service::ReferenceService;
pub use transaction_service::{TransactionPage, TransactionService};
pub use user_service::UserService;

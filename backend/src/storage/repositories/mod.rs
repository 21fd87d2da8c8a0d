// Repository modules
pub mod account_repository;
pub mod balance_history_repository;
pub mod budget_repository;
pub mod category_repository;
pub mod reference_repository;
pub mod transaction_repository;
pub mod user_repository;

// Re-export repository types
pub use account_repository::AccountRepository;
pub use balance_history_repository::{BalanceHistoryRepository, HistoryRange};
pub use budget_repository::BudgetRepository;
pub use category_repository::CategoryRepository;
pub use reference_repository::ReferenceRepository;
pub use transaction_repository::{TransactionFilter, TransactionRepository, TransactionTotals};
pub use user_repository::UserRepository;

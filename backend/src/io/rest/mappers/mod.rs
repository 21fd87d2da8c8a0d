pub mod account_mapper;
pub mod budget_mapper;
pub mod reference_mapper;
pub mod transaction_mapper;

pub use account_mapper::AccountMapper;
pub use budget_mapper::BudgetMapper;
pub use reference_mapper::ReferenceMapper;
pub use transaction_mapper::TransactionMapper;

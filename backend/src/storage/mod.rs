//! # Storage Module
//!
//! SQLite persistence for the finance tracker, built on SQLx.
//!
//! Repositories expose two flavours of method:
//! - reads that take the shared pool, for request validation and read APIs
//! - writes that take `&mut SqliteConnection`, so the caller can run several
//!   of them (transaction row, balance, history) inside one database
//!   transaction
//!
//! Money columns hold integer cents. Dates are `YYYY-MM-DD` text and
//! timestamps fixed-width RFC 3339 UTC text, so text ordering is time
//! ordering.

pub mod codec;
pub mod connection;
pub mod repositories;

pub use connection::DbConnection;
pub use repositories::{
    AccountRepository, BalanceHistoryRepository, BudgetRepository, CategoryRepository, HistoryRange,
    ReferenceRepository, TransactionFilter, TransactionRepository, TransactionTotals, UserRepository,
};

//! Error types returned by the domain services.

use thiserror::Error;

/// Input rules checked before any write reaches storage or the ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
    #[error("{field} is too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be positive")]
    NonPositiveAmount { field: &'static str },
    #[error("{field} cannot be negative")]
    NegativeAmount { field: &'static str },
    #[error("{field} must have at most 2 fraction digits")]
    TooManyFractionDigits { field: &'static str },
    #[error("{field} is out of range")]
    AmountOutOfRange { field: &'static str },
    #[error("Currency code must be 3 uppercase letters")]
    InvalidCurrencyCode,
    #[error("Email address is invalid")]
    InvalidEmail,
    #[error("Start date must be earlier than or equal to end date")]
    InvalidPeriod,
    #[error("Unknown {resource}: {id}")]
    UnknownReference { resource: &'static str, id: String },
    #[error("{resource} does not belong to the current user")]
    NotOwned { resource: &'static str },
    #[error("Category is a {actual} category, expected {expected}")]
    CategoryKindMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Unknown or missing user")]
    Unauthorized,
    #[error("{0}")]
    Conflict(String),
    #[error("Storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Translate constraint violations into conflicts, keep everything else
    /// as a storage failure.
    pub fn from_constraint(error: sqlx::Error, conflict: &str) -> Self {
        match &error {
            sqlx::Error::Database(db)
                if db.is_unique_violation() || db.is_foreign_key_violation() =>
            {
                Self::Conflict(conflict.to_string())
            }
            _ => Self::Storage(error),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

//! # REST API Interface Layer
//!
//! One module per resource, each exposing a `router()` that `create_router`
//! nests under `/api`. Every handler except user registration and health
//! runs on behalf of the [`CurrentUser`](owner::CurrentUser) named by the
//! `X-User-Id` header.

pub mod account_apis;
pub mod budget_apis;
pub mod category_apis;
pub mod error;
pub mod health_apis;
pub mod mappers;
pub mod owner;
pub mod reference_apis;
pub mod transaction_apis;
pub mod user_apis;

pub use owner::{CurrentUser, USER_ID_HEADER};

//! # IO Module
//!
//! HTTP interface of the finance tracker. Handlers translate JSON requests
//! into service calls and domain results back into `shared` DTOs.

pub mod rest;

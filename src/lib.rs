//! Time Bank Library
//!
//! Re-exports modules for the server binary and integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod store;

mod error;

pub use config::Config;
pub use domain::{Account, DomainError, OperationContext, Service, TransactionRecord};
pub use error::{AppError, ErrorResponse};

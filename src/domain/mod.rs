//! Domain module
//!
//! Core domain types and business rules.

pub mod account;
pub mod context;
pub mod error;
pub mod service;
pub mod transaction;

pub use account::{Account, AccountDraft};
pub use context::OperationContext;
pub use error::DomainError;
pub use service::{Service, ServiceDraft, DEFAULT_DURATION_MINUTES};
pub use transaction::{NewTransaction, TransactionRecord};

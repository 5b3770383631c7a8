//! Store module
//!
//! Persistence seam for accounts, services and the transaction log.
//! Handlers depend on the `TimeBankStore` trait; `PgStore` backs it with
//! PostgreSQL and `MemoryStore` keeps everything in process.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;

use crate::domain::{
    Account, AccountDraft, NewTransaction, Service, ServiceDraft, TransactionRecord,
};

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Keyed reads and writes over users, services and transactions.
#[async_trait]
pub trait TimeBankStore: Send + Sync {
    async fn create_user(&self, draft: AccountDraft) -> Result<Account, StoreError>;

    /// All users in ascending id order
    async fn list_users(&self) -> Result<Vec<Account>, StoreError>;

    async fn get_user(&self, id: i64) -> Result<Option<Account>, StoreError>;

    /// Replace name and balance; `None` when the user does not exist
    async fn update_user(
        &self,
        id: i64,
        draft: AccountDraft,
    ) -> Result<Option<Account>, StoreError>;

    /// Returns whether a user was deleted
    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;

    async fn create_service(&self, draft: ServiceDraft) -> Result<Service, StoreError>;

    async fn list_services(&self) -> Result<Vec<Service>, StoreError>;

    /// The transaction log in append order
    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, StoreError>;

    async fn get_transaction(&self, id: i64) -> Result<Option<TransactionRecord>, StoreError>;

    /// Open a unit of work. Nothing it does is visible to other callers
    /// until `commit`; dropping it rolls everything back.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;
}

/// A single store transaction used by the transfer path.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Read an account and hold it locked until the unit ends.
    async fn lock_account(&mut self, id: i64) -> Result<Option<Account>, StoreError>;

    /// Add `delta` to an account's balance.
    async fn adjust_balance(&mut self, id: i64, delta: i64) -> Result<(), StoreError>;

    /// Append a record to the transaction log and return it with its identity.
    async fn append_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

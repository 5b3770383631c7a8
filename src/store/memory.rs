//! In-memory store
//!
//! Keeps all state behind one async mutex. A unit of work holds the lock for
//! its whole lifetime and writes in place, remembering what it touched; a unit
//! dropped without `commit` puts those values back.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    Account, AccountDraft, NewTransaction, Service, ServiceDraft, TransactionRecord,
};

use super::{StoreError, TimeBankStore, UnitOfWork};

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, Account>,
    services: BTreeMap<i64, Service>,
    transactions: Vec<TransactionRecord>,
    last_user_id: i64,
    last_service_id: i64,
    last_transaction_id: i64,
}

/// Process-local store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_appends: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following transaction append fail with a backend error.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TimeBankStore for MemoryStore {
    async fn create_user(&self, draft: AccountDraft) -> Result<Account, StoreError> {
        let mut state = self.state.lock().await;
        state.last_user_id += 1;

        let account = Account {
            id: state.last_user_id,
            name: draft.name,
            minutes_balance: draft.minutes_balance,
        };
        state.users.insert(account.id, account.clone());

        Ok(account)
    }

    async fn list_users(&self) -> Result<Vec<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.values().cloned().collect())
    }

    async fn get_user(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn update_user(
        &self,
        id: i64,
        draft: AccountDraft,
    ) -> Result<Option<Account>, StoreError> {
        let mut state = self.state.lock().await;

        Ok(state.users.get_mut(&id).map(|account| {
            account.name = draft.name;
            account.minutes_balance = draft.minutes_balance;
            account.clone()
        }))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.users.remove(&id).is_some())
    }

    async fn create_service(&self, draft: ServiceDraft) -> Result<Service, StoreError> {
        let mut state = self.state.lock().await;
        state.last_service_id += 1;

        let service = Service {
            id: state.last_service_id,
            title: draft.title,
            description: draft.description,
            provider_user_id: draft.provider_user_id,
            duration_minutes: draft.duration_minutes,
        };
        state.services.insert(service.id, service.clone());

        Ok(service)
    }

    async fn list_services(&self) -> Result<Vec<Service>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.services.values().cloned().collect())
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.transactions.clone())
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<TransactionRecord>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.transactions.iter().find(|record| record.id == id).cloned())
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let undo = Undo {
            balances: BTreeMap::new(),
            log_len: guard.transactions.len(),
            last_transaction_id: guard.last_transaction_id,
        };

        Ok(Box::new(MemoryUnitOfWork {
            guard,
            undo: Some(undo),
            fail_appends: self.fail_appends.load(Ordering::SeqCst),
        }))
    }
}

/// Values overwritten by an open unit of work
struct Undo {
    /// Balance of each adjusted account before its first adjustment
    balances: BTreeMap<i64, i64>,
    log_len: usize,
    last_transaction_id: i64,
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    /// `None` once committed
    undo: Option<Undo>,
    fail_appends: bool,
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        let Some(undo) = self.undo.take() else {
            return;
        };

        let state = &mut *self.guard;
        for (id, balance) in undo.balances {
            if let Some(account) = state.users.get_mut(&id) {
                account.minutes_balance = balance;
            }
        }
        state.transactions.truncate(undo.log_len);
        state.last_transaction_id = undo.last_transaction_id;
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_account(&mut self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.guard.users.get(&id).cloned())
    }

    async fn adjust_balance(&mut self, id: i64, delta: i64) -> Result<(), StoreError> {
        let account = self
            .guard
            .users
            .get_mut(&id)
            .ok_or(StoreError::RowNotFound { table: "users", id })?;
        let balance = account
            .minutes_balance
            .checked_add(delta)
            .ok_or_else(|| StoreError::Backend(format!("balance overflow for user {}", id)))?;

        if let Some(undo) = self.undo.as_mut() {
            undo.balances.entry(id).or_insert(account.minutes_balance);
        }
        account.minutes_balance = balance;
        Ok(())
    }

    async fn append_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, StoreError> {
        if self.fail_appends {
            return Err(StoreError::Backend("transaction log unavailable".to_string()));
        }

        let state = &mut *self.guard;
        state.last_transaction_id += 1;
        let record = transaction.into_record(state.last_transaction_id, Utc::now());
        state.transactions.push(record.clone());

        Ok(record)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut unit = self;
        unit.undo = None;
        Ok(())
    }
}

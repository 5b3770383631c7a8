//! Application state shared across routes

use std::sync::Arc;

use crate::handlers::TransferPolicy;
use crate::store::TimeBankStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TimeBankStore>,
    pub transfer_policy: TransferPolicy,
}

impl AppState {
    pub fn new(store: Arc<dyn TimeBankStore>, transfer_policy: TransferPolicy) -> Self {
        Self {
            store,
            transfer_policy,
        }
    }
}

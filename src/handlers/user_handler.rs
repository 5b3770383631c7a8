//! User Handler
//!
//! Account CRUD over the store.

use std::sync::Arc;

use crate::domain::{Account, AccountDraft};
use crate::error::AppError;
use crate::store::TimeBankStore;

/// Handler for user accounts
pub struct UserHandler {
    store: Arc<dyn TimeBankStore>,
}

impl UserHandler {
    pub fn new(store: Arc<dyn TimeBankStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: AccountDraft) -> Result<Account, AppError> {
        let account = self.store.create_user(draft).await?;

        tracing::info!(user_id = account.id, "User created");
        Ok(account)
    }

    pub async fn list(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.store.list_users().await?)
    }

    pub async fn get(&self, user_id: i64) -> Result<Account, AppError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(AppError::UserNotFound(user_id))
    }

    /// Replace the name and balance of an existing user
    pub async fn update(&self, user_id: i64, draft: AccountDraft) -> Result<Account, AppError> {
        let account = self
            .store
            .update_user(user_id, draft)
            .await?
            .ok_or(AppError::UserNotFound(user_id))?;

        tracing::info!(user_id, "User updated");
        Ok(account)
    }

    /// Delete a user. Their services and transaction records stay.
    pub async fn delete(&self, user_id: i64) -> Result<(), AppError> {
        if !self.store.delete_user(user_id).await? {
            return Err(AppError::UserNotFound(user_id));
        }

        tracing::info!(user_id, "User deleted");
        Ok(())
    }
}

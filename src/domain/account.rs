//! Account
//!
//! A time bank user together with their minute balance.

use serde::{Deserialize, Serialize};

use super::DomainError;

/// A user's identity plus minute balance.
///
/// The balance is a plain integer: no floor is enforced, so it may go
/// negative through direct updates or negative transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub minutes_balance: i64,
}

impl Account {
    /// Check that this account can pay `minutes` out of its balance.
    pub fn ensure_can_pay(&self, minutes: i64) -> Result<(), DomainError> {
        if self.minutes_balance < minutes {
            return Err(DomainError::insufficient_minutes(minutes, self.minutes_balance));
        }
        Ok(())
    }
}

/// Fields for creating or fully replacing an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDraft {
    pub name: String,
    pub minutes_balance: i64,
}

impl AccountDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            minutes_balance: 0,
        }
    }

    pub fn with_balance(mut self, minutes_balance: i64) -> Self {
        self.minutes_balance = minutes_balance;
        self
    }
}

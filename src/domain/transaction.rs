//! Transaction records
//!
//! The append-only audit log of completed transfers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record of one completed transfer.
///
/// `minutes` moved from the recipient's balance to the provider's balance.
/// Ids are assigned on append and increase in append order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TransactionRecord {
    pub id: i64,
    pub provider_user_id: i64,
    pub recipient_user_id: i64,
    pub minutes: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A record about to be appended to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub provider_user_id: i64,
    pub recipient_user_id: i64,
    pub minutes: i64,
    pub description: Option<String>,
}

impl NewTransaction {
    /// Attach the store-assigned identity and timestamp.
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord {
            id,
            provider_user_id: self.provider_user_id,
            recipient_user_id: self.recipient_user_id,
            minutes: self.minutes,
            description: self.description,
            created_at,
        }
    }
}

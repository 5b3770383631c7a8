//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::{Deserialize, Serialize};

use crate::domain::NewTransaction;

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to move minutes from a recipient to a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCommand {
    /// User who performed the service and receives the minutes
    pub provider_user_id: i64,
    /// User who received the service and pays the minutes
    pub recipient_user_id: i64,
    pub minutes: i64,
    pub description: Option<String>,
}

impl TransferCommand {
    pub fn new(provider_user_id: i64, recipient_user_id: i64, minutes: i64) -> Self {
        Self {
            provider_user_id,
            recipient_user_id,
            minutes,
            description: None,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn is_self_transfer(&self) -> bool {
        self.provider_user_id == self.recipient_user_id
    }

    /// The log record this command appends once applied
    pub fn to_new_transaction(&self) -> NewTransaction {
        NewTransaction {
            provider_user_id: self.provider_user_id,
            recipient_user_id: self.recipient_user_id,
            minutes: self.minutes,
            description: self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_command() {
        let cmd = TransferCommand::new(1, 2, 30).with_description("Gardening".to_string());

        assert_eq!(cmd.minutes, 30);
        assert_eq!(cmd.description, Some("Gardening".to_string()));
        assert!(!cmd.is_self_transfer());
        assert!(TransferCommand::new(4, 4, 10).is_self_transfer());
    }

    #[test]
    fn test_new_transaction_keeps_fields() {
        let cmd = TransferCommand::new(1, 2, 30);
        let new_tx = cmd.to_new_transaction();

        assert_eq!(new_tx.provider_user_id, 1);
        assert_eq!(new_tx.recipient_user_id, 2);
        assert_eq!(new_tx.minutes, 30);
        assert!(new_tx.description.is_none());
    }
}

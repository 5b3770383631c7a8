//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Business rule violations raised while validating a transfer.
///
/// The display strings are what API clients see in the `detail` field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Provider or recipient does not resolve to an account
    #[error("Invalid provider or recipient")]
    ParticipantNotFound {
        provider_user_id: i64,
        recipient_user_id: i64,
    },

    /// Recipient's balance is below the requested minutes
    #[error("Recipient does not have enough minutes to pay")]
    InsufficientMinutes { required: i64, available: i64 },

    /// Zero or negative minutes (strict policy only)
    #[error("Minutes must be positive")]
    NonPositiveMinutes(i64),

    /// Provider and recipient are the same account (strict policy only)
    #[error("Provider and recipient must be different users")]
    SameAccountTransfer,
}

impl DomainError {
    /// Create an insufficient minutes error
    pub fn insufficient_minutes(required: i64, available: i64) -> Self {
        Self::InsufficientMinutes {
            required,
            available,
        }
    }

    /// Check if this error means a referenced account is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ParticipantNotFound { .. })
    }
}

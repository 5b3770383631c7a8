//! Transfer Handler
//!
//! Validates a transfer between two users and applies it atomically: both
//! balance adjustments and the transaction log append commit together or
//! not at all.

use std::sync::Arc;

use crate::domain::{Account, DomainError, OperationContext, TransactionRecord};
use crate::error::AppError;
use crate::store::{StoreError, TimeBankStore, UnitOfWork};

use super::TransferCommand;

/// Optional hardening of transfer validation.
///
/// The permissive policy accepts zero or negative minutes and transfers
/// where provider and recipient are the same user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferPolicy {
    pub strict: bool,
}

impl TransferPolicy {
    pub fn permissive() -> Self {
        Self { strict: false }
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Checks that need no stored state
    pub fn check(&self, command: &TransferCommand) -> Result<(), DomainError> {
        if !self.strict {
            return Ok(());
        }
        if command.minutes <= 0 {
            return Err(DomainError::NonPositiveMinutes(command.minutes));
        }
        if command.is_self_transfer() {
            return Err(DomainError::SameAccountTransfer);
        }
        Ok(())
    }
}

/// Handler for minute transfers and transaction log reads
pub struct TransferHandler {
    store: Arc<dyn TimeBankStore>,
    policy: TransferPolicy,
}

impl TransferHandler {
    pub fn new(store: Arc<dyn TimeBankStore>, policy: TransferPolicy) -> Self {
        Self { store, policy }
    }

    /// Execute the transfer command
    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransactionRecord, AppError> {
        if let Err(e) = self.policy.check(&command) {
            tracing::warn!(correlation_id = ?context.correlation_id, "Transfer rejected: {}", e);
            return Err(e.into());
        }

        let debit = command
            .minutes
            .checked_neg()
            .ok_or_else(|| AppError::InvalidRequest("minutes out of range".to_string()))?;

        let mut unit = self.store.begin().await?;

        let (provider, recipient) = lock_participants(
            &mut *unit,
            command.provider_user_id,
            command.recipient_user_id,
        )
        .await?;

        let recipient = match (provider, recipient) {
            (Some(_), Some(recipient)) => recipient,
            _ => {
                tracing::warn!(
                    correlation_id = ?context.correlation_id,
                    provider_user_id = command.provider_user_id,
                    recipient_user_id = command.recipient_user_id,
                    "Transfer rejected: unknown participant"
                );
                return Err(DomainError::ParticipantNotFound {
                    provider_user_id: command.provider_user_id,
                    recipient_user_id: command.recipient_user_id,
                }
                .into());
            }
        };

        if let Err(e) = recipient.ensure_can_pay(command.minutes) {
            tracing::warn!(
                correlation_id = ?context.correlation_id,
                recipient_user_id = recipient.id,
                balance = recipient.minutes_balance,
                minutes = command.minutes,
                "Transfer rejected: {}",
                e
            );
            return Err(e.into());
        }

        unit.adjust_balance(command.provider_user_id, command.minutes).await?;
        unit.adjust_balance(command.recipient_user_id, debit).await?;
        let record = unit.append_transaction(command.to_new_transaction()).await?;

        unit.commit().await?;

        tracing::info!(
            correlation_id = ?context.correlation_id,
            transaction_id = record.id,
            provider_user_id = record.provider_user_id,
            recipient_user_id = record.recipient_user_id,
            minutes = record.minutes,
            "Transfer completed"
        );

        Ok(record)
    }

    /// The whole transaction log in append order
    pub async fn list(&self) -> Result<Vec<TransactionRecord>, AppError> {
        Ok(self.store.list_transactions().await?)
    }

    pub async fn get(&self, transaction_id: i64) -> Result<TransactionRecord, AppError> {
        self.store
            .get_transaction(transaction_id)
            .await?
            .ok_or(AppError::TransactionNotFound(transaction_id))
    }
}

/// Lock both participants, lower id first, so that two transfers over the
/// same pair in opposite directions cannot deadlock. Returns
/// `(provider, recipient)`.
async fn lock_participants(
    unit: &mut dyn UnitOfWork,
    provider_user_id: i64,
    recipient_user_id: i64,
) -> Result<(Option<Account>, Option<Account>), StoreError> {
    if provider_user_id == recipient_user_id {
        let account = unit.lock_account(provider_user_id).await?;
        return Ok((account.clone(), account));
    }

    let first = provider_user_id.min(recipient_user_id);
    let second = provider_user_id.max(recipient_user_id);

    let first_account = unit.lock_account(first).await?;
    let second_account = unit.lock_account(second).await?;

    if first == provider_user_id {
        Ok((first_account, second_account))
    } else {
        Ok((second_account, first_account))
    }
}

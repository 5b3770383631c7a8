//! Handler tests
//!
//! Run against the in-memory store; the PostgreSQL equivalents live in
//! tests/integration_postgres.rs.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::domain::{AccountDraft, DomainError, OperationContext, ServiceDraft};
    use crate::error::AppError;
    use crate::handlers::{
        ServiceHandler, TransferCommand, TransferHandler, TransferPolicy, UserHandler,
    };
    use crate::store::{MemoryStore, TimeBankStore};

    struct Fixture {
        store: MemoryStore,
        transfers: TransferHandler,
        users: UserHandler,
        alice: i64,
        bob: i64,
    }

    /// Alice starts with 0 minutes, Bob with 100.
    async fn fixture(policy: TransferPolicy) -> Fixture {
        let store = MemoryStore::new();
        let shared: Arc<dyn TimeBankStore> = Arc::new(store.clone());
        let users = UserHandler::new(shared.clone());

        let alice = users.create(AccountDraft::new("Alice")).await.unwrap().id;
        let bob = users
            .create(AccountDraft::new("Bob").with_balance(100))
            .await
            .unwrap()
            .id;

        Fixture {
            store,
            transfers: TransferHandler::new(shared, policy),
            users,
            alice,
            bob,
        }
    }

    async fn balance(f: &Fixture, user_id: i64) -> i64 {
        f.users.get(user_id).await.unwrap().minutes_balance
    }

    // =========================================================================
    // Successful transfers
    // =========================================================================

    #[tokio::test]
    async fn test_transfer_moves_minutes_to_provider() {
        let f = fixture(TransferPolicy::permissive()).await;
        let context = OperationContext::new();

        let record = f
            .transfers
            .execute(TransferCommand::new(f.alice, f.bob, 30), &context)
            .await
            .unwrap();

        assert_eq!(record.provider_user_id, f.alice);
        assert_eq!(record.recipient_user_id, f.bob);
        assert_eq!(record.minutes, 30);
        assert!(record.description.is_none());

        assert_eq!(balance(&f, f.alice).await, 30);
        assert_eq!(balance(&f, f.bob).await, 70);

        let log = f.transfers.list().await.unwrap();
        assert_eq!(log, vec![record.clone()]);
        assert_eq!(f.transfers.get(record.id).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_transfer_of_whole_balance() {
        let f = fixture(TransferPolicy::permissive()).await;

        f.transfers
            .execute(TransferCommand::new(f.alice, f.bob, 100), &OperationContext::new())
            .await
            .unwrap();

        assert_eq!(balance(&f, f.alice).await, 100);
        assert_eq!(balance(&f, f.bob).await, 0);
    }

    #[tokio::test]
    async fn test_description_is_recorded() {
        let f = fixture(TransferPolicy::permissive()).await;
        let command = TransferCommand::new(f.alice, f.bob, 15)
            .with_description("Bike repair".to_string());

        let record = f
            .transfers
            .execute(command, &OperationContext::new())
            .await
            .unwrap();

        assert_eq!(record.description.as_deref(), Some("Bike repair"));
    }

    #[tokio::test]
    async fn test_identical_transfers_are_not_deduplicated() {
        let f = fixture(TransferPolicy::permissive()).await;
        let context = OperationContext::new();

        let first = f
            .transfers
            .execute(TransferCommand::new(f.alice, f.bob, 20), &context)
            .await
            .unwrap();
        let second = f
            .transfers
            .execute(TransferCommand::new(f.alice, f.bob, 20), &context)
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.id > first.id);
        assert_eq!(balance(&f, f.alice).await, 40);
        assert_eq!(balance(&f, f.bob).await, 60);
        assert_eq!(f.transfers.list().await.unwrap().len(), 2);
    }

    // =========================================================================
    // Rejected transfers
    // =========================================================================

    #[tokio::test]
    async fn test_insufficient_minutes_changes_nothing() {
        let f = fixture(TransferPolicy::permissive()).await;

        let result = f
            .transfers
            .execute(TransferCommand::new(f.alice, f.bob, 200), &OperationContext::new())
            .await;

        match result {
            Err(AppError::Domain(DomainError::InsufficientMinutes {
                required,
                available,
            })) => {
                assert_eq!(required, 200);
                assert_eq!(available, 100);
            }
            other => panic!("Expected InsufficientMinutes, got: {:?}", other),
        }

        assert_eq!(balance(&f, f.alice).await, 0);
        assert_eq!(balance(&f, f.bob).await, 100);
        assert!(f.transfers.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_balance_is_not_checked() {
        let f = fixture(TransferPolicy::permissive()).await;

        // Alice has nothing but is the provider, so only Bob's balance matters
        let result = f
            .transfers
            .execute(TransferCommand::new(f.alice, f.bob, 50), &OperationContext::new())
            .await;
        assert!(result.is_ok());

        // Alice as recipient with 50 minutes cannot pay 60
        let result = f
            .transfers
            .execute(TransferCommand::new(f.bob, f.alice, 60), &OperationContext::new())
            .await;
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::InsufficientMinutes { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_not_found() {
        let f = fixture(TransferPolicy::permissive()).await;

        let result = f
            .transfers
            .execute(TransferCommand::new(99, f.bob, 10), &OperationContext::new())
            .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::ParticipantNotFound {
                provider_user_id: 99,
                ..
            })
        ));
        assert_eq!(err.to_string(), "Invalid provider or recipient");
        assert_eq!(balance(&f, f.bob).await, 100);
        assert!(f.transfers.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_not_found() {
        let f = fixture(TransferPolicy::permissive()).await;

        let result = f
            .transfers
            .execute(TransferCommand::new(f.alice, 99, 0), &OperationContext::new())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::ParticipantNotFound { .. }))
        ));
        assert_eq!(balance(&f, f.alice).await, 0);
    }

    #[tokio::test]
    async fn test_missing_participant_wins_over_insufficient_minutes() {
        let f = fixture(TransferPolicy::permissive()).await;

        let result = f
            .transfers
            .execute(TransferCommand::new(99, f.alice, 500), &OperationContext::new())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::ParticipantNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_deleted_user_cannot_take_part() {
        let f = fixture(TransferPolicy::permissive()).await;
        f.users.delete(f.alice).await.unwrap();

        let result = f
            .transfers
            .execute(TransferCommand::new(f.alice, f.bob, 10), &OperationContext::new())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::ParticipantNotFound { .. }))
        ));
    }

    // =========================================================================
    // Atomicity
    // =========================================================================

    #[tokio::test]
    async fn test_storage_failure_rolls_back_balances() {
        let f = fixture(TransferPolicy::permissive()).await;
        f.store.set_fail_appends(true);

        let result = f
            .transfers
            .execute(TransferCommand::new(f.alice, f.bob, 30), &OperationContext::new())
            .await;

        assert!(matches!(result, Err(AppError::Store(_))));
        assert_eq!(balance(&f, f.alice).await, 0);
        assert_eq!(balance(&f, f.bob).await, 100);
        assert!(f.transfers.list().await.unwrap().is_empty());

        // The store recovers once appends work again
        f.store.set_fail_appends(false);
        f.transfers
            .execute(TransferCommand::new(f.alice, f.bob, 30), &OperationContext::new())
            .await
            .unwrap();
        assert_eq!(balance(&f, f.bob).await, 70);
    }

    #[tokio::test]
    async fn test_concurrent_debits_never_overdraw() {
        let f = fixture(TransferPolicy::permissive()).await;
        let shared: Arc<dyn TimeBankStore> = Arc::new(f.store.clone());

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let handler = TransferHandler::new(shared.clone(), TransferPolicy::permissive());
            let (alice, bob) = (f.alice, f.bob);
            tasks.push(tokio::spawn(async move {
                handler
                    .execute(TransferCommand::new(alice, bob, 30), &OperationContext::new())
                    .await
            }));
        }

        let mut succeeded = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 3);
        assert_eq!(balance(&f, f.alice).await, 90);
        assert_eq!(balance(&f, f.bob).await, 10);
        assert_eq!(f.transfers.list().await.unwrap().len(), 3);
    }

    /// Runs `count` one-minute transfers back and forth between Alice and Bob
    async fn ping_pong(f: &Fixture, count: usize) -> std::time::Duration {
        let context = OperationContext::new();
        let start = std::time::Instant::now();
        for i in 0..count {
            let (provider, recipient) = if i % 2 == 0 {
                (f.alice, f.bob)
            } else {
                (f.bob, f.alice)
            };
            f.transfers
                .execute(TransferCommand::new(provider, recipient, 1), &context)
                .await
                .unwrap();
        }
        start.elapsed()
    }

    #[tokio::test]
    async fn test_transfer_cost_does_not_grow_with_log() {
        let f = fixture(TransferPolicy::permissive()).await;

        let early = ping_pong(&f, 1_000).await;
        ping_pong(&f, 50_000).await;
        let late = ping_pong(&f, 1_000).await;

        assert_eq!(f.transfers.list().await.unwrap().len(), 52_000);
        assert_eq!(balance(&f, f.bob).await, 100);
        assert!(
            late <= early * 5 + std::time::Duration::from_millis(100),
            "1000 transfers took {:?} on an empty log but {:?} on a 51000 record log",
            early,
            late
        );
    }

    // =========================================================================
    // Permissive vs strict policy
    // =========================================================================

    #[tokio::test]
    async fn test_permissive_self_transfer_records_without_net_change() {
        let f = fixture(TransferPolicy::permissive()).await;

        let record = f
            .transfers
            .execute(TransferCommand::new(f.bob, f.bob, 40), &OperationContext::new())
            .await
            .unwrap();

        assert_eq!(record.provider_user_id, record.recipient_user_id);
        assert_eq!(balance(&f, f.bob).await, 100);
        assert_eq!(f.transfers.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_permissive_negative_minutes_reverse_the_flow() {
        let f = fixture(TransferPolicy::permissive()).await;

        f.transfers
            .execute(TransferCommand::new(f.bob, f.alice, -25), &OperationContext::new())
            .await
            .unwrap();

        assert_eq!(balance(&f, f.bob).await, 75);
        assert_eq!(balance(&f, f.alice).await, 25);
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_before_touching_store() {
        let f = fixture(TransferPolicy::strict()).await;

        let zero = f
            .transfers
            .execute(TransferCommand::new(f.alice, f.bob, 0), &OperationContext::new())
            .await;
        assert!(matches!(
            zero,
            Err(AppError::Domain(DomainError::NonPositiveMinutes(0)))
        ));

        let same = f
            .transfers
            .execute(TransferCommand::new(f.bob, f.bob, 10), &OperationContext::new())
            .await;
        assert!(matches!(
            same,
            Err(AppError::Domain(DomainError::SameAccountTransfer))
        ));

        assert!(f.transfers.list().await.unwrap().is_empty());
        assert_eq!(balance(&f, f.bob).await, 100);
    }

    #[tokio::test]
    async fn test_minutes_out_of_range() {
        let f = fixture(TransferPolicy::permissive()).await;

        let result = f
            .transfers
            .execute(
                TransferCommand::new(f.alice, f.bob, i64::MIN),
                &OperationContext::new(),
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    // =========================================================================
    // Users and services
    // =========================================================================

    #[tokio::test]
    async fn test_user_crud() {
        let f = fixture(TransferPolicy::permissive()).await;

        let updated = f
            .users
            .update(f.alice, AccountDraft::new("Alicia").with_balance(15))
            .await
            .unwrap();
        assert_eq!(updated.name, "Alicia");
        assert_eq!(updated.minutes_balance, 15);

        assert!(matches!(
            f.users.update(42, AccountDraft::new("Ghost")).await,
            Err(AppError::UserNotFound(42))
        ));

        f.users.delete(f.alice).await.unwrap();
        assert!(matches!(
            f.users.get(f.alice).await,
            Err(AppError::UserNotFound(_))
        ));
        assert!(matches!(
            f.users.delete(f.alice).await,
            Err(AppError::UserNotFound(_))
        ));
        assert_eq!(f.users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_user_keeps_transaction_records() {
        let f = fixture(TransferPolicy::permissive()).await;
        let record = f
            .transfers
            .execute(TransferCommand::new(f.alice, f.bob, 10), &OperationContext::new())
            .await
            .unwrap();

        f.users.delete(f.bob).await.unwrap();

        assert_eq!(f.transfers.get(record.id).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_services() {
        let store: Arc<dyn TimeBankStore> = Arc::new(MemoryStore::new());
        let services = ServiceHandler::new(store);

        let tutoring = services
            .create(ServiceDraft::new("Math tutoring", 1).with_description("Algebra"))
            .await
            .unwrap();
        let cooking = services
            .create(ServiceDraft::new("Cooking", 7).with_duration(90))
            .await
            .unwrap();

        assert_eq!(tutoring.duration_minutes, 60);
        assert_eq!(tutoring.description.as_deref(), Some("Algebra"));
        assert_eq!(cooking.duration_minutes, 90);
        assert_eq!(services.list().await.unwrap(), vec![tutoring, cooking]);
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let f = fixture(TransferPolicy::permissive()).await;

        assert!(matches!(
            f.transfers.get(5).await,
            Err(AppError::TransactionNotFound(5))
        ));
    }
}

//! PostgreSQL store
//!
//! `TimeBankStore` over a sqlx connection pool. Units of work are database
//! transactions and account reads inside them take row locks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{
    Account, AccountDraft, NewTransaction, Service, ServiceDraft, TransactionRecord,
};

use super::{StoreError, TimeBankStore, UnitOfWork};

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new PgStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeBankStore for PgStore {
    async fn create_user(&self, draft: AccountDraft) -> Result<Account, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO users (name, minutes_balance)
            VALUES ($1, $2)
            RETURNING id, name, minutes_balance
            "#,
        )
        .bind(&draft.name)
        .bind(draft.minutes_balance)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    async fn list_users(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT id, name, minutes_balance FROM users ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn get_user(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, name, minutes_balance FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn update_user(
        &self,
        id: i64,
        draft: AccountDraft,
    ) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE users
            SET name = $2, minutes_balance = $3
            WHERE id = $1
            RETURNING id, name, minutes_balance
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(draft.minutes_balance)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn create_service(&self, draft: ServiceDraft) -> Result<Service, StoreError> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (title, description, provider_user_id, duration_minutes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, provider_user_id, duration_minutes
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.provider_user_id)
        .bind(draft.duration_minutes)
        .fetch_one(&self.pool)
        .await?;

        Ok(service)
    }

    async fn list_services(&self) -> Result<Vec<Service>, StoreError> {
        let services = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, title, description, provider_user_id, duration_minutes
            FROM services
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        let records = sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT id, provider_user_id, recipient_user_id, minutes, description, created_at
            FROM transactions
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<TransactionRecord>, StoreError> {
        let record = sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT id, provider_user_id, recipient_user_id, minutes, description, created_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// A PostgreSQL transaction. Dropping it without commit rolls back.
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_account(&mut self, id: i64) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, name, minutes_balance FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(account)
    }

    async fn adjust_balance(&mut self, id: i64, delta: i64) -> Result<(), StoreError> {
        let rows_affected = sqlx::query(
            "UPDATE users SET minutes_balance = minutes_balance + $2 WHERE id = $1",
        )
        .bind(id)
        .bind(delta)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::RowNotFound { table: "users", id });
        }

        Ok(())
    }

    async fn append_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, StoreError> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO transactions (provider_user_id, recipient_user_id, minutes, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(transaction.provider_user_id)
        .bind(transaction.recipient_user_id)
        .bind(transaction.minutes)
        .bind(&transaction.description)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(transaction.into_record(id, created_at))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let unit = *self;
        unit.tx.commit().await?;
        Ok(())
    }
}

//! Store Errors
//!
//! Error types for persistence operations.

/// Errors that can occur in a store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A row expected to exist inside a unit of work was missing
    #[error("Row not found in {table}: {id}")]
    RowNotFound { table: &'static str, id: i64 },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure reported by a non-SQL backend
    #[error("Storage backend error: {0}")]
    Backend(String),
}

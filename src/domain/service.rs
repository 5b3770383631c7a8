//! Service listing
//!
//! Something a user offers to do for others, priced in minutes.

use serde::{Deserialize, Serialize};

/// Default duration of a listed service, in minutes.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// A service offered by a provider.
///
/// `provider_user_id` is not checked against existing accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub provider_user_id: i64,
    pub duration_minutes: i64,
}

/// Fields for listing a new service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDraft {
    pub title: String,
    pub description: Option<String>,
    pub provider_user_id: i64,
    pub duration_minutes: i64,
}

impl ServiceDraft {
    pub fn new(title: impl Into<String>, provider_user_id: i64) -> Self {
        Self {
            title: title.into(),
            description: None,
            provider_user_id,
            duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_duration(mut self, duration_minutes: i64) -> Self {
        self.duration_minutes = duration_minutes;
        self
    }
}

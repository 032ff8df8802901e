//! Traits for stores and delegates.

use crate::{ClaimLog, DisbursementResponse, Event, UpdateEventRequest, ValidationResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Event definitions: point lookups, listings, create and patch-update.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Store a new event.
    async fn insert(&self, event: Event) -> Result<(), EventStoreError>;

    /// Get one event by id; `Ok(None)` when unknown.
    async fn get(&self, id: &str) -> Result<Option<Event>, EventStoreError>;

    /// All events, newest `created_at` first.
    async fn list_all(&self) -> Result<Vec<Event>, EventStoreError>;

    /// Events claimable at `now`, newest `created_at` first.
    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Event>, EventStoreError>;

    /// Apply a patch atomically. Returns the updated event, or `Ok(None)` when unknown.
    ///
    /// The patched event must pass [`Event::check`]; otherwise nothing is written and
    /// [`EventStoreError::Invalid`] is returned.
    async fn update(
        &self,
        id: &str,
        patch: &UpdateEventRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, EventStoreError>;
}

/// Append-only claim audit log. There is no update or delete.
#[async_trait]
pub trait ClaimLogStore: Send + Sync {
    async fn append(&self, log: ClaimLog) -> Result<(), ClaimLogStoreError>;

    /// All logs, newest first.
    async fn list_all(&self) -> Result<Vec<ClaimLog>, ClaimLogStoreError>;

    /// Logs of one user, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ClaimLog>, ClaimLogStoreError>;
}

/// External authority deciding whether a user meets an event's condition.
#[async_trait]
pub trait ConditionValidator: Send + Sync {
    async fn validate(
        &self,
        user_id: &str,
        condition: &serde_json::Value,
    ) -> Result<ValidationResponse, DelegateError>;
}

/// External authority granting an event's reward to a user.
#[async_trait]
pub trait RewardDisburser: Send + Sync {
    async fn disburse(
        &self,
        user_id: &str,
        reward: &serde_json::Value,
    ) -> Result<DisbursementResponse, DelegateError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    /// A patch would leave the event invalid.
    #[error("invalid event: {0}")]
    Invalid(String),
    #[error("event store error: {0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimLogStoreError {
    #[error("claim log store error: {0}")]
    Other(String),
}

/// Failure to get a usable answer from a delegate. Distinct from a logical "no".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DelegateError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("delegate returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed delegate response: {0}")]
    Malformed(String),
}

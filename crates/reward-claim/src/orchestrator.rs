//! ClaimOrchestrator: window gate, validation, disbursement, then exactly one audit record.

use chrono::{DateTime, Utc};
use reward_types::{
    ClaimLog, ClaimLogStore, ClaimLogStoreError, ClaimOutcome, ConditionValidator, Event,
    EventStore, EventStoreError, RejectReason, RewardDisburser,
};
use std::sync::Arc;

/// Errors that escape a claim. Every other failure becomes a rejected log.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    /// No event with this id; nothing is logged.
    #[error("event not found: {0}")]
    EventNotFound(String),
    /// The event store itself failed; nothing is logged.
    #[error("event lookup failed: {0}")]
    EventLookup(#[source] EventStoreError),
    /// The decision was reached but could not be recorded.
    #[error("failed to persist claim log: {0}")]
    AuditPersist(#[source] ClaimLogStoreError),
}

/// Runs reward claims against the event store, the two delegates and the audit log.
///
/// Claims share no mutable state. Concurrent claims for the same user and event are
/// neither serialized nor deduplicated.
pub struct ClaimOrchestrator {
    events: Arc<dyn EventStore>,
    logs: Arc<dyn ClaimLogStore>,
    validator: Arc<dyn ConditionValidator>,
    disburser: Arc<dyn RewardDisburser>,
}

impl ClaimOrchestrator {
    pub fn new(
        events: Arc<dyn EventStore>,
        logs: Arc<dyn ClaimLogStore>,
        validator: Arc<dyn ConditionValidator>,
        disburser: Arc<dyn RewardDisburser>,
    ) -> Self {
        Self {
            events,
            logs,
            validator,
            disburser,
        }
    }

    /// Claim `event_id`'s reward for `user_id`, gating on the current time.
    pub async fn request_reward(&self, event_id: &str, user_id: &str) -> Result<ClaimLog, ClaimError> {
        self.request_reward_at(event_id, user_id, Utc::now()).await
    }

    /// Same as [`request_reward`](Self::request_reward) with the window gate evaluated at `now`.
    ///
    /// Returns the persisted log, accepted or rejected. Only a missing event, a failing
    /// event store, or a failing log write are errors.
    pub async fn request_reward_at(
        &self,
        event_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ClaimLog, ClaimError> {
        let event = match self.events.get(event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::warn!(event_id, user_id, "claim for unknown event");
                return Err(ClaimError::EventNotFound(event_id.to_string()));
            }
            Err(e) => {
                tracing::error!(event_id, user_id, error = %e, "event lookup failed");
                return Err(ClaimError::EventLookup(e));
            }
        };

        let outcome = self.decide(&event, user_id, now).await;
        let log = ClaimLog::new(user_id, event.id.as_str(), outcome, Utc::now());
        self.persist(log).await
    }

    async fn decide(&self, event: &Event, user_id: &str, now: DateTime<Utc>) -> ClaimOutcome {
        if !event.is_claimable_at(now) {
            return ClaimOutcome::rejected(RejectReason::EventInactive);
        }

        match self.validator.validate(user_id, &event.desired_condition).await {
            Ok(res) if res.is_valid => {}
            Ok(_) => return ClaimOutcome::rejected(RejectReason::ConditionNotMet),
            Err(e) => {
                tracing::error!(event_id = %event.id, user_id, error = %e, "validation delegate failed");
                return ClaimOutcome::rejected(RejectReason::ValidationUnavailable);
            }
        }

        match self.disburser.disburse(user_id, &event.reward).await {
            Ok(res) if res.success => ClaimOutcome::Accepted,
            Ok(_) => ClaimOutcome::rejected(RejectReason::DisbursementRefused),
            Err(e) => {
                tracing::error!(event_id = %event.id, user_id, error = %e, "disbursement delegate failed");
                ClaimOutcome::rejected(RejectReason::DisbursementUnavailable)
            }
        }
    }

    // The write runs on its own task so it completes even if the caller is dropped.
    async fn persist(&self, log: ClaimLog) -> Result<ClaimLog, ClaimError> {
        let logs = Arc::clone(&self.logs);
        let record = log.clone();
        let written = tokio::spawn(async move { logs.append(record).await }).await;
        match written {
            Ok(Ok(())) => {
                tracing::info!(
                    log_id = %log.id,
                    event_id = %log.event_id,
                    user_id = %log.user_id,
                    result = %log.process_result(),
                    reason = log.rejected_reason().map(|r| r.as_str()).unwrap_or(""),
                    "claim recorded"
                );
                Ok(log)
            }
            Ok(Err(e)) => {
                tracing::error!(event_id = %log.event_id, user_id = %log.user_id, error = %e, "failed to persist claim log");
                Err(ClaimError::AuditPersist(e))
            }
            Err(join) => {
                tracing::error!(event_id = %log.event_id, user_id = %log.user_id, error = %join, "claim log task aborted");
                Err(ClaimError::AuditPersist(ClaimLogStoreError::Other(join.to_string())))
            }
        }
    }

    /// Every claim log, newest first.
    pub async fn list_all(&self) -> Result<Vec<ClaimLog>, ClaimLogStoreError> {
        self.logs.list_all().await
    }

    /// Claim logs of one user, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<ClaimLog>, ClaimLogStoreError> {
        self.logs.list_by_user(user_id).await
    }
}

//! Event definitions and the operator-facing create/update requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A time-boxed event whose reward users may claim.
///
/// `desired_condition` and `reward` are opaque: they are stored and forwarded to
/// the delegates untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub description: String,
    pub desired_condition: serde_json::Value,
    pub reward: serde_json::Value,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_enabled: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Build a new event from an operator request, assigning id and timestamps.
    pub fn from_request(req: CreateEventRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: req.description,
            desired_condition: req.desired_condition,
            reward: req.reward,
            start_date: req.start_date,
            end_date: req.end_date,
            is_enabled: req.is_enabled,
            created_by: req.created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Window gate: enabled and `start_date <= now <= end_date` (both bounds inclusive).
    pub fn is_claimable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_enabled && self.start_date <= now && now <= self.end_date
    }

    /// Check the shape rules an event must satisfy after create or update.
    pub fn check(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("description must not be empty".to_string());
        }
        if self.created_by.trim().is_empty() {
            return Err("createdBy must not be empty".to_string());
        }
        if !self.desired_condition.is_object() {
            return Err("desiredCondition must be an object".to_string());
        }
        if !self.reward.is_object() {
            return Err("reward must be an object".to_string());
        }
        if self.start_date > self.end_date {
            return Err("startDate must not be after endDate".to_string());
        }
        Ok(())
    }
}

/// Create-event request (operator).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub description: String,
    pub desired_condition: serde_json::Value,
    pub reward: serde_json::Value,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    pub created_by: String,
}

fn default_enabled() -> bool {
    true
}

/// Partial update: only present fields replace the stored ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub desired_condition: Option<serde_json::Value>,
    #[serde(default)]
    pub reward: Option<serde_json::Value>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_enabled: Option<bool>,
}

impl UpdateEventRequest {
    /// Apply the present fields to `event` and bump `updated_at`.
    pub fn apply(&self, event: &mut Event, now: DateTime<Utc>) {
        if let Some(ref description) = self.description {
            event.description = description.clone();
        }
        if let Some(ref condition) = self.desired_condition {
            event.desired_condition = condition.clone();
        }
        if let Some(ref reward) = self.reward {
            event.reward = reward.clone();
        }
        if let Some(start) = self.start_date {
            event.start_date = start;
        }
        if let Some(end) = self.end_date {
            event.end_date = end;
        }
        if let Some(enabled) = self.is_enabled {
            event.is_enabled = enabled;
        }
        event.updated_at = now;
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.desired_condition.is_none()
            && self.reward.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.is_enabled.is_none()
    }
}

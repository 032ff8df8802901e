//! Claim audit records: ClaimLog, ClaimOutcome, RejectReason.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Why a claim was rejected. The wire code is stable; `message` is for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Event disabled or `now` outside `[start_date, end_date]`.
    EventInactive,
    /// Validation delegate unreachable or errored.
    ValidationUnavailable,
    /// Validation delegate answered `isValid = false`.
    ConditionNotMet,
    /// Disbursement delegate unreachable or errored.
    DisbursementUnavailable,
    /// Disbursement delegate answered `success = false`.
    DisbursementRefused,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::EventInactive => "event_inactive",
            RejectReason::ValidationUnavailable => "validation_unavailable",
            RejectReason::ConditionNotMet => "condition_not_met",
            RejectReason::DisbursementUnavailable => "disbursement_unavailable",
            RejectReason::DisbursementRefused => "disbursement_refused",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RejectReason::EventInactive => "event is not active or disabled",
            RejectReason::ValidationUnavailable => "failed to validate event conditions",
            RejectReason::ConditionNotMet => "event conditions not met",
            RejectReason::DisbursementUnavailable => "failed to reach reward disbursement",
            RejectReason::DisbursementRefused => "reward disbursement refused",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RejectReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event_inactive" => Ok(RejectReason::EventInactive),
            "validation_unavailable" => Ok(RejectReason::ValidationUnavailable),
            "condition_not_met" => Ok(RejectReason::ConditionNotMet),
            "disbursement_unavailable" => Ok(RejectReason::DisbursementUnavailable),
            "disbursement_refused" => Ok(RejectReason::DisbursementRefused),
            other => Err(format!("unknown reject reason: {}", other)),
        }
    }
}

/// Coarse result of a claim, as stored in `processResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessResult {
    Accepted,
    Rejected,
}

impl ProcessResult {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessResult::Accepted => "accepted",
            ProcessResult::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(ProcessResult::Accepted),
            "rejected" => Ok(ProcessResult::Rejected),
            other => Err(format!("unknown process result: {}", other)),
        }
    }
}

/// Terminal decision of a claim. A reason exists only for rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "processResult", rename_all = "lowercase")]
pub enum ClaimOutcome {
    Accepted,
    Rejected {
        #[serde(rename = "rejectedReason")]
        rejected_reason: RejectReason,
    },
}

impl ClaimOutcome {
    pub fn rejected(reason: RejectReason) -> Self {
        ClaimOutcome::Rejected {
            rejected_reason: reason,
        }
    }

    pub fn process_result(&self) -> ProcessResult {
        match self {
            ClaimOutcome::Accepted => ProcessResult::Accepted,
            ClaimOutcome::Rejected { .. } => ProcessResult::Rejected,
        }
    }

    pub fn rejected_reason(&self) -> Option<RejectReason> {
        match self {
            ClaimOutcome::Accepted => None,
            ClaimOutcome::Rejected { rejected_reason } => Some(*rejected_reason),
        }
    }

    /// Rebuild from stored columns; `None` when they contradict each other.
    pub fn from_parts(result: ProcessResult, reason: Option<RejectReason>) -> Option<Self> {
        match (result, reason) {
            (ProcessResult::Accepted, None) => Some(ClaimOutcome::Accepted),
            (ProcessResult::Rejected, Some(r)) => Some(ClaimOutcome::rejected(r)),
            _ => None,
        }
    }
}

/// Immutable audit record of one claim attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimLog {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    #[serde(flatten)]
    pub outcome: ClaimOutcome,
    pub created_at: DateTime<Utc>,
}

impl ClaimLog {
    pub fn new(
        user_id: impl Into<String>,
        event_id: impl Into<String>,
        outcome: ClaimOutcome,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            event_id: event_id.into(),
            outcome,
            created_at,
        }
    }

    pub fn process_result(&self) -> ProcessResult {
        self.outcome.process_result()
    }

    pub fn rejected_reason(&self) -> Option<RejectReason> {
        self.outcome.rejected_reason()
    }
}

/// Sort newest first by `created_at`. Callers pass records in append order so the
/// stable sort breaks ties towards the most recent append.
pub fn sort_newest_first(logs: &mut [ClaimLog]) {
    logs.reverse();
    logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

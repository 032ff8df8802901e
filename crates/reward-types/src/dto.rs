//! Request and response DTOs: API envelope, claim request, delegate bodies.

use serde::{Deserialize, Serialize};

/// Inbound claim request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRewardRequest {
    pub user_id: String,
    pub event_id: String,
}

/// Base response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    #[serde(default = "default_code")]
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

fn default_code() -> u16 {
    200
}

impl<T> BaseResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_code(200, data)
    }

    pub fn with_code(code: u16, data: T) -> Self {
        Self {
            code,
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Body sent to the condition validation delegate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest<'a> {
    pub user_id: &'a str,
    pub condition: &'a serde_json::Value,
}

/// Answer of the condition validation delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_valid: bool,
}

/// Body sent to the reward disbursement delegate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementRequest<'a> {
    pub user_id: &'a str,
    pub reward: &'a serde_json::Value,
}

/// Answer of the reward disbursement delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementResponse {
    pub success: bool,
}

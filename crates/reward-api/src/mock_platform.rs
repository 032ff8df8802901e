//! Stand-in for the external platform: fixed-answer validation and disbursement endpoints.

use axum::{routing::post, Json, Router};
use reward_types::{DisbursementResponse, ValidationResponse};
use serde::Deserialize;

/// Accepts whatever the orchestrator sends; only `userId` is read, for logging.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DelegateCall {
    #[serde(default)]
    user_id: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/validate-event-condition/success", post(validate_success))
        .route("/validate-event-condition/failed", post(validate_failed))
        .route("/provide-event-reward/success", post(reward_success))
        .route("/provide-event-reward/failed", post(reward_failed))
}

async fn validate_success(Json(call): Json<DelegateCall>) -> Json<ValidationResponse> {
    tracing::info!(user_id = %call.user_id, "validate: pass");
    Json(ValidationResponse { is_valid: true })
}

async fn validate_failed(Json(call): Json<DelegateCall>) -> Json<ValidationResponse> {
    tracing::info!(user_id = %call.user_id, "validate: fail");
    Json(ValidationResponse { is_valid: false })
}

async fn reward_success(Json(call): Json<DelegateCall>) -> Json<DisbursementResponse> {
    tracing::info!(user_id = %call.user_id, "reward: granted");
    Json(DisbursementResponse { success: true })
}

async fn reward_failed(Json(call): Json<DelegateCall>) -> Json<DisbursementResponse> {
    tracing::info!(user_id = %call.user_id, "reward: refused");
    Json(DisbursementResponse { success: false })
}

//! Axum server and routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use reward_claim::{CatalogError, ClaimError, ClaimOrchestrator, EventCatalog};
use reward_types::{
    BaseResponse, ClaimLog, CreateEventRequest, Event, RequestRewardRequest, UpdateEventRequest,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub catalog: Arc<EventCatalog>,
    pub claims: Arc<ClaimOrchestrator>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/events/create", post(handle_create_event))
        .route("/events/list/all", get(handle_list_events))
        .route("/events/list/active", get(handle_list_active_events))
        .route("/events/detail/:id", get(handle_event_detail))
        .route("/events/update/:id", post(handle_update_event))
        .route("/event-rewards/request", post(handle_request_reward))
        .route("/event-rewards/list", get(handle_list_claims))
        .route("/event-rewards/list/user/:user_id", get(handle_list_user_claims))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type Reply<T> = (StatusCode, Json<BaseResponse<T>>);

fn respond<T>(status: StatusCode, data: T) -> Reply<T> {
    (status, Json(BaseResponse::with_code(status.as_u16(), data)))
}

fn fail<T>(status: StatusCode, message: impl Into<String>) -> Reply<T> {
    (status, Json(BaseResponse::error(status.as_u16(), message)))
}

fn catalog_failure<T>(e: CatalogError) -> Reply<T> {
    match e {
        CatalogError::NotFound(_) => fail(StatusCode::NOT_FOUND, e.to_string()),
        CatalogError::InvalidEvent(_) => fail(StatusCode::BAD_REQUEST, e.to_string()),
        CatalogError::Store(_) => {
            tracing::error!(error = %e, "event store failure");
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn handle_create_event(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Reply<Event> {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(e) => return fail(StatusCode::BAD_REQUEST, e.body_text()),
    };
    match state.catalog.create(req).await {
        Ok(event) => respond(StatusCode::CREATED, event),
        Err(e) => catalog_failure(e),
    }
}

async fn handle_list_events(State(state): State<Arc<AppState>>) -> Reply<Vec<Event>> {
    match state.catalog.list_all().await {
        Ok(events) => respond(StatusCode::OK, events),
        Err(e) => catalog_failure(e),
    }
}

async fn handle_list_active_events(State(state): State<Arc<AppState>>) -> Reply<Vec<Event>> {
    match state.catalog.list_active().await {
        Ok(events) => respond(StatusCode::OK, events),
        Err(e) => catalog_failure(e),
    }
}

async fn handle_event_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Reply<Event> {
    match state.catalog.get(&id).await {
        Ok(event) => respond(StatusCode::OK, event),
        Err(e) => catalog_failure(e),
    }
}

async fn handle_update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Reply<Event> {
    let Json(patch) = match payload {
        Ok(p) => p,
        Err(e) => return fail(StatusCode::BAD_REQUEST, e.body_text()),
    };
    match state.catalog.update(&id, patch).await {
        Ok(event) => respond(StatusCode::OK, event),
        Err(e) => catalog_failure(e),
    }
}

/// Rejections are normal results (201 with a rejected log); only a missing event
/// or a failed log write are error responses.
async fn handle_request_reward(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RequestRewardRequest>, JsonRejection>,
) -> Reply<ClaimLog> {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(e) => return fail(StatusCode::BAD_REQUEST, e.body_text()),
    };
    if req.user_id.trim().is_empty() || req.event_id.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, "userId and eventId are required");
    }
    match state.claims.request_reward(&req.event_id, &req.user_id).await {
        Ok(log) => {
            let message = match log.rejected_reason() {
                Some(reason) => reason.message(),
                None => "reward granted",
            };
            let mut body = BaseResponse::with_code(StatusCode::CREATED.as_u16(), log);
            body.message = message.to_string();
            (StatusCode::CREATED, Json(body))
        }
        Err(ClaimError::EventNotFound(id)) => {
            fail(StatusCode::NOT_FOUND, format!("event not found: {}", id))
        }
        Err(e) => fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn handle_list_claims(State(state): State<Arc<AppState>>) -> Reply<Vec<ClaimLog>> {
    match state.claims.list_all().await {
        Ok(logs) => respond(StatusCode::OK, logs),
        Err(e) => {
            tracing::error!(error = %e, "claim log listing failed");
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn handle_list_user_claims(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Reply<Vec<ClaimLog>> {
    match state.claims.list_by_user(&user_id).await {
        Ok(logs) => respond(StatusCode::OK, logs),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "claim log listing failed");
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn handle_health() -> &'static str {
    "ok"
}

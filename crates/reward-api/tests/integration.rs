//! Integration tests: event catalog routes, claim requests, claim log listing.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use reward_api::server::{self, AppState};
use reward_claim::{ClaimOrchestrator, EventCatalog};
use reward_delegate::{DelegateError, MockConditionValidator, MockRewardDisburser};
use reward_store::{InMemoryClaimLogStore, InMemoryEventStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn app_with(validator: MockConditionValidator, disburser: MockRewardDisburser) -> axum::Router {
    let events = Arc::new(InMemoryEventStore::new());
    let logs = Arc::new(InMemoryClaimLogStore::new());
    let state = Arc::new(AppState {
        catalog: Arc::new(EventCatalog::new(events.clone())),
        claims: Arc::new(ClaimOrchestrator::new(
            events,
            logs,
            Arc::new(validator),
            Arc::new(disburser),
        )),
    });
    server::router(state)
}

fn test_app() -> axum::Router {
    app_with(MockConditionValidator::valid(), MockRewardDisburser::granting())
}

async fn call(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let j = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, j)
}

fn live_event() -> Value {
    let now = Utc::now();
    json!({
        "description": "7-day attendance",
        "desiredCondition": { "loginDays": 7 },
        "reward": { "currency": 1000 },
        "startDate": (now - Duration::hours(1)).to_rfc3339(),
        "endDate": (now + Duration::days(7)).to_rfc3339(),
        "createdBy": "operator-1"
    })
}

async fn create_event(app: &axum::Router, body: Value) -> String {
    let (status, j) = call(app, "POST", "/events/create", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(j["code"], 201);
    j["data"]["id"].as_str().unwrap().to_string()
}

async fn claim(app: &axum::Router, user: &str, event: &str) -> (StatusCode, Value) {
    call(
        app,
        "POST",
        "/event-rewards/request",
        Some(json!({ "userId": user, "eventId": event })),
    )
    .await
}

#[tokio::test]
async fn health_is_ok() {
    let app = test_app();
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn create_then_detail_and_lists() {
    let app = test_app();
    let id = create_event(&app, live_event()).await;

    let (status, j) = call(&app, "GET", &format!("/events/detail/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["data"]["description"], "7-day attendance");
    assert_eq!(j["data"]["isEnabled"], true);
    assert_eq!(j["data"]["desiredCondition"]["loginDays"], 7);

    let (_, all) = call(&app, "GET", "/events/list/all", None).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 1);
    let (_, active) = call(&app, "GET", "/events/list/active", None).await;
    assert_eq!(active["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn detail_of_unknown_event_is_404() {
    let app = test_app();
    let (status, j) = call(&app, "GET", "/events/detail/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(j["code"], 404);
    assert!(j.get("data").is_none());
}

#[tokio::test]
async fn create_with_inverted_window_is_400() {
    let app = test_app();
    let mut body = live_event();
    body["endDate"] = json!((Utc::now() - Duration::days(3)).to_rfc3339());
    let (status, j) = call(&app, "POST", "/events/create", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(j["code"], 400);
}

#[tokio::test]
async fn malformed_body_is_400_envelope() {
    let app = test_app();
    let (status, j) = call(&app, "POST", "/events/create", Some(json!({ "description": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(j["code"], 400);
}

#[tokio::test]
async fn disabling_an_event_removes_it_from_active_and_rejects_claims() {
    let app = test_app();
    let id = create_event(&app, live_event()).await;

    let (status, j) = call(
        &app,
        "POST",
        &format!("/events/update/{}", id),
        Some(json!({ "isEnabled": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["data"]["isEnabled"], false);

    let (_, active) = call(&app, "GET", "/events/list/active", None).await;
    assert!(active["data"].as_array().unwrap().is_empty());

    let (status, j) = claim(&app, "user-1", &id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(j["data"]["processResult"], "rejected");
    assert_eq!(j["data"]["rejectedReason"], "event_inactive");
}

#[tokio::test]
async fn update_unknown_event_is_404() {
    let app = test_app();
    let (status, _) = call(
        &app,
        "POST",
        "/events/update/missing",
        Some(json!({ "description": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn accepted_claim_is_201_with_log() {
    let app = test_app();
    let id = create_event(&app, live_event()).await;
    let (status, j) = claim(&app, "user-1", &id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(j["code"], 201);
    let log = &j["data"];
    assert_eq!(log["userId"], "user-1");
    assert_eq!(log["eventId"], id);
    assert_eq!(log["processResult"], "accepted");
    assert!(log.get("rejectedReason").is_none());
    assert!(log["id"].as_str().is_some());
    assert!(log["createdAt"].as_str().is_some());
}

#[tokio::test]
async fn condition_not_met_is_a_logged_rejection() {
    let app = app_with(MockConditionValidator::invalid(), MockRewardDisburser::granting());
    let id = create_event(&app, live_event()).await;
    let (status, j) = claim(&app, "user-1", &id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(j["data"]["processResult"], "rejected");
    assert_eq!(j["data"]["rejectedReason"], "condition_not_met");
    assert_eq!(j["message"], "event conditions not met");
}

#[tokio::test]
async fn unreachable_disbursement_is_a_logged_rejection() {
    let app = app_with(
        MockConditionValidator::valid(),
        MockRewardDisburser::failing(DelegateError::Timeout),
    );
    let id = create_event(&app, live_event()).await;
    let (status, j) = claim(&app, "user-1", &id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(j["data"]["rejectedReason"], "disbursement_unavailable");

    let (_, logs) = call(&app, "GET", "/event-rewards/list", None).await;
    assert_eq!(logs["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn claim_for_unknown_event_is_404_without_log() {
    let app = test_app();
    let (status, j) = claim(&app, "user-1", "missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(j["code"], 404);

    let (_, logs) = call(&app, "GET", "/event-rewards/list", None).await;
    assert!(logs["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_ids_are_rejected_before_orchestration() {
    let app = test_app();
    let id = create_event(&app, live_event()).await;
    let (status, _) = claim(&app, "", &id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = claim(&app, "user-1", "  ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, logs) = call(&app, "GET", "/event-rewards/list", None).await;
    assert!(logs["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn log_listings_are_newest_first_and_filter_by_user() {
    let app = test_app();
    let id = create_event(&app, live_event()).await;
    let (_, first) = claim(&app, "alice", &id).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (_, second) = claim(&app, "bob", &id).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (_, third) = claim(&app, "alice", &id).await;

    let (status, all) = call(&app, "GET", "/event-rewards/list", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&Value> = all["data"].as_array().unwrap().iter().map(|l| &l["id"]).collect();
    assert_eq!(ids, vec![&third["data"]["id"], &second["data"]["id"], &first["data"]["id"]]);

    let (_, mine) = call(&app, "GET", "/event-rewards/list/user/alice", None).await;
    let mine = mine["data"].as_array().unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0]["id"], third["data"]["id"]);
    assert_eq!(mine[1]["id"], first["data"]["id"]);

    let (_, nobody) = call(&app, "GET", "/event-rewards/list/user/carol", None).await;
    assert!(nobody["data"].as_array().unwrap().is_empty());
}

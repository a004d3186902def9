//! Router-level tests for the guide HTTP API.
#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use channel_guide::db::LocalRepository;
use channel_guide::http::{create_router, AppState};
use channel_guide::services::{FixedClock, GuideSettings, MalformedLineupPolicy, SettingsAction};
use support::{at, channel, content};

const WINDOW: &str = "from=2024-03-01T11:00:00Z&to=2024-03-01T13:00:00Z";

fn seeded_repo() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.insert_channel(channel("ch-1", 1));
    repo.insert_channel(channel("ch-2", 2));
    repo.insert_lineup(&channel("ch-1", 1).id, vec![content(-30, 30), content(30, 60)]);
    repo
}

fn state_with(repo: LocalRepository, settings: GuideSettings) -> AppState {
    AppState::with_settings(Arc::new(repo), settings).with_clock(Arc::new(FixedClock::new(at(30))))
}

fn app() -> (Router, AppState) {
    let state = state_with(seeded_repo(), GuideSettings::default());
    (create_router(state.clone()), state)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

#[tokio::test]
async fn health_reports_repository() {
    let (app, _) = app();
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["repository"], "connected");
}

#[tokio::test]
async fn lists_channels_in_number_order() {
    let (app, _) = app();
    let (status, body) = get(app, "/v1/channels").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["channels"][0]["id"], "ch-1");
}

#[tokio::test]
async fn raw_lineup_is_untrimmed() {
    let (app, _) = app();
    let (status, body) = get(app, &format!("/v1/channels/ch-1/lineup?{}", WINDOW)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["programs"].as_array().unwrap().len(), 2);
    assert_eq!(body["programs"][0]["start"], at(-30).millis());
}

#[tokio::test]
async fn channel_guide_renders_row() {
    let (app, _) = app();
    let (status, body) = get(app, &format!("/v1/channels/ch-1/guide?{}", WINDOW)).await;
    assert_eq!(status, StatusCode::OK);

    let segments = body["segments"].as_array().unwrap();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0]["widthPercent"], 25.0);
    assert_eq!(segments[0]["cssWidth"], "25.00%");
    assert_eq!(segments[2]["isFillerBlock"], true);
    assert_eq!(segments[2]["widthPercent"], 50.0);
    assert_eq!(body["endOfAvailableProgramming"], true);
}

#[tokio::test]
async fn guide_snapshot_uses_clock_and_now_override() {
    let (app, _) = app();
    let (status, body) = get(app.clone(), &format!("/v1/guide?{}", WINDOW)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"], 25.0);
    assert_eq!(body["rows"].as_array().unwrap().len(), 2);
    // Channel without programs renders as a single filler.
    assert_eq!(body["rows"][1]["segments"][0]["widthPercent"], 100.0);

    let uri = format!("/v1/guide?{}&now=2024-03-01T12:00:00Z", WINDOW);
    let (_, body) = get(app.clone(), &uri).await;
    assert_eq!(body["progress"], 50.0);

    let uri = format!("/v1/guide?{}&now=2024-03-01T14:00:00Z", WINDOW);
    let (_, body) = get(app, &uri).await;
    assert!(body["progress"].is_null());
}

#[tokio::test]
async fn inverted_window_is_bad_request() {
    let (app, _) = app();
    let uri = "/v1/guide?from=2024-03-01T13:00:00Z&to=2024-03-01T11:00:00Z";
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn missing_window_is_bad_request() {
    let (app, _) = app();
    let (status, body) = get(app, "/v1/guide").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unknown_channel_is_not_found() {
    let (app, _) = app();
    let (status, body) = get(app, &format!("/v1/channels/ghost/guide?{}", WINDOW)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn rejected_lineup_is_unprocessable() {
    let repo = seeded_repo();
    repo.insert_lineup(
        &channel("ch-2", 2).id,
        vec![content(0, 60), content(30, 90)],
    );
    let settings =
        GuideSettings::default().reduce(SettingsAction::SetPolicy(MalformedLineupPolicy::Reject));
    let app = create_router(state_with(repo, settings));

    let (status, body) = get(app, &format!("/v1/channels/ch-2/guide?{}", WINDOW)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "UNPROCESSABLE_LINEUP");
}

#[tokio::test]
async fn put_lineup_stores_and_publishes() {
    let (app, state) = app();
    let mut subscription = state.events.subscribe();

    let programs = json!({"programs": [
        {"type": "content", "start": at(0).millis(), "stop": at(120).millis(), "title": "Marathon"}
    ]});
    let (status, body) = send(app.clone(), Method::PUT, "/v1/channels/ch-2/lineup", Some(programs)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["programCount"], 1);
    assert_eq!(body["subscribersNotified"], 1);

    let event = subscription.recv().await.unwrap();
    assert_eq!(event.kind.name(), "lineupUpdated");

    let (_, row) = get(app, &format!("/v1/channels/ch-2/guide?{}", WINDOW)).await;
    assert_eq!(row["endOfAvailableProgramming"], false);
    assert_eq!(row["segments"][0]["widthPercent"], 100.0);
}

#[tokio::test]
async fn put_lineup_rejects_bad_body() {
    let (app, _) = app();
    let body = json!({"programs": [{"type": "documentary", "start": 0, "stop": 1}]});
    let (status, body) = send(app, Method::PUT, "/v1/channels/ch-1/lineup", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn create_and_delete_channel() {
    let (app, state) = app();
    let mut subscription = state.events.subscribe();

    let body = json!({"id": "ch-9", "number": 9, "name": "Nine"});
    let (status, _) = send(app.clone(), Method::POST, "/v1/channels", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(subscription.recv().await.unwrap().kind.name(), "guideInvalidated");

    let (status, _) = send(app.clone(), Method::DELETE, "/v1/channels/ch-9", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(subscription.recv().await.unwrap().kind.name(), "channelRemoved");

    let (status, _) = send(app, Method::DELETE, "/v1/channels/ch-9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn event_stream_delivers_published_events() {
    let (app, state) = app();
    let response = app
        .oneshot(Request::builder().uri("/v1/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );

    state.events.publish(channel_guide::services::GuideEventKind::GuideInvalidated);

    let mut stream = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("event frame")
        .expect("stream open")
        .unwrap();
    let text = String::from_utf8(frame.to_vec()).unwrap();
    assert!(text.contains("event: guideInvalidated"), "{}", text);
    assert!(text.contains("\"type\":\"guideInvalidated\""), "{}", text);
}

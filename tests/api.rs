// Drives the HTTP router in-process with `tower::ServiceExt::oneshot`.
// The ticker task is not spawned, so the timer only moves on explicit commands.

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use pomodoro_server::{
    create_router,
    services::{JsonFileSettingsStore, MemorySettingsStore},
    AppState,
};

fn app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        3010,
        "127.0.0.1".into(),
        Arc::new(MemorySettingsStore::new()),
    ));
    (create_router(Arc::clone(&state)), state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_user_settings_are_not_found() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/api/settings/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Settings not found");
}

#[tokio::test]
async fn saved_settings_round_trip_and_apply_to_timer() {
    let (app, _) = app();
    let settings = json!({
        "focusDuration": 50,
        "shortBreakDuration": 10,
        "longBreakDuration": 20,
        "focusSound": "focus.mp3",
        "shortBreakSound": "short.mp3",
        "longBreakSound": "long.mp3"
    });

    let (status, saved) = send(&app, Method::POST, "/api/settings/alice", Some(settings)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["userId"], "alice");
    assert_eq!(saved["focusDuration"], 50);

    let (status, fetched) = send(&app, Method::GET, "/api/settings/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, saved);

    let (_, timer) = send(&app, Method::GET, "/api/timer", None).await;
    assert_eq!(timer["timeRemainingSeconds"], 50 * 60);
    assert_eq!(timer["timeRemaining"]["minutes"], 50);

    let (_, sound) = send(&app, Method::GET, "/api/timer/sounds/longBreak", None).await;
    assert_eq!(sound["sound"], "long.mp3");
}

#[tokio::test]
async fn partial_settings_merge_onto_defaults() {
    let (app, _) = app();
    let (status, saved) = send(
        &app,
        Method::POST,
        "/api/settings/bob",
        Some(json!({ "shortBreakDuration": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["focusDuration"], 25);
    assert_eq!(saved["shortBreakDuration"], 7);
    assert_eq!(saved["longBreakDuration"], 15);
}

#[tokio::test]
async fn sub_minute_settings_are_rejected() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/settings/carol",
        Some(json!({ "focusDuration": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid settings");

    let (status, _) = send(&app, Method::GET, "/api/settings/carol", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_settings_are_rejected_and_not_stored() {
    let (app, state) = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/settings/eve",
        Some(json!({ "focusDuration": 1u64 << 62 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid settings");

    let (status, _) = send(&app, Method::GET, "/api/settings/eve", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(state.get_snapshot().unwrap().time_remaining_seconds, 25 * 60);
}

#[tokio::test]
async fn settings_persist_in_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let state = Arc::new(AppState::new(
        0,
        "127.0.0.1".into(),
        Arc::new(JsonFileSettingsStore::open(&path).unwrap()),
    ));
    let app = create_router(state);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/settings/dave",
        Some(json!({ "longBreakDuration": 30 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let reopened = Arc::new(AppState::new(
        0,
        "127.0.0.1".into(),
        Arc::new(JsonFileSettingsStore::open(&path).unwrap()),
    ));
    let app = create_router(reopened);
    let (status, body) = send(&app, Method::GET, "/api/settings/dave", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["longBreakDuration"], 30);
}

#[tokio::test]
async fn start_stop_reset_commands() {
    let (app, state) = app();

    let (status, body) = send(&app, Method::POST, "/api/timer/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["running"], true);

    for _ in 0..3 {
        state.tick().unwrap();
    }

    let (_, body) = send(&app, Method::POST, "/api/timer/stop", None).await;
    assert_eq!(body["status"], "stopped");
    assert_eq!(body["timer"]["timeRemainingSeconds"], 25 * 60 - 3);

    let (_, body) = send(&app, Method::POST, "/api/timer/reset", None).await;
    assert_eq!(body["timer"]["mode"], "focus");
    assert_eq!(body["timer"]["timeRemainingSeconds"], 25 * 60);
    assert_eq!(body["timer"]["sessionCount"], 0);

    let (_, status_body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(status_body["lastAction"], "reset");
    assert_eq!(status_body["port"], 3010);
}

#[tokio::test]
async fn configured_one_minute_phases_reach_long_break() {
    let (app, state) = app();
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/timer/durations",
        Some(json!({ "focus": 60, "shortBreak": 60, "longBreak": 60 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    send(&app, Method::POST, "/api/timer/start", None).await;
    for _ in 0..60 {
        state.tick().unwrap();
    }

    let (_, timer) = send(&app, Method::GET, "/api/timer", None).await;
    assert_eq!(timer["mode"], "longBreak");
    assert_eq!(timer["timeRemainingSeconds"], 60);
    assert_eq!(timer["running"], true);
}

#[tokio::test]
async fn skip_moves_to_next_phase() {
    let (app, _) = app();
    let (_, body) = send(&app, Method::POST, "/api/timer/skip", None).await;
    assert_eq!(body["timer"]["mode"], "longBreak");
    assert_eq!(body["timer"]["timeRemainingSeconds"], 15 * 60);
}

#[tokio::test]
async fn unknown_sound_stage_is_ignored() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/timer/sounds/siesta",
        Some(json!({ "sound": "x.mp3" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sound"], "");

    let (_, body) = send(
        &app,
        Method::PUT,
        "/api/timer/sounds/focus",
        Some(json!({ "sound": "bell.mp3" })),
    )
    .await;
    assert_eq!(body["sound"], "bell.mp3");
}

#[tokio::test]
async fn activity_is_logged_with_elapsed_focus_time() {
    let (app, state) = app();
    send(&app, Method::POST, "/api/timer/start", None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/activity/start",
        Some(json!({ "name": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["activity"]["name"], "X");

    for _ in 0..30 {
        state.tick().unwrap();
    }

    let (_, body) = send(&app, Method::POST, "/api/activity/stop", None).await;
    assert_eq!(body["stopped"]["name"], "X");
    assert_eq!(body["stopped"]["duration"], 30);
    assert_eq!(body["timer"]["activity"]["name"], "");

    let (_, body) = send(&app, Method::GET, "/api/activities", None).await;
    assert_eq!(body["days"], 7);
    let activities = body["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0]["name"], "X");
    assert_eq!(activities[0]["duration"], 30);
    assert!(activities[0]["date"].is_string());
}

#[tokio::test]
async fn blank_activity_name_is_rejected() {
    let (app, _) = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/activity/start",
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn loading_missing_user_settings_uses_defaults() {
    let (app, _) = app();
    send(
        &app,
        Method::PUT,
        "/api/timer/durations",
        Some(json!({ "focus": 120, "shortBreak": 60, "longBreak": 60 })),
    )
    .await;

    let (status, body) = send(&app, Method::POST, "/api/timer/settings/ghost", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["durations"]["focus"], 25 * 60);
    assert_eq!(body["timer"]["timeRemainingSeconds"], 25 * 60);
}

#[tokio::test]
async fn skip_is_pushed_as_stage_complete_event() {
    let (app, _) = app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/events")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let (status, _) = send(&app, Method::POST, "/api/timer/skip", None).await;
    assert_eq!(status, StatusCode::OK);

    let mut stream = response.into_body().into_data_stream();
    let mut frame = String::new();
    while !frame.contains("\n\n") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("no stage event within 5s")
            .expect("event stream ended")
            .unwrap();
        frame.push_str(std::str::from_utf8(&chunk).unwrap());
    }

    assert!(frame.contains("event: stage-complete"), "{frame}");
    let data = frame
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    let event: Value = serde_json::from_str(data).unwrap();
    assert_eq!(event["mode"], "longBreak");
    assert_eq!(event["sessionCount"], 0);
}

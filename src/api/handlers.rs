//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::state::{
    AppState, Durations, SaveSettingsError, SettingsDocument, SettingsPatch, TimerSnapshot,
    DEFAULT_ACTIVITY_DAYS,
};
use super::responses::{
    ActivitiesQuery, ActivitiesResponse, ActivityRequest, ActivityStopResponse, ApiResponse,
    ErrorResponse, HealthResponse, SoundRequest, SoundResponse, StatusResponse,
};

/// Upper bound on the activity look-back window (ten years)
const MAX_ACTIVITY_DAYS: i64 = 3650;

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn server_error(e: impl std::fmt::Display) -> ErrorReply {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::with_error("Server error", e.to_string())),
    )
}

/// Turn an engine command result into a timer response
fn timer_reply(
    message: &str,
    result: Result<TimerSnapshot, String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok(snapshot) => Ok(Json(ApiResponse::for_timer(message.to_string(), snapshot))),
        Err(e) => {
            error!("Timer command failed ({}): {}", message, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /api/settings/:user_id - Fetch stored settings
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<SettingsDocument>, ErrorReply> {
    match state.settings_store.get(&user_id) {
        Ok(Some(settings)) => Ok(Json(SettingsDocument { user_id, settings })),
        Ok(None) => {
            info!("No settings found for user {}", user_id);
            Err((StatusCode::NOT_FOUND, Json(ErrorResponse::new("Settings not found"))))
        }
        Err(e) => {
            error!("Failed to fetch settings for {}: {:#}", user_id, e);
            Err(server_error(format!("{:#}", e)))
        }
    }
}

/// Handle POST /api/settings/:user_id - Upsert settings and apply them to the timer
pub async fn save_settings_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<SettingsDocument>, ErrorReply> {
    info!("Received settings for user {}", user_id);
    match state.save_user_settings(&user_id, patch) {
        Ok(document) => Ok(Json(document)),
        Err(SaveSettingsError::Invalid(msg)) => {
            warn!("Rejected settings for {}: {}", user_id, msg);
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_error("Invalid settings", msg)),
            ))
        }
        Err(e @ SaveSettingsError::Store(_)) => {
            error!("Error saving settings for {}: {}", user_id, e);
            Err(server_error(e))
        }
    }
}

/// Handle POST /api/timer/settings/:user_id - Load a user's settings into the timer
pub async fn load_settings_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    if let Err(e) = state.load_user_settings(&user_id) {
        error!("Failed to apply settings for {}: {}", user_id, e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    timer_reply("Settings applied", state.get_snapshot())
}

/// Handle GET /api/timer - Poll the timer
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerSnapshot>, StatusCode> {
    state.get_snapshot().map(Json).map_err(|e| {
        error!("Failed to get timer snapshot: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle POST /api/timer/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    timer_reply("Timer started", state.start())
}

/// Handle POST /api/timer/stop
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    timer_reply("Timer stopped", state.stop())
}

/// Handle POST /api/timer/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    timer_reply("Timer reset", state.reset())
}

/// Handle POST /api/timer/skip - End the current phase early
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    timer_reply("Phase skipped", state.skip())
}

/// Handle PUT /api/timer/durations - Replace durations (seconds)
pub async fn durations_handler(
    State(state): State<Arc<AppState>>,
    Json(durations): Json<Durations>,
) -> Result<Json<ApiResponse>, StatusCode> {
    timer_reply("Durations updated", state.configure_durations(durations))
}

/// Handle GET /api/timer/sounds/:mode
pub async fn get_sound_handler(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
) -> Result<Json<SoundResponse>, StatusCode> {
    match state.get_sound(&mode) {
        Ok(sound) => Ok(Json(SoundResponse { mode, sound })),
        Err(e) => {
            error!("Failed to read sound for {}: {}", mode, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /api/timer/sounds/:mode - Unknown modes are ignored
pub async fn set_sound_handler(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
    Json(request): Json<SoundRequest>,
) -> Result<Json<SoundResponse>, StatusCode> {
    if let Err(e) = state.set_sound(&mode, request.sound) {
        error!("Failed to set sound for {}: {}", mode, e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    get_sound_handler(State(state), Path(mode)).await
}

/// Handle POST /api/activity/start
pub async fn start_activity_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActivityRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let name = request.name.trim();
    if name.is_empty() {
        warn!("Rejected activity with empty name");
        return Err(StatusCode::BAD_REQUEST);
    }
    timer_reply("Activity started", state.start_activity(name.to_string()))
}

/// Handle POST /api/activity/stop
pub async fn stop_activity_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActivityStopResponse>, StatusCode> {
    match state.stop_activity() {
        Ok((stopped, timer)) => Ok(Json(ActivityStopResponse { stopped, timer })),
        Err(e) => {
            error!("Failed to stop activity: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /api/activities?days=N - Activities started in the last N days
pub async fn activities_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>, StatusCode> {
    let days = query.days.unwrap_or(DEFAULT_ACTIVITY_DAYS).clamp(0, MAX_ACTIVITY_DAYS);
    match state.get_activities(days) {
        Ok(activities) => Ok(Json(ActivitiesResponse { days, activities })),
        Err(e) => {
            error!("Failed to list activities: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /api/events - Server-sent stage-complete notifications
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    info!("Stage event subscriber connected");
    let rx = state.stage_tx.subscribe();

    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(stage) => {
                    let event = Event::default().event("stage-complete").json_data(&stage);
                    return Some((event, rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Stage event subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return current timer and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_snapshot() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

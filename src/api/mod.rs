//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Settings persistence
        .route(
            "/api/settings/:user_id",
            get(get_settings_handler).post(save_settings_handler),
        )
        // Timer commands and polling
        .route("/api/timer", get(timer_handler))
        .route("/api/timer/start", post(start_handler))
        .route("/api/timer/stop", post(stop_handler))
        .route("/api/timer/reset", post(reset_handler))
        .route("/api/timer/skip", post(skip_handler))
        .route("/api/timer/durations", put(durations_handler))
        .route("/api/timer/settings/:user_id", post(load_settings_handler))
        .route(
            "/api/timer/sounds/:mode",
            get(get_sound_handler).put(set_sound_handler),
        )
        // Activity tracking
        .route("/api/activity/start", post(start_activity_handler))
        .route("/api/activity/stop", post(stop_activity_handler))
        .route("/api/activities", get(activities_handler))
        .route("/api/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

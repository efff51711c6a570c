//! Pomodoro Server - A Pomodoro timer with activity tracking
//!
//! This is the main entry point for the pomodoro-server application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use pomodoro_server::{
    config::Config,
    state::AppState,
    api::create_router,
    services::{JsonFileSettingsStore, MemorySettingsStore, SettingsStore},
    tasks::ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_server={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}", config.host, config.port);

    let settings_store: Arc<dyn SettingsStore> = match &config.settings_file {
        Some(path) => Arc::new(JsonFileSettingsStore::open(path)?),
        None => {
            info!("No settings file given, settings are kept in memory");
            Arc::new(MemorySettingsStore::new())
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone(), settings_store));

    if let Some(user_id) = &config.user_id {
        if let Err(e) = state.load_user_settings(user_id) {
            tracing::warn!("Could not apply settings for {}: {}", user_id, e);
        }
    }

    // Start the countdown ticker background task
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        ticker_task(ticker_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /api/settings/:user_id       - Fetch user settings");
    info!("  POST /api/settings/:user_id       - Save user settings");
    info!("  GET  /api/timer                   - Poll timer state");
    info!("  POST /api/timer/start|stop|reset|skip");
    info!("  PUT  /api/timer/durations         - Configure durations (seconds)");
    info!("  POST /api/timer/settings/:user_id - Load user settings into the timer");
    info!("  GET  /api/timer/sounds/:mode      - Read / PUT to change a stage sound");
    info!("  POST /api/activity/start|stop     - Track an activity");
    info!("  GET  /api/activities?days=7       - Recent activities");
    info!("  GET  /api/events                  - Stage-complete event stream");
    info!("  GET  /status                      - Server and timer status");
    info!("  GET  /health                      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

//! Countdown ticker background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Background task that ticks the timer once per second while it is running.
///
/// This is the only place the engine is ticked from, so starting an already
/// running timer can never produce a second countdown.
pub async fn ticker_task(state: Arc<AppState>) {
    info!("Starting ticker task");

    let mut running_rx = state.running_tx.subscribe();

    loop {
        // Wait until the timer is started
        if !*running_rx.borrow_and_update() {
            if running_rx.changed().await.is_err() {
                break;
            }
            continue;
        }

        debug!("Timer running, ticking every {:?}", TICK_INTERVAL);
        let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = state.tick() {
                        error!("Failed to tick timer: {}", e);
                    }
                }

                // Running flag changed - stop ticking if the timer was stopped
                changed = running_rx.changed() => {
                    if changed.is_err() {
                        info!("Ticker task shutting down");
                        return;
                    }
                    if !*running_rx.borrow_and_update() {
                        debug!("Timer stopped, ticker idle");
                        break;
                    }
                }
            }
        }
    }

    info!("Ticker task shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::MemorySettingsStore,
        state::{Durations, Mode},
    };

    fn spawn_state() -> Arc<AppState> {
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".into(),
            Arc::new(MemorySettingsStore::new()),
        ));
        tokio::spawn(ticker_task(Arc::clone(&state)));
        state
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_ticks_once_per_second() {
        let state = spawn_state();
        state.start().unwrap();
        state.start().unwrap();

        tokio::time::sleep(Duration::from_millis(5500)).await;
        let snapshot = state.get_snapshot().unwrap();
        assert_eq!(snapshot.time_remaining_seconds, 25 * 60 - 5);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_freezes_countdown() {
        let state = spawn_state();
        state.start().unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        state.stop().unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let snapshot = state.get_snapshot().unwrap();
        assert!(!snapshot.running);
        assert_eq!(snapshot.time_remaining_seconds, 25 * 60 - 3);
    }

    #[tokio::test(start_paused = true)]
    async fn phases_continue_without_restart() {
        let state = spawn_state();
        let mut stages = state.stage_tx.subscribe();
        state.configure_durations(Durations::from_minutes(1, 1, 1)).unwrap();
        state.start().unwrap();

        tokio::time::sleep(Duration::from_millis(60_500)).await;
        assert_eq!(stages.recv().await.unwrap().mode, Mode::LongBreak);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(stages.recv().await.unwrap().mode, Mode::Focus);
        assert_eq!(state.get_snapshot().unwrap().session_count, 1);
    }
}

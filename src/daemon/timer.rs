//! Tick driver for the session engine.
//!
//! This module provides the daemon's clock source:
//! - Pulses with tokio::time::interval
//! - Measures real elapsed time between pulses
//! - Persists the snapshot whenever an interval finishes

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::engine::SessionEngine;
use crate::store::StateStore;

/// Default pulse period.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

// ============================================================================
// TickDriver
// ============================================================================

/// Feeds elapsed time into a shared engine.
pub struct TickDriver {
    engine: Arc<Mutex<SessionEngine>>,
    store: Arc<dyn StateStore>,
    cadence: Duration,
}

impl TickDriver {
    /// Creates a driver with the default 250 ms cadence.
    pub fn new(engine: Arc<Mutex<SessionEngine>>, store: Arc<dyn StateStore>) -> Self {
        Self {
            engine,
            store,
            cadence: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Overrides the pulse period.
    #[must_use]
    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    /// Runs the tick loop forever.
    ///
    /// It should be spawned as a separate tokio task. Each pulse advances the
    /// engine by the time measured since the previous pulse, or since the
    /// engine was resumed if that is later, so a late pulse is not lost and
    /// time spent idle is never counted.
    pub async fn run(self) {
        let mut ticker = interval(self.cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        loop {
            ticker.tick().await;
            let now = Instant::now();
            let since = last;
            last = now;

            let snapshot = {
                let mut engine = self.engine.lock().await;
                if !engine.is_running() {
                    continue;
                }
                let since = engine.resumed_at().map_or(since, |at| at.max(since));
                if !engine.tick(now.saturating_duration_since(since)) {
                    continue;
                }
                engine.snapshot()
            };

            debug!("Interval finished, persisting state");
            if let Err(e) = self.store.save(&snapshot) {
                warn!("Failed to persist state: {}", e);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::engine::SessionEvent;
    use crate::store::MemoryStateStore;
    use crate::types::TimerMode;

    fn create_engine(
        work_ms: u64,
        break_ms: u64,
    ) -> (Arc<Mutex<SessionEngine>>, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = SessionEngine::with_durations(
            Duration::from_millis(work_ms),
            Duration::from_millis(break_ms),
            tx,
        );
        (Arc::new(Mutex::new(engine)), rx)
    }

    fn spawn_driver(
        engine: &Arc<Mutex<SessionEngine>>,
        store: &Arc<MemoryStateStore>,
    ) -> tokio::task::JoinHandle<()> {
        let store: Arc<dyn StateStore> = store.clone();
        tokio::spawn(TickDriver::new(engine.clone(), store).run())
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_finishes_interval() {
        let (engine, _rx) = create_engine(2000, 1000);
        let store = Arc::new(MemoryStateStore::new());
        engine.lock().await.start();

        let handle = spawn_driver(&engine, &store);
        tokio::time::sleep(Duration::from_millis(2100)).await;
        handle.abort();

        let engine = engine.lock().await;
        assert_eq!(engine.mode(), TimerMode::Break);
        assert_eq!(engine.sessions_completed(), 1);
        assert!(engine.is_running());
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.stored().map(|s| s.sessions_completed), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_skips_when_not_running() {
        let (engine, mut rx) = create_engine(2000, 1000);
        let store = Arc::new(MemoryStateStore::new());

        let handle = spawn_driver(&engine, &store);
        tokio::time::sleep(Duration::from_millis(5000)).await;
        handle.abort();

        assert!(rx.try_recv().is_err());
        assert_eq!(engine.lock().await.remaining(), Duration::from_millis(2000));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_time_is_not_counted() {
        let (engine, _rx) = create_engine(10_000, 1000);
        let store = Arc::new(MemoryStateStore::new());

        let handle = spawn_driver(&engine, &store);
        // Resume 10ms after an idle pulse, then run until 4110ms
        tokio::time::sleep(Duration::from_millis(3010)).await;
        engine.lock().await.start();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        handle.abort();

        // Pulses at 3250..=4000 count 990ms of running time
        assert_eq!(engine.lock().await.remaining(), Duration::from_millis(9010));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_pulse_after_resume_counts_only_running_time() {
        let (engine, _rx) = create_engine(10_000, 1000);
        let store = Arc::new(MemoryStateStore::new());

        let handle = spawn_driver(&engine, &store);
        tokio::time::sleep(Duration::from_millis(3010)).await;
        engine.lock().await.start();
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.abort();

        assert_eq!(engine.lock().await.remaining(), Duration::from_millis(9760));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_resume_does_not_skew_countdown() {
        let (engine, _rx) = create_engine(10_000, 1000);
        let store = Arc::new(MemoryStateStore::new());
        engine.lock().await.start();

        let handle = spawn_driver(&engine, &store);
        // Pulses at 0, 250, 500; pause at 600
        tokio::time::sleep(Duration::from_millis(600)).await;
        engine.lock().await.pause();
        tokio::time::sleep(Duration::from_millis(1030)).await;
        // Resume at 1630, pulses at 1750 and 2000
        engine.lock().await.start();
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.abort();

        // 500ms before the pause, 370ms after the resume
        assert_eq!(engine.lock().await.remaining(), Duration::from_millis(9130));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_cadence() {
        let (engine, mut rx) = create_engine(10_000, 1000);
        let store = Arc::new(MemoryStateStore::new());
        engine.lock().await.start();
        let _ = rx.try_recv();

        let store_dyn: Arc<dyn StateStore> = store.clone();
        let handle = tokio::spawn(
            TickDriver::new(engine.clone(), store_dyn)
                .with_cadence(Duration::from_secs(1))
                .run(),
        );
        tokio::time::sleep(Duration::from_millis(3500)).await;
        handle.abort();

        let mut ticks = 0;
        while let Ok(event) = rx.try_recv() {
            if event.is_tick() {
                ticks += 1;
            }
        }
        // Immediate first pulse plus one per second
        assert_eq!(ticks, 4);
        assert_eq!(engine.lock().await.remaining(), Duration::from_secs(7));
    }
}

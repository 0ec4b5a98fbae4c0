//! End-to-end tests for the daemon.
//!
//! These tests verify complete workflows:
//! - A full daemon run driven by the CLI client, ending in quit
//! - State restored from and written back to the state file
//! - Auto-chaining of work and break intervals under the tick driver

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, Notify};
use tokio::time::timeout;

use pomoloop::cli::client::IpcClient;
use pomoloop::daemon::{self, DaemonOptions, RequestHandler, TickDriver};
use pomoloop::engine::{SessionEngine, SessionEvent};
use pomoloop::feedback::{FeedbackDispatcher, MockNotifier};
use pomoloop::sound::{MockSoundPlayer, SoundLibrary};
use pomoloop::store::{FileStateStore, MemoryStateStore, StateStore};
use pomoloop::types::{IpcRequest, SessionSnapshot, TimerMode};

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates a temporary directory that outlives the test.
fn create_temp_dir() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    // Keep the directory so it's not deleted
    std::mem::forget(dir);
    path
}

fn create_options(dir: &Path) -> DaemonOptions {
    DaemonOptions {
        no_sound: true,
        state_file: Some(dir.join("state.json")),
        socket_path: Some(dir.join("daemon.sock")),
        ..DaemonOptions::default()
    }
}

fn read_state(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

// ============================================================================
// Daemon Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_daemon_full_session_via_client() {
    let dir = create_temp_dir();
    let options = create_options(&dir);
    let client = IpcClient::with_socket_path(dir.join("daemon.sock"));

    let client_flow = async {
        let started = client.start().await.unwrap();
        assert!(started.data.unwrap().running);

        let configured = client.configure(50, 0).await.unwrap();
        let data = configured.data.unwrap();
        assert_eq!(data.work_minutes, 50);
        assert_eq!(data.break_minutes, 1);
        // Running interval keeps its remaining time
        assert!(data.remaining_millis <= 25 * 60 * 1000);

        let reset = client.reset(9).await.unwrap();
        assert_eq!(reset.data.unwrap().sessions_completed, 9);

        let status = client.status().await.unwrap().data.unwrap();
        assert_eq!(status.mode, "work");
        assert!(status.running);

        client.quit().await.unwrap();
    };

    let (result, ()) = timeout(
        Duration::from_secs(10),
        async { tokio::join!(daemon::run(options), client_flow) },
    )
    .await
    .unwrap();
    result.unwrap();

    let state = read_state(&dir.join("state.json"));
    assert_eq!(state["sessionsCompleted"], 1);
    assert_eq!(state["workMinutes"], 50);
    assert_eq!(state["breakMinutes"], 1);
    assert_eq!(state["isWorkMode"], true);
    assert_eq!(state["running"], true);
    assert!(!dir.join("daemon.sock").exists());
}

#[tokio::test]
async fn test_daemon_restores_state_file() {
    let dir = create_temp_dir();
    let state_path = dir.join("state.json");
    FileStateStore::with_path(&state_path)
        .save(&SessionSnapshot {
            work_minutes: 40,
            break_minutes: 8,
            is_work_mode: false,
            time_left_millis: 120_000,
            running: false,
            sessions_completed: 4,
        })
        .unwrap();

    let options = create_options(&dir);
    let client = IpcClient::with_socket_path(dir.join("daemon.sock"));

    let client_flow = async {
        let data = client.status().await.unwrap().data.unwrap();
        assert_eq!(data.mode, "break");
        assert_eq!(data.remaining, "02:00");
        assert_eq!(data.sessions_completed, 4);
        assert_eq!(data.work_minutes, 40);
        assert!(!data.running);

        client.quit().await.unwrap();
    };

    let (result, ()) = timeout(
        Duration::from_secs(10),
        async { tokio::join!(daemon::run(options), client_flow) },
    )
    .await
    .unwrap();
    result.unwrap();

    let state = read_state(&state_path);
    assert_eq!(state["sessionsCompleted"], 1);
    assert_eq!(state["isWorkMode"], false);
    assert_eq!(state["timeLeftMillis"], 120_000);
}

#[tokio::test]
async fn test_daemon_duration_overrides_are_clamped() {
    let dir = create_temp_dir();
    let options = DaemonOptions {
        work_minutes: Some(-5),
        break_minutes: Some(12),
        ..create_options(&dir)
    };
    let client = IpcClient::with_socket_path(dir.join("daemon.sock"));

    let client_flow = async {
        let data = client.status().await.unwrap().data.unwrap();
        assert_eq!(data.work_minutes, 1);
        assert_eq!(data.break_minutes, 12);
        assert_eq!(data.remaining, "01:00");

        client.quit().await.unwrap();
    };

    let (result, ()) = timeout(
        Duration::from_secs(10),
        async { tokio::join!(daemon::run(options), client_flow) },
    )
    .await
    .unwrap();
    result.unwrap();
}

// ============================================================================
// Auto-Chaining Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_tick_driver_chains_intervals_and_persists() {
    let (tx, mut events) = mpsc::unbounded_channel();
    let engine = Arc::new(Mutex::new(SessionEngine::with_durations(
        Duration::from_secs(3),
        Duration::from_secs(3),
        tx,
    )));
    let store = Arc::new(MemoryStateStore::new());
    let handler = RequestHandler::new(
        engine.clone(),
        store.clone() as Arc<dyn StateStore>,
        Arc::new(Notify::new()),
    );

    let ticker = tokio::spawn(TickDriver::new(engine.clone(), store.clone()).run());

    assert!(!handler.handle(IpcRequest::Start).await.is_error());

    // One full work interval and one full break, plus slack
    tokio::time::sleep(Duration::from_millis(6_400)).await;
    ticker.abort();

    let status = handler.handle(IpcRequest::Status).await.data.unwrap();
    assert_eq!(status.mode, "work");
    assert!(status.running);
    assert_eq!(status.sessions_completed, 1);

    // Start, plus one save per finished interval
    assert_eq!(store.save_count(), 3);

    let mut dispatcher = FeedbackDispatcher::new(
        Some(MockSoundPlayer::new()),
        MockNotifier::new(),
        SoundLibrary::new(None).with_fallback(None),
    );
    let mut finished = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::IntervalFinished { mode } = event {
            finished.push(mode);
        }
        dispatcher.handle(&event);
    }

    assert_eq!(finished, vec![TimerMode::Work, TimerMode::Break]);
    assert_eq!(
        dispatcher.player().unwrap().played_names(),
        vec!["work_start", "break_start", "alert", "break_end", "alert", "work_start"]
    );
    assert_eq!(dispatcher.notifier().notification_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_paused_engine_does_not_advance() {
    let (tx, _events) = mpsc::unbounded_channel();
    let engine = Arc::new(Mutex::new(SessionEngine::with_durations(
        Duration::from_secs(3),
        Duration::from_secs(3),
        tx,
    )));
    let store = Arc::new(MemoryStateStore::new());

    let ticker = tokio::spawn(TickDriver::new(engine.clone(), store.clone()).run());

    engine.lock().await.start();
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    engine.lock().await.pause();
    let remaining = engine.lock().await.remaining();

    tokio::time::sleep(Duration::from_secs(10)).await;
    ticker.abort();

    let engine = engine.lock().await;
    assert_eq!(engine.remaining(), remaining);
    assert_eq!(engine.mode(), TimerMode::Work);
    assert_eq!(engine.sessions_completed(), 0);
    assert_eq!(store.save_count(), 0);
}

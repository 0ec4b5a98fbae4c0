//! Daemon module for the session loop.
//!
//! This module contains the core daemon functionality:
//! - `timer`: Tick driver feeding elapsed time into the engine
//! - `ipc`: Unix socket server and request handling
//! - [`run`]: Wires engine, store, feedback and IPC together

pub mod ipc;
pub mod timer;

pub use ipc::{default_socket_path, IpcServer, RequestHandler, DEFAULT_SOCKET_PATH};
pub use timer::{TickDriver, DEFAULT_TICK_INTERVAL};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Mutex, Notify};
use tracing::{info, warn};

use crate::engine::SessionEngine;
use crate::feedback::{DesktopNotifier, FeedbackDispatcher, Notifier, TerminalNotifier};
use crate::sound::{try_create_player, SoundLibrary};
use crate::store::{FileStateStore, StateStore};
use crate::types::{clamp_minutes, PomodoroConfig, SESSION_COUNT_BASELINE};

/// Startup options for the daemon.
#[derive(Debug, Clone, Default)]
pub struct DaemonOptions {
    /// Overrides the persisted work duration (minutes)
    pub work_minutes: Option<i64>,
    /// Overrides the persisted break duration (minutes)
    pub break_minutes: Option<i64>,
    /// Skip audio entirely
    pub no_sound: bool,
    /// Send notifications to the desktop instead of the terminal
    pub desktop_notify: bool,
    /// Directory holding per-cue sound files
    pub sound_dir: Option<PathBuf>,
    /// State file; defaults to `~/.pomoloop/state.json`
    pub state_file: Option<PathBuf>,
    /// Socket path; defaults to `~/.pomoloop/pomoloop.sock`
    pub socket_path: Option<PathBuf>,
}

impl DaemonOptions {
    /// Applies the duration overrides on top of the saved configuration.
    ///
    /// Overrides below one minute are raised to one minute.
    pub fn config_over(&self, saved: PomodoroConfig) -> PomodoroConfig {
        let mut config = saved;
        if let Some(work) = self.work_minutes {
            config = config.with_work_minutes(clamp_minutes(work));
        }
        if let Some(brk) = self.break_minutes {
            config = config.with_break_minutes(clamp_minutes(brk));
        }
        config
    }

    /// Creates the notifier selected by the options.
    pub fn notifier(&self) -> Box<dyn Notifier> {
        if self.desktop_notify {
            Box::new(DesktopNotifier::new())
        } else {
            Box::new(TerminalNotifier::default())
        }
    }
}

/// Runs the daemon in the foreground until Ctrl-C or a quit request.
///
/// On exit the session count is reset to the baseline and the state is
/// persisted one last time.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound.
pub async fn run(options: DaemonOptions) -> Result<()> {
    let store: Arc<dyn StateStore> = Arc::new(match &options.state_file {
        Some(path) => FileStateStore::with_path(path),
        None => FileStateStore::new(),
    });

    let mut snapshot = store.load();
    let config = options.config_over(snapshot.config());
    snapshot.work_minutes = config.work_minutes;
    snapshot.break_minutes = config.break_minutes;

    let (event_tx, mut events) = mpsc::unbounded_channel();
    let engine = Arc::new(Mutex::new(SessionEngine::restore(&snapshot, event_tx)));

    let notifier = options.notifier();
    let socket_path = match options.socket_path {
        Some(path) => path,
        None => default_socket_path()?,
    };
    let server = IpcServer::new(&socket_path).context("Failed to start IPC server")?;

    // The output stream is not Send; the dispatcher stays on this task.
    let player = if options.no_sound {
        info!("Sound disabled");
        None
    } else {
        try_create_player(false)
    };
    let library = SoundLibrary::new(options.sound_dir.or_else(SoundLibrary::default_sound_dir));
    let mut dispatcher = FeedbackDispatcher::new(player, notifier, library);

    let shutdown = Arc::new(Notify::new());
    let handler = RequestHandler::new(engine.clone(), store.clone(), shutdown.clone());
    let ticker = tokio::spawn(TickDriver::new(engine.clone(), store.clone()).run());

    {
        let engine = engine.lock().await;
        info!(
            "Daemon started: {} {} (sessions: {})",
            engine.mode().label(),
            engine.remaining_display(),
            engine.sessions_completed()
        );
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            Some(event) = events.recv() => dispatcher.handle(&event),
            accepted = server.accept() => match accepted {
                Ok(stream) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handler.serve(stream).await {
                            warn!("IPC connection failed: {:#}", e);
                        }
                    });
                }
                Err(e) => warn!("{:#}", e),
            },
            () = shutdown.notified() => {
                info!("Quit requested");
                break;
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Interrupted");
                break;
            }
        }
    }

    ticker.abort();

    let snapshot = {
        let mut engine = engine.lock().await;
        engine.reset_session_count(SESSION_COUNT_BASELINE);
        engine.snapshot()
    };
    if let Err(e) = store.save(&snapshot) {
        warn!("Failed to persist state on exit: {}", e);
    }

    // Drain what the engine emitted before shutdown
    while let Ok(event) = events.try_recv() {
        dispatcher.handle(&event);
    }

    info!("Daemon stopped");
    Ok(())
}

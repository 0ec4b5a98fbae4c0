//! pomoloop library
//!
//! A Pomodoro timer that alternates work and break intervals forever.
//! It includes:
//! - Session engine owning mode, countdown, session count and cue preplay
//! - Feedback dispatch turning engine events into sounds and notifications
//! - State persistence across daemon restarts
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities

pub mod cli;
pub mod daemon;
pub mod engine;
pub mod feedback;
pub mod sound;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    IpcRequest, IpcResponse, PomodoroConfig, ResponseData, SessionSnapshot, TimerMode,
};

// Re-export engine types
pub use engine::{SessionEngine, SessionEvent};

// Re-export feedback types
pub use feedback::{
    DesktopNotifier, FeedbackDispatcher, MockNotifier, Notification, Notifier, TerminalNotifier,
};

// Re-export sound types
pub use sound::{
    get_default_sound, MockSoundPlayer, RodioSoundPlayer, SoundCue, SoundError, SoundLibrary,
    SoundPlayer, SoundSource,
};

// Re-export store types
pub use store::{FileStateStore, MemoryStateStore, StateStore, StoreError};

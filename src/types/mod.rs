//! Core data types for pomoloop.
//!
//! This module defines the data structures used for:
//! - The work/break mode of the session engine
//! - Duration configuration with clamping
//! - The persisted session snapshot
//! - IPC request/response serialization

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest accepted interval length in minutes.
pub const MIN_MINUTES: u32 = 1;

/// Default work interval length in minutes.
pub const DEFAULT_WORK_MINUTES: u32 = 25;

/// Default break interval length in minutes.
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Session count written on first run and whenever the user leaves.
pub const SESSION_COUNT_BASELINE: u32 = 1;

// ============================================================================
// TimerMode
// ============================================================================

/// The interval type currently counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Focused work interval
    #[default]
    Work,
    /// Break interval
    Break,
}

impl TimerMode {
    /// Returns the wire representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::Break => "break",
        }
    }

    /// Returns the label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Work => "作業",
            TimerMode::Break => "休憩",
        }
    }

    /// Returns the mode that follows this one.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            TimerMode::Work => TimerMode::Break,
            TimerMode::Break => TimerMode::Work,
        }
    }

    /// Returns true for the work interval.
    pub fn is_work(&self) -> bool {
        matches!(self, TimerMode::Work)
    }

    /// Parses the wire representation produced by [`TimerMode::as_str`].
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "work" => Some(TimerMode::Work),
            "break" => Some(TimerMode::Break),
            _ => None,
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PomodoroConfig
// ============================================================================

/// Interval lengths of the work/break loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    /// Work duration in minutes (at least 1)
    pub work_minutes: u32,
    /// Break duration in minutes (at least 1)
    pub break_minutes: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl PomodoroConfig {
    /// Builds a configuration from raw user input.
    ///
    /// Non-positive values are silently raised to [`MIN_MINUTES`].
    pub fn clamped(work_minutes: i64, break_minutes: i64) -> Self {
        Self {
            work_minutes: clamp_minutes(work_minutes),
            break_minutes: clamp_minutes(break_minutes),
        }
    }

    /// Returns a copy with zero durations raised to [`MIN_MINUTES`].
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            work_minutes: self.work_minutes.max(MIN_MINUTES),
            break_minutes: self.break_minutes.max(MIN_MINUTES),
        }
    }

    /// Creates a new configuration with the specified work duration.
    #[must_use]
    pub fn with_work_minutes(mut self, minutes: u32) -> Self {
        self.work_minutes = minutes.max(MIN_MINUTES);
        self
    }

    /// Creates a new configuration with the specified break duration.
    #[must_use]
    pub fn with_break_minutes(mut self, minutes: u32) -> Self {
        self.break_minutes = minutes.max(MIN_MINUTES);
        self
    }

    /// Length of the work interval.
    pub fn work_duration(&self) -> Duration {
        minutes(self.work_minutes)
    }

    /// Length of the break interval.
    pub fn break_duration(&self) -> Duration {
        minutes(self.break_minutes)
    }

    /// Length of the interval for `mode`.
    pub fn duration_of(&self, mode: TimerMode) -> Duration {
        match mode {
            TimerMode::Work => self.work_duration(),
            TimerMode::Break => self.break_duration(),
        }
    }
}

/// Clamps a signed minute count into the accepted range.
pub fn clamp_minutes(value: i64) -> u32 {
    if value < i64::from(MIN_MINUTES) {
        MIN_MINUTES
    } else {
        u32::try_from(value).unwrap_or(u32::MAX)
    }
}

fn minutes(value: u32) -> Duration {
    Duration::from_secs(u64::from(value) * 60)
}

// ============================================================================
// SessionSnapshot
// ============================================================================

/// Durable view of the session engine.
///
/// This is both the persisted key/value record and the source of every
/// status display. Keys missing from a stored record take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSnapshot {
    /// Work duration in minutes
    pub work_minutes: u32,
    /// Break duration in minutes
    pub break_minutes: u32,
    /// Whether the current interval is a work interval
    pub is_work_mode: bool,
    /// Time left in the current interval, in milliseconds
    pub time_left_millis: u64,
    /// Whether the countdown is running
    pub running: bool,
    /// Number of completed work intervals
    pub sessions_completed: u32,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        let config = PomodoroConfig::default();
        Self {
            work_minutes: config.work_minutes,
            break_minutes: config.break_minutes,
            is_work_mode: true,
            time_left_millis: duration_millis(config.work_duration()),
            running: false,
            sessions_completed: SESSION_COUNT_BASELINE,
        }
    }
}

impl SessionSnapshot {
    /// Mode recorded in the snapshot.
    pub fn mode(&self) -> TimerMode {
        if self.is_work_mode {
            TimerMode::Work
        } else {
            TimerMode::Break
        }
    }

    /// Duration configuration recorded in the snapshot.
    pub fn config(&self) -> PomodoroConfig {
        PomodoroConfig {
            work_minutes: self.work_minutes,
            break_minutes: self.break_minutes,
        }
        .sanitized()
    }

    /// Time left in the current interval.
    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.time_left_millis)
    }

    /// Completed fraction of the current interval, in `[0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        progress_fraction(self.config().duration_of(self.mode()), self.remaining())
    }
}

// ============================================================================
// Time helpers
// ============================================================================

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Formats a remaining time as `mm:ss`.
///
/// Minutes are not wrapped into hours, and partial seconds are truncated.
pub fn format_clock(remaining: Duration) -> String {
    let total_seconds = remaining.as_secs();
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Completed fraction of an interval of length `total` with `remaining` left.
pub fn progress_fraction(total: Duration, remaining: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    let elapsed = total.saturating_sub(remaining);
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

/// Rounds a progress fraction to a whole percentage.
pub fn progress_percent(fraction: f64) -> u8 {
    // Clamped to 0..=100, so the cast cannot truncate.
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

// ============================================================================
// IPC Types
// ============================================================================

fn default_baseline() -> u32 {
    SESSION_COUNT_BASELINE
}

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Query the current status
    Status,
    /// Change both interval lengths
    Configure {
        /// Work duration in minutes (non-positive values are clamped)
        #[serde(rename = "workMinutes")]
        work_minutes: i64,
        /// Break duration in minutes (non-positive values are clamped)
        #[serde(rename = "breakMinutes")]
        break_minutes: i64,
    },
    /// Overwrite the completed session count
    Reset {
        /// New session count
        #[serde(default = "default_baseline")]
        baseline: u32,
    },
    /// Leave: reset the session count and stop the daemon
    Quit,
}

/// Status payload attached to IPC responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// Current mode ("work" or "break")
    pub mode: String,
    /// Whether the countdown is running
    pub running: bool,
    /// Time left in milliseconds
    pub remaining_millis: u64,
    /// Time left formatted as mm:ss
    pub remaining: String,
    /// Completed share of the current interval (0-100)
    pub progress_percent: u8,
    /// Completed work intervals
    pub sessions_completed: u32,
    /// Work duration in minutes
    pub work_minutes: u32,
    /// Break duration in minutes
    pub break_minutes: u32,
}

impl ResponseData {
    /// Creates response data from a session snapshot.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self {
            mode: snapshot.mode().as_str().to_string(),
            running: snapshot.running,
            remaining_millis: snapshot.time_left_millis,
            remaining: format_clock(snapshot.remaining()),
            progress_percent: progress_percent(snapshot.progress_fraction()),
            sessions_completed: snapshot.sessions_completed,
            work_minutes: snapshot.work_minutes,
            break_minutes: snapshot.break_minutes,
        }
    }

    /// Parsed mode, if the daemon sent a known value.
    pub fn timer_mode(&self) -> Option<TimerMode> {
        TimerMode::from_wire(&self.mode)
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// Returns true for an error response.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

// ============================================================================
// Tests
// ============================================================================

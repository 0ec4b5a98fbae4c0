//! Events emitted by the session engine.

use crate::types::TimerMode;

/// Discrete notifications for the feedback and presentation layers.
///
/// Events are sent synchronously, in the order the engine performs the
/// corresponding transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Countdown started or resumed
    SessionStarted {
        /// Mode of the interval now running
        mode: TimerMode,
    },
    /// Countdown paused
    SessionPaused {
        /// Mode of the paused interval
        mode: TimerMode,
    },
    /// Time advanced while running
    Tick {
        /// Mode of the running interval
        mode: TimerMode,
        /// Time left after this tick, in milliseconds
        remaining_millis: u64,
    },
    /// The work interval is about to end; the break-start cue may play now
    PreplayBreakStart,
    /// The break interval is about to end; the break-end cue may play now
    PreplayBreakEnd,
    /// The current interval was restarted from its full length while idle
    IntervalRestarted {
        /// Mode of the restarted interval
        mode: TimerMode,
    },
    /// An interval ran down to zero
    IntervalFinished {
        /// Mode of the interval that finished
        mode: TimerMode,
    },
    /// The completed session count changed after a work interval
    SessionsChanged {
        /// New completed session count
        sessions_completed: u32,
    },
}

impl SessionEvent {
    /// Returns true for the high-frequency tick event.
    pub fn is_tick(&self) -> bool {
        matches!(self, SessionEvent::Tick { .. })
    }
}

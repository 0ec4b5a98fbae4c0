//! The work/break session engine.
//!
//! The engine is a plain owned state machine with two states per mode,
//! idle and running. It never blocks and never spawns: a clock source feeds
//! it `tick` pulses, a command source calls `start`/`pause`/`reconfigure`,
//! and every transition is reported on an event channel.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::event::SessionEvent;
use crate::types::{
    duration_millis, format_clock, progress_fraction, PomodoroConfig, SessionSnapshot, TimerMode,
};

/// Remaining work time at which the break-start cue is released early.
pub const BREAK_START_PREPLAY_WINDOW: Duration = Duration::from_millis(1500);

/// Remaining break time at which the break-end cue is released early.
pub const BREAK_END_PREPLAY_WINDOW: Duration = Duration::from_millis(2000);

/// Shortest interval accepted by [`SessionEngine::with_durations`].
const MIN_INTERVAL: Duration = Duration::from_millis(1);

// ============================================================================
// SessionEngine
// ============================================================================

/// Countdown state machine alternating between work and break intervals.
///
/// Not synchronized: callers that share it between tasks must wrap every
/// call in one mutex.
pub struct SessionEngine {
    work_duration: Duration,
    break_duration: Duration,
    mode: TimerMode,
    remaining: Duration,
    running: bool,
    sessions_completed: u32,
    /// Set once the break-start cue was released during the current interval.
    break_start_preplayed: bool,
    /// Set once the break-end cue was released during the current interval.
    break_pre_end_played: bool,
    /// When the countdown last went from idle to running.
    resumed_at: Option<Instant>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionEngine {
    /// Creates an idle engine at the start of a work interval.
    pub fn new(config: PomodoroConfig, event_tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        let config = config.sanitized();
        Self::with_durations(config.work_duration(), config.break_duration(), event_tx)
    }

    /// Creates an idle engine with arbitrary interval lengths.
    ///
    /// Zero lengths are raised to one millisecond.
    pub fn with_durations(
        work: Duration,
        brk: Duration,
        event_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let work_duration = work.max(MIN_INTERVAL);
        Self {
            work_duration,
            break_duration: brk.max(MIN_INTERVAL),
            mode: TimerMode::Work,
            remaining: work_duration,
            running: false,
            sessions_completed: 0,
            break_start_preplayed: false,
            break_pre_end_played: false,
            resumed_at: None,
            event_tx,
        }
    }

    /// Rebuilds an engine from a persisted snapshot.
    ///
    /// A stored time of zero, or one longer than the restored interval,
    /// restarts the interval from its full length. A snapshot that was
    /// running resumes immediately.
    pub fn restore(
        snapshot: &SessionSnapshot,
        event_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let mut engine = Self::new(snapshot.config(), event_tx);
        engine.mode = snapshot.mode();
        engine.sessions_completed = snapshot.sessions_completed;

        let duration = engine.current_duration();
        let stored = snapshot.remaining();
        engine.remaining = if stored.is_zero() || stored > duration {
            duration
        } else {
            stored
        };

        debug!(
            mode = %engine.mode,
            remaining = %format_clock(engine.remaining),
            sessions = engine.sessions_completed,
            "Session state restored"
        );

        if snapshot.running {
            engine.start();
        }
        engine
    }

    /// Starts or resumes the countdown.
    ///
    /// Returns false without side effects if the countdown is already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            debug!("start ignored: already running");
            return false;
        }

        self.running = true;
        self.resumed_at = Some(Instant::now());
        info!(
            mode = %self.mode,
            remaining = %format_clock(self.remaining),
            "Session started"
        );
        self.emit(SessionEvent::SessionStarted { mode: self.mode });
        true
    }

    /// Pauses the countdown, keeping the remaining time.
    ///
    /// Returns false without side effects if the countdown is not running.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            debug!("pause ignored: not running");
            return false;
        }

        self.running = false;
        self.resumed_at = None;
        info!(
            mode = %self.mode,
            remaining = %format_clock(self.remaining),
            "Session paused"
        );
        self.emit(SessionEvent::SessionPaused { mode: self.mode });
        true
    }

    /// Advances the countdown by `elapsed`.
    ///
    /// Ignored while idle. Returns true if the tick finished an interval,
    /// in which case the engine has already switched mode and started the
    /// next interval.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.running {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(elapsed);
        self.emit(SessionEvent::Tick {
            mode: self.mode,
            remaining_millis: duration_millis(self.remaining),
        });

        match self.mode {
            TimerMode::Work
                if !self.break_start_preplayed
                    && self.remaining <= BREAK_START_PREPLAY_WINDOW =>
            {
                self.break_start_preplayed = true;
                self.emit(SessionEvent::PreplayBreakStart);
            }
            TimerMode::Break
                if !self.break_pre_end_played && self.remaining <= BREAK_END_PREPLAY_WINDOW =>
            {
                self.break_pre_end_played = true;
                self.emit(SessionEvent::PreplayBreakEnd);
            }
            _ => {}
        }

        if self.remaining.is_zero() {
            self.complete_interval();
            return true;
        }
        false
    }

    /// Finishes the current interval and chains into the next one.
    fn complete_interval(&mut self) {
        let finished = self.mode;
        info!(mode = %finished, "Interval finished");
        self.emit(SessionEvent::IntervalFinished { mode: finished });

        if finished.is_work() {
            self.sessions_completed = self.sessions_completed.saturating_add(1);
            info!(sessions = self.sessions_completed, "Work session completed");
            self.emit(SessionEvent::SessionsChanged {
                sessions_completed: self.sessions_completed,
            });
        }

        self.mode = finished.toggled();
        self.break_start_preplayed = false;
        self.break_pre_end_played = false;
        self.remaining = self.current_duration();

        // The loop never rests between intervals; only pause() stops it.
        self.running = false;
        self.start();
    }

    /// Replaces both interval lengths.
    ///
    /// Non-positive minute counts are clamped to one minute. While idle the
    /// current interval restarts at its new length with its preplay cues
    /// re-armed; while running the remaining time is kept, capped to the new
    /// length.
    pub fn reconfigure(&mut self, work_minutes: i64, break_minutes: i64) {
        let config = PomodoroConfig::clamped(work_minutes, break_minutes);
        self.work_duration = config.work_duration();
        self.break_duration = config.break_duration();

        let duration = self.current_duration();
        if self.running {
            self.remaining = self.remaining.min(duration);
        } else {
            self.remaining = duration;
            self.break_start_preplayed = false;
            self.break_pre_end_played = false;
            self.emit(SessionEvent::IntervalRestarted { mode: self.mode });
        }

        info!(
            work_minutes = config.work_minutes,
            break_minutes = config.break_minutes,
            remaining = %format_clock(self.remaining),
            "Durations reconfigured"
        );
    }

    /// Overwrites the completed session count.
    ///
    /// Mode, remaining time and running state are untouched.
    pub fn reset_session_count(&mut self, baseline: u32) {
        info!(
            from = self.sessions_completed,
            to = baseline,
            "Session count reset"
        );
        self.sessions_completed = baseline;
    }

    /// Current interval type.
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Time left in the current interval.
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Whether the countdown is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of completed work intervals.
    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    /// Length of the interval for `mode`.
    pub fn duration_of(&self, mode: TimerMode) -> Duration {
        match mode {
            TimerMode::Work => self.work_duration,
            TimerMode::Break => self.break_duration,
        }
    }

    /// Length of the current interval.
    pub fn current_duration(&self) -> Duration {
        self.duration_of(self.mode)
    }

    /// Interval lengths in whole minutes.
    pub fn config(&self) -> PomodoroConfig {
        PomodoroConfig {
            work_minutes: whole_minutes(self.work_duration),
            break_minutes: whole_minutes(self.break_duration),
        }
        .sanitized()
    }

    /// Completed fraction of the current interval, in `[0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        progress_fraction(self.current_duration(), self.remaining)
    }

    /// Remaining time formatted as `mm:ss`.
    pub fn remaining_display(&self) -> String {
        format_clock(self.remaining)
    }

    /// Instant of the last idle-to-running transition, while running.
    ///
    /// Clock sources use it so time spent idle before a resume is not
    /// charged to the countdown.
    pub fn resumed_at(&self) -> Option<Instant> {
        self.resumed_at
    }

    /// Durable view of the engine for persistence and display.
    pub fn snapshot(&self) -> SessionSnapshot {
        let config = self.config();
        SessionSnapshot {
            work_minutes: config.work_minutes,
            break_minutes: config.break_minutes,
            is_work_mode: self.mode.is_work(),
            time_left_millis: duration_millis(self.remaining),
            running: self.running,
            sessions_completed: self.sessions_completed,
        }
    }

    fn emit(&self, event: SessionEvent) {
        if self.event_tx.send(event).is_err() && !event.is_tick() {
            warn!("Event receiver dropped, {:?} was not delivered", event);
        }
    }
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("mode", &self.mode)
            .field("remaining", &self.remaining)
            .field("running", &self.running)
            .field("sessions_completed", &self.sessions_completed)
            .finish_non_exhaustive()
    }
}

fn whole_minutes(duration: Duration) -> u32 {
    u32::try_from(duration.as_secs() / 60).unwrap_or(u32::MAX)
}

// ============================================================================
// Tests
// ============================================================================

//! Audible and visible feedback for session events.
//!
//! This module turns [`SessionEvent`]s into side effects:
//! - `notifier`: User notifications for finished intervals
//! - [`FeedbackDispatcher`]: Maps each event to cues and notifications
//!
//! Feedback failures are logged and swallowed; they never reach the engine.

mod error;
mod notifier;

pub use error::NotifyError;
pub use notifier::{DesktopNotifier, MockNotifier, Notification, Notifier, TerminalNotifier};

use tracing::{debug, info, warn};

use crate::engine::SessionEvent;
use crate::sound::{SoundCue, SoundLibrary, SoundPlayer};
use crate::types::TimerMode;

/// Plays cues and shows notifications in response to session events.
pub struct FeedbackDispatcher<P, N> {
    player: Option<P>,
    notifier: N,
    library: SoundLibrary,
    /// The break-start cue already played ahead of the coming break.
    break_start_preplayed: bool,
}

impl<P: SoundPlayer, N: Notifier> FeedbackDispatcher<P, N> {
    /// Creates a dispatcher. Without a player all cues are skipped.
    pub fn new(player: Option<P>, notifier: N, library: SoundLibrary) -> Self {
        Self {
            player,
            notifier,
            library,
            break_start_preplayed: false,
        }
    }

    pub fn player(&self) -> Option<&P> {
        self.player.as_ref()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Handles one event.
    pub fn handle(&mut self, event: &SessionEvent) {
        match *event {
            SessionEvent::SessionStarted {
                mode: TimerMode::Work,
            } => self.play(SoundCue::WorkStart),
            SessionEvent::SessionStarted {
                mode: TimerMode::Break,
            } => {
                if std::mem::take(&mut self.break_start_preplayed) {
                    debug!("break_start already preplayed");
                } else {
                    self.play(SoundCue::BreakStart);
                }
            }
            SessionEvent::PreplayBreakStart => {
                self.play(SoundCue::BreakStart);
                self.break_start_preplayed = true;
            }
            SessionEvent::PreplayBreakEnd => self.play(SoundCue::BreakEnd),
            SessionEvent::IntervalRestarted { mode } => {
                // The early cue belonged to the abandoned interval
                self.break_start_preplayed = false;
                debug!("{} interval restarted", mode);
            }
            SessionEvent::IntervalFinished { mode } => {
                self.notify(&Notification::interval_finished(mode));
                self.play(SoundCue::Alert);
            }
            SessionEvent::SessionsChanged { sessions_completed } => {
                info!("Completed sessions: {}", sessions_completed);
            }
            SessionEvent::SessionPaused { mode } => {
                debug!("{} paused", mode);
            }
            SessionEvent::Tick { .. } => {}
        }
    }

    fn play(&self, cue: SoundCue) {
        let Some(player) = &self.player else {
            return;
        };
        let source = self.library.resolve(cue);
        debug!("Cue {} -> {}", cue, source.name());
        if let Err(e) = player.play(&source) {
            warn!("Failed to play {}: {}", cue, e);
        }
    }

    fn notify(&self, notification: &Notification) {
        if let Err(e) = self.notifier.notify(notification) {
            warn!("Failed to notify: {} ({})", e, e.suggestion());
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

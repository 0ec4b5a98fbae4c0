//! User notifications for finished intervals.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::error::NotifyError;
use crate::types::TimerMode;

/// ASCII bell, the terminal's stand-in for a vibration.
const BELL: &str = "\x07";

/// Application name shown by the desktop notification daemon.
const APP_NAME: &str = "pomoloop";

/// Freedesktop icon name for desktop notifications.
const APP_ICON: &str = "alarm-clock";

/// A title and a one-line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Notification for the end of an interval of `mode`.
    pub fn interval_finished(mode: TimerMode) -> Self {
        match mode {
            TimerMode::Work => Self::new("🍅 作業完了", "休憩の時間です"),
            TimerMode::Break => Self::new("☕ 休憩終了", "作業に戻りましょう"),
        }
    }
}

/// Delivers notifications to the user.
pub trait Notifier {
    /// Shows `notification`.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification cannot be delivered.
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).notify(notification)
    }
}

// ============================================================================
// TerminalNotifier
// ============================================================================

/// Writes notifications to stderr.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    bell: bool,
}

impl TerminalNotifier {
    /// Creates a notifier; `bell` rings the terminal bell before each message.
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }

    /// Formats `notification` the way it is written to the terminal.
    pub fn render(&self, notification: &Notification) -> String {
        let bell = if self.bell { BELL } else { "" };
        format!("{}{}: {}", bell, notification.title, notification.body)
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{}", self.render(notification))?;
        stderr.flush()?;
        Ok(())
    }
}

// ============================================================================
// DesktopNotifier
// ============================================================================

/// Sends notifications to the desktop notification service.
#[derive(Debug, Clone, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }

    /// Builds the desktop notification for `notification`.
    pub fn build(&self, notification: &Notification) -> notify_rust::Notification {
        let mut desktop = notify_rust::Notification::new();
        desktop
            .summary(&notification.title)
            .body(&notification.body)
            .appname(APP_NAME)
            .icon(APP_ICON);
        desktop
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.build(notification)
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::SendFailed(e.to_string()))
    }
}

// ============================================================================
// MockNotifier
// ============================================================================

/// Mock notifier for testing.
#[derive(Debug, Default)]
pub struct MockNotifier {
    notifications: Mutex<Vec<Notification>>,
    should_fail: AtomicBool,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn get_notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.notifications.lock().map(|n| n.len()).unwrap_or_default()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotifyError::SendFailed("Mock failure".to_string()));
        }
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification.clone());
        }
        Ok(())
    }
}

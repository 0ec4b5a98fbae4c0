//! Notification error types.

use thiserror::Error;

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The notification could not be written.
    #[error("通知の送信に失敗しました: {0}")]
    SendFailed(String),

    /// The output stream is gone.
    #[error("通知の出力に失敗しました: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifyError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::SendFailed(_) => "通知設定を確認してください",
            Self::Io(_) => "デーモンを端末から起動してください",
        }
    }
}

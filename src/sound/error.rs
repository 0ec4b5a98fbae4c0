//! Sound system error types.
//!
//! Every error here is recoverable: the caller logs it and the session
//! carries on silently.

use thiserror::Error;

/// Errors that can occur in the sound playback system.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("オーディオデバイスが利用できません: {0}")]
    DeviceNotAvailable(String),

    /// Sound file was not found at the specified path.
    #[error("サウンドファイルが見つかりません: {0}")]
    FileNotFound(String),

    /// Failed to decode the audio file.
    #[error("サウンドファイルのデコードに失敗しました: {0}")]
    DecodeError(String),

    /// Failed to create the audio output stream.
    #[error("オーディオストリームの作成に失敗しました: {0}")]
    StreamError(String),

    /// Generic sound playback error.
    #[error("サウンド再生エラー: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the audio file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }

    /// Returns true if playback should retry with a synthesized tone.
    #[must_use]
    pub fn should_fallback_to_tone(&self) -> bool {
        self.is_file_error()
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "オーディオデバイスを接続するか --no-sound で起動してください",
            Self::FileNotFound(_) => "合成音で再生を試みます",
            Self::DecodeError(_) => "サウンドファイルの形式を確認してください",
            Self::StreamError(_) => "オーディオ設定を確認してください",
            Self::PlaybackError(_) => "デーモンを再起動してください",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SoundError::DeviceNotAvailable("no device".to_string());
        assert!(err.to_string().contains("no device"));
        assert!(err.to_string().contains("オーディオデバイスが利用できません"));

        let err = SoundError::FileNotFound("/sounds/work_start.wav".to_string());
        assert!(err.to_string().contains("/sounds/work_start.wav"));

        let err = SoundError::DecodeError("invalid format".to_string());
        assert!(err.to_string().contains("invalid format"));
    }

    #[test]
    fn test_error_classification() {
        assert!(SoundError::DeviceNotAvailable("x".into()).is_device_error());
        assert!(SoundError::StreamError("x".into()).is_device_error());
        assert!(!SoundError::FileNotFound("x".into()).is_device_error());

        assert!(SoundError::FileNotFound("x".into()).is_file_error());
        assert!(SoundError::DecodeError("x".into()).is_file_error());
        assert!(!SoundError::PlaybackError("x".into()).is_file_error());
    }

    #[test]
    fn test_should_fallback_to_tone() {
        assert!(SoundError::FileNotFound("x".into()).should_fallback_to_tone());
        assert!(SoundError::DecodeError("x".into()).should_fallback_to_tone());
        assert!(!SoundError::DeviceNotAvailable("x".into()).should_fallback_to_tone());
    }

    #[test]
    fn test_suggestion() {
        assert!(SoundError::DeviceNotAvailable("x".into())
            .suggestion()
            .contains("--no-sound"));
        assert!(SoundError::FileNotFound("x".into())
            .suggestion()
            .contains("合成音"));
        assert!(SoundError::StreamError("x".into())
            .suggestion()
            .contains("オーディオ設定"));
    }
}

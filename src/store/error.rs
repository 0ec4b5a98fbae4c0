//! State store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while persisting the session state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The state file or its directory could not be written.
    #[error("状態ファイルの書き込みに失敗しました: {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be serialized.
    #[error("状態のシリアライズに失敗しました: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if this error came from the filesystem.
    #[must_use]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

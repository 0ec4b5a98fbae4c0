//! IPC Server for the session daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for session commands
//! - Integration with SessionEngine and the state store

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{Mutex, Notify};
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use crate::engine::SessionEngine;
use crate::store::StateStore;
use crate::types::{IpcRequest, IpcResponse, ResponseData, SessionSnapshot, SESSION_COUNT_BASELINE};

// ============================================================================
// Constants
// ============================================================================

/// Default socket path, relative to the home directory
pub const DEFAULT_SOCKET_PATH: &str = ".pomoloop/pomoloop.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Returns `~/.pomoloop/pomoloop.sock`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_socket_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to get home directory")?;
    Ok(home.join(DEFAULT_SOCKET_PATH))
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// Peer closed the connection without sending anything
    #[error("Connection closed by client")]
    ConnectionClosed,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        // Remove existing socket file if present
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        info!("Listening on {:?}", socket_path);

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            return Err(IpcError::ConnectionClosed.into());
        }
        if n == MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to SessionEngine.
#[derive(Clone)]
pub struct RequestHandler {
    /// Shared reference to the session engine
    engine: Arc<Mutex<SessionEngine>>,
    /// Where every successful mutation is saved
    store: Arc<dyn StateStore>,
    /// Signalled by the quit command
    shutdown: Arc<Notify>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(
        engine: Arc<Mutex<SessionEngine>>,
        store: Arc<dyn StateStore>,
        shutdown: Arc<Notify>,
    ) -> Self {
        Self {
            engine,
            store,
            shutdown,
        }
    }

    /// Serves one connection: one request, one response.
    ///
    /// Malformed requests get an error response.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails before a response is sent.
    pub async fn serve(&self, mut stream: UnixStream) -> Result<()> {
        let response = match IpcServer::receive_request(&mut stream).await {
            Ok(request) => self.handle(request).await,
            Err(e) if e.downcast_ref::<IpcError>().is_some() => return Err(e),
            Err(e) => {
                debug!("Rejecting request: {:#}", e);
                IpcResponse::error(format!("不正なリクエストです: {}", e))
            }
        };
        IpcServer::send_response(&mut stream, &response).await
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        debug!("Handling {:?}", request);
        match request {
            IpcRequest::Start => self.handle_start().await,
            IpcRequest::Pause => self.handle_pause().await,
            IpcRequest::Status => self.handle_status().await,
            IpcRequest::Configure {
                work_minutes,
                break_minutes,
            } => self.handle_configure(work_minutes, break_minutes).await,
            IpcRequest::Reset { baseline } => self.handle_reset(baseline).await,
            IpcRequest::Quit => self.handle_quit().await,
        }
    }

    /// Handles the start command.
    async fn handle_start(&self) -> IpcResponse {
        let snapshot = {
            let mut engine = self.engine.lock().await;
            if !engine.start() {
                return IpcResponse::error("タイマーは既に実行中です");
            }
            engine.snapshot()
        };
        self.persisted("タイマーを開始しました", snapshot)
    }

    /// Handles the pause command.
    async fn handle_pause(&self) -> IpcResponse {
        let snapshot = {
            let mut engine = self.engine.lock().await;
            if !engine.pause() {
                return IpcResponse::error("タイマーは実行されていません");
            }
            engine.snapshot()
        };
        self.persisted("タイマーを一時停止しました", snapshot)
    }

    /// Handles the status command.
    async fn handle_status(&self) -> IpcResponse {
        let engine = self.engine.lock().await;
        IpcResponse::success("", Some(ResponseData::from_snapshot(&engine.snapshot())))
    }

    /// Handles the configure command.
    async fn handle_configure(&self, work_minutes: i64, break_minutes: i64) -> IpcResponse {
        let snapshot = {
            let mut engine = self.engine.lock().await;
            engine.reconfigure(work_minutes, break_minutes);
            engine.snapshot()
        };
        let message = format!(
            "設定を更新しました: 作業 {}分 / 休憩 {}分",
            snapshot.work_minutes, snapshot.break_minutes
        );
        self.persisted(message, snapshot)
    }

    /// Handles the reset command.
    async fn handle_reset(&self, baseline: u32) -> IpcResponse {
        let snapshot = {
            let mut engine = self.engine.lock().await;
            engine.reset_session_count(baseline);
            engine.snapshot()
        };
        self.persisted(
            format!("セッション数を{}にリセットしました", baseline),
            snapshot,
        )
    }

    /// Handles the quit command.
    async fn handle_quit(&self) -> IpcResponse {
        let snapshot = {
            let mut engine = self.engine.lock().await;
            engine.reset_session_count(SESSION_COUNT_BASELINE);
            engine.snapshot()
        };
        let response = self.persisted("デーモンを終了します", snapshot);
        self.shutdown.notify_one();
        response
    }

    /// Saves `snapshot` and wraps it in a success response.
    fn persisted(&self, message: impl Into<String>, snapshot: SessionSnapshot) -> IpcResponse {
        if let Err(e) = self.store.save(&snapshot) {
            warn!("Failed to persist state: {}", e);
        }
        IpcResponse::success(message, Some(ResponseData::from_snapshot(&snapshot)))
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Persistence for the session snapshot.
//!
//! The daemon saves a [`SessionSnapshot`] after every mutation and loads it on
//! startup. A missing or unreadable file is never fatal: the store falls back
//! to the first-run snapshot.

mod error;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

pub use error::StoreError;

use crate::types::SessionSnapshot;

/// State file location relative to the home directory.
pub const DEFAULT_STATE_FILE: &str = ".pomoloop/state.json";

/// Loads and saves the session snapshot.
pub trait StateStore: Send + Sync {
    /// Returns the stored snapshot, or the default one if nothing usable is stored.
    fn load(&self) -> SessionSnapshot;

    /// Replaces the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError>;
}

// ============================================================================
// FileStateStore
// ============================================================================

/// JSON file backed store.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Creates a store at `~/.pomoloop/state.json`.
    ///
    /// Falls back to a path relative to the working directory when the home
    /// directory cannot be determined.
    pub fn new() -> Self {
        let path = match dirs::home_dir() {
            Some(home) => home.join(DEFAULT_STATE_FILE),
            None => PathBuf::from("pomoloop_state.json"),
        };
        Self { path }
    }

    /// Creates a store at a custom path.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the state file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> SessionSnapshot {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state file at {:?}, using defaults", self.path);
                return SessionSnapshot::default();
            }
            Err(e) => {
                warn!("Failed to read state file {:?}: {}", self.path, e);
                return SessionSnapshot::default();
            }
        };

        match serde_json::from_slice::<SessionSnapshot>(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Ignoring corrupt state file {:?}: {}", self.path, e);
                SessionSnapshot::default()
            }
        }
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let data = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&self.path, data).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

// ============================================================================
// MemoryStateStore
// ============================================================================

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    snapshot: Mutex<Option<SessionSnapshot>>,
    saves: Mutex<usize>,
}

impl MemoryStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    /// Last saved snapshot, if any.
    #[must_use]
    pub fn stored(&self) -> Option<SessionSnapshot> {
        self.snapshot.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> SessionSnapshot {
        self.stored().unwrap_or_default()
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        if let Ok(mut stored) = self.snapshot.lock() {
            *stored = Some(snapshot.clone());
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Sound source management.
//!
//! A sound is either an audio file on disk or a short synthesized tone.
//! Tones need no files and no decoder, so they are the last fallback.

use std::path::PathBuf;

use super::error::SoundError;

/// Represents the source of a sound to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// An audio file on disk.
    File {
        /// The name of the sound (usually the file stem).
        name: String,
        /// The full path to the sound file.
        path: PathBuf,
    },
    /// A sine tone generated at playback time.
    Tone {
        /// The name of the sound.
        name: String,
        /// Pitch in hertz.
        frequency_hz: u32,
        /// Length in milliseconds.
        duration_ms: u64,
    },
}

/// Length of synthesized fallback tones.
pub const DEFAULT_TONE_MS: u64 = 350;

/// Pitch of the generic fallback tone.
pub const DEFAULT_TONE_HZ: u32 = 880;

impl SoundSource {
    /// Creates a file sound source.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a synthesized tone source.
    #[must_use]
    pub fn tone(name: impl Into<String>, frequency_hz: u32, duration_ms: u64) -> Self {
        Self::Tone {
            name: name.into(),
            frequency_hz,
            duration_ms,
        }
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Tone { name, .. } => name,
        }
    }

    /// Returns true if this is a file on disk.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Returns true if this is a synthesized tone.
    #[must_use]
    pub fn is_tone(&self) -> bool {
        matches!(self, Self::Tone { .. })
    }

    /// Returns the file path if this is a file sound.
    #[must_use]
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Tone { .. } => None,
        }
    }
}

/// Directories to search for system sounds, in order of priority.
const SYSTEM_SOUND_DIRS: &[&str] = &[
    "/System/Library/Sounds",
    "/Library/Sounds",
    "/usr/share/sounds/freedesktop/stereo",
];

/// Supported audio file extensions, in lookup order.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg", "aiff", "m4a"];

/// Default sound names to try, in order of preference.
const DEFAULT_SOUND_NAMES: &[&str] = &["Glass", "Ping", "Pop", "complete", "bell"];

/// Returns true if `path` has one of the supported audio extensions.
pub(crate) fn has_supported_extension(path: &std::path::Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Discovers available system sounds.
///
/// Scans the system sound directories and returns a list of available sounds.
/// Returns an empty vector if no sounds are found.
#[must_use]
pub fn discover_system_sounds() -> Vec<SoundSource> {
    let mut sounds = Vec::new();

    for dir in SYSTEM_SOUND_DIRS {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };

        for entry in entries.flatten() {
            let file_path = entry.path();
            if !has_supported_extension(&file_path) {
                continue;
            }
            if let Some(stem) = file_path.file_stem() {
                sounds.push(SoundSource::File {
                    name: stem.to_string_lossy().into_owned(),
                    path: file_path,
                });
            }
        }
    }

    // Sort by name for consistent ordering
    sounds.sort_by(|a, b| a.name().cmp(b.name()));
    sounds
}

/// Picks the preferred installed system sound, if any.
#[must_use]
pub fn default_system_sound() -> Option<SoundSource> {
    let system_sounds = discover_system_sounds();

    for preferred_name in DEFAULT_SOUND_NAMES {
        if let Some(sound) = system_sounds.iter().find(|s| s.name() == *preferred_name) {
            return Some(sound.clone());
        }
    }

    system_sounds.into_iter().next()
}

/// Gets the default notification sound.
///
/// Falls back to a synthesized tone when no system sound is installed.
#[must_use]
pub fn get_default_sound() -> SoundSource {
    default_system_sound()
        .unwrap_or_else(|| SoundSource::tone("default", DEFAULT_TONE_HZ, DEFAULT_TONE_MS))
}

/// Finds a system sound by name.
///
/// # Errors
///
/// Returns `SoundError::FileNotFound` if no sound with the given name exists.
pub fn find_system_sound(name: &str) -> Result<SoundSource, SoundError> {
    discover_system_sounds()
        .into_iter()
        .find(|s| s.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| SoundError::FileNotFound(format!("System sound '{}' not found", name)))
}

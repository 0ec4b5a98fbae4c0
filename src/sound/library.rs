//! Named cue sounds and their lookup.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::source::{default_system_sound, SoundSource, DEFAULT_TONE_MS, SUPPORTED_EXTENSIONS};

/// Sound directory relative to the home directory.
pub const DEFAULT_SOUND_DIR: &str = ".pomoloop/sounds";

/// The feedback sounds the session loop plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// A work interval starts
    WorkStart,
    /// A break interval starts
    BreakStart,
    /// A break interval ends
    BreakEnd,
    /// Any interval finished
    Alert,
}

impl SoundCue {
    /// Every cue.
    pub const ALL: [SoundCue; 4] = [
        SoundCue::WorkStart,
        SoundCue::BreakStart,
        SoundCue::BreakEnd,
        SoundCue::Alert,
    ];

    /// File stem used to look the cue up in the sound directory.
    pub fn stem(&self) -> &'static str {
        match self {
            SoundCue::WorkStart => "work_start",
            SoundCue::BreakStart => "break_start",
            SoundCue::BreakEnd => "break_end",
            SoundCue::Alert => "alert",
        }
    }

    /// Pitch of the synthesized stand-in for this cue.
    pub fn tone_frequency(&self) -> u32 {
        match self {
            SoundCue::WorkStart => 660,
            SoundCue::BreakStart => 880,
            SoundCue::BreakEnd => 550,
            SoundCue::Alert => 990,
        }
    }

    /// Synthesized stand-in for this cue.
    pub fn tone(&self) -> SoundSource {
        SoundSource::tone(self.stem(), self.tone_frequency(), DEFAULT_TONE_MS)
    }
}

impl std::fmt::Display for SoundCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stem())
    }
}

/// Resolves cues to playable sources.
///
/// Lookup order: `<sound_dir>/<stem>.<ext>`, then the shared fallback sound,
/// then the cue's own tone.
#[derive(Debug, Clone)]
pub struct SoundLibrary {
    sound_dir: Option<PathBuf>,
    fallback: Option<SoundSource>,
}

impl SoundLibrary {
    /// Creates a library over `sound_dir`, falling back to the installed
    /// system sound.
    pub fn new(sound_dir: Option<PathBuf>) -> Self {
        Self {
            sound_dir,
            fallback: default_system_sound(),
        }
    }

    /// Replaces the shared fallback sound.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Option<SoundSource>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Returns `~/.pomoloop/sounds`, if the home directory is known.
    pub fn default_sound_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_SOUND_DIR))
    }

    /// Returns the configured sound directory.
    pub fn sound_dir(&self) -> Option<&Path> {
        self.sound_dir.as_deref()
    }

    /// Finds the source to play for `cue`.
    pub fn resolve(&self, cue: SoundCue) -> SoundSource {
        if let Some(source) = self.find_in_dir(cue) {
            return source;
        }
        if let Some(fallback) = &self.fallback {
            debug!("No '{}' file, using {}", cue, fallback.name());
            return fallback.clone();
        }
        cue.tone()
    }

    fn find_in_dir(&self, cue: SoundCue) -> Option<SoundSource> {
        let dir = self.sound_dir.as_ref()?;
        SUPPORTED_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", cue.stem(), ext)))
            .find(|path| path.is_file())
            .map(|path| SoundSource::file(cue.stem(), path))
    }
}

impl Default for SoundLibrary {
    fn default() -> Self {
        Self::new(Self::default_sound_dir())
    }
}

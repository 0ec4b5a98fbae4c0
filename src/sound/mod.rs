//! Sound playback system for the session loop.
//!
//! This module provides audio cue capabilities, including:
//!
//! - Per-cue sound files looked up in a sound directory
//! - System sound discovery
//! - Synthesized fallback tones
//! - Non-blocking audio playback
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   SoundLibrary   │ ← SoundCue → SoundSource
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │   SoundSource    │────▶│  Sound files     │
//! │                  │     │  (sound dir,     │
//! │                  │     │   system dirs)   │
//! │                  │     ├──────────────────┤
//! │                  │────▶│ Sine tones       │
//! └────────┬─────────┘     │  (fallback)      │
//!          │               └──────────────────┘
//!          ▼
//! ┌──────────────────┐
//! │   SoundPlayer    │ ← rodio, or a mock in tests
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use pomoloop::sound::{RodioSoundPlayer, SoundCue, SoundLibrary};
//!
//! let player = RodioSoundPlayer::new(false).expect("audio init");
//! let library = SoundLibrary::default();
//! player.play(&library.resolve(SoundCue::BreakStart)).expect("playback failed");
//! ```

mod error;
mod library;
mod player;
mod source;

pub use error::SoundError;
pub use library::{SoundCue, SoundLibrary, DEFAULT_SOUND_DIR};
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::{
    default_system_sound, discover_system_sounds, find_system_sound, get_default_sound,
    SoundSource, SUPPORTED_EXTENSIONS,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Trait for sound playback implementations.
///
/// This trait abstracts the sound playback functionality, allowing for
/// different implementations (e.g., rodio-based, mock for testing).
pub trait SoundPlayer {
    /// Plays a sound from the given source.
    ///
    /// This method should be non-blocking; the sound plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, source: &SoundSource) -> Result<(), SoundError>;

    /// Returns true if sound playback is disabled.
    fn is_disabled(&self) -> bool;

    /// Enables sound playback.
    fn enable(&self);

    /// Disables sound playback.
    fn disable(&self);
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, source)
    }

    fn is_disabled(&self) -> bool {
        RodioSoundPlayer::is_disabled(self)
    }

    fn enable(&self) {
        RodioSoundPlayer::enable(self)
    }

    fn disable(&self) {
        RodioSoundPlayer::disable(self)
    }
}

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<SoundSource>>,
    disabled: AtomicBool,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<SoundSource> {
        self.play_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Names of the played sources, in order.
    #[must_use]
    pub fn played_names(&self) -> Vec<String> {
        self.get_play_calls()
            .iter()
            .map(|source| source.name().to_string())
            .collect()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.play_calls.lock() {
            calls.clear();
        }
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, source: &SoundSource) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        if self.disabled.load(Ordering::SeqCst) {
            return Ok(());
        }
        if let Ok(mut calls) = self.play_calls.lock() {
            calls.push(source.clone());
        }
        Ok(())
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let _: fn(bool) -> Result<RodioSoundPlayer, SoundError> = RodioSoundPlayer::new;
        let _: fn() -> SoundSource = get_default_sound;
        let _: fn() -> Vec<SoundSource> = discover_system_sounds;
        let _: fn(&str) -> Result<SoundSource, SoundError> = find_system_sound;
    }

    #[test]
    fn test_mock_records_calls() {
        let player = MockSoundPlayer::new();

        player.play(&SoundCue::WorkStart.tone()).unwrap();
        player.play(&SoundCue::Alert.tone()).unwrap();

        assert_eq!(player.play_count(), 2);
        assert_eq!(player.played_names(), vec!["work_start", "alert"]);

        player.clear_calls();
        assert_eq!(player.play_count(), 0);
    }

    #[test]
    fn test_mock_disabled_skips() {
        let player = MockSoundPlayer::new();
        player.disable();

        assert!(player.is_disabled());
        player.play(&SoundCue::Alert.tone()).unwrap();
        assert_eq!(player.play_count(), 0);

        player.enable();
        player.play(&SoundCue::Alert.tone()).unwrap();
        assert_eq!(player.play_count(), 1);
    }

    #[test]
    fn test_mock_failure() {
        let player = MockSoundPlayer::new();
        player.set_should_fail(true);

        assert!(player.play(&SoundCue::Alert.tone()).is_err());
        assert_eq!(player.play_count(), 0);
    }
}

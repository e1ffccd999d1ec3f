//! Player preferences
//!
//! Persisted as one JSON value, separately from progress.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, keys, load_or_default, save_logged};

/// Longest player name shown on the leaderboard
pub const MAX_PLAYER_NAME: usize = 16;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    pub sound_enabled: bool,
    pub music_enabled: bool,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Feedback ===
    /// Vibrate on taps and misses
    pub haptics: bool,

    // === Profile ===
    /// Name used for leaderboard entries
    pub player_name: String,
    /// Selected theme
    pub theme: String,

    // === Accessibility ===
    /// Reduced motion (minimize pulses and flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
            sfx_volume: 1.0,
            music_volume: 0.7,

            haptics: true,

            player_name: "Player".to_string(),
            theme: "neon".to_string(),

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective effect volume (0 when sound is off)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.sound_enabled {
            crate::sanitize_non_negative(self.sfx_volume).min(1.0)
        } else {
            0.0
        }
    }

    /// Effective music volume (0 when music is off)
    pub fn effective_music_volume(&self) -> f32 {
        if self.music_enabled {
            crate::sanitize_non_negative(self.music_volume).min(1.0)
        } else {
            0.0
        }
    }

    /// Set the leaderboard name; blank names fall back to the default
    pub fn set_player_name(&mut self, name: &str) {
        let trimmed: String = name.trim().chars().take(MAX_PLAYER_NAME).collect();
        self.player_name = if trimmed.is_empty() {
            Settings::default().player_name
        } else {
            trimmed
        };
    }

    /// Load settings; missing or unreadable values use defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let settings: Self = load_or_default(store, keys::SETTINGS);
        log::info!("Loaded settings (sound: {})", settings.sound_enabled);
        settings
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> bool {
        let saved = save_logged(store, keys::SETTINGS, self);
        if saved {
            log::info!("Settings saved");
        }
        saved
    }
}

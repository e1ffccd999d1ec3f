//! Reflex Tap - a reflex tapping arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic gameplay (spawning, difficulty, scoring, session loop)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Key-value storage, player progress
//! - `leaderboard`: Per-mode all-time and weekly rankings
//! - `platform`: Browser/native platform abstraction
//! - `audio`, `ads`, `theme`: Collaborator interfaces consumed by the session

pub mod ads;
pub mod audio;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod theme;
pub mod tuning;

pub use leaderboard::{Leaderboard, LeaderboardEntry, Leaderboards};
pub use settings::Settings;
pub use sim::{GameMode, Session, SessionPhase};
pub use theme::Theme;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Health at the start of a run in health modes
    pub const MAX_HEALTH: u32 = 3;

    /// Difficulty tier bounds
    pub const MIN_TIER: u32 = 1;
    pub const MAX_TIER: u32 = 10;

    /// Expiry sweep cadence (ms)
    pub const EXPIRY_SWEEP_MS: u32 = 100;
    /// Countdown and clock cadence (ms)
    pub const SECOND_MS: u32 = 1000;
    /// Countdown ticks before play (3-2-1-Go)
    pub const COUNTDOWN_STEPS: u32 = 3;

    /// Largest single `advance` step (ms); longer frames are clamped
    pub const MAX_FRAME_MS: u32 = 250;

    /// Target colors for fixed categories (0xRRGGBB)
    pub const DANGER_COLOR: u32 = 0xFF3B30;
    pub const POWER_UP_COLOR: u32 = 0xFFD700;

    /// Extra clearance around a target, on top of half its size
    pub const TOUCH_MARGIN: f32 = 10.0;

    /// Lucky target coin multipliers (uniform draw)
    pub const LUCKY_MULTIPLIERS: [u32; 4] = [2, 3, 5, 10];
    /// Coins per lucky multiplier step
    pub const LUCKY_COINS_PER_STEP: u32 = 5;

    /// Power-up rewards
    pub const POWER_UP_SCORE: u64 = 3 * 50;
    pub const POWER_UP_COINS: u32 = 10;
    pub const POWER_UP_XP: u32 = 50;

    /// Rush multiplier step, in tenths (0.2)
    pub const RUSH_STEP_TENTHS: u32 = 2;
    /// Combo milestone that escalates the rush multiplier
    pub const RUSH_MILESTONE: u32 = 5;

    /// One week in milliseconds (weekly leaderboard period)
    pub const WEEK_MS: f64 = 7.0 * 24.0 * 60.0 * 60.0 * 1000.0;
}

/// Treat NaN/infinite values as zero and clamp negatives to zero
#[inline]
pub fn sanitize_non_negative(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::info!("Reflex Tap core loaded");
}

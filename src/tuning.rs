//! Data-driven game balance
//!
//! Every balance knob lives here so a JSON override can retune the game
//! without touching simulation code. Missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::sim::GameMode;

/// Per-mode pacing values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeTuning {
    /// Run length in seconds
    pub duration_secs: u32,
    /// Milliseconds a target stays on screen before it expires
    pub target_lifetime_ms: u32,
    /// Spawn interval at tier 1, level 1 (ms)
    pub base_spawn_ms: u32,
}

/// Game balance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub classic: ModeTuning,
    pub rush: ModeTuning,
    pub zen: ModeTuning,
    pub speed_test: ModeTuning,
    pub battle: ModeTuning,

    // === Difficulty ===
    /// Score needed per difficulty tier
    pub score_per_tier: u64,
    /// Spawn interval reduction per tier above 1 (ms)
    pub spawn_ms_per_tier: u32,
    /// Spawn interval reduction per player level above 1 (ms)
    pub spawn_ms_per_level: u32,
    /// Fastest allowed spawn interval (ms)
    pub min_spawn_ms: u32,
    /// Target diameter at tier 1
    pub base_target_size: f32,
    /// Diameter lost per tier above 1
    pub size_per_tier: f32,
    /// Smallest diameter as a fraction of the base size
    pub min_size_ratio: f32,

    // === Scoring ===
    /// Points for a normal hit before combo/rush scaling
    pub base_points: u64,
    /// Score divisor for end-of-run XP
    pub xp_divisor: u64,
    /// Score divisor for end-of-run coins
    pub coin_divisor: u64,
    /// Max combo divisor for end-of-run bonus coins
    pub combo_coin_divisor: u32,
    /// Runs scoring below this earn nothing
    pub reward_min_score: u64,

    // === Power meter ===
    /// Meter fill per normal/lucky hit (power-ups fill double)
    pub power_fill_per_hit: u32,
    /// Meter capacity
    pub power_meter_max: u32,
    /// Length of the power-bar bonus window (ms)
    pub power_bonus_ms: u32,

    // === Session ===
    /// Targets to clear in Speed Test
    pub speed_test_goal: u32,
    /// Whether a one-time revive is offered in health modes
    pub revive_enabled: bool,

    // === Leaderboard ===
    /// Runs shorter than this are not ranked (ms)
    pub leaderboard_min_duration_ms: u64,
    /// Entries kept per board
    pub leaderboard_size: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            classic: ModeTuning {
                duration_secs: 60,
                target_lifetime_ms: 2000,
                base_spawn_ms: 1000,
            },
            rush: ModeTuning {
                duration_secs: 45,
                target_lifetime_ms: 1500,
                base_spawn_ms: 700,
            },
            zen: ModeTuning {
                duration_secs: 90,
                target_lifetime_ms: 3000,
                base_spawn_ms: 1500,
            },
            speed_test: ModeTuning {
                duration_secs: 120,
                target_lifetime_ms: 2500,
                base_spawn_ms: 1000,
            },
            battle: ModeTuning {
                duration_secs: 30,
                target_lifetime_ms: 1800,
                base_spawn_ms: 900,
            },

            score_per_tier: 250,
            spawn_ms_per_tier: 40,
            spawn_ms_per_level: 5,
            min_spawn_ms: 500,
            base_target_size: 80.0,
            size_per_tier: 2.0,
            min_size_ratio: 0.7,

            base_points: 10,
            xp_divisor: 8,
            coin_divisor: 40,
            combo_coin_divisor: 6,
            reward_min_score: 50,

            power_fill_per_hit: 5,
            power_meter_max: 100,
            power_bonus_ms: 10_000,

            speed_test_goal: 30,
            revive_enabled: true,

            leaderboard_min_duration_ms: 10_000,
            leaderboard_size: 10,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pacing for a mode
    pub fn mode(&self, mode: GameMode) -> &ModeTuning {
        match mode {
            GameMode::Classic => &self.classic,
            GameMode::Rush => &self.rush,
            GameMode::Zen => &self.zen,
            GameMode::SpeedTest => &self.speed_test,
            GameMode::Battle => &self.battle,
        }
    }

    /// Target lifetime for a mode (ms)
    pub fn lifetime_ms(&self, mode: GameMode) -> u32 {
        self.mode(mode).target_lifetime_ms
    }

    /// Smallest target diameter
    pub fn min_target_size(&self) -> f32 {
        self.base_target_size * self.min_size_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "min_spawn_ms": 400, "speed_test_goal": 10 }"#)
            .expect("valid override");
        assert_eq!(tuning.min_spawn_ms, 400);
        assert_eq!(tuning.speed_test_goal, 10);
        assert_eq!(tuning.score_per_tier, 250);
        assert_eq!(tuning.classic.base_spawn_ms, 1000);
    }

    #[test]
    fn test_malformed_override_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_mode_lookup() {
        let tuning = Tuning::default();
        assert_eq!(tuning.mode(GameMode::Rush).base_spawn_ms, 700);
        assert_eq!(tuning.mode(GameMode::Zen).base_spawn_ms, 1500);
        assert_eq!(tuning.lifetime_ms(GameMode::Classic), 2000);
        assert!((tuning.min_target_size() - 56.0).abs() < 0.001);
    }
}

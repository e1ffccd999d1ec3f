//! Difficulty scaling
//!
//! Score drives a discrete tier (1-10); tier and player level together set
//! the spawn cadence, how many targets may be up at once and target size.

use super::state::GameMode;
use crate::consts::{MAX_TIER, MIN_TIER};
use crate::tuning::Tuning;

/// Difficulty tier for a score. Zen never scales.
pub fn tier(score: u64, mode: GameMode, tuning: &Tuning) -> u32 {
    if mode == GameMode::Zen || tuning.score_per_tier == 0 {
        return MIN_TIER;
    }
    let steps = score / tuning.score_per_tier;
    (steps.min(u64::from(MAX_TIER)) as u32 + 1).clamp(MIN_TIER, MAX_TIER)
}

/// Milliseconds between spawns, floored at the configured minimum
pub fn spawn_interval(tier: u32, mode: GameMode, player_level: u32, tuning: &Tuning) -> u32 {
    let base = tuning.mode(mode).base_spawn_ms;
    let tier_cut = tuning
        .spawn_ms_per_tier
        .saturating_mul(tier.clamp(MIN_TIER, MAX_TIER) - 1);
    let level_cut = tuning
        .spawn_ms_per_level
        .saturating_mul(player_level.max(1) - 1);
    base.saturating_sub(tier_cut)
        .saturating_sub(level_cut)
        .max(tuning.min_spawn_ms)
}

/// How many targets may be on screen at once (1-5)
///
/// Banded by player level:
/// - 1-2: 1
/// - 3-4: 2
/// - 5-7: 3
/// - 8-11: 3, then 4 from level 10
/// - 12+: 4, or 5 in Rush at the top tier
pub fn max_simultaneous_targets(tier: u32, player_level: u32, mode: GameMode) -> usize {
    match player_level {
        0..=2 => 1,
        3..=4 => 2,
        5..=7 => 3,
        8..=11 => (3 + (player_level - 8) / 2).min(4) as usize,
        _ => {
            if mode == GameMode::Rush && tier >= MAX_TIER {
                5
            } else {
                4
            }
        }
    }
}

/// Target diameter at a tier
pub fn target_size(tier: u32, tuning: &Tuning) -> f32 {
    let shrink = tuning.size_per_tier * (tier.clamp(MIN_TIER, MAX_TIER) - 1) as f32;
    (tuning.base_target_size - shrink).max(tuning.min_target_size())
}

/// Everything the spawner needs for the current tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub tier: u32,
    pub spawn_interval_ms: u32,
    pub max_targets: usize,
    pub target_size: f32,
}

impl DifficultyProfile {
    pub fn compute(score: u64, mode: GameMode, player_level: u32, tuning: &Tuning) -> Self {
        let tier = tier(score, mode, tuning);
        Self {
            tier,
            spawn_interval_ms: spawn_interval(tier, mode, player_level, tuning),
            max_targets: max_simultaneous_targets(tier, player_level, mode),
            target_size: target_size(tier, tuning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tier_from_score() {
        let t = Tuning::default();
        assert_eq!(tier(0, GameMode::Classic, &t), 1);
        assert_eq!(tier(249, GameMode::Classic, &t), 1);
        assert_eq!(tier(250, GameMode::Classic, &t), 2);
        assert_eq!(tier(2250, GameMode::Classic, &t), 10);
        assert_eq!(tier(1_000_000, GameMode::Rush, &t), 10);
    }

    #[test]
    fn test_zen_never_scales() {
        let t = Tuning::default();
        assert_eq!(tier(0, GameMode::Zen, &t), 1);
        assert_eq!(tier(99_999, GameMode::Zen, &t), 1);
    }

    #[test]
    fn test_spawn_interval_bases() {
        let t = Tuning::default();
        assert_eq!(spawn_interval(1, GameMode::Classic, 1, &t), 1000);
        assert_eq!(spawn_interval(1, GameMode::Rush, 1, &t), 700);
        assert_eq!(spawn_interval(1, GameMode::Zen, 1, &t), 1500);
        // 1000 - 40*4 - 5*2
        assert_eq!(spawn_interval(5, GameMode::Classic, 3, &t), 830);
        // Floored
        assert_eq!(spawn_interval(10, GameMode::Rush, 50, &t), 500);
    }

    #[test]
    fn test_max_targets_banding() {
        assert_eq!(max_simultaneous_targets(1, 1, GameMode::Classic), 1);
        assert_eq!(max_simultaneous_targets(1, 2, GameMode::Classic), 1);
        assert_eq!(max_simultaneous_targets(1, 4, GameMode::Classic), 2);
        assert_eq!(max_simultaneous_targets(1, 6, GameMode::Classic), 3);
        assert_eq!(max_simultaneous_targets(1, 8, GameMode::Classic), 3);
        assert_eq!(max_simultaneous_targets(1, 9, GameMode::Classic), 3);
        assert_eq!(max_simultaneous_targets(1, 10, GameMode::Classic), 4);
        assert_eq!(max_simultaneous_targets(1, 11, GameMode::Classic), 4);
        assert_eq!(max_simultaneous_targets(10, 15, GameMode::Classic), 4);
        assert_eq!(max_simultaneous_targets(9, 15, GameMode::Rush), 4);
        assert_eq!(max_simultaneous_targets(10, 15, GameMode::Rush), 5);
    }

    #[test]
    fn test_target_size_shrinks_and_floors() {
        let t = Tuning::default();
        assert_eq!(target_size(1, &t), 80.0);
        assert_eq!(target_size(10, &t), 62.0);
        let harsh = Tuning {
            size_per_tier: 10.0,
            ..Tuning::default()
        };
        assert_eq!(target_size(10, &harsh), harsh.min_target_size());
    }

    proptest! {
        #[test]
        fn prop_spawn_interval_non_increasing(
            tier in 1u32..10,
            level in 1u32..80,
            mode_idx in 0usize..5,
        ) {
            let t = Tuning::default();
            let mode = GameMode::ALL[mode_idx];
            let here = spawn_interval(tier, mode, level, &t);
            prop_assert!(spawn_interval(tier + 1, mode, level, &t) <= here);
            prop_assert!(spawn_interval(tier, mode, level + 1, &t) <= here);
            prop_assert!(here >= t.min_spawn_ms);
        }

        #[test]
        fn prop_max_targets_in_range(tier in 1u32..=10, level in 0u32..200, mode_idx in 0usize..5) {
            let n = max_simultaneous_targets(tier, level, GameMode::ALL[mode_idx]);
            prop_assert!((1..=5).contains(&n));
        }
    }
}

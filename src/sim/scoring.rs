//! Tap scoring, combo rules and end-of-run rewards
//!
//! Multipliers are kept in integer percent/tenths so floors are exact.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameMode, SessionState, TargetKind};
use crate::ads::AdResult;
use crate::consts::{
    LUCKY_COINS_PER_STEP, LUCKY_MULTIPLIERS, POWER_UP_COINS, POWER_UP_SCORE, POWER_UP_XP,
    RUSH_MILESTONE,
};
use crate::tuning::Tuning;

/// Combo bonus per combo step, in percent
const COMBO_PERCENT_PER_STEP: u64 = 5;

/// Reaction bonus bounds (Battle)
const REACTION_DEFAULT_POINTS: u64 = 10;
const REACTION_MIN_POINTS: u64 = 5;
const REACTION_MAX_POINTS: u64 = 20;
const REACTION_WINDOW_MS: f64 = 2000.0;

/// `floor(base * (1 + combo * 0.05))`, then the rush multiplier in Rush
pub fn points_for_tap(base: u64, combo: u32, mode: GameMode, rush_tenths: u32) -> u64 {
    let percent = 100 + u64::from(combo) * COMBO_PERCENT_PER_STEP;
    let points = base.saturating_mul(percent) / 100;
    if mode == GameMode::Rush {
        points.saturating_mul(u64::from(rush_tenths)) / 10
    } else {
        points
    }
}

/// Faster taps score more: `clamp(5, 20, floor(10 + max(0, 2000 - ms) / 100))`
///
/// Negative or NaN reaction times score the default 10.
pub fn reaction_points(reaction_ms: f64) -> u64 {
    if !reaction_ms.is_finite() || reaction_ms < 0.0 {
        return REACTION_DEFAULT_POINTS;
    }
    let bonus = ((REACTION_WINDOW_MS - reaction_ms).max(0.0) / 100.0).floor() as u64;
    (REACTION_DEFAULT_POINTS + bonus).clamp(REACTION_MIN_POINTS, REACTION_MAX_POINTS)
}

/// What happens to the combo after a tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboChange {
    Increment,
    Reset,
}

/// Outcome of tapping one target, before it is applied to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapEffect {
    pub kind: TargetKind,
    pub points: u64,
    pub coins: u32,
    pub xp: u32,
    pub health_loss: u32,
    pub combo: ComboChange,
    pub meter_fill: u32,
    /// Lucky coin multiplier that was drawn
    pub lucky_multiplier: Option<u32>,
}

/// Score a tap on a target of `kind` against the current session state
pub fn score_tap<R: Rng>(
    rng: &mut R,
    kind: TargetKind,
    state: &SessionState,
    mode: GameMode,
    tuning: &Tuning,
) -> TapEffect {
    let fill = tuning.power_fill_per_hit;
    let base = TapEffect {
        kind,
        points: 0,
        coins: 0,
        xp: 0,
        health_loss: 0,
        combo: ComboChange::Increment,
        meter_fill: 0,
        lucky_multiplier: None,
    };
    match kind {
        TargetKind::Normal => TapEffect {
            points: points_for_tap(
                tuning.base_points,
                state.combo,
                mode,
                state.rush_multiplier_tenths(),
            ),
            meter_fill: fill,
            ..base
        },
        TargetKind::Lucky => {
            let multiplier = LUCKY_MULTIPLIERS[rng.random_range(0..LUCKY_MULTIPLIERS.len())];
            TapEffect {
                coins: multiplier * LUCKY_COINS_PER_STEP,
                meter_fill: fill,
                lucky_multiplier: Some(multiplier),
                ..base
            }
        }
        TargetKind::PowerUp => TapEffect {
            points: POWER_UP_SCORE,
            coins: POWER_UP_COINS,
            xp: POWER_UP_XP,
            meter_fill: fill.saturating_mul(2),
            ..base
        },
        TargetKind::Danger => TapEffect {
            health_loss: 1,
            combo: ComboChange::Reset,
            ..base
        },
    }
}

/// Apply a tap to the session; returns true if the power bar just filled
pub fn apply_tap(state: &mut SessionState, effect: &TapEffect, mode: GameMode, tuning: &Tuning) -> bool {
    state.score = state.score.saturating_add(effect.points);
    state.bonus_coins = state.bonus_coins.saturating_add(effect.coins);
    state.bonus_xp = state.bonus_xp.saturating_add(effect.xp);
    if mode.uses_health() {
        state.health = state.health.saturating_sub(effect.health_loss);
    }

    match effect.combo {
        ComboChange::Reset => state.combo = 0,
        ComboChange::Increment => {
            state.bump_combo();
            state.targets_hit = state.targets_hit.saturating_add(1);
            let escalates = effect.kind != TargetKind::Lucky;
            if mode == GameMode::Rush && escalates && state.combo % RUSH_MILESTONE == 0 {
                state.rush_steps += 1;
                log::debug!("rush multiplier now {:.1}x", state.rush_multiplier());
            }
        }
    }

    if effect.meter_fill == 0 {
        return false;
    }
    state
        .power
        .add(effect.meter_fill, tuning.power_meter_max, tuning.power_bonus_ms)
}

/// Apply a batch of expired targets as one aggregate penalty
pub fn apply_misses(state: &mut SessionState, misses: u32, mode: GameMode) {
    if misses == 0 {
        return;
    }
    state.misses = state.misses.saturating_add(misses);
    if mode.uses_health() {
        state.health = state.health.saturating_sub(misses);
    }
    if mode.resets_combo_on_miss() {
        state.combo = 0;
    }
}

/// XP and coins earned by a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    pub xp: u64,
    pub coins: u64,
}

impl Rewards {
    /// End-of-run rewards
    ///
    /// `xp = score / 8`, `coins = score / 40 + max_combo / 6`, plus anything
    /// earned by taps during the run. Doubled while the power-bar bonus is
    /// active; nothing at all below the minimum score.
    pub fn for_run(state: &SessionState, tuning: &Tuning) -> Self {
        if state.score < tuning.reward_min_score {
            return Self::default();
        }
        let xp = state.score / tuning.xp_divisor.max(1) + u64::from(state.bonus_xp);
        let coins = state.score / tuning.coin_divisor.max(1)
            + u64::from(state.max_combo / tuning.combo_coin_divisor.max(1))
            + u64::from(state.bonus_coins);
        let factor = if state.power.bonus_active() { 2 } else { 1 };
        Self {
            xp: xp * factor,
            coins: coins * factor,
        }
    }

    /// Double rewards after a completed rewarded ad; declined ads change nothing
    pub fn with_ad(self, result: AdResult) -> Self {
        if result.success {
            Self {
                xp: self.xp.saturating_mul(2),
                coins: self.coins.saturating_mul(2),
            }
        } else {
            self
        }
    }
}

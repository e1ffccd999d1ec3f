//! Session loop for single-player modes (Classic, Rush, Zen, Speed Test)
//!
//! The host drives the session with [`Session::advance`] once per frame and
//! forwards taps. Timer handlers re-check the phase when they fire, so a
//! handler that loses a race with a pause, revive offer or end is a no-op.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyProfile;
use super::scoring::{Rewards, TapEffect, apply_misses, apply_tap, score_tap};
use super::spawn::{SpawnContext, spawn_target};
use super::state::{
    Bounds, EndReason, GameMode, SessionEvent, SessionPhase, SessionState, Target, TargetKind,
};
use super::timers::{TimerKind, Timers};
use crate::ads::AdResult;
use crate::audio::{SoundEffect, SoundSink};
use crate::consts::{COUNTDOWN_STEPS, EXPIRY_SWEEP_MS, MAX_FRAME_MS, MAX_HEALTH, SECOND_MS};
use crate::theme::Theme;
use crate::tuning::Tuning;

/// Read-only inputs for a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: GameMode,
    /// Player level at session start (derived from total XP)
    pub player_level: u32,
    pub bounds: Bounds,
    pub theme: Theme,
    pub tuning: Tuning,
    /// RNG seed; same seed and inputs replay the same run
    pub seed: u64,
}

impl SessionConfig {
    pub fn new(mode: GameMode, player_level: u32, bounds: Bounds, seed: u64) -> Self {
        Self {
            mode,
            player_level: player_level.max(1),
            bounds,
            theme: Theme::default(),
            tuning: Tuning::default(),
            seed,
        }
    }
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: GameMode,
    pub reason: EndReason,
    pub score: u64,
    pub max_combo: u32,
    pub targets_hit: u32,
    pub misses: u32,
    /// Active play time (ms)
    pub duration_ms: u64,
    /// Speed Test completion time, if the goal was reached
    pub completion_ms: Option<u64>,
    /// Power-bar bonus was active at the end
    pub power_bonus: bool,
    /// Rewards before any ad doubling
    pub rewards: Rewards,
}

/// What a tap did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapOutcome {
    pub target_id: u32,
    pub effect: TapEffect,
    pub reaction_ms: u64,
}

/// A single-player run
pub struct Session {
    config: SessionConfig,
    phase: SessionPhase,
    state: SessionState,
    targets: Vec<Target>,
    timers: Timers,
    /// Timers parked while paused
    suspended: Option<Timers>,
    rng: Pcg32,
    sound: Box<dyn SoundSink>,
    events: Vec<SessionEvent>,
    next_id: u32,
    summary: Option<RunSummary>,
    reward_ad_used: bool,
    final_rewards: Option<Rewards>,
}

impl Session {
    pub fn new(config: SessionConfig, sound: Box<dyn SoundSink>) -> Self {
        let time_left = config.tuning.mode(config.mode).duration_secs;
        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            config,
            phase: SessionPhase::Idle,
            state: SessionState::new(time_left),
            targets: Vec::new(),
            timers: Timers::new(),
            suspended: None,
            sound,
            events: Vec::new(),
            next_id: 1,
            summary: None,
            reward_ad_used: false,
            final_rewards: None,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Live timers (0 whenever the session is not running)
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Difficulty numbers for the current score
    pub fn difficulty(&self) -> DifficultyProfile {
        DifficultyProfile::compute(
            self.state.score,
            self.config.mode,
            self.config.player_level,
            &self.config.tuning,
        )
    }

    /// Play area changed (rotation, resize). Applies to future spawns.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.config.bounds = bounds;
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn is_live(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    fn emit(&mut self, event: SessionEvent, sound: Option<SoundEffect>) {
        self.events.push(event);
        if let Some(effect) = sound {
            self.sound.play(effect);
        }
    }

    // === Lifecycle ===

    /// Start (or restart) a run: reset everything and begin the countdown
    pub fn start(&mut self) {
        self.timers.cancel_all();
        self.suspended = None;
        self.targets.clear();
        self.events.clear();
        self.state = SessionState::new(self.config.tuning.mode(self.config.mode).duration_secs);
        self.summary = None;
        self.reward_ad_used = false;
        self.final_rewards = None;

        self.phase = SessionPhase::Countdown {
            remaining: COUNTDOWN_STEPS,
        };
        self.timers.schedule(TimerKind::Countdown, SECOND_MS);
        log::info!(
            "Starting {:?} run (player level {}, seed {})",
            self.config.mode,
            self.config.player_level,
            self.config.seed
        );
        self.emit(
            SessionEvent::CountdownTick {
                remaining: COUNTDOWN_STEPS,
            },
            Some(SoundEffect::CountdownTick),
        );
    }

    /// Tear the session down without finishing the run (leaving the screen)
    pub fn stop(&mut self) {
        self.timers.cancel_all();
        self.suspended = None;
        self.targets.clear();
        if self.phase != SessionPhase::Idle {
            log::info!("Session stopped in {:?}", self.phase);
        }
        self.phase = SessionPhase::Idle;
    }

    pub fn pause(&mut self) {
        if self.phase != SessionPhase::Active {
            return;
        }
        self.suspended = Some(std::mem::take(&mut self.timers));
        self.phase = SessionPhase::Paused;
        log::debug!("Paused at {} ms", self.state.clock_ms);
    }

    /// Resume with the timers exactly where they were parked
    pub fn resume(&mut self) {
        if self.phase != SessionPhase::Paused {
            return;
        }
        if let Some(timers) = self.suspended.take() {
            self.timers = timers;
        }
        self.phase = SessionPhase::Active;
        log::debug!("Resumed at {} ms", self.state.clock_ms);
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            SessionPhase::Active => self.pause(),
            SessionPhase::Paused => self.resume(),
            _ => {}
        }
    }

    /// Advance the session by one frame
    pub fn advance(&mut self, dt_ms: u32) {
        let dt = dt_ms.min(MAX_FRAME_MS);
        match self.phase {
            SessionPhase::Active => {
                self.state.clock_ms += u64::from(dt);
                self.state.power.elapse(dt);
            }
            SessionPhase::Countdown { .. } => {}
            _ => return,
        }

        for kind in self.timers.advance(dt) {
            match kind {
                TimerKind::Countdown => self.on_countdown(),
                TimerKind::ExpirySweep => self.on_expiry_sweep(),
                TimerKind::Spawn => self.on_spawn(),
                TimerKind::Clock => self.on_clock(),
            }
        }
    }

    // === Timer handlers ===

    fn on_countdown(&mut self) {
        let SessionPhase::Countdown { remaining } = self.phase else {
            return;
        };
        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.phase = SessionPhase::Countdown { remaining };
            self.emit(
                SessionEvent::CountdownTick { remaining },
                Some(SoundEffect::CountdownTick),
            );
            return;
        }

        self.timers.cancel(TimerKind::Countdown);
        self.phase = SessionPhase::Active;
        self.emit(SessionEvent::Go, Some(SoundEffect::Go));
        self.schedule_play_timers();
        let profile = self.difficulty();
        self.spawn_one(&profile);
    }

    fn schedule_play_timers(&mut self) {
        let profile = self.difficulty();
        self.timers.schedule(TimerKind::ExpirySweep, EXPIRY_SWEEP_MS);
        self.timers
            .schedule(TimerKind::Spawn, profile.spawn_interval_ms);
        self.timers.schedule(TimerKind::Clock, SECOND_MS);
    }

    fn on_expiry_sweep(&mut self) {
        if !self.is_live() {
            return;
        }
        let now = self.state.clock_ms;
        let lifetime = u64::from(self.config.tuning.lifetime_ms(self.config.mode));
        let (expired, alive): (Vec<Target>, Vec<Target>) = std::mem::take(&mut self.targets)
            .into_iter()
            .partition(|t| t.age(now) >= lifetime);
        self.targets = alive;
        if expired.is_empty() {
            return;
        }

        let misses = expired.iter().filter(|t| t.penalized_on_expiry()).count() as u32;
        apply_misses(&mut self.state, misses, self.config.mode);
        let ids = expired.iter().map(|t| t.id).collect();
        let sound = (misses > 0).then_some(SoundEffect::Miss);
        self.emit(SessionEvent::TargetsExpired { ids, misses }, sound);
        self.check_health();
    }

    fn on_spawn(&mut self) {
        if !self.is_live() {
            return;
        }
        let profile = self.difficulty();
        if self.targets.len() < profile.max_targets {
            self.spawn_one(&profile);
        }
        self.timers
            .set_period(TimerKind::Spawn, profile.spawn_interval_ms);
    }

    fn on_clock(&mut self) {
        if !self.is_live() {
            return;
        }
        self.state.time_left = self.state.time_left.saturating_sub(1);
        if self.state.time_left == 0 {
            self.end(EndReason::TimeUp);
        }
    }

    fn spawn_one(&mut self, profile: &DifficultyProfile) {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        let ctx = SpawnContext {
            mode: self.config.mode,
            player_level: self.config.player_level,
        };
        let target = spawn_target(
            &mut self.rng,
            id,
            self.config.bounds,
            profile.target_size,
            &ctx,
            &self.config.theme,
            self.state.clock_ms,
        );
        let kind = target.kind;
        self.targets.push(target);
        self.emit(SessionEvent::TargetSpawned { id, kind }, None);
    }

    // === Input ===

    /// Tap a target by id. Ignored unless the run is active.
    pub fn tap(&mut self, target_id: u32) -> Option<TapOutcome> {
        if !self.is_live() {
            return None;
        }
        let index = self.targets.iter().position(|t| t.id == target_id)?;
        let target = self.targets.remove(index);
        let reaction_ms = target.age(self.state.clock_ms);

        let mode = self.config.mode;
        let tier_before = self.state.tier;
        let rush_before = self.state.rush_steps;
        let effect = score_tap(&mut self.rng, target.kind, &self.state, mode, &self.config.tuning);
        let filled = apply_tap(&mut self.state, &effect, mode, &self.config.tuning);

        let sound = match target.kind {
            TargetKind::Normal => SoundEffect::Tap,
            TargetKind::Lucky => SoundEffect::Lucky,
            TargetKind::PowerUp => SoundEffect::PowerUp,
            TargetKind::Danger => SoundEffect::Danger,
        };
        self.emit(
            SessionEvent::TargetTapped {
                id: target.id,
                kind: target.kind,
                points: effect.points,
                coins: effect.coins,
            },
            Some(sound),
        );
        if self.state.rush_steps > rush_before {
            self.sound.play(SoundEffect::ComboMilestone);
        }
        if filled {
            self.emit(SessionEvent::PowerBarFilled, Some(SoundEffect::PowerBar));
        }

        self.state.tier = self.difficulty().tier;
        if self.state.tier != tier_before {
            log::info!("Tier {} -> {} at score {}", tier_before, self.state.tier, self.state.score);
            self.emit(SessionEvent::TierChanged { tier: self.state.tier }, None);
        }
        self.timers
            .set_period(TimerKind::Spawn, self.difficulty().spawn_interval_ms);

        if mode == GameMode::SpeedTest
            && self.state.targets_hit >= self.config.tuning.speed_test_goal
        {
            self.end(EndReason::GoalReached);
        } else {
            self.check_health();
        }

        Some(TapOutcome {
            target_id: target.id,
            effect,
            reaction_ms,
        })
    }

    /// Tap a point; hits the newest target under it
    pub fn tap_at(&mut self, point: Vec2) -> Option<TapOutcome> {
        let id = self.targets.iter().rev().find(|t| t.contains(point))?.id;
        self.tap(id)
    }

    // === Ending ===

    fn check_health(&mut self) {
        if !self.config.mode.uses_health() || self.state.health > 0 || !self.is_live() {
            return;
        }
        if self.config.tuning.revive_enabled && !self.state.revive_used {
            self.state.revive_used = true;
            self.timers.cancel_all();
            self.phase = SessionPhase::RevivePending;
            log::info!("Out of health at score {}, offering revive", self.state.score);
            self.emit(SessionEvent::ReviveOffered, None);
        } else {
            self.end(EndReason::OutOfHealth);
        }
    }

    /// Answer the revive offer. Returns true if the run continues.
    pub fn resolve_revive(&mut self, result: AdResult) -> bool {
        if self.phase != SessionPhase::RevivePending {
            return false;
        }
        if !result.success {
            self.end(EndReason::OutOfHealth);
            return false;
        }
        self.state.health = MAX_HEALTH;
        self.targets.clear();
        self.phase = SessionPhase::Active;
        self.schedule_play_timers();
        log::info!("Revived at score {}", self.state.score);
        self.emit(SessionEvent::Revived, Some(SoundEffect::Revive));
        true
    }

    fn end(&mut self, reason: EndReason) {
        self.timers.cancel_all();
        self.suspended = None;
        self.targets.clear();
        self.phase = SessionPhase::Ended;

        let rewards = Rewards::for_run(&self.state, &self.config.tuning);
        let completion_ms = (reason == EndReason::GoalReached).then_some(self.state.clock_ms);
        let summary = RunSummary {
            mode: self.config.mode,
            reason,
            score: self.state.score,
            max_combo: self.state.max_combo,
            targets_hit: self.state.targets_hit,
            misses: self.state.misses,
            duration_ms: self.state.clock_ms,
            completion_ms,
            power_bonus: self.state.power.bonus_active(),
            rewards,
        };
        log::info!(
            "{:?} run ended ({:?}): score {}, max combo {}, +{} xp, +{} coins",
            summary.mode,
            reason,
            summary.score,
            summary.max_combo,
            rewards.xp,
            rewards.coins
        );
        self.summary = Some(summary);
        self.final_rewards = Some(rewards);
        self.emit(SessionEvent::Ended { reason }, Some(SoundEffect::GameOver));
    }

    /// Rewards to persist, including any ad doubling
    pub fn final_rewards(&self) -> Option<Rewards> {
        self.final_rewards
    }

    /// Apply the "double reward" ad result; only the first call counts
    pub fn claim_double_reward(&mut self, result: AdResult) -> Option<Rewards> {
        let rewards = self.final_rewards?;
        if self.reward_ad_used {
            return Some(rewards);
        }
        self.reward_ad_used = result.success;
        let rewards = rewards.with_ad(result);
        self.final_rewards = Some(rewards);
        Some(rewards)
    }
}

//! Local 1v1 battle
//!
//! The play area is split in two, one half per player. Each player clears
//! their own targets and scores by reaction speed; highest score when the
//! clock runs out wins.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty;
use super::scoring::reaction_points;
use super::spawn::place;
use super::state::{Bounds, GameMode, SessionPhase, Target, TargetKind};
use super::timers::{TimerKind, Timers};
use crate::audio::{SoundEffect, SoundSink};
use crate::consts::{COUNTDOWN_STEPS, EXPIRY_SWEEP_MS, MAX_FRAME_MS, SECOND_MS};
use crate::theme::Theme;
use crate::tuning::Tuning;

/// Battle participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

/// One player's half of the screen
#[derive(Debug, Clone, PartialEq)]
pub struct Side {
    /// Top-left of this half in screen space
    pub origin: Vec2,
    pub area: Bounds,
    pub score: u64,
    pub hits: u32,
    pub misses: u32,
    pub best_reaction_ms: Option<u64>,
    pub targets: Vec<Target>,
}

impl Side {
    fn new(origin: Vec2, area: Bounds) -> Self {
        Self {
            origin,
            area,
            score: 0,
            hits: 0,
            misses: 0,
            best_reaction_ms: None,
            targets: Vec::new(),
        }
    }

    fn contains(&self, point: Vec2) -> bool {
        let local = point - self.origin;
        local.x >= 0.0 && local.y >= 0.0 && local.x <= self.area.width && local.y <= self.area.height
    }
}

/// Split the screen along its long axis
pub fn split_bounds(bounds: Bounds) -> [(Vec2, Bounds); 2] {
    if bounds.width >= bounds.height {
        let half = bounds.width / 2.0;
        [
            (Vec2::ZERO, Bounds::new(half, bounds.height)),
            (Vec2::new(half, 0.0), Bounds::new(half, bounds.height)),
        ]
    } else {
        let half = bounds.height / 2.0;
        [
            (Vec2::ZERO, Bounds::new(bounds.width, half)),
            (Vec2::new(0.0, half), Bounds::new(bounds.width, half)),
        ]
    }
}

/// Final battle standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    /// `None` on a draw
    pub winner: Option<Player>,
    pub scores: [u64; 2],
    pub hits: [u32; 2],
}

/// A local 1v1 match
pub struct BattleSession {
    tuning: Tuning,
    theme: Theme,
    player_level: u32,
    phase: SessionPhase,
    sides: [Side; 2],
    timers: Timers,
    suspended: Option<Timers>,
    rng: Pcg32,
    sound: Box<dyn SoundSink>,
    time_left: u32,
    clock_ms: u64,
    next_id: u32,
    result: Option<BattleResult>,
}

impl BattleSession {
    pub fn new(
        bounds: Bounds,
        player_level: u32,
        theme: Theme,
        tuning: Tuning,
        seed: u64,
        sound: Box<dyn SoundSink>,
    ) -> Self {
        let [(o1, a1), (o2, a2)] = split_bounds(bounds);
        Self {
            time_left: tuning.battle.duration_secs,
            tuning,
            theme,
            player_level: player_level.max(1),
            phase: SessionPhase::Idle,
            sides: [Side::new(o1, a1), Side::new(o2, a2)],
            timers: Timers::new(),
            suspended: None,
            rng: Pcg32::seed_from_u64(seed),
            sound,
            clock_ms: 0,
            next_id: 1,
            result: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn side(&self, player: Player) -> &Side {
        &self.sides[player.index()]
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn result(&self) -> Option<&BattleResult> {
        self.result.as_ref()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn start(&mut self) {
        self.timers.cancel_all();
        self.suspended = None;
        for side in &mut self.sides {
            *side = Side::new(side.origin, side.area);
        }
        self.time_left = self.tuning.battle.duration_secs;
        self.clock_ms = 0;
        self.result = None;
        self.phase = SessionPhase::Countdown {
            remaining: COUNTDOWN_STEPS,
        };
        self.timers.schedule(TimerKind::Countdown, SECOND_MS);
        self.sound.play(SoundEffect::CountdownTick);
        log::info!("Battle starting ({} s)", self.time_left);
    }

    pub fn stop(&mut self) {
        self.timers.cancel_all();
        self.suspended = None;
        for side in &mut self.sides {
            side.targets.clear();
        }
        self.phase = SessionPhase::Idle;
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            SessionPhase::Active => {
                self.suspended = Some(std::mem::take(&mut self.timers));
                self.phase = SessionPhase::Paused;
            }
            SessionPhase::Paused => {
                if let Some(timers) = self.suspended.take() {
                    self.timers = timers;
                }
                self.phase = SessionPhase::Active;
            }
            _ => {}
        }
    }

    pub fn advance(&mut self, dt_ms: u32) {
        let dt = dt_ms.min(MAX_FRAME_MS);
        match self.phase {
            SessionPhase::Active => self.clock_ms += u64::from(dt),
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

    fn on_countdown(&mut self) {
        let SessionPhase::Countdown { remaining } = self.phase else {
            return;
        };
        if remaining > 1 {
            self.phase = SessionPhase::Countdown {
                remaining: remaining - 1,
            };
            self.sound.play(SoundEffect::CountdownTick);
            return;
        }
        self.timers.cancel(TimerKind::Countdown);
        self.phase = SessionPhase::Active;
        self.sound.play(SoundEffect::Go);
        self.schedule_play_timers();
        self.on_spawn();
    }

    fn schedule_play_timers(&mut self) {
        self.timers.schedule(TimerKind::ExpirySweep, EXPIRY_SWEEP_MS);
        self.timers.schedule(TimerKind::Spawn, self.spawn_interval());
        self.timers.schedule(TimerKind::Clock, SECOND_MS);
    }

    /// Pace follows whoever is ahead
    fn spawn_interval(&self) -> u32 {
        let leader = self.sides.iter().map(|s| s.score).max().unwrap_or(0);
        let tier = difficulty::tier(leader, GameMode::Battle, &self.tuning);
        difficulty::spawn_interval(tier, GameMode::Battle, self.player_level, &self.tuning)
    }

    fn on_expiry_sweep(&mut self) {
        if self.phase != SessionPhase::Active {
            return;
        }
        let lifetime = u64::from(self.tuning.battle.target_lifetime_ms);
        let now = self.clock_ms;
        for side in &mut self.sides {
            let before = side.targets.len();
            side.targets.retain(|t| t.age(now) < lifetime);
            side.misses += (before - side.targets.len()) as u32;
        }
    }

    fn on_spawn(&mut self) {
        if self.phase != SessionPhase::Active {
            return;
        }
        let colors = [self.theme.primary_color, self.theme.secondary_color];
        for (i, side) in self.sides.iter_mut().enumerate() {
            let tier = difficulty::tier(side.score, GameMode::Battle, &self.tuning);
            let cap = difficulty::max_simultaneous_targets(tier, self.player_level, GameMode::Battle);
            if side.targets.len() >= cap {
                continue;
            }
            let size = difficulty::target_size(tier, &self.tuning);
            let (local, size) = place(&mut self.rng, side.area, size);
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1).max(1);
            side.targets.push(Target {
                id,
                pos: side.origin + local,
                size,
                kind: TargetKind::Normal,
                color: colors[i],
                created_at: self.clock_ms,
            });
        }
        let interval = self.spawn_interval();
        self.timers.set_period(TimerKind::Spawn, interval);
    }

    fn on_clock(&mut self) {
        if self.phase != SessionPhase::Active {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.finish();
        }
    }

    /// A player taps one of their own targets; returns the points scored
    pub fn tap(&mut self, player: Player, target_id: u32) -> Option<u64> {
        if self.phase != SessionPhase::Active {
            return None;
        }
        let now = self.clock_ms;
        let side = &mut self.sides[player.index()];
        let index = side.targets.iter().position(|t| t.id == target_id)?;
        let target = side.targets.remove(index);
        let reaction = target.age(now);
        let points = reaction_points(reaction as f64);
        side.score += points;
        side.hits += 1;
        side.best_reaction_ms = Some(side.best_reaction_ms.map_or(reaction, |b| b.min(reaction)));
        self.sound.play(SoundEffect::Tap);
        Some(points)
    }

    /// Route a screen tap to whichever half it lands in
    pub fn tap_at(&mut self, point: Vec2) -> Option<(Player, u64)> {
        let player = [Player::One, Player::Two]
            .into_iter()
            .find(|p| self.sides[p.index()].contains(point))?;
        let id = self.sides[player.index()]
            .targets
            .iter()
            .rev()
            .find(|t| t.contains(point))?
            .id;
        self.tap(player, id).map(|points| (player, points))
    }

    fn finish(&mut self) {
        self.timers.cancel_all();
        self.suspended = None;
        let scores = [self.sides[0].score, self.sides[1].score];
        let winner = match scores[0].cmp(&scores[1]) {
            std::cmp::Ordering::Greater => Some(Player::One),
            std::cmp::Ordering::Less => Some(Player::Two),
            std::cmp::Ordering::Equal => None,
        };
        for side in &mut self.sides {
            side.targets.clear();
        }
        self.result = Some(BattleResult {
            winner,
            scores,
            hits: [self.sides[0].hits, self.sides[1].hits],
        });
        self.phase = SessionPhase::Ended;
        self.sound.play(SoundEffect::GameOver);
        log::info!("Battle over: {} - {}, winner {:?}", scores[0], scores[1], winner);
    }
}

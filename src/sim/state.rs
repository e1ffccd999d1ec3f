//! Session state and core gameplay types
//!
//! Everything a running session mutates lives in [`SessionState`]; targets
//! and phases are plain data so hosts can render them directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_HEALTH, MIN_TIER};

/// Game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    Classic,
    Rush,
    Zen,
    SpeedTest,
    Battle,
}

impl GameMode {
    pub const ALL: [GameMode; 5] = [
        GameMode::Classic,
        GameMode::Rush,
        GameMode::Zen,
        GameMode::SpeedTest,
        GameMode::Battle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Rush => "rush",
            GameMode::Zen => "zen",
            GameMode::SpeedTest => "speed_test",
            GameMode::Battle => "battle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "rush" => Some(GameMode::Rush),
            "zen" => Some(GameMode::Zen),
            "speed_test" | "speedtest" | "speed" => Some(GameMode::SpeedTest),
            "battle" | "1v1" => Some(GameMode::Battle),
            _ => None,
        }
    }

    /// Misses and danger taps cost health in this mode
    pub fn uses_health(&self) -> bool {
        matches!(self, GameMode::Classic | GameMode::Rush)
    }

    /// A miss breaks the combo in this mode
    pub fn resets_combo_on_miss(&self) -> bool {
        !matches!(self, GameMode::Zen)
    }
}

/// Target category. Exactly one per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetKind {
    #[default]
    Normal,
    Lucky,
    Danger,
    PowerUp,
}

/// Axis-aligned play area, origin at top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: crate::sanitize_non_negative(width),
            height: crate::sanitize_non_negative(height),
        }
    }
}

/// A spawned tappable target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    /// Top-left corner of the target's bounding square
    pub pos: Vec2,
    /// Diameter
    pub size: f32,
    pub kind: TargetKind,
    /// 0xRRGGBB
    pub color: u32,
    /// Session clock (ms) at spawn
    pub created_at: u64,
}

impl Target {
    pub fn is_danger(&self) -> bool {
        self.kind == TargetKind::Danger
    }

    pub fn is_power_up(&self) -> bool {
        self.kind == TargetKind::PowerUp
    }

    pub fn is_lucky(&self) -> bool {
        self.kind == TargetKind::Lucky
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    /// Whether a point lands on the target circle
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center()) <= self.size / 2.0
    }

    /// Age in ms at session clock `now`
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    /// Expired non-danger, non-power-up targets count as misses
    pub fn penalized_on_expiry(&self) -> bool {
        matches!(self.kind, TargetKind::Normal | TargetKind::Lucky)
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Not started, or torn down
    Idle,
    /// 3-2-1-Go before play
    Countdown { remaining: u32 },
    /// Timers running
    Active,
    /// User pause, all timers suspended
    Paused,
    /// Health ran out, waiting on the revive offer
    RevivePending,
    /// Run finished, summary available
    Ended,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TimeUp,
    OutOfHealth,
    GoalReached,
}

/// Power meter: fills on hits, opens a bonus window when full
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerMeter {
    pub fill: u32,
    /// Remaining ms of the bonus window (0 = inactive)
    pub bonus_ms_left: u32,
}

impl PowerMeter {
    /// Add fill; returns true if the meter just filled up
    pub fn add(&mut self, amount: u32, capacity: u32, bonus_ms: u32) -> bool {
        self.fill = self.fill.saturating_add(amount);
        if capacity > 0 && self.fill >= capacity {
            self.fill = 0;
            self.bonus_ms_left = bonus_ms;
            return true;
        }
        false
    }

    pub fn elapse(&mut self, dt_ms: u32) {
        self.bonus_ms_left = self.bonus_ms_left.saturating_sub(dt_ms);
    }

    pub fn bonus_active(&self) -> bool {
        self.bonus_ms_left > 0
    }
}

/// Mutable per-run state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub health: u32,
    pub tier: u32,
    pub time_left: u32,
    /// Rush multiplier steps of 0.2 above 1.0
    pub rush_steps: u32,
    pub targets_hit: u32,
    pub misses: u32,
    /// Coins and XP earned by taps during the run
    pub bonus_coins: u32,
    pub bonus_xp: u32,
    pub power: PowerMeter,
    pub revive_used: bool,
    /// Active play time (ms)
    pub clock_ms: u64,
}

impl SessionState {
    pub fn new(time_left: u32) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            health: MAX_HEALTH,
            tier: MIN_TIER,
            time_left,
            rush_steps: 0,
            targets_hit: 0,
            misses: 0,
            bonus_coins: 0,
            bonus_xp: 0,
            power: PowerMeter::default(),
            revive_used: false,
            clock_ms: 0,
        }
    }

    /// Rush multiplier in tenths (10 = 1.0x)
    pub fn rush_multiplier_tenths(&self) -> u32 {
        10 + self.rush_steps * crate::consts::RUSH_STEP_TENTHS
    }

    pub fn rush_multiplier(&self) -> f32 {
        self.rush_multiplier_tenths() as f32 / 10.0
    }

    pub fn bump_combo(&mut self) {
        self.combo = self.combo.saturating_add(1);
        self.max_combo = self.max_combo.max(self.combo);
    }
}

/// Things that happened during a tick, for the host to render/play
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CountdownTick { remaining: u32 },
    Go,
    TargetSpawned { id: u32, kind: TargetKind },
    TargetsExpired { ids: Vec<u32>, misses: u32 },
    TargetTapped { id: u32, kind: TargetKind, points: u64, coins: u32 },
    TierChanged { tier: u32 },
    PowerBarFilled,
    ReviveOffered,
    Revived,
    Ended { reason: EndReason },
}

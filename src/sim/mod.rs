//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only moves through `advance(dt_ms)`
//! - Seeded RNG only
//! - Stable timer firing order
//! - No rendering or platform dependencies

pub mod battle;
pub mod difficulty;
pub mod progression;
pub mod scoring;
pub mod session;
pub mod spawn;
pub mod state;
pub mod timers;

pub use battle::{BattleResult, BattleSession, Player, Side, split_bounds};
pub use difficulty::DifficultyProfile;
pub use scoring::{Rewards, TapEffect};
pub use session::{RunSummary, Session, SessionConfig, TapOutcome};
pub use state::{
    Bounds, EndReason, GameMode, PowerMeter, SessionEvent, SessionPhase, SessionState, Target,
    TargetKind,
};
pub use timers::{TimerKind, Timers};

//! Player progress across runs
//!
//! Loaded once at startup and written once per finished run. Level is always
//! derived from total XP.

use std::collections::HashMap;

use super::{KeyValueStore, keys, load_or_default, save_logged};
use crate::sim::progression::level_from_xp;
use crate::sim::scoring::Rewards;
use crate::sim::{GameMode, RunSummary};

/// Persisted progression
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressProfile {
    pub total_xp: u64,
    pub coins: u64,
    pub max_combo: u32,
    pub games_played: u32,
    /// Best score per mode; for Speed Test the best (lowest) time in ms
    pub bests: HashMap<GameMode, u64>,
}

/// What recording a run changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRecord {
    pub new_best: bool,
    pub level_before: u32,
    pub level_after: u32,
    /// Every key was written
    pub saved: bool,
}

impl RunRecord {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

impl ProgressProfile {
    /// Load from the store; missing or unreadable values start at zero
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut bests = HashMap::new();
        for mode in GameMode::ALL {
            let best: u64 = load_or_default(store, &keys::high_score(mode));
            if best > 0 {
                bests.insert(mode, best);
            }
        }
        let profile = Self {
            total_xp: load_or_default(store, keys::TOTAL_XP),
            coins: load_or_default(store, keys::COINS),
            max_combo: load_or_default(store, keys::MAX_COMBO),
            games_played: load_or_default(store, keys::GAMES_PLAYED),
            bests,
        };
        log::info!(
            "Loaded profile: level {}, {} xp, {} coins, {} games",
            profile.level(),
            profile.total_xp,
            profile.coins,
            profile.games_played
        );
        profile
    }

    pub fn level(&self) -> u32 {
        level_from_xp(self.total_xp)
    }

    pub fn best(&self, mode: GameMode) -> Option<u64> {
        self.bests.get(&mode).copied()
    }

    /// Whether `value` beats the stored best for `mode`
    pub fn is_new_best(&self, mode: GameMode, value: u64) -> bool {
        if value == 0 {
            return false;
        }
        match (mode, self.best(mode)) {
            (_, None) => true,
            (GameMode::SpeedTest, Some(best)) => value < best,
            (_, Some(best)) => value > best,
        }
    }

    /// Fold a finished run into the profile and persist it in one batch
    ///
    /// The in-memory profile is updated even if the store fails.
    pub fn record_run(
        &mut self,
        store: &mut dyn KeyValueStore,
        summary: &RunSummary,
        rewards: Rewards,
    ) -> RunRecord {
        let level_before = self.level();

        self.total_xp = self.total_xp.saturating_add(rewards.xp);
        self.coins = self.coins.saturating_add(rewards.coins);
        self.max_combo = self.max_combo.max(summary.max_combo);
        self.games_played = self.games_played.saturating_add(1);

        let best_value = match summary.mode {
            GameMode::SpeedTest => summary.completion_ms.unwrap_or(0),
            _ => summary.score,
        };
        let new_best = self.is_new_best(summary.mode, best_value);
        if new_best {
            self.bests.insert(summary.mode, best_value);
        }

        let saved = self.save(store, summary.mode);
        let record = RunRecord {
            new_best,
            level_before,
            level_after: self.level(),
            saved,
        };
        log::info!(
            "Recorded {:?} run: +{} xp, +{} coins, level {} -> {}{}",
            summary.mode,
            rewards.xp,
            rewards.coins,
            record.level_before,
            record.level_after,
            if new_best { " (new best)" } else { "" }
        );
        record
    }

    fn save(&self, store: &mut dyn KeyValueStore, mode: GameMode) -> bool {
        let mut ok = save_logged(store, keys::TOTAL_XP, &self.total_xp);
        ok &= save_logged(store, keys::COINS, &self.coins);
        ok &= save_logged(store, keys::MAX_COMBO, &self.max_combo);
        ok &= save_logged(store, keys::GAMES_PLAYED, &self.games_played);
        if let Some(best) = self.best(mode) {
            ok &= save_logged(store, &keys::high_score(mode), &best);
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, UnavailableStore};
    use crate::sim::EndReason;

    fn summary(mode: GameMode, score: u64, completion_ms: Option<u64>) -> RunSummary {
        RunSummary {
            mode,
            reason: EndReason::TimeUp,
            score,
            max_combo: 9,
            targets_hit: 20,
            misses: 2,
            duration_ms: 60_000,
            completion_ms,
            power_bonus: false,
            rewards: Rewards::default(),
        }
    }

    #[test]
    fn test_empty_store_loads_defaults() {
        let profile = ProgressProfile::load(&MemoryStore::new());
        assert_eq!(profile, ProgressProfile::default());
        assert_eq!(profile.level(), 1);
    }

    #[test]
    fn test_record_and_reload() {
        let mut store = MemoryStore::new();
        let mut profile = ProgressProfile::load(&store);
        let record = profile.record_run(
            &mut store,
            &summary(GameMode::Classic, 640, None),
            Rewards { xp: 320, coins: 17 },
        );
        assert!(record.saved);
        assert!(record.new_best);
        assert!(record.leveled_up());
        assert_eq!(record.level_after, 2);

        let reloaded = ProgressProfile::load(&store);
        assert_eq!(reloaded, profile);
        assert_eq!(reloaded.best(GameMode::Classic), Some(640));
        assert_eq!(reloaded.games_played, 1);
        assert_eq!(reloaded.max_combo, 9);
    }

    #[test]
    fn test_speed_test_best_is_lowest_time() {
        let mut store = MemoryStore::new();
        let mut profile = ProgressProfile::default();
        let first = profile.record_run(
            &mut store,
            &summary(GameMode::SpeedTest, 300, Some(21_000)),
            Rewards::default(),
        );
        assert!(first.new_best);
        let slower = profile.record_run(
            &mut store,
            &summary(GameMode::SpeedTest, 300, Some(25_000)),
            Rewards::default(),
        );
        assert!(!slower.new_best);
        let faster = profile.record_run(
            &mut store,
            &summary(GameMode::SpeedTest, 300, Some(18_500)),
            Rewards::default(),
        );
        assert!(faster.new_best);
        assert_eq!(profile.best(GameMode::SpeedTest), Some(18_500));
        // Unfinished speed test never counts
        assert!(!profile.is_new_best(GameMode::SpeedTest, 0));
    }

    #[test]
    fn test_failed_store_keeps_memory_state() {
        let mut store = UnavailableStore;
        let mut profile = ProgressProfile::load(&store);
        let record = profile.record_run(
            &mut store,
            &summary(GameMode::Rush, 100, None),
            Rewards { xp: 12, coins: 2 },
        );
        assert!(!record.saved);
        assert_eq!(profile.total_xp, 12);
        assert_eq!(profile.coins, 2);
    }
}

//! Local leaderboards
//!
//! One all-time and one weekly top list per mode, persisted as a single JSON
//! value. Speed Test ranks by completion time (lower is better); every other
//! mode ranks by score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::WEEK_MS;
use crate::persistence::{KeyValueStore, keys, load_or_default, save_logged};
use crate::sim::{GameMode, RunSummary};
use crate::tuning::Tuning;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u64,
    /// Best combo in the run
    pub combo: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
    pub player_name: String,
    /// Speed Test completion time (ms)
    #[serde(default)]
    pub time_ms: Option<u64>,
    /// Speed Test goal
    #[serde(default)]
    pub target_count: Option<u32>,
    /// Active play time (ms)
    pub duration_ms: u64,
}

impl LeaderboardEntry {
    pub fn from_run(summary: &RunSummary, player_name: &str, timestamp: f64, tuning: &Tuning) -> Self {
        let speed_test = summary.mode == GameMode::SpeedTest;
        Self {
            score: summary.score,
            combo: summary.max_combo,
            timestamp,
            player_name: player_name.to_string(),
            time_ms: if speed_test { summary.completion_ms } else { None },
            target_count: speed_test.then_some(tuning.speed_test_goal),
            duration_ms: summary.duration_ms,
        }
    }
}

/// Whether `a` ranks strictly above `b`
fn ranks_above(mode: GameMode, a: &LeaderboardEntry, b: &LeaderboardEntry) -> bool {
    match mode {
        GameMode::SpeedTest => match (a.time_ms, b.time_ms) {
            (Some(ta), Some(tb)) => ta < tb || (ta == tb && a.timestamp < b.timestamp),
            (Some(_), None) => true,
            _ => false,
        },
        _ => a.score > b.score,
    }
}

/// A top-N list for one mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an entry would make the board
    pub fn qualifies(&self, mode: GameMode, entry: &LeaderboardEntry, size: usize) -> bool {
        let has_result = match mode {
            GameMode::SpeedTest => entry.time_ms.is_some_and(|t| t > 0),
            _ => entry.score > 0,
        };
        if !has_result || size == 0 {
            return false;
        }
        if self.entries.len() < size {
            return true;
        }
        self.entries
            .last()
            .map(|last| ranks_above(mode, entry, last))
            .unwrap_or(true)
    }

    /// Rank an entry would achieve (1-indexed), without inserting it
    pub fn potential_rank(&self, mode: GameMode, entry: &LeaderboardEntry, size: usize) -> Option<usize> {
        if !self.qualifies(mode, entry, size) {
            return None;
        }
        let pos = self.entries.iter().position(|e| ranks_above(mode, entry, e));
        Some(pos.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies; returns the rank achieved (1-indexed)
    pub fn add_score(&mut self, mode: GameMode, entry: LeaderboardEntry, size: usize) -> Option<usize> {
        let rank = self.potential_rank(mode, &entry, size)?;
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(size);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }
}

/// Ranks achieved by one submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub all_time: Option<usize>,
    pub weekly: Option<usize>,
}

/// Every board, keyed by mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Leaderboards {
    all_time: BTreeMap<String, Leaderboard>,
    weekly: BTreeMap<String, Leaderboard>,
    /// Unix timestamp (ms) of the last weekly reset; 0 means never
    weekly_reset_at: f64,
}

impl Leaderboards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every board; weekly boards older than a week come back empty
    pub fn load(store: &dyn KeyValueStore, now: f64) -> Self {
        let mut boards: Self = load_or_default(store, keys::LEADERBOARDS);
        boards.prune_weekly(now);
        log::info!(
            "Loaded leaderboards ({} all-time entries)",
            boards.all_time.values().map(|b| b.entries.len()).sum::<usize>()
        );
        boards
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> bool {
        save_logged(store, keys::LEADERBOARDS, self)
    }

    pub fn all_time(&self, mode: GameMode) -> Option<&Leaderboard> {
        self.all_time.get(mode.as_str())
    }

    pub fn weekly(&self, mode: GameMode) -> Option<&Leaderboard> {
        self.weekly.get(mode.as_str())
    }

    pub fn weekly_reset_at(&self) -> f64 {
        self.weekly_reset_at
    }

    /// Clear the weekly boards once a week has passed; returns whether they reset
    pub fn prune_weekly(&mut self, now: f64) -> bool {
        if !now.is_finite() {
            return false;
        }
        if self.weekly_reset_at <= 0.0 || now < self.weekly_reset_at {
            // First use, or the clock went backwards
            self.weekly_reset_at = now;
            return false;
        }
        if now - self.weekly_reset_at < WEEK_MS {
            return false;
        }
        self.weekly.clear();
        self.weekly_reset_at = now;
        log::info!("Weekly leaderboards reset");
        true
    }

    /// Submit a finished run to both boards for its mode
    ///
    /// Runs shorter than the minimum duration are rejected outright.
    pub fn add_score(
        &mut self,
        mode: GameMode,
        entry: LeaderboardEntry,
        now: f64,
        tuning: &Tuning,
    ) -> Option<Placement> {
        if entry.duration_ms < tuning.leaderboard_min_duration_ms {
            log::warn!(
                "Rejected {:?} leaderboard entry: run lasted {} ms",
                mode,
                entry.duration_ms
            );
            return None;
        }
        self.prune_weekly(now);

        let size = tuning.leaderboard_size;
        let key = mode.as_str().to_string();
        let weekly = self
            .weekly
            .entry(key.clone())
            .or_default()
            .add_score(mode, entry.clone(), size);
        let all_time = self.all_time.entry(key).or_default().add_score(mode, entry, size);

        if all_time.is_none() && weekly.is_none() {
            return None;
        }
        Some(Placement { all_time, weekly })
    }
}

/// Describe how long ago a timestamp was
pub fn relative_age(timestamp: f64, now: f64) -> String {
    let diff_mins = ((now - timestamp) / 60_000.0).max(0.0);
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as u32;
        match days {
            1 => "Yesterday".to_string(),
            2..=6 => format!("{days} days ago"),
            _ => format!("{} weeks ago", days / 7),
        }
    } else if diff_hours >= 1.0 {
        match diff_hours.floor() as u32 {
            1 => "1 hour ago".to_string(),
            hours => format!("{hours} hours ago"),
        }
    } else if diff_mins >= 1.0 {
        match diff_mins.floor() as u32 {
            1 => "1 min ago".to_string(),
            mins => format!("{mins} mins ago"),
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    const NOW: f64 = 1_700_000_000_000.0;

    fn entry(score: u64, timestamp: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            score,
            combo: 5,
            timestamp,
            player_name: "Player".to_string(),
            time_ms: None,
            target_count: None,
            duration_ms: 60_000,
        }
    }

    fn timed(time_ms: u64, timestamp: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            time_ms: Some(time_ms),
            target_count: Some(30),
            ..entry(300, timestamp)
        }
    }

    #[test]
    fn test_score_board_orders_descending() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add_score(GameMode::Classic, entry(100, 1.0), 10), Some(1));
        assert_eq!(board.add_score(GameMode::Classic, entry(300, 2.0), 10), Some(1));
        assert_eq!(board.add_score(GameMode::Classic, entry(200, 3.0), 10), Some(2));
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 100]);
        // Zero never ranks
        assert_eq!(board.add_score(GameMode::Classic, entry(0, 4.0), 10), None);
    }

    #[test]
    fn test_board_is_capped() {
        let mut board = Leaderboard::new();
        for i in 1..=12 {
            board.add_score(GameMode::Rush, entry(i * 10, i as f64), 10);
        }
        assert_eq!(board.entries.len(), 10);
        assert_eq!(board.top().map(|e| e.score), Some(120));
        assert!(!board.qualifies(GameMode::Rush, &entry(30, 0.0), 10));
        assert_eq!(board.potential_rank(GameMode::Rush, &entry(35, 0.0), 10), Some(10));
    }

    #[test]
    fn test_speed_test_orders_by_time_then_timestamp() {
        let mut board = Leaderboard::new();
        board.add_score(GameMode::SpeedTest, timed(20_000, 1.0), 10);
        assert_eq!(board.add_score(GameMode::SpeedTest, timed(15_000, 2.0), 10), Some(1));
        // Same time, later timestamp ranks below
        assert_eq!(board.add_score(GameMode::SpeedTest, timed(15_000, 3.0), 10), Some(2));
        // Unfinished runs carry no time and never rank
        assert_eq!(board.add_score(GameMode::SpeedTest, entry(900, 4.0), 10), None);
        let times: Vec<Option<u64>> = board.entries.iter().map(|e| e.time_ms).collect();
        assert_eq!(times, vec![Some(15_000), Some(15_000), Some(20_000)]);
        assert_eq!(board.entries[0].timestamp, 2.0);
    }

    #[test]
    fn test_short_runs_are_rejected() {
        let tuning = Tuning::default();
        let mut boards = Leaderboards::new();
        let short = LeaderboardEntry {
            duration_ms: 9_999,
            ..entry(5_000, NOW)
        };
        assert_eq!(boards.add_score(GameMode::Classic, short, NOW, &tuning), None);
        assert!(boards.all_time(GameMode::Classic).is_none());

        let placement = boards.add_score(GameMode::Classic, entry(500, NOW), NOW, &tuning);
        assert_eq!(
            placement,
            Some(Placement {
                all_time: Some(1),
                weekly: Some(1)
            })
        );
    }

    #[test]
    fn test_weekly_reset_after_seven_days() {
        let tuning = Tuning::default();
        let mut boards = Leaderboards::new();
        boards.add_score(GameMode::Zen, entry(400, NOW), NOW, &tuning);
        assert_eq!(boards.weekly_reset_at(), NOW);

        assert!(!boards.prune_weekly(NOW + WEEK_MS - 1.0));
        assert!(boards.weekly(GameMode::Zen).is_some());

        let later = NOW + WEEK_MS;
        let placement = boards.add_score(GameMode::Zen, entry(100, later), later, &tuning);
        assert_eq!(boards.weekly_reset_at(), later);
        assert_eq!(placement.and_then(|p| p.weekly), Some(1));
        assert_eq!(placement.and_then(|p| p.all_time), Some(2));
        assert_eq!(boards.weekly(GameMode::Zen).map(|b| b.entries.len()), Some(1));
    }

    #[test]
    fn test_save_and_load() {
        let tuning = Tuning::default();
        let mut store = MemoryStore::new();
        let mut boards = Leaderboards::new();
        boards.add_score(GameMode::SpeedTest, timed(18_000, NOW), NOW, &tuning);
        boards.add_score(GameMode::Classic, entry(700, NOW), NOW, &tuning);
        assert!(boards.save(&mut store));
        assert_eq!(Leaderboards::load(&store, NOW), boards);
    }

    #[test]
    fn test_corrupt_store_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(keys::LEADERBOARDS, "{not json").expect("memory store");
        let boards = Leaderboards::load(&store, NOW);
        assert!(boards.all_time(GameMode::Classic).is_none());
        assert!(boards.weekly(GameMode::Classic).is_none());
    }

    #[test]
    fn test_load_drops_stale_weekly_boards() {
        let tuning = Tuning::default();
        let mut store = MemoryStore::new();
        let mut boards = Leaderboards::new();
        boards.add_score(GameMode::Rush, entry(800, NOW), NOW, &tuning);
        assert!(boards.save(&mut store));

        let fresh = Leaderboards::load(&store, NOW + WEEK_MS - 1.0);
        assert_eq!(fresh.weekly(GameMode::Rush).map(|b| b.entries.len()), Some(1));

        let later = NOW + WEEK_MS;
        let stale = Leaderboards::load(&store, later);
        assert!(stale.weekly(GameMode::Rush).is_none());
        assert_eq!(stale.weekly_reset_at(), later);
        assert_eq!(stale.all_time(GameMode::Rush).map(|b| b.entries.len()), Some(1));
    }

    #[test]
    fn test_relative_age() {
        assert_eq!(relative_age(NOW, NOW + 30_000.0), "Just now");
        assert_eq!(relative_age(NOW, NOW + 5.0 * 60_000.0), "5 mins ago");
        assert_eq!(relative_age(NOW, NOW + 3_600_000.0), "1 hour ago");
        assert_eq!(relative_age(NOW, NOW + 86_400_000.0), "Yesterday");
        assert_eq!(relative_age(NOW, NOW + 3.0 * 86_400_000.0), "3 days ago");
        assert_eq!(relative_age(NOW, NOW + 15.0 * 86_400_000.0), "2 weeks ago");
    }
}

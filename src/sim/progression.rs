//! XP curve and level lookup
//!
//! Levels 1-6 follow a fixed table; past level 6 each level costs 15% more
//! than the last. Level is always derived from total XP, never stored.

/// Cumulative XP to reach levels 1..=6
const LEVEL_TABLE: [u64; 6] = [0, 300, 800, 1600, 2800, 4300];

/// Last level covered by the table
const TABLE_TOP_LEVEL: u32 = 6;

/// Cost of the first level past the table before growth
const GROWTH_BASE_XP: f64 = 1500.0;
/// Per-level growth past the table
const GROWTH_RATE: f64 = 1.15;

/// XP needed to go from `level` to `level + 1`
pub fn xp_for_next_level(level: u32) -> u64 {
    let level = level.max(1);
    if level < TABLE_TOP_LEVEL {
        let i = level as usize;
        return LEVEL_TABLE[i] - LEVEL_TABLE[i - 1];
    }
    let exponent = i32::try_from(level - (TABLE_TOP_LEVEL - 1)).unwrap_or(i32::MAX);
    let step = GROWTH_BASE_XP * GROWTH_RATE.powi(exponent);
    if step.is_finite() && step < u64::MAX as f64 {
        step.floor() as u64
    } else {
        u64::MAX
    }
}

/// Cumulative XP to reach `level` (0 for level 1 and below)
pub fn xp_needed_for_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    if level <= TABLE_TOP_LEVEL {
        return LEVEL_TABLE[level as usize - 1];
    }
    let mut total = LEVEL_TABLE[5];
    for l in TABLE_TOP_LEVEL..level {
        total = total.saturating_add(xp_for_next_level(l));
        if total == u64::MAX {
            break;
        }
    }
    total
}

/// Largest level whose threshold is <= `total_xp`
pub fn level_from_xp(total_xp: u64) -> u32 {
    let mut level = 1;
    let mut threshold = 0u64;
    loop {
        let next = threshold.saturating_add(xp_for_next_level(level));
        // Saturated curve: no further level is reachable
        if next == threshold || next > total_xp {
            return level;
        }
        threshold = next;
        level += 1;
    }
}

/// Level lookup for untrusted input; NaN and negatives map to level 1
pub fn level_from_raw_xp(total_xp: f64) -> u32 {
    if !total_xp.is_finite() || total_xp <= 0.0 {
        return 1;
    }
    level_from_xp(total_xp.floor() as u64)
}

/// Fraction (0..=1) of the way from the current level to the next
pub fn level_progress(total_xp: u64) -> f32 {
    let level = level_from_xp(total_xp);
    let floor = xp_needed_for_level(level);
    let span = xp_for_next_level(level);
    if span == 0 {
        return 0.0;
    }
    ((total_xp - floor) as f64 / span as f64).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_levels() {
        assert_eq!(xp_needed_for_level(0), 0);
        assert_eq!(xp_needed_for_level(1), 0);
        assert_eq!(xp_needed_for_level(2), 300);
        assert_eq!(xp_needed_for_level(3), 800);
        assert_eq!(xp_needed_for_level(4), 1600);
        assert_eq!(xp_needed_for_level(5), 2800);
        assert_eq!(xp_needed_for_level(6), 4300);
    }

    #[test]
    fn test_growth_levels() {
        // 1500 * 1.15 = 1725
        assert_eq!(xp_for_next_level(6), 1725);
        assert_eq!(xp_needed_for_level(7), 4300 + 1725);
        // 1500 * 1.15^2 = 1983.75
        assert_eq!(xp_for_next_level(7), 1983);
        assert_eq!(xp_needed_for_level(8), 4300 + 1725 + 1983);
    }

    #[test]
    fn test_next_level_matches_cumulative() {
        for level in 1..60 {
            assert_eq!(
                xp_needed_for_level(level + 1) - xp_needed_for_level(level),
                xp_for_next_level(level),
                "level {level}"
            );
        }
    }

    #[test]
    fn test_round_trip_at_boundaries() {
        for level in 1..=50 {
            let xp = xp_needed_for_level(level);
            assert_eq!(level_from_xp(xp), level);
            if level > 1 {
                assert_eq!(level_from_xp(xp - 1), level - 1);
            }
        }
    }

    #[test]
    fn test_invalid_xp_is_level_one() {
        assert_eq!(level_from_raw_xp(f64::NAN), 1);
        assert_eq!(level_from_raw_xp(-500.0), 1);
        assert_eq!(level_from_raw_xp(f64::NEG_INFINITY), 1);
        assert_eq!(level_from_raw_xp(299.9), 1);
        assert_eq!(level_from_raw_xp(300.0), 2);
    }

    #[test]
    fn test_huge_xp_terminates() {
        let level = level_from_xp(u64::MAX);
        assert!(level > 50);
    }

    #[test]
    fn test_extreme_levels_saturate() {
        assert_eq!(xp_for_next_level(u32::MAX), u64::MAX);
        let past_i32 = i32::MAX as u32 + 10;
        assert_eq!(xp_for_next_level(past_i32), u64::MAX);
        assert!(xp_for_next_level(past_i32) >= xp_for_next_level(100));
        assert_eq!(xp_needed_for_level(u32::MAX), u64::MAX);
        assert_eq!(xp_needed_for_level(past_i32), u64::MAX);
    }

    #[test]
    fn test_level_progress() {
        assert_eq!(level_progress(0), 0.0);
        assert!((level_progress(150) - 0.5).abs() < 0.001);
        assert_eq!(level_progress(300), 0.0);
    }

    proptest! {
        #[test]
        fn prop_thresholds_strictly_increase(level in 1u32..200) {
            prop_assert!(xp_needed_for_level(level + 1) > xp_needed_for_level(level));
        }

        #[test]
        fn prop_level_brackets_xp(xp in 0u64..50_000_000) {
            let level = level_from_xp(xp);
            prop_assert!(xp_needed_for_level(level) <= xp);
            prop_assert!(xp_needed_for_level(level + 1) > xp);
        }
    }
}

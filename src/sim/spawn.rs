//! Target spawning
//!
//! Categories are decided by an ordered list of gated, weighted rules. The
//! first rule whose gate passes and whose roll succeeds wins, so a target
//! only ever gets one category. Anything left over is a normal target.

use glam::Vec2;
use rand::Rng;

use super::state::{Bounds, GameMode, Target, TargetKind};
use crate::consts::{DANGER_COLOR, POWER_UP_COLOR, TOUCH_MARGIN};
use crate::theme::Theme;

/// Inputs a category rule may look at
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext {
    pub mode: GameMode,
    pub player_level: u32,
}

/// One gated, weighted category rule
pub struct CategoryRule {
    pub kind: TargetKind,
    pub eligible: fn(&SpawnContext) -> bool,
    pub chance: fn(&SpawnContext) -> f64,
}

/// Category rules in priority order
pub const CATEGORY_RULES: [CategoryRule; 3] = [
    CategoryRule {
        kind: TargetKind::Danger,
        eligible: danger_eligible,
        chance: danger_chance,
    },
    CategoryRule {
        kind: TargetKind::PowerUp,
        eligible: power_up_eligible,
        chance: power_up_chance,
    },
    CategoryRule {
        kind: TargetKind::Lucky,
        eligible: always,
        chance: lucky_chance,
    },
];

fn always(_: &SpawnContext) -> bool {
    true
}

fn lucky_chance(_: &SpawnContext) -> f64 {
    0.10
}

fn danger_eligible(ctx: &SpawnContext) -> bool {
    ctx.mode == GameMode::Rush && ctx.player_level >= 5
}

fn danger_chance(ctx: &SpawnContext) -> f64 {
    let extra = ctx.player_level.saturating_sub(5) as f64;
    (0.03 + 0.005 * extra).min(0.25)
}

fn power_up_eligible(ctx: &SpawnContext) -> bool {
    ctx.player_level >= 3
}

fn power_up_chance(ctx: &SpawnContext) -> f64 {
    let extra = ctx.player_level.saturating_sub(3) as f64;
    let chance = (0.05 + 0.002 * extra).min(0.15);
    if ctx.mode == GameMode::Zen {
        chance * 1.5
    } else {
        chance
    }
}

/// Roll a category for one spawn
pub fn pick_kind<R: Rng>(rng: &mut R, ctx: &SpawnContext) -> TargetKind {
    for rule in &CATEGORY_RULES {
        if !(rule.eligible)(ctx) {
            continue;
        }
        let p = (rule.chance)(ctx).clamp(0.0, 1.0);
        if rng.random_bool(p) {
            return rule.kind;
        }
    }
    TargetKind::Normal
}

/// Target color: fixed for danger/power-up, theme particle color otherwise
pub fn pick_color<R: Rng>(rng: &mut R, kind: TargetKind, theme: &Theme) -> u32 {
    match kind {
        TargetKind::Danger => DANGER_COLOR,
        TargetKind::PowerUp => POWER_UP_COLOR,
        TargetKind::Normal | TargetKind::Lucky => {
            if theme.particle_colors.is_empty() {
                theme.primary_color
            } else {
                theme.particle_colors[rng.random_range(0..theme.particle_colors.len())]
            }
        }
    }
}

/// Place a target of `size` inside `bounds`; returns (top-left, fitted size)
///
/// Keeps `size / 2 + TOUCH_MARGIN` clearance from every edge when there is
/// room. When the area is too small the target is centered on the short axis
/// and shrunk to fit if needed, so it never leaves the play area.
pub fn place<R: Rng>(rng: &mut R, bounds: Bounds, size: f32) -> (Vec2, f32) {
    // Fields are public, so bounds may not have gone through `Bounds::new`
    let width = crate::sanitize_non_negative(bounds.width);
    let height = crate::sanitize_non_negative(bounds.height);
    let size = crate::sanitize_non_negative(size).min(width).min(height);
    let padding = size / 2.0 + TOUCH_MARGIN;
    let x = axis_position(rng, width, size, padding);
    let y = axis_position(rng, height, size, padding);
    (Vec2::new(x, y), size)
}

fn axis_position<R: Rng>(rng: &mut R, extent: f32, size: f32, padding: f32) -> f32 {
    let min = padding;
    let max = extent - size - padding;
    let pos = if max > min && max.is_finite() {
        rng.random_range(min..=max)
    } else {
        // Degenerate: no room for the margin, center what fits
        (extent - size) / 2.0
    };
    pos.clamp(0.0, (extent - size).max(0.0))
}

/// Spawn one target
pub fn spawn_target<R: Rng>(
    rng: &mut R,
    id: u32,
    bounds: Bounds,
    size: f32,
    ctx: &SpawnContext,
    theme: &Theme,
    now: u64,
) -> Target {
    let kind = pick_kind(rng, ctx);
    let color = pick_color(rng, kind, theme);
    let (pos, size) = place(rng, bounds, size);
    log::debug!("spawn #{id} {kind:?} at ({:.0}, {:.0}) size {size:.0}", pos.x, pos.y);
    Target {
        id,
        pos,
        size,
        kind,
        color,
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ctx(mode: GameMode, player_level: u32) -> SpawnContext {
        SpawnContext { mode, player_level }
    }

    #[test]
    fn test_rule_order_is_danger_power_up_lucky() {
        let kinds: Vec<_> = CATEGORY_RULES.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![TargetKind::Danger, TargetKind::PowerUp, TargetKind::Lucky]
        );
    }

    #[test]
    fn test_chances() {
        assert!((danger_chance(&ctx(GameMode::Rush, 5)) - 0.03).abs() < 1e-9);
        assert!((danger_chance(&ctx(GameMode::Rush, 15)) - 0.08).abs() < 1e-9);
        assert!((danger_chance(&ctx(GameMode::Rush, 200)) - 0.25).abs() < 1e-9);
        assert!((power_up_chance(&ctx(GameMode::Classic, 3)) - 0.05).abs() < 1e-9);
        assert!((power_up_chance(&ctx(GameMode::Classic, 500)) - 0.15).abs() < 1e-9);
        assert!((power_up_chance(&ctx(GameMode::Zen, 500)) - 0.225).abs() < 1e-9);
    }

    #[test]
    fn test_gates() {
        assert!(!danger_eligible(&ctx(GameMode::Classic, 30)));
        assert!(!danger_eligible(&ctx(GameMode::Rush, 4)));
        assert!(danger_eligible(&ctx(GameMode::Rush, 5)));
        assert!(!power_up_eligible(&ctx(GameMode::Zen, 2)));
        assert!(power_up_eligible(&ctx(GameMode::Zen, 3)));
    }

    #[test]
    fn test_low_level_only_normal_or_lucky() {
        let mut rng = Pcg32::seed_from_u64(7);
        let c = ctx(GameMode::Rush, 1);
        for _ in 0..5_000 {
            let kind = pick_kind(&mut rng, &c);
            assert!(matches!(kind, TargetKind::Normal | TargetKind::Lucky));
        }
    }

    #[test]
    fn test_category_exclusivity_over_many_spawns() {
        let mut rng = Pcg32::seed_from_u64(42);
        let theme = Theme::default();
        let bounds = Bounds::new(400.0, 700.0);
        let mut seen = std::collections::HashSet::new();
        for i in 0..100_000u32 {
            let c = ctx(GameMode::ALL[(i % 5) as usize], 1 + i % 30);
            let t = spawn_target(&mut rng, i, bounds, 70.0, &c, &theme, 0);
            let flags = [t.is_danger(), t.is_power_up(), t.is_lucky()];
            assert!(flags.iter().filter(|f| **f).count() <= 1);
            seen.insert(t.kind);
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_lucky_rate_is_roughly_ten_percent() {
        let mut rng = Pcg32::seed_from_u64(3);
        let c = ctx(GameMode::Classic, 1);
        let lucky = (0..20_000)
            .filter(|_| pick_kind(&mut rng, &c) == TargetKind::Lucky)
            .count();
        assert!((1_600..2_400).contains(&lucky), "lucky = {lucky}");
    }

    #[test]
    fn test_colors() {
        let mut rng = Pcg32::seed_from_u64(1);
        let theme = Theme::default();
        assert_eq!(pick_color(&mut rng, TargetKind::Danger, &theme), DANGER_COLOR);
        assert_eq!(pick_color(&mut rng, TargetKind::PowerUp, &theme), POWER_UP_COLOR);
        let c = pick_color(&mut rng, TargetKind::Normal, &theme);
        assert!(theme.particle_colors.contains(&c));

        let bare = Theme {
            particle_colors: Vec::new(),
            ..Theme::default()
        };
        assert_eq!(pick_color(&mut rng, TargetKind::Lucky, &bare), bare.primary_color);
    }

    #[test]
    fn test_degenerate_bounds_clamp() {
        let mut rng = Pcg32::seed_from_u64(9);
        // Too narrow for margins
        let (pos, size) = place(&mut rng, Bounds::new(90.0, 500.0), 80.0);
        assert_eq!(size, 80.0);
        assert_eq!(pos.x, 5.0);
        // Smaller than the target itself
        let (pos, size) = place(&mut rng, Bounds::new(30.0, 20.0), 80.0);
        assert_eq!(size, 20.0);
        assert!(pos.x >= 0.0 && pos.x + size <= 30.0);
        assert_eq!(pos.y, 0.0);
        // Empty / NaN area
        let (pos, size) = place(&mut rng, Bounds::new(f32::NAN, 0.0), 80.0);
        assert_eq!((pos, size), (Vec2::ZERO, 0.0));
    }

    proptest! {
        #[test]
        fn prop_targets_stay_inside_bounds(
            seed in any::<u64>(),
            width in 0.0f32..2000.0,
            height in 0.0f32..2000.0,
            size in 0.0f32..120.0,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let bounds = Bounds::new(width, height);
            let (pos, fitted) = place(&mut rng, bounds, size);
            prop_assert!(pos.x >= 0.0 && pos.y >= 0.0);
            prop_assert!(pos.x + fitted <= width + 1e-3);
            prop_assert!(pos.y + fitted <= height + 1e-3);
        }

        #[test]
        fn prop_unsanitized_bounds_place_safely(
            seed in any::<u64>(),
            width in prop_oneof![
                Just(f32::NAN),
                Just(f32::INFINITY),
                Just(f32::NEG_INFINITY),
                -500.0f32..0.0,
                0.0f32..2000.0,
            ],
            height in prop_oneof![
                Just(f32::NAN),
                Just(f32::INFINITY),
                Just(f32::NEG_INFINITY),
                -500.0f32..0.0,
                0.0f32..2000.0,
            ],
            size in 0.0f32..120.0,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            // Built directly, skipping `Bounds::new`
            let bounds = Bounds { width, height };
            let (pos, fitted) = place(&mut rng, bounds, size);
            prop_assert!(pos.x.is_finite() && pos.y.is_finite() && fitted.is_finite());
            prop_assert!(fitted >= 0.0);
            prop_assert!(pos.x >= 0.0 && pos.y >= 0.0);
            let w = crate::sanitize_non_negative(width);
            let h = crate::sanitize_non_negative(height);
            prop_assert!(pos.x + fitted <= w + 1e-3);
            prop_assert!(pos.y + fitted <= h + 1e-3);
        }
    }

    #[test]
    fn test_literal_bounds_never_panic_or_nan() {
        let mut rng = Pcg32::seed_from_u64(5);
        let (pos, size) = place(&mut rng, Bounds { width: f32::INFINITY, height: 300.0 }, 40.0);
        assert_eq!((pos.x, size), (0.0, 0.0));
        assert!(pos.y.is_finite() && pos.y <= 300.0);
        let (pos, size) = place(&mut rng, Bounds { width: f32::NAN, height: 300.0 }, 40.0);
        assert_eq!((pos.x, size), (0.0, 0.0));
        assert!(pos.y.is_finite());
        let (pos, size) = place(&mut rng, Bounds { width: -50.0, height: 300.0 }, 40.0);
        assert_eq!(size, 0.0);
        assert_eq!(pos.x, 0.0);
    }
}

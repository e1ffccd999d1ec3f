//! Reflex Tap headless driver
//!
//! Plays one run with a simple bot so the core can be exercised without a
//! UI: `reflex-tap [mode] [seed]`. Progress and leaderboards are kept in an
//! in-memory store for the lifetime of the process.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use reflex_tap::ads::{AdKind, NoAds, RewardedAds};
    use reflex_tap::audio::{Gated, RecordingSink, SoundEffect, SoundSink};
    use reflex_tap::leaderboard::{Leaderboards, LeaderboardEntry};
    use reflex_tap::persistence::{MemoryStore, ProgressProfile};
    use reflex_tap::platform::{now_ms, random_seed};
    use reflex_tap::sim::{
        BattleSession, Bounds, GameMode, Player, Session, SessionConfig, SessionPhase,
    };
    use reflex_tap::{Settings, Theme, Tuning};

    /// Simulated frame length (ms)
    const FRAME_MS: u32 = 16;
    /// How long the bot waits before tapping a target
    const BOT_REACTION_MS: u64 = 420;
    /// Stop after this much simulated time no matter what
    const MAX_FRAMES: u32 = 20_000;

    const SCREEN: Bounds = Bounds {
        width: 390.0,
        height: 700.0,
    };

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let mode = match args.next() {
            Some(name) => match GameMode::from_str(&name) {
                Some(mode) => mode,
                None => {
                    eprintln!("Unknown mode '{name}', expected classic|rush|zen|speed_test|battle");
                    std::process::exit(2);
                }
            },
            None => GameMode::Classic,
        };
        let seed = args
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(random_seed);

        let mut store = MemoryStore::new();
        let settings = Settings::load(&store);
        let tuning = Tuning::default();

        if mode == GameMode::Battle {
            run_battle(&settings, tuning, seed);
            return;
        }

        let mut profile = ProgressProfile::load(&store);
        let mut boards = Leaderboards::load(&store, now_ms());
        let mut ads = NoAds;
        let sounds = RecordingSink::new();

        let mut config = SessionConfig::new(mode, profile.level(), SCREEN, seed);
        config.theme = Theme::named(&settings.theme);
        config.tuning = tuning.clone();
        let mut session = Session::new(
            config,
            Box::new(Gated::new(sounds.clone(), settings.sound_enabled)),
        );
        session.start();

        for _ in 0..MAX_FRAMES {
            match session.phase() {
                SessionPhase::Ended | SessionPhase::Idle => break,
                SessionPhase::RevivePending => {
                    let result = ads.show_rewarded_ad(AdKind::Revive);
                    session.resolve_revive(result);
                    continue;
                }
                _ => {}
            }
            session.advance(FRAME_MS);
            let now = session.state().clock_ms;
            let ready: Vec<u32> = session
                .targets()
                .iter()
                .filter(|t| !t.is_danger() && t.age(now) >= BOT_REACTION_MS)
                .map(|t| t.id)
                .collect();
            for id in ready {
                session.tap(id);
            }
            for event in session.drain_events() {
                log::debug!("{event:?}");
            }
        }

        let Some(summary) = session.summary().cloned() else {
            log::warn!("Run did not finish within {MAX_FRAMES} frames");
            session.stop();
            return;
        };
        let ad = ads.show_rewarded_ad(AdKind::DoubleReward);
        let rewards = session.claim_double_reward(ad).unwrap_or(summary.rewards);

        let record = profile.record_run(&mut store, &summary, rewards);
        let now = now_ms();
        let entry = LeaderboardEntry::from_run(&summary, &settings.player_name, now, &tuning);
        let placement = boards.add_score(mode, entry, now, &tuning);
        boards.save(&mut store);

        println!("Mode:        {}", mode.as_str());
        println!("Seed:        {seed}");
        println!("Ended:       {:?}", summary.reason);
        println!("Score:       {}", summary.score);
        if let Some(ms) = summary.completion_ms {
            println!("Time:        {:.2} s", ms as f64 / 1000.0);
        }
        println!("Max combo:   {}", summary.max_combo);
        println!("Hits/misses: {}/{}", summary.targets_hit, summary.misses);
        println!("Rewards:     +{} xp, +{} coins", rewards.xp, rewards.coins);
        println!(
            "Level:       {} -> {}{}",
            record.level_before,
            record.level_after,
            if record.new_best { " (new best)" } else { "" }
        );
        match placement.and_then(|p| p.all_time) {
            Some(rank) => println!("Leaderboard: #{rank}"),
            None => println!("Leaderboard: not ranked"),
        }
        if record.new_best && settings.sound_enabled {
            sounds.play(SoundEffect::HighScore);
        }
        println!(
            "Sounds:      {} played ({} taps)",
            sounds.played().len(),
            sounds.count(SoundEffect::Tap)
        );
    }

    fn run_battle(settings: &Settings, tuning: Tuning, seed: u64) {
        let mut battle = BattleSession::new(
            Bounds::new(SCREEN.height, SCREEN.width),
            1,
            Theme::named(&settings.theme),
            tuning,
            seed,
            Box::new(Gated::new(RecordingSink::new(), settings.sound_enabled)),
        );
        battle.start();

        let mut elapsed: u64 = 0;
        for _ in 0..MAX_FRAMES {
            if battle.phase() == SessionPhase::Ended {
                break;
            }
            battle.advance(FRAME_MS);
            elapsed += u64::from(FRAME_MS);
            // Player one reacts faster
            for (player, every) in [(Player::One, 400), (Player::Two, 560)] {
                if elapsed % every >= u64::from(FRAME_MS) {
                    continue;
                }
                let target = battle.side(player).targets.first().map(|t| t.id);
                if let Some(id) = target {
                    battle.tap(player, id);
                }
            }
        }

        match battle.result() {
            Some(result) => {
                println!("Battle:      {} - {}", result.scores[0], result.scores[1]);
                println!("Hits:        {} - {}", result.hits[0], result.hits[1]);
                match result.winner {
                    Some(player) => println!("Winner:      {player:?}"),
                    None => println!("Winner:      draw"),
                }
            }
            None => log::warn!("Battle did not finish within {MAX_FRAMES} frames"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Reflex Tap (native) starting...");
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `wasm_start` in the library
}

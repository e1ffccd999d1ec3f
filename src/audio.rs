//! Sound effects
//!
//! The session only ever calls [`SoundSink::play`], fire-and-forget. On the
//! web, [`AudioManager`] synthesizes every effect with the Web Audio API, no
//! external files needed.

use std::cell::RefCell;
use std::rc::Rc;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Normal target hit
    Tap,
    /// Lucky target hit
    Lucky,
    /// Power-up collected
    PowerUp,
    /// Danger target hit
    Danger,
    /// Target expired unhit
    Miss,
    /// Rush multiplier went up
    ComboMilestone,
    /// Power bar filled
    PowerBar,
    /// 3-2-1
    CountdownTick,
    /// Go!
    Go,
    /// Run continued after a revive
    Revive,
    /// Run over
    GameOver,
    /// New high score
    HighScore,
}

impl SoundEffect {
    /// Event name used by sound packs
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Tap => "tap",
            SoundEffect::Lucky => "lucky",
            SoundEffect::PowerUp => "powerup",
            SoundEffect::Danger => "danger",
            SoundEffect::Miss => "miss",
            SoundEffect::ComboMilestone => "combo",
            SoundEffect::PowerBar => "powerbar",
            SoundEffect::CountdownTick => "countdown",
            SoundEffect::Go => "go",
            SoundEffect::Revive => "revive",
            SoundEffect::GameOver => "gameover",
            SoundEffect::HighScore => "highscore",
        }
    }
}

/// Sound trigger. Implementations must swallow their own failures.
pub trait SoundSink {
    fn play(&self, effect: SoundEffect);
}

/// Plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SoundSink for Silent {
    fn play(&self, _effect: SoundEffect) {}
}

/// Remembers every effect it was asked to play (headless runs, replays)
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    played: Rc<RefCell<Vec<SoundEffect>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effects played so far, oldest first
    pub fn played(&self) -> Vec<SoundEffect> {
        self.played.borrow().clone()
    }

    pub fn count(&self, effect: SoundEffect) -> usize {
        self.played.borrow().iter().filter(|e| **e == effect).count()
    }
}

impl SoundSink for RecordingSink {
    fn play(&self, effect: SoundEffect) {
        if let Ok(mut played) = self.played.try_borrow_mut() {
            played.push(effect);
        }
    }
}

/// Wraps a sink and drops everything while sound is disabled in settings
pub struct Gated<S: SoundSink> {
    inner: S,
    enabled: bool,
}

impl<S: SoundSink> Gated<S> {
    pub fn new(inner: S, enabled: bool) -> Self {
        Self { inner, enabled }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl<S: SoundSink> SoundSink for Gated<S> {
    fn play(&self, effect: SoundEffect) {
        if self.enabled {
            self.inner.play(effect);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundEffect, SoundSink};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
            }
        }

        /// Set master volume (0.0 - 1.0)
        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        /// Set SFX volume (0.0 - 1.0)
        pub fn set_sfx_volume(&mut self, vol: f32) {
            self.sfx_volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// One enveloped tone, optionally sweeping to `end_freq`
        #[allow(clippy::too_many_arguments)]
        fn tone(
            &self,
            ctx: &AudioContext,
            osc_type: OscillatorType,
            freq: f32,
            end_freq: Option<f32>,
            gain_level: f32,
            delay: f64,
            length: f64,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;

            gain.gain().set_value_at_time(0.0, ctx.current_time()).ok();
            gain.gain().set_value_at_time(gain_level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            if let Some(end) = end_freq {
                osc.frequency().set_value_at_time(freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(end, t + length)
                    .ok();
            }

            osc.start().ok();
            osc.stop_with_when(t + length + 0.02).ok();
        }
    }

    impl SoundSink for AudioManager {
        fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers suspend the context until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            use OscillatorType::{Sawtooth, Sine, Square, Triangle};
            match effect {
                SoundEffect::Tap => self.tone(ctx, Sine, 660.0, Some(880.0), vol * 0.4, 0.0, 0.08),
                SoundEffect::Lucky => {
                    for (i, freq) in [784.0, 988.0, 1175.0].into_iter().enumerate() {
                        self.tone(ctx, Triangle, freq, None, vol * 0.35, i as f64 * 0.06, 0.12);
                    }
                }
                SoundEffect::PowerUp => {
                    self.tone(ctx, Square, 440.0, Some(1320.0), vol * 0.25, 0.0, 0.25)
                }
                SoundEffect::Danger => {
                    self.tone(ctx, Sawtooth, 220.0, Some(55.0), vol * 0.5, 0.0, 0.3)
                }
                SoundEffect::Miss => self.tone(ctx, Sine, 200.0, Some(120.0), vol * 0.3, 0.0, 0.15),
                SoundEffect::ComboMilestone => {
                    self.tone(ctx, Triangle, 523.0, None, vol * 0.3, 0.0, 0.08);
                    self.tone(ctx, Triangle, 1047.0, None, vol * 0.3, 0.08, 0.12);
                }
                SoundEffect::PowerBar => {
                    self.tone(ctx, Sawtooth, 330.0, Some(1320.0), vol * 0.3, 0.0, 0.4)
                }
                SoundEffect::CountdownTick => self.tone(ctx, Sine, 440.0, None, vol * 0.4, 0.0, 0.1),
                SoundEffect::Go => self.tone(ctx, Sine, 880.0, None, vol * 0.5, 0.0, 0.25),
                SoundEffect::Revive => {
                    self.tone(ctx, Triangle, 262.0, Some(784.0), vol * 0.4, 0.0, 0.5)
                }
                SoundEffect::GameOver => {
                    for (i, freq) in [392.0, 330.0, 262.0].into_iter().enumerate() {
                        self.tone(ctx, Triangle, freq, None, vol * 0.4, i as f64 * 0.2, 0.3);
                    }
                }
                SoundEffect::HighScore => {
                    for (i, freq) in [523.0, 659.0, 784.0, 1047.0].into_iter().enumerate() {
                        self.tone(ctx, Square, freq, None, vol * 0.2, i as f64 * 0.1, 0.15);
                    }
                }
            }
        }
    }
}

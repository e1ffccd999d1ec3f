//! Repeating session timers
//!
//! Timers advance only when the owner calls [`Timers::advance`], so pausing
//! is simply not advancing. Each timer fires at most once per advance and
//! drops any excess, which rules out catch-up bursts after a long frame.

/// Session timers, in firing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    /// 3-2-1-Go
    Countdown,
    /// Removes expired targets
    ExpirySweep,
    /// Spawns targets
    Spawn,
    /// Counts down the run clock
    Clock,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    kind: TimerKind,
    period_ms: u32,
    elapsed_ms: u32,
}

/// A small set of cancellable repeating timers
#[derive(Debug, Clone, Default)]
pub struct Timers {
    // Kept sorted by kind so firing order is stable
    timers: Vec<Timer>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart from zero) a repeating timer
    pub fn schedule(&mut self, kind: TimerKind, period_ms: u32) {
        self.cancel(kind);
        let timer = Timer {
            kind,
            period_ms: period_ms.max(1),
            elapsed_ms: 0,
        };
        let at = self.timers.partition_point(|t| t.kind < kind);
        self.timers.insert(at, timer);
    }

    /// Change a running timer's period without losing progress
    pub fn set_period(&mut self, kind: TimerKind, period_ms: u32) {
        if let Some(timer) = self.timers.iter_mut().find(|t| t.kind == kind) {
            timer.period_ms = period_ms.max(1);
        }
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.timers.retain(|t| t.kind != kind);
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// Number of live timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn period(&self, kind: TimerKind) -> Option<u32> {
        self.timers
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.period_ms)
    }

    /// Advance every timer by `dt_ms`; returns the timers that fired, in order
    pub fn advance(&mut self, dt_ms: u32) -> Vec<TimerKind> {
        let mut fired = Vec::new();
        for timer in &mut self.timers {
            timer.elapsed_ms = timer.elapsed_ms.saturating_add(dt_ms);
            if timer.elapsed_ms >= timer.period_ms {
                timer.elapsed_ms = (timer.elapsed_ms - timer.period_ms).min(timer.period_ms - 1);
                fired.push(timer.kind);
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_on_period() {
        let mut timers = Timers::new();
        timers.schedule(TimerKind::Clock, 1000);
        assert!(timers.advance(999).is_empty());
        assert_eq!(timers.advance(1), vec![TimerKind::Clock]);
        assert!(timers.advance(500).is_empty());
        assert_eq!(timers.advance(500), vec![TimerKind::Clock]);
    }

    #[test]
    fn test_firing_order_is_fixed() {
        let mut timers = Timers::new();
        timers.schedule(TimerKind::Clock, 100);
        timers.schedule(TimerKind::Spawn, 100);
        timers.schedule(TimerKind::ExpirySweep, 100);
        assert_eq!(
            timers.advance(100),
            vec![TimerKind::ExpirySweep, TimerKind::Spawn, TimerKind::Clock]
        );
    }

    #[test]
    fn test_no_catch_up_burst() {
        let mut timers = Timers::new();
        timers.schedule(TimerKind::Spawn, 100);
        assert_eq!(timers.advance(1000), vec![TimerKind::Spawn]);
        // Excess was dropped down to just under one period
        assert_eq!(timers.advance(1), vec![TimerKind::Spawn]);
        assert!(timers.advance(98).is_empty());
    }

    #[test]
    fn test_cancel_all_leaves_nothing() {
        let mut timers = Timers::new();
        timers.schedule(TimerKind::Spawn, 500);
        timers.schedule(TimerKind::ExpirySweep, 100);
        timers.schedule(TimerKind::Clock, 1000);
        assert_eq!(timers.pending(), 3);
        timers.cancel_all();
        assert_eq!(timers.pending(), 0);
        assert!(timers.advance(10_000).is_empty());
    }

    #[test]
    fn test_set_period_keeps_progress() {
        let mut timers = Timers::new();
        timers.schedule(TimerKind::Spawn, 1000);
        timers.advance(600);
        timers.set_period(TimerKind::Spawn, 700);
        assert_eq!(timers.period(TimerKind::Spawn), Some(700));
        assert_eq!(timers.advance(100), vec![TimerKind::Spawn]);
    }

    #[test]
    fn test_reschedule_resets() {
        let mut timers = Timers::new();
        timers.schedule(TimerKind::Countdown, 1000);
        timers.advance(900);
        timers.schedule(TimerKind::Countdown, 1000);
        assert_eq!(timers.pending(), 1);
        assert!(timers.advance(900).is_empty());
    }
}

// clock.rs

use log::{debug, trace};

pub const MINUTE_MS: f64 = 60_000.0;

/// Outcome of a single clock poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Start of a subdivision step
    Tick,
    /// Midpoint of a subdivision step
    Tock,
    None,
}

/// Polled phase detector.
///
/// There is no clock edge to wait on, so each poll compares wall-clock time
/// against the last tick and reports whether a step boundary or a step
/// midpoint has been crossed since. At most one of tick or tock is reported
/// per poll and at most one tock per step.
#[derive(Debug, Default)]
pub struct BeatClock {
    /// None until the first poll or latch arms the clock
    last_tick_ms: Option<f64>,
    tock_fired: bool,
    /// Tempo held fixed while a phrase is sounding
    effective_bpm: Option<f64>,
    step_ms: f64,
    half_step_ms: f64,
    beat_ms: f64,
}

impl BeatClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self, tempo_bpm: f64, subdivision_beats: f64, now_ms: f64) -> Phase {
        // Non-positive or NaN inputs skip this cycle entirely
        if !(tempo_bpm > 0.0) || !(subdivision_beats > 0.0) {
            return Phase::None;
        }

        let bpm = *self.effective_bpm.get_or_insert(tempo_bpm);
        let steps_per_minute = bpm / subdivision_beats;
        self.beat_ms = MINUTE_MS / bpm;
        self.step_ms = MINUTE_MS / steps_per_minute;
        self.half_step_ms = self.step_ms / 2.0;

        let Some(last_tick_ms) = self.last_tick_ms else {
            self.arm(now_ms);
            return Phase::Tick;
        };

        let diff = now_ms - last_tick_ms;
        if diff > self.step_ms {
            self.arm(now_ms);
            trace!("tick after {:.1} ms (step {:.1} ms)", diff, self.step_ms);
            Phase::Tick
        } else if diff > self.half_step_ms && !self.tock_fired {
            self.tock_fired = true;
            trace!("tock after {:.1} ms", diff);
            Phase::Tock
        } else {
            Phase::None
        }
    }

    /// Locks the clock to `tempo_bpm` and restarts the step at `now_ms`.
    /// Called when the first note of a phrase is pressed.
    ///
    /// Only a tick clears the tock flag, so a tock already fired in the
    /// running step stays fired until the next tick.
    pub fn latch(&mut self, tempo_bpm: Option<f64>, now_ms: f64) {
        if let Some(bpm) = tempo_bpm.filter(|bpm| *bpm > 0.0) {
            self.effective_bpm = Some(bpm);
            self.beat_ms = MINUTE_MS / bpm;
            debug!("Latched effective tempo at {} BPM", bpm);
        }
        self.last_tick_ms = Some(now_ms);
    }

    fn arm(&mut self, now_ms: f64) {
        self.last_tick_ms = Some(now_ms);
        self.tock_fired = false;
    }

    pub fn effective_bpm(&self) -> Option<f64> {
        self.effective_bpm
    }

    /// Duration of one beat (not one step) at the effective tempo
    pub fn beat_ms(&self) -> f64 {
        self.beat_ms
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    pub fn half_step_ms(&self) -> f64 {
        self.half_step_ms
    }

    pub fn is_armed(&self) -> bool {
        self.last_tick_ms.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_durations_at_120_bpm() {
        let mut clock = BeatClock::new();
        clock.poll(120.0, 1.0, 0.0);
        assert_eq!(clock.step_ms(), 500.0);
        assert_eq!(clock.half_step_ms(), 250.0);
        assert_eq!(clock.beat_ms(), 500.0);

        let mut clock = BeatClock::new();
        clock.poll(120.0, 0.5, 0.0);
        assert_eq!(clock.step_ms(), 250.0);
        assert_eq!(clock.beat_ms(), 500.0);
    }

    #[test]
    fn test_tick_tock_tick_sequence() {
        let mut clock = BeatClock::new();
        assert_eq!(clock.poll(120.0, 1.0, 0.0), Phase::Tick);
        assert_eq!(clock.poll(120.0, 1.0, 260.0), Phase::Tock);
        assert_eq!(clock.poll(120.0, 1.0, 520.0), Phase::Tick);
    }

    #[test]
    fn test_one_tock_per_step() {
        let mut clock = BeatClock::new();
        clock.poll(120.0, 1.0, 0.0);

        let tocks = (1..50)
            .map(|i| clock.poll(120.0, 1.0, i as f64 * 10.0))
            .filter(|phase| *phase == Phase::Tock)
            .count();
        assert_eq!(tocks, 1);

        // The next tick clears the flag
        assert_eq!(clock.poll(120.0, 1.0, 501.0), Phase::Tick);
        assert_eq!(clock.poll(120.0, 1.0, 760.0), Phase::Tock);
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        let mut clock = BeatClock::new();
        clock.poll(120.0, 1.0, 0.0);
        assert_eq!(clock.poll(120.0, 1.0, 250.0), Phase::None);
        assert_eq!(clock.poll(120.0, 1.0, 251.0), Phase::Tock);
        assert_eq!(clock.poll(120.0, 1.0, 500.0), Phase::None);
        assert_eq!(clock.poll(120.0, 1.0, 501.0), Phase::Tick);
    }

    #[test]
    fn test_effective_tempo_ignores_host_changes() {
        let mut clock = BeatClock::new();
        clock.poll(120.0, 1.0, 0.0);
        clock.poll(60.0, 1.0, 10.0);
        assert_eq!(clock.effective_bpm(), Some(120.0));
        assert_eq!(clock.step_ms(), 500.0);
    }

    #[test]
    fn test_latch_relocks_tempo_and_restarts_step() {
        let mut clock = BeatClock::new();
        clock.poll(120.0, 1.0, 0.0);
        clock.poll(120.0, 1.0, 300.0); // tock

        clock.latch(Some(60.0), 400.0);
        assert_eq!(clock.effective_bpm(), Some(60.0));
        assert_eq!(clock.beat_ms(), 1000.0);

        // One second per step now, measured from the latch
        assert_eq!(clock.poll(140.0, 1.0, 800.0), Phase::None);
        assert_eq!(clock.poll(140.0, 1.0, 1401.0), Phase::Tick);
        assert_eq!(clock.poll(140.0, 1.0, 1902.0), Phase::Tock);
    }

    #[test]
    fn test_latch_after_tock_keeps_tock_suppressed_until_tick() {
        let mut clock = BeatClock::new();
        assert_eq!(clock.poll(120.0, 1.0, 0.0), Phase::Tick);
        assert_eq!(clock.poll(120.0, 1.0, 260.0), Phase::Tock);

        clock.latch(Some(120.0), 300.0);
        assert_eq!(clock.poll(120.0, 1.0, 560.0), Phase::None);
        assert_eq!(clock.poll(120.0, 1.0, 801.0), Phase::Tick);
        assert_eq!(clock.poll(120.0, 1.0, 1052.0), Phase::Tock);
    }

    #[test]
    fn test_latch_on_fresh_clock_still_tocks() {
        let mut clock = BeatClock::new();
        clock.latch(Some(120.0), 0.0);
        assert_eq!(clock.poll(120.0, 1.0, 251.0), Phase::Tock);
    }

    #[test]
    fn test_latch_without_tempo_keeps_previous() {
        let mut clock = BeatClock::new();
        clock.poll(90.0, 1.0, 0.0);
        clock.latch(None, 100.0);
        assert_eq!(clock.effective_bpm(), Some(90.0));
        assert!(clock.is_armed());
    }

    #[test]
    fn test_non_positive_tempo_does_not_tick() {
        let mut clock = BeatClock::new();
        assert_eq!(clock.poll(0.0, 1.0, 0.0), Phase::None);
        assert_eq!(clock.poll(-120.0, 1.0, 10.0), Phase::None);
        assert_eq!(clock.poll(f64::NAN, 1.0, 20.0), Phase::None);
        assert!(!clock.is_armed());
        assert_eq!(clock.effective_bpm(), None);
    }
}

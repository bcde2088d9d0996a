//! MIDI clock decoding and BPM calculation

use crate::midi::MidiMessage;
use std::collections::VecDeque;

/// Pulses (ticks) per quarter note in standard MIDI clock
pub const PPQ: u32 = 24;

// Intervals outside this range are treated as dropouts or bursts
const MIN_INTERVAL_MS: f64 = 1.0;
const MAX_INTERVAL_MS: f64 = 100.0;

/// Represents different types of MIDI clock messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMessage {
    Tick,
    Start,
    Stop,
    Continue,
}

impl ClockMessage {
    pub fn from_midi(msg: &MidiMessage) -> Option<Self> {
        match msg {
            MidiMessage::Clock => Some(ClockMessage::Tick),
            MidiMessage::Start => Some(ClockMessage::Start),
            MidiMessage::Stop => Some(ClockMessage::Stop),
            MidiMessage::Continue => Some(ClockMessage::Continue),
            _ => None,
        }
    }
}

/// Handles BPM calculation from MIDI clock messages.
///
/// Timestamps are supplied by the caller in milliseconds so the calculator
/// stays deterministic under test.
#[derive(Debug)]
pub struct BpmCalculator {
    last_tick_ms: Option<f64>,
    is_playing: bool,
    intervals: VecDeque<f64>,
    window_size: usize, // Number of intervals to average
}

impl Default for BpmCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl BpmCalculator {
    /// Creates a calculator averaging over one quarter note worth of ticks
    pub fn new() -> Self {
        Self {
            last_tick_ms: None,
            is_playing: false,
            intervals: VecDeque::with_capacity(32),
            window_size: PPQ as usize,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Process a MIDI clock message and return the current BPM if it can be calculated
    pub fn process_message(&mut self, msg: ClockMessage, now_ms: f64) -> Option<f64> {
        match msg {
            ClockMessage::Start => {
                self.is_playing = true;
                self.last_tick_ms = None;
                self.intervals.clear();
                None
            }
            ClockMessage::Stop => {
                self.is_playing = false;
                None
            }
            ClockMessage::Continue => {
                self.is_playing = true;
                None
            }
            ClockMessage::Tick => {
                if !self.is_playing {
                    return None;
                }

                if let Some(last_ms) = self.last_tick_ms {
                    let interval = now_ms - last_ms;
                    if interval > MIN_INTERVAL_MS && interval < MAX_INTERVAL_MS {
                        self.intervals.push_back(interval);
                        while self.intervals.len() > self.window_size {
                            self.intervals.pop_front();
                        }
                    }
                }
                self.last_tick_ms = Some(now_ms);

                self.current_bpm()
            }
        }
    }

    /// Returns the current BPM if it can be calculated
    pub fn current_bpm(&self) -> Option<f64> {
        // Need at least a few intervals to calculate meaningful BPM
        if self.intervals.len() < 3 {
            return None;
        }

        // Sort intervals and take the median section to avoid outliers
        let mut intervals: Vec<f64> = self.intervals.iter().copied().collect();
        intervals.sort_by(f64::total_cmp);

        let start_idx = intervals.len() / 4;
        let end_idx = (intervals.len() * 3) / 4;
        let median_intervals = &intervals[start_idx..end_idx];

        let avg_interval_ms = median_intervals.iter().sum::<f64>() / median_intervals.len() as f64;
        let ticks_per_minute = 60_000.0 / avg_interval_ms;
        Some(ticks_per_minute / f64::from(PPQ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK_MS_120: f64 = 500.0 / 24.0;

    #[test]
    fn test_no_bpm_until_three_intervals() {
        let mut calc = BpmCalculator::new();
        calc.process_message(ClockMessage::Start, 0.0);
        assert_eq!(calc.process_message(ClockMessage::Tick, 0.0), None);
        assert_eq!(calc.process_message(ClockMessage::Tick, TICK_MS_120), None);
        assert_eq!(calc.process_message(ClockMessage::Tick, 2.0 * TICK_MS_120), None);
        assert!(calc
            .process_message(ClockMessage::Tick, 3.0 * TICK_MS_120)
            .is_some());
    }

    #[test]
    fn test_ticks_ignored_while_stopped() {
        let mut calc = BpmCalculator::new();
        for i in 0..10 {
            assert_eq!(
                calc.process_message(ClockMessage::Tick, i as f64 * TICK_MS_120),
                None
            );
        }
        assert!(!calc.is_playing());
    }

    #[test]
    fn test_window_keeps_only_recent_intervals() {
        let mut calc = BpmCalculator::new();
        calc.process_message(ClockMessage::Start, 0.0);

        // A long run at 60 BPM followed by a full window at 120 BPM
        let slow_tick_ms = 1000.0 / 24.0;
        let mut now = 0.0;
        for _ in 0..100 {
            calc.process_message(ClockMessage::Tick, now);
            now += slow_tick_ms;
        }
        let mut bpm = None;
        for _ in 0..=PPQ {
            bpm = calc.process_message(ClockMessage::Tick, now);
            now += TICK_MS_120;
        }

        assert_eq!(calc.intervals.len(), PPQ as usize);
        let bpm = bpm.unwrap();
        assert!((bpm - 120.0).abs() < 0.01, "bpm was {}", bpm);
    }

    #[test]
    fn test_from_midi() {
        assert_eq!(
            ClockMessage::from_midi(&MidiMessage::Clock),
            Some(ClockMessage::Tick)
        );
        assert_eq!(ClockMessage::from_midi(&MidiMessage::AllNotesOff), None);
    }
}

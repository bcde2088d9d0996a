use crate::config::ClockSource;
use crate::midi::{BpmCalculator, ClockMessage, MidiMessage};
use log::info;

/// Transport information available to the processor on each poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostInfo {
    /// None while the tempo cannot be determined
    pub tempo_bpm: Option<f64>,
    pub is_playing: bool,
}

/// Stands in for the plugin host: owns the tempo and play state that the
/// processor reads.
#[derive(Debug)]
pub struct HostTransport {
    source: ClockSource,
    fixed_bpm: f64,
    bpm_calculator: BpmCalculator,
    is_playing: bool,
}

impl HostTransport {
    pub fn new(source: ClockSource, fixed_bpm: f64) -> Self {
        let is_playing = source == ClockSource::Internal;
        Self {
            source,
            fixed_bpm,
            bpm_calculator: BpmCalculator::new(),
            is_playing,
        }
    }

    /// Feeds realtime messages into the transport. Other messages are ignored.
    pub fn observe(&mut self, msg: &MidiMessage, now_ms: f64) {
        let Some(clock_msg) = ClockMessage::from_midi(msg) else {
            return;
        };

        match clock_msg {
            ClockMessage::Start | ClockMessage::Continue if !self.is_playing => {
                info!("Host transport started ({:?})", clock_msg);
                self.is_playing = true;
            }
            ClockMessage::Stop if self.is_playing => {
                info!("Host transport stopped");
                self.is_playing = false;
            }
            _ => {}
        }

        if self.source == ClockSource::External {
            self.bpm_calculator.process_message(clock_msg, now_ms);
        }
    }

    pub fn info(&self) -> HostInfo {
        let tempo_bpm = match self.source {
            ClockSource::Internal => Some(self.fixed_bpm),
            ClockSource::External => self.bpm_calculator.current_bpm(),
        };
        HostInfo {
            tempo_bpm: tempo_bpm.filter(|bpm| *bpm > 0.0),
            is_playing: self.is_playing,
        }
    }
}

//! The repeater itself: note bookkeeping, beat detection and re-triggering.
//!
//! [`MarimbaRepeat`] is driven from two call sites that never run at the same
//! time: [`MarimbaRepeat::handle_midi`] for every incoming message and
//! [`MarimbaRepeat::process_block`] once per processing block. Neither
//! blocks; note-offs are handed back as [`Output::After`] for the caller to
//! deliver later.

use crate::clock::{BeatClock, Phase};
use crate::held_notes::HeldNotes;
use crate::host::HostInfo;
use crate::midi::MidiMessage;
use crate::params::Params;
use crate::pitch::SyncGroup;
use crate::repeater::Repeater;
use crate::transport::{TransportMonitor, TransportState};
use log::debug;

/// Something the processor wants sent downstream
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Now(MidiMessage),
    After { message: MidiMessage, delay_ms: f64 },
}

pub struct MarimbaRepeat {
    params: Params,
    clock: BeatClock,
    held: HeldNotes,
    transport: TransportMonitor,
    /// First note arrived before any tempo was known
    pending_latch: bool,
}

impl MarimbaRepeat {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            clock: BeatClock::new(),
            held: HeldNotes::new(),
            transport: TransportMonitor::new(),
            pending_latch: false,
        }
    }

    pub fn params(&self) -> Params {
        self.params
    }

    /// Takes effect from the next poll or trigger.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    pub fn handle_midi(&mut self, msg: MidiMessage, host: &HostInfo, now_ms: f64) -> Vec<Output> {
        let mut out = Vec::new();

        match msg {
            MidiMessage::NoteOn { note, velocity, .. } => {
                if self.held.press(note, velocity) {
                    debug!("First note on: note={} vel={}", note, velocity);
                    if usable_tempo(host).is_some() {
                        self.clock.latch(host.tempo_bpm, now_ms);
                        self.trigger(SyncGroup::OnBeat, &mut out);
                    } else {
                        debug!("No tempo yet, holding the first note until one arrives");
                        self.pending_latch = true;
                    }
                }
            }
            MidiMessage::NoteOff { note, .. } => {
                self.held.release(note);
                if self.held.held_count() == 0 {
                    self.pending_latch = false;
                }
            }
            other => out.push(Output::Now(other)),
        }

        out
    }

    pub fn process_block(&mut self, host: &HostInfo, now_ms: f64) -> Vec<Output> {
        let mut out = Vec::new();

        let phase = match usable_tempo(host) {
            // The phrase starts on the first block that knows its tempo
            Some(tempo) if self.pending_latch => {
                self.pending_latch = false;
                self.clock.latch(Some(tempo), now_ms);
                Phase::Tick
            }
            Some(tempo) => self.clock.poll(tempo, self.params.time.beats(), now_ms),
            None => Phase::None,
        };

        if self.transport.poll(host.is_playing) {
            out.push(Output::Now(MidiMessage::AllNotesOff));
        }

        match phase {
            Phase::Tick => self.trigger(SyncGroup::OnBeat, &mut out),
            Phase::Tock => self.trigger(SyncGroup::OffBeat, &mut out),
            Phase::None => {}
        }

        out
    }

    fn trigger(&self, group: SyncGroup, out: &mut Vec<Output>) {
        let repeater = Repeater::new(self.params.channel, self.params.note_length);
        repeater.trigger(self.held.group(group), self.clock.beat_ms(), out);
    }

    pub fn held_notes(&self) -> &HeldNotes {
        &self.held
    }

    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport.state()
    }
}

fn usable_tempo(host: &HostInfo) -> Option<f64> {
    host.tempo_bpm.filter(|bpm| *bpm > 0.0)
}

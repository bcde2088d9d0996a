// event_loop.rs

use crate::config::Config;
use crate::deferred::DeferredQueue;
use crate::host::HostTransport;
use crate::midi::{self, MidiEngine, MidiMessage};
use crate::pitch::SyncGroup;
use crate::processor::{MarimbaRepeat, Output};
use crate::ui::StatusSnapshot;
use crossbeam::channel::{select, tick, Receiver, Sender};
use log::{debug, error, info, trace};
use std::time::{Duration, Instant};

const STATUS_INTERVAL_MS: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    /// Raw bytes from the MIDI input
    Midi(Vec<u8>),
    Shutdown,
}

/// The single thread that owns all repeater state.
///
/// Incoming MIDI and the block ticker are the only two things that touch the
/// processor, and both are serviced here one at a time.
pub struct EventLoop<E: MidiEngine> {
    processor: MarimbaRepeat,
    host: HostTransport,
    deferred: DeferredQueue,
    engine: E,
    rx: Receiver<EngineMessage>,
    block_interval: Duration,
    started: Instant,
    status_tx: Option<Sender<StatusSnapshot>>,
    last_status_ms: f64,
}

impl<E: MidiEngine> EventLoop<E> {
    pub fn new(config: &Config, engine: E, rx: Receiver<EngineMessage>) -> Self {
        EventLoop {
            processor: MarimbaRepeat::new(config.params()),
            host: HostTransport::new(config.clock_source, config.bpm),
            deferred: DeferredQueue::new(),
            engine,
            rx,
            block_interval: config.block_interval(),
            started: Instant::now(),
            status_tx: None,
            last_status_ms: f64::NEG_INFINITY,
        }
    }

    /// Publishes a status snapshot roughly ten times a second.
    pub fn with_status(mut self, status_tx: Sender<StatusSnapshot>) -> Self {
        self.status_tx = Some(status_tx);
        self
    }

    pub fn run(mut self) {
        info!(
            "Event loop running, polling every {:.2} ms",
            self.block_interval.as_secs_f64() * 1000.0
        );
        let rx = self.rx.clone();
        let ticker = tick(self.block_interval);

        loop {
            select! {
                recv(rx) -> msg => match msg {
                    Ok(EngineMessage::Midi(bytes)) => self.handle_midi(&bytes),
                    Ok(EngineMessage::Shutdown) => {
                        info!("Shutdown requested");
                        break;
                    }
                    Err(_) => {
                        debug!("Engine channel closed");
                        break;
                    }
                },
                recv(ticker) -> _ => self.process_block(),
            }
        }

        self.shutdown();
    }

    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn handle_midi(&mut self, bytes: &[u8]) {
        let Some(msg) = midi::parse(bytes) else {
            return;
        };
        let now_ms = self.now_ms();
        trace!("MIDI in at {:.1} ms: {:?}", now_ms, msg);

        self.host.observe(&msg, now_ms);
        let outputs = self.processor.handle_midi(msg, &self.host.info(), now_ms);
        self.dispatch(outputs, now_ms);
    }

    fn process_block(&mut self) {
        let now_ms = self.now_ms();

        for msg in self.deferred.drain_due(now_ms) {
            self.send(&msg);
        }

        let outputs = self.processor.process_block(&self.host.info(), now_ms);
        self.dispatch(outputs, now_ms);
        self.publish_status(now_ms);
    }

    fn dispatch(&mut self, outputs: Vec<Output>, now_ms: f64) {
        for output in outputs {
            match output {
                Output::Now(msg) => self.send(&msg),
                Output::After { message, delay_ms } => {
                    let delay_ms = if delay_ms.is_finite() {
                        delay_ms.max(0.0)
                    } else {
                        0.0
                    };
                    self.deferred.schedule(message, now_ms + delay_ms);
                }
            }
        }
    }

    fn send(&mut self, msg: &MidiMessage) {
        // A failed send must not stop the loop
        if let Err(e) = self.engine.send(msg) {
            error!("Failed to send {:?}: {}", msg, e);
        }
    }

    fn publish_status(&mut self, now_ms: f64) {
        let Some(status_tx) = &self.status_tx else {
            return;
        };
        if now_ms - self.last_status_ms < STATUS_INTERVAL_MS {
            return;
        }
        self.last_status_ms = now_ms;

        let host = self.host.info();
        let held = self.processor.held_notes();
        let snapshot = StatusSnapshot {
            tempo_bpm: host.tempo_bpm,
            effective_bpm: self.processor.clock().effective_bpm(),
            is_playing: host.is_playing,
            time: self.processor.params().time,
            on_beat: held.group(SyncGroup::OnBeat).len(),
            off_beat: held.group(SyncGroup::OffBeat).len(),
            pending_note_offs: self.deferred.len(),
        };
        // Drop the snapshot rather than wait on the display
        let _ = status_tx.try_send(snapshot);
    }

    fn shutdown(&mut self) {
        let pending = self.deferred.drain_all();
        info!("Flushing {} pending note-offs", pending.len());
        for msg in pending {
            self.send(&msg);
        }
    }
}

use crate::midi::{MidiEngine, MidiMessage, Result};
use std::sync::{Arc, Mutex};

/// Output engine that records every message it is asked to send
#[derive(Clone, Default)]
pub struct MockMidiEngine {
    sent: Arc<Mutex<Vec<MidiMessage>>>,
}

impl MockMidiEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far, shared across clones
    pub fn sent(&self) -> Vec<MidiMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl MidiEngine for MockMidiEngine {
    fn send(&mut self, msg: &MidiMessage) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(msg.clone());
        }
        Ok(())
    }
}

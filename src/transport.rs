use log::info;

/// Host play/stop state as last seen by the monitor
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransportState {
    pub is_playing: bool,
    /// Set while stopped once the flush has been issued
    pub all_notes_off_sent: bool,
}

/// Issues a single all-notes-off each time the host transport stops.
///
/// Held notes are left alone, so resuming playback with keys still down
/// carries on repeating them.
#[derive(Debug, Default)]
pub struct TransportMonitor {
    state: TransportState,
}

impl TransportMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when an all-notes-off must be sent this cycle.
    pub fn poll(&mut self, is_playing: bool) -> bool {
        self.state.is_playing = is_playing;

        if is_playing && self.state.all_notes_off_sent {
            self.state.all_notes_off_sent = false;
            info!("Transport resumed");
        }

        if !is_playing && !self.state.all_notes_off_sent {
            self.state.all_notes_off_sent = true;
            info!("Transport stopped, sending all notes off");
            return true;
        }

        false
    }

    pub fn state(&self) -> TransportState {
        self.state
    }
}

pub mod cli;
pub mod clock;
pub mod config;
pub mod deferred;
pub mod event_loop;
pub mod held_notes;
pub mod host;
pub mod logging;
pub mod midi;
pub mod params;
pub mod pitch;
pub mod processor;
pub mod repeater;
pub mod transport;
pub mod ui;

pub use clock::{BeatClock, Phase};
pub use config::{ClockSource, Config};
pub use event_loop::{EngineMessage, EventLoop};
pub use host::{HostInfo, HostTransport};
pub use params::{NoteLength, Params, Subdivision};
pub use pitch::{classify, SyncGroup};
pub use processor::{MarimbaRepeat, Output};

/// Names of every MIDI input and output port, inputs first
pub fn handle_device_list() -> (Vec<String>, Vec<String>) {
    (midi::list_input_ports(), midi::list_output_ports())
}

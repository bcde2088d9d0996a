use crate::event_loop::EngineMessage;
use crate::midi::{encode, MidiEngine, MidiError, MidiMessage, Result};
use crossbeam::channel::Sender;
use log::{debug, info};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

const CLIENT_NAME: &str = "marimba-repeat";

/// Output side of a real MIDI device
pub struct MidirEngine {
    output: MidiOutputConnection,
}

impl MidirEngine {
    /// Connects to the first output port whose name contains `device_name`.
    pub fn connect(device_name: &str) -> Result<Self> {
        let midi_out = MidiOutput::new(CLIENT_NAME)
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;

        let out_ports = midi_out.ports();
        let out_port = out_ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(device_name)
            })
            .ok_or_else(|| MidiError::DeviceNotFound(device_name.to_string()))?;

        let port_name = midi_out.port_name(out_port).unwrap_or_default();
        info!("Connecting to MIDI output port: {}", port_name);

        let output = midi_out
            .connect(out_port, "marimba-repeat-output")
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;
        Ok(MidirEngine { output })
    }
}

impl MidiEngine for MidirEngine {
    fn send(&mut self, msg: &MidiMessage) -> Result<()> {
        for bytes in encode(msg) {
            self.output
                .send(&bytes)
                .map_err(|e| MidiError::SendError(e.to_string()))?;
        }
        Ok(())
    }
}

/// Input side of a real MIDI device. Incoming packets are forwarded to the
/// event loop for as long as this value is alive.
pub struct MidirInput {
    _connection: MidiInputConnection<()>,
}

impl MidirInput {
    pub fn connect(device_name: &str, tx: Sender<EngineMessage>) -> Result<Self> {
        let mut midi_in =
            MidiInput::new(CLIENT_NAME).map_err(|e| MidiError::ConnectionError(e.to_string()))?;
        // Clock and transport messages are needed for external sync
        midi_in.ignore(Ignore::None);

        let in_ports = midi_in.ports();
        let in_port = in_ports
            .iter()
            .find(|p| {
                midi_in
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(device_name)
            })
            .ok_or_else(|| MidiError::DeviceNotFound(device_name.to_string()))?;

        let port_name = midi_in.port_name(in_port).unwrap_or_default();
        info!("Connecting to MIDI input port: {}", port_name);

        let connection = midi_in
            .connect(
                in_port,
                "marimba-repeat-input",
                move |_stamp, message, _| {
                    if tx.send(EngineMessage::Midi(message.to_vec())).is_err() {
                        debug!("Event loop gone, dropping MIDI input");
                    }
                },
                (),
            )
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;

        Ok(MidirInput {
            _connection: connection,
        })
    }
}

pub fn list_input_ports() -> Vec<String> {
    match MidiInput::new(CLIENT_NAME) {
        Ok(midi_in) => midi_in
            .ports()
            .iter()
            .filter_map(|p| midi_in.port_name(p).ok())
            .collect(),
        Err(_) => vec![],
    }
}

pub fn list_output_ports() -> Vec<String> {
    match MidiOutput::new(CLIENT_NAME) {
        Ok(midi_out) => midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect(),
        Err(_) => vec![],
    }
}

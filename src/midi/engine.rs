use std::error::Error;
use std::fmt;

const ALL_NOTES_OFF_CC: u8 = 123;

/// Custom error type for MIDI operations
#[derive(Debug)]
pub enum MidiError {
    /// Error when sending a MIDI message
    SendError(String),
    /// Error when opening or connecting to a MIDI port
    ConnectionError(String),
    /// No port matched the requested device name
    DeviceNotFound(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::SendError(msg) => write!(f, "MIDI send error: {}", msg),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
            MidiError::DeviceNotFound(name) => write!(f, "MIDI device '{}' not found", name),
        }
    }
}

impl Error for MidiError {}

/// Represents a MIDI message flowing through the repeater
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note On message with note number and velocity
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off message with note number and release velocity
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// MIDI Clock timing message
    Clock,
    /// MIDI Start message
    Start,
    /// MIDI Stop message
    Stop,
    /// MIDI Continue message
    Continue,
    /// All-notes-off broadcast to every channel
    AllNotesOff,
    /// Anything else, forwarded byte for byte
    Other(Vec<u8>),
}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// Trait defining the interface for MIDI output implementations
pub trait MidiEngine: Send {
    /// Sends a MIDI message to the device
    fn send(&mut self, msg: &MidiMessage) -> Result<()>;
}

/// Decodes one raw MIDI packet. Note-on with velocity 0 is read as note-off.
pub fn parse(data: &[u8]) -> Option<MidiMessage> {
    let status = *data.first()?;
    let channel = status & 0x0F;

    let msg = match status & 0xF0 {
        0x90 if data.len() >= 3 && data[2] > 0 => MidiMessage::NoteOn {
            channel,
            note: data[1],
            velocity: data[2],
        },
        0x90 if data.len() >= 3 => MidiMessage::NoteOff {
            channel,
            note: data[1],
            velocity: 0,
        },
        0x80 if data.len() >= 3 => MidiMessage::NoteOff {
            channel,
            note: data[1],
            velocity: data[2],
        },
        _ => match status {
            0xF8 => MidiMessage::Clock,
            0xFA => MidiMessage::Start,
            0xFC => MidiMessage::Stop,
            0xFB => MidiMessage::Continue,
            _ => MidiMessage::Other(data.to_vec()),
        },
    };
    Some(msg)
}

/// Encodes a message into the packets that go on the wire.
pub fn encode(msg: &MidiMessage) -> Vec<Vec<u8>> {
    match msg {
        MidiMessage::NoteOn {
            channel,
            note,
            velocity,
        } => vec![vec![0x90 | (channel & 0x0F), *note, *velocity]],
        MidiMessage::NoteOff {
            channel,
            note,
            velocity,
        } => vec![vec![0x80 | (channel & 0x0F), *note, *velocity]],
        MidiMessage::Clock => vec![vec![0xF8]],
        MidiMessage::Start => vec![vec![0xFA]],
        MidiMessage::Stop => vec![vec![0xFC]],
        MidiMessage::Continue => vec![vec![0xFB]],
        MidiMessage::AllNotesOff => (0..16u8)
            .map(|channel| vec![0xB0 | channel, ALL_NOTES_OFF_CC, 0])
            .collect(),
        MidiMessage::Other(bytes) => vec![bytes.clone()],
    }
}

//! MIDI functionality for the repeater
//!
//! This module provides MIDI communication capabilities, including:
//! - Core MIDI message types, wire encoding and error handling
//! - MIDI clock decoding and BPM calculation for external sync
//! - Real MIDI device communication via midir
//! - A recording mock output for testing
//!
mod clock;
mod engine;
pub mod midir_engine;
pub mod mock_engine;

pub use engine::{encode, parse, MidiEngine, MidiError, MidiMessage, Result};

pub use midir_engine::{list_input_ports, list_output_ports, MidirEngine, MidirInput};
pub use mock_engine::MockMidiEngine;

pub use clock::{BpmCalculator, ClockMessage, PPQ};

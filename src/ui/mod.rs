//! User interface components
//!
//! A single status line on stderr showing tempo, transport and held notes.
//! It is rendered on its own thread from snapshots published by the event
//! loop, so drawing never holds up the real-time path.

mod status;

pub use status::{create_status_spinner, format_status, run_status_display, StatusSnapshot};

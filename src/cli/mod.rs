use crate::params::Subdivision;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Syncopated MIDI note repeater", long_about = None)]
pub struct Args {
    /// List available MIDI devices
    #[arg(long)]
    pub device_list: bool,

    /// MIDI input device to read notes (and clock) from
    #[arg(short, long)]
    pub input: Option<String>,

    /// MIDI output device to send repeated notes to
    #[arg(short, long)]
    pub output: Option<String>,

    /// Pick input and output devices interactively
    #[arg(long)]
    pub select_devices: bool,

    /// Tempo source: internal or external
    #[arg(short, long, value_name = "SOURCE")]
    pub clock_source: Option<String>,

    /// Tempo used with the internal clock source
    #[arg(short, long)]
    pub bpm: Option<f64>,

    /// Repeat subdivision, e.g. "1/16", "1/8 dotted", "1/4t"
    #[arg(short, long)]
    pub time: Option<Subdivision>,

    /// Length of repeated notes as a percentage of a beat
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub note_length: Option<u8>,

    /// Output MIDI channel (1-16)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub channel: Option<u8>,

    /// Frames per processing block
    #[arg(long)]
    pub block_size: Option<u32>,

    /// Sample rate the block size is measured against
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Settings file (defaults to ~/.config/marimba-repeat/settings.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable the status line
    #[arg(long)]
    pub no_status: bool,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}

// config.rs

use crate::cli::Args;
use crate::params::{NoteLength, Params, Subdivision};
use log::{debug, info};
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BPM: f64 = 120.0;
pub const DEFAULT_BLOCK_SIZE: u32 = 128;
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

const ENV_PREFIX: &str = "MARIMBA";

#[derive(Debug)]
pub enum ConfigError {
    /// The settings file or environment could not be read
    Settings(String),
    InvalidValue { key: &'static str, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Settings(msg) => write!(f, "Settings error: {}", msg),
            ConfigError::InvalidValue { key, message } => {
                write!(f, "Invalid value for '{}': {}", key, message)
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    #[default]
    Internal,
    External,
}

impl FromStr for ClockSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "internal" => Ok(ClockSource::Internal),
            "external" => Ok(ClockSource::External),
            other => Err(format!(
                "unknown clock source '{}', expected internal or external",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input_device: Option<String>,
    pub output_device: Option<String>,
    pub clock_source: ClockSource,
    pub bpm: f64,
    pub time: Subdivision,
    pub note_length: NoteLength,
    /// Output channel, 1-16
    pub channel: u8,
    pub block_size: u32,
    pub sample_rate: u32,
    pub show_status: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_device: None,
            output_device: None,
            clock_source: ClockSource::Internal,
            bpm: DEFAULT_BPM,
            time: Subdivision::default(),
            note_length: NoteLength::default(),
            channel: 1,
            block_size: DEFAULT_BLOCK_SIZE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            show_status: true,
        }
    }
}

/// Missing keys are not an error, anything else is.
fn optional<T>(result: Result<T, ::config::ConfigError>) -> Result<Option<T>, ConfigError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(::config::ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ConfigError::Settings(e.to_string())),
    }
}

fn invalid(key: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        message: message.into(),
    }
}

pub fn default_settings_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("marimba-repeat")
            .join("settings.toml"),
    )
}

impl Config {
    /// Resolves settings from the settings file, `MARIMBA_*` environment
    /// variables and command line arguments, later sources winning.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        Self::load_with(args, Some(ENV_PREFIX))
    }

    /// Same as [`Config::load`], reading environment overrides under
    /// `env_prefix` only when one is given.
    fn load_with(args: &Args, env_prefix: Option<&str>) -> Result<Self, ConfigError> {
        let path = args.config.clone().or_else(default_settings_path);
        let mut config = Self::from_settings(path.as_deref(), env_prefix)?;
        config.apply_args(args)?;
        config.validate()?;

        info!(
            "Configuration: clock={:?} bpm={} time={} note_length={}% channel={}",
            config.clock_source,
            config.bpm,
            config.time,
            config.note_length.percent(),
            config.channel
        );
        Ok(config)
    }

    fn from_settings(path: Option<&Path>, env_prefix: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            debug!("Reading settings from {}", path.display());
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        if let Some(prefix) = env_prefix {
            builder = builder.add_source(::config::Environment::with_prefix(prefix));
        }
        let settings = builder
            .build()
            .map_err(|e| ConfigError::Settings(e.to_string()))?;

        let mut config = Config::default();

        config.input_device = optional(settings.get_string("input"))?;
        config.output_device = optional(settings.get_string("output"))?;

        if let Some(source) = optional(settings.get_string("clock_source"))? {
            config.clock_source = source
                .parse()
                .map_err(|e: String| invalid("clock_source", e))?;
        }
        if let Some(bpm) = optional(settings.get_float("bpm"))? {
            config.bpm = bpm;
        }
        if let Some(time) = optional(settings.get_string("time"))? {
            config.time = time.parse().map_err(|e: String| invalid("time", e))?;
        }
        if let Some(percent) = optional(settings.get_int("note_length"))? {
            let percent = u8::try_from(percent)
                .ok()
                .filter(|p| (NoteLength::MIN..=NoteLength::MAX).contains(p))
                .ok_or_else(|| invalid("note_length", format!("{} is not within 1-100", percent)))?;
            config.note_length = NoteLength::new(percent);
        }
        if let Some(channel) = optional(settings.get_int("channel"))? {
            config.channel = u8::try_from(channel)
                .map_err(|_| invalid("channel", format!("{} is not within 1-16", channel)))?;
        }
        if let Some(block_size) = optional(settings.get_int("block_size"))? {
            config.block_size = u32::try_from(block_size)
                .map_err(|_| invalid("block_size", format!("{} is not a frame count", block_size)))?;
        }
        if let Some(sample_rate) = optional(settings.get_int("sample_rate"))? {
            config.sample_rate = u32::try_from(sample_rate)
                .map_err(|_| invalid("sample_rate", format!("{} is not a rate", sample_rate)))?;
        }
        if let Some(status) = optional(settings.get_bool("status"))? {
            config.show_status = status;
        }

        Ok(config)
    }

    fn apply_args(&mut self, args: &Args) -> Result<(), ConfigError> {
        if let Some(input) = &args.input {
            self.input_device = Some(input.clone());
        }
        if let Some(output) = &args.output {
            self.output_device = Some(output.clone());
        }
        if let Some(source) = &args.clock_source {
            self.clock_source = source
                .parse()
                .map_err(|e: String| invalid("clock_source", e))?;
        }
        if let Some(bpm) = args.bpm {
            self.bpm = bpm;
        }
        if let Some(time) = args.time {
            self.time = time;
        }
        if let Some(percent) = args.note_length {
            self.note_length = NoteLength::new(percent);
        }
        if let Some(channel) = args.channel {
            self.channel = channel;
        }
        if let Some(block_size) = args.block_size {
            self.block_size = block_size;
        }
        if let Some(sample_rate) = args.sample_rate {
            self.sample_rate = sample_rate;
        }
        if args.no_status {
            self.show_status = false;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.bpm > 0.0) {
            return Err(invalid("bpm", format!("{} must be positive", self.bpm)));
        }
        if !(1..=16).contains(&self.channel) {
            return Err(invalid("channel", format!("{} is not within 1-16", self.channel)));
        }
        if self.block_size == 0 {
            return Err(invalid("block_size", "must be at least one frame"));
        }
        if self.sample_rate == 0 {
            return Err(invalid("sample_rate", "must be positive"));
        }
        Ok(())
    }

    /// Wall-clock time between polls
    pub fn block_interval(&self) -> Duration {
        Duration::from_secs_f64(f64::from(self.block_size) / f64::from(self.sample_rate))
    }

    pub fn params(&self) -> Params {
        Params {
            time: self.time,
            note_length: self.note_length,
            channel: self.channel.saturating_sub(1) & 0x0F,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    fn write_settings(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("marimba-repeat-tests");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}-{}.toml", name, std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_settings_file() {
        let path = std::env::temp_dir().join("marimba-repeat-missing-settings.toml");
        let args = Args::parse_from(["test", "--config", path.to_str().unwrap()]);
        let config = Config::load_with(&args, None).unwrap();

        assert_eq!(config.clock_source, ClockSource::Internal);
        assert_eq!(config.bpm, 120.0);
        assert_eq!(config.time, Subdivision::Sixteenth);
        assert_eq!(config.note_length.percent(), 50);
        assert_eq!(config.channel, 1);
        assert!(config.show_status);
    }

    #[test]
    fn test_settings_file_values() {
        let path = write_settings(
            "values",
            "clock_source = \"external\"\ntime = \"1/8 dotted\"\nnote_length = 80\nchannel = 10\nstatus = false\n",
        );
        let args = Args::parse_from(["test", "--config", path.to_str().unwrap()]);
        let config = Config::load_with(&args, None).unwrap();

        assert_eq!(config.clock_source, ClockSource::External);
        assert_eq!(config.time, Subdivision::EighthDotted);
        assert_eq!(config.note_length.percent(), 80);
        assert_eq!(config.params().channel, 9);
        assert!(!config.show_status);
    }

    #[test]
    fn test_args_override_settings_file() {
        let path = write_settings("override", "bpm = 90.0\ntime = \"1/4\"\n");
        let args = Args::parse_from([
            "test",
            "--config",
            path.to_str().unwrap(),
            "--bpm",
            "140",
            "--time",
            "1/2t",
        ]);
        let config = Config::load_with(&args, None).unwrap();

        assert_eq!(config.bpm, 140.0);
        assert_eq!(config.time, Subdivision::HalfTriplet);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let path = write_settings("invalid", "note_length = 0\n");
        let args = Args::parse_from(["test", "--config", path.to_str().unwrap()]);
        assert!(matches!(
            Config::load_with(&args, None),
            Err(ConfigError::InvalidValue {
                key: "note_length",
                ..
            })
        ));

        let path = write_settings("invalid-source", "clock_source = \"midi\"\n");
        let args = Args::parse_from(["test", "--config", path.to_str().unwrap()]);
        assert!(Config::load_with(&args, None).is_err());
    }

    #[test]
    fn test_environment_overrides_settings_file() {
        let path = write_settings("env", "bpm = 90.0\nchannel = 3\n");
        let args = Args::parse_from(["test", "--config", path.to_str().unwrap()]);

        // Prefix unique to this test so parallel tests never see it
        std::env::set_var("MARIMBATESTENV_BPM", "133");

        let isolated = Config::load_with(&args, None).unwrap();
        assert_eq!(isolated.bpm, 90.0);

        let config = Config::load_with(&args, Some("MARIMBATESTENV")).unwrap();
        assert_eq!(config.bpm, 133.0);
        assert_eq!(config.channel, 3);

        std::env::remove_var("MARIMBATESTENV_BPM");
    }

    #[test]
    fn test_block_interval() {
        let config = Config {
            block_size: 441,
            sample_rate: 44_100,
            ..Config::default()
        };
        assert_eq!(config.block_interval(), Duration::from_millis(10));
    }
}

use simplelog::*;
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;

pub fn log_dir() -> Result<PathBuf, Error> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("marimba-repeat")
        .join("logs"))
}

/// Logs to `~/.local/share/marimba-repeat/logs/app.log`. The terminal is left
/// to the status line.
pub fn init_logger(verbose: bool) -> Result<(), Error> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("app.log"))?;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Debug)
        .build();

    CombinedLogger::init(vec![WriteLogger::new(level, config, log_file)])
        .map_err(|e| Error::new(ErrorKind::Other, format!("Logger initialization failed: {}", e)))
}

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Log levels selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Progressive path tracer for sphere scenes
#[derive(Debug, Parser)]
#[command(name = "glint", version, about = "Progressive path tracer for sphere scenes")]
pub struct Args {
    /// Scene description (JSON). Renders the built-in scene when omitted.
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Samples per pixel in each frame
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum number of bounces per path
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// Number of progressive frames to accumulate
    #[arg(short, long, default_value_t = 16, value_parser = clap::value_parser!(u32).range(1..))]
    pub frames: u32,

    /// Base seed for the random streams
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many seconds, discarding the frame in flight
    #[arg(long)]
    pub max_seconds: Option<f64>,

    /// Output file path (.png)
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Set the logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

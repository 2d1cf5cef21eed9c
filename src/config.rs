use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    api::ChannelRef,
    format::{NumberStyle, TitleMode},
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "splitflap-stats",
    version,
    about = "Show YouTube channel statistics on a split-flap display"
)]
pub struct Args {
    /// Your Google API key
    #[arg(required_unless_present_any = ["cache", "list_ports"])]
    pub api_key: Option<String>,

    /// The YouTube channel to show: a channel ID, user:<name> or @handle
    #[arg(required_unless_present_any = ["cache", "list_ports"])]
    pub channel_id: Option<String>,

    /// Name or 1-based index of the serial port to use
    #[arg(short, long, env = "SPLITFLAP_PORT")]
    pub port: Option<String>,

    /// Run without a connected display, mirroring output to the console
    #[arg(long)]
    pub demo: bool,

    /// Seconds between updates
    #[arg(short, long, default_value_t = 120, env = "SPLITFLAP_INTERVAL")]
    pub interval: u64,

    /// Number of flap modules (defaults to what the display reports)
    #[arg(short, long)]
    pub width: Option<usize>,

    /// Seconds each line stays on the display
    #[arg(long, default_value_t = 2.0)]
    pub dwell: f64,

    /// How counts are written
    #[arg(long, value_enum, default_value_t = NumberStyle::Grouped)]
    pub numbers: NumberStyle,

    /// How titles longer than the display are shown
    #[arg(long, value_enum, default_value_t = TitleMode::Chunk)]
    pub title: TitleMode,

    /// Show info strings at startup
    #[arg(long)]
    pub intro: bool,

    /// Also announce the channel's latest upload while it is recent
    #[arg(long, conflicts_with = "cache")]
    pub recent_video: bool,

    /// How many days an upload counts as recent
    #[arg(long, default_value_t = 3, value_name = "DAYS")]
    pub recent_days: u32,

    /// Replay statistics from a saved snapshot instead of calling the API
    #[arg(long, value_name = "FILE", conflicts_with = "save_cache")]
    pub cache: Option<PathBuf>,

    /// Save every successful fetch to this snapshot file
    #[arg(long, value_name = "FILE")]
    pub save_cache: Option<PathBuf>,

    /// Retries for transient HTTP failures within a single fetch
    #[arg(long, default_value_t = 0)]
    pub http_retries: u32,

    /// List the available serial ports and exit
    #[arg(long)]
    pub list_ports: bool,
}

/// Where statistics come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Api {
        api_key: String,
        channel: ChannelRef,
        retries: u32,
        /// Window for announcing a new upload, when enabled
        recent_days: Option<u32>,
    },
    Cache(PathBuf),
}

/// Where frames go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Console,
    Serial { port: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source: Source,
    pub output: Output,
    pub interval: Duration,
    pub width: Option<usize>,
    pub dwell: Duration,
    pub numbers: NumberStyle,
    pub title: TitleMode,
    pub intro: bool,
    pub save_cache: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Update interval must be greater than 0")]
    InvalidInterval,
    #[error("Dwell time must be a non-negative number of seconds, got: {0}")]
    InvalidDwell(f64),
    #[error("Display width must be at least 1 module")]
    InvalidWidth,
    #[error("An API key is required")]
    MissingApiKey,
    #[error("Invalid channel: {0}")]
    InvalidChannel(String),
    #[error("Recent video window must be 1 to {max} days, got: {0}", max = MAX_RECENT_DAYS)]
    InvalidRecentDays(u32),
}

pub const MAX_RECENT_DAYS: u32 = 3650;

/// Seconds to a dwell time, rejecting values a `Duration` cannot hold.
pub fn dwell_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidDwell(secs))
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        if args.interval == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        let dwell = dwell_from_secs(args.dwell)?;
        if args.width == Some(0) {
            return Err(ConfigError::InvalidWidth);
        }
        if args.recent_video && !(1..=MAX_RECENT_DAYS).contains(&args.recent_days) {
            return Err(ConfigError::InvalidRecentDays(args.recent_days));
        }

        let source = match args.cache {
            Some(path) => Source::Cache(path),
            None => {
                let api_key = args
                    .api_key
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .ok_or(ConfigError::MissingApiKey)?;
                let channel = args
                    .channel_id
                    .unwrap_or_default()
                    .parse()
                    .map_err(ConfigError::InvalidChannel)?;
                Source::Api {
                    api_key,
                    channel,
                    retries: args.http_retries,
                    recent_days: args.recent_video.then_some(args.recent_days),
                }
            }
        };

        let output = if args.demo {
            if let Some(port) = &args.port {
                warn!("Ignoring serial port '{}' in demo mode", port);
            }
            Output::Console
        } else {
            Output::Serial { port: args.port }
        };

        Ok(Config {
            source,
            output,
            interval: Duration::from_secs(args.interval),
            width: args.width,
            dwell,
            numbers: args.numbers,
            title: args.title,
            intro: args.intro,
            save_cache: args.save_cache,
        })
    }
}

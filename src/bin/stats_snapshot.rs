//! Fetches channel statistics once and saves them as snapshot files, for
//! replaying later with `--cache` or the channel demo.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use splitflap_stats::{
    api::{ChannelRef, YouTubeClient},
    cache,
    util,
};

#[derive(Parser, Debug)]
#[command(name = "stats-snapshot", version, about = "Save YouTube channel statistics to disk")]
struct Args {
    /// Your Google API key
    api_key: String,

    /// Channels to save: channel IDs, user:<name> or @handle
    #[arg(required = true, num_args = 1..)]
    channels: Vec<String>,

    /// Directory the snapshots are written to
    #[arg(long, default_value = "youtube_info")]
    dir: PathBuf,

    /// Retries for transient HTTP failures
    #[arg(long, default_value_t = 0)]
    http_retries: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let http = match util::HttpClient::new(args.http_retries) {
        Ok(http) => http,
        Err(e) => {
            log::error!("Could not create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let client = YouTubeClient::new(http, &args.api_key);

    let mut failed = 0;
    for channel in &args.channels {
        let channel: ChannelRef = match channel.parse() {
            Ok(c) => c,
            Err(e) => {
                log::error!("Invalid channel '{}': {}", channel, e);
                failed += 1;
                continue;
            }
        };

        log::info!("Fetching channel data for {}", channel);
        let stats = match client.channel_stats(&channel).await {
            Ok(stats) => stats,
            Err(e) => {
                log::error!("Could not fetch {}: {}", channel, e);
                failed += 1;
                if e.is_invalid_key() {
                    break;
                }
                continue;
            }
        };

        match cache::save_snapshot(&args.dir, &stats) {
            Ok(path) => log::info!(
                "Saved '{}' ({} subscribers) to {}",
                stats.title,
                stats.subscriber_count,
                path.display()
            ),
            Err(e) => {
                log::error!("Could not save '{}': {}", stats.title, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        log::error!("{} of {} channels failed", failed, args.channels.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

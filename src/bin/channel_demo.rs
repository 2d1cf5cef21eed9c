//! Interactive demo: pick a saved channel from a list and show its
//! subscriber count on the display.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

use clap::Parser;
use splitflap_stats::{
    cache,
    config::{self, Output},
    display::{self, Printer},
    error::AppError,
    format::{Formatter, DEFAULT_CHARSET, DEFAULT_WIDTH},
    stats::ChannelStats,
};

const LEAD_IN: Duration = Duration::from_secs(3);
const HOLD: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "channel-demo", version, about = "Show saved channel statistics on request")]
struct Args {
    /// Directory holding snapshots saved by stats-snapshot
    #[arg(long, default_value = "youtube_info")]
    dir: PathBuf,

    /// Name or 1-based index of the serial port to use
    #[arg(short, long, env = "SPLITFLAP_PORT")]
    port: Option<String>,

    /// Run without a connected display, mirroring output to the console
    #[arg(long)]
    demo: bool,

    /// Number of flap modules (defaults to what the display reports)
    #[arg(short, long)]
    width: Option<usize>,

    /// Seconds each line stays on the display
    #[arg(long, default_value_t = 2.0)]
    dwell: f64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_channels(channels: &[ChannelStats]) {
    println!();
    println!("Saved channels:");
    for (i, stats) in channels.iter().enumerate() {
        println!("[{:2}] {}", i + 1, stats.title);
    }
}

/// Maps a 1-based menu entry to an index into a list of `len` channels.
fn parse_selection(input: &str, len: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Some(n - 1),
        _ => None,
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    let dwell = config::dwell_from_secs(args.dwell)?;

    let mut channels = cache::read_snapshots(&args.dir)?;
    if channels.is_empty() {
        return Err(AppError::Other(format!(
            "No saved channels found in {}",
            args.dir.display()
        )));
    }
    channels.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));

    let output = if args.demo {
        Output::Console
    } else {
        Output::Serial { port: args.port }
    };
    let charset: Vec<char> = DEFAULT_CHARSET.chars().collect();
    let display = display::connect(&output, &charset)?;

    let width = args
        .width
        .or_else(|| display.num_modules())
        .unwrap_or(DEFAULT_WIDTH);
    let formatter = Formatter::new(width).with_dwell(dwell);
    let mut printer = Printer::new(display);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print_channels(&channels);
        print!("Select a channel (Ctrl-D to quit): ");
        io::stdout().flush().map_err(|e| AppError::Other(e.to_string()))?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => return Err(AppError::Other(e.to_string())),
            None => break,
        };

        let Some(idx) = parse_selection(&line, channels.len()) else {
            println!("Not a valid selection, please try again");
            continue;
        };

        let stats = &channels[idx];
        log::info!(
            "Showing '{}' ({} subscribers)",
            stats.title,
            stats.subscriber_count
        );

        tokio::time::sleep(LEAD_IN).await;
        printer.print(&formatter.subscribers(stats)).await?;
        tokio::time::sleep(HOLD).await;
        printer.print(&[formatter.blank(Duration::ZERO)]).await?;
    }

    println!();
    printer.close()?;
    Ok(())
}

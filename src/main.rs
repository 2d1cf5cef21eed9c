use std::process::ExitCode;

use clap::Parser;
use splitflap_stats::{
    config::{Args, Config},
    display::{self, Printer},
    driver,
    error::AppError,
    format::{Formatter, DEFAULT_CHARSET, DEFAULT_WIDTH},
    poller::Poller,
    source,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_ports {
        return match driver::list_ports() {
            Ok(ports) if ports.is_empty() => {
                println!("No serial ports found");
                ExitCode::SUCCESS
            }
            Ok(ports) => {
                driver::print_ports(&ports);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    log::info!(
        "{} v{} - YouTube statistics on a split-flap display",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_args(args)?;
    let source = source::from_config(&config.source)?;

    let charset: Vec<char> = DEFAULT_CHARSET.chars().collect();
    let display = display::connect(&config.output, &charset)?;

    let width = config
        .width
        .or_else(|| display.num_modules())
        .unwrap_or(DEFAULT_WIDTH);
    log::info!("Formatting for {} modules", width);

    let formatter = Formatter::new(width)
        .with_numbers(config.numbers)
        .with_title_mode(config.title)
        .with_dwell(config.dwell);

    let mut poller = Poller::new(source, Printer::new(display), formatter, config.interval)
        .with_save_cache(config.save_cache.clone());

    if config.intro {
        poller.intro().await?;
    }

    poller
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    log::info!("Done");
    Ok(())
}

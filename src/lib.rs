//! # splitflap-stats
//!
//! Polls the YouTube Data API for a channel's subscriber, view and video
//! counts and shows them on a split-flap display connected over serial.
//!
//! ## Usage
//!
//! The [`poller`] module ties everything together: a [`source::StatsSource`]
//! produces [`stats::ChannelStats`], a [`format::Formatter`] turns them into
//! fixed-width frames, and a [`display::Printer`] sends those to the flaps.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use splitflap_stats::{
//!     api::{ChannelRef, YouTubeClient},
//!     display::{ConsoleDisplay, Printer},
//!     format::Formatter,
//!     poller::Poller,
//!     source::ApiSource,
//!     util,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // No retries inside a fetch; the next poll is the retry
//!     let http = util::HttpClient::new(0).unwrap();
//!     let client = YouTubeClient::new(http, "my-api-key");
//!     let channel: ChannelRef = "UCoMRklnEz2Lk21_AkwAGkog".parse().unwrap();
//!
//!     // Mirror to the terminal instead of a real display
//!     let printer = Printer::new(Box::new(ConsoleDisplay::stdout()));
//!
//!     Poller::new(
//!         Box::new(ApiSource::new(client, channel)),
//!         printer,
//!         Formatter::new(8),
//!         Duration::from_secs(120),
//!     )
//!     .run(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//!     .unwrap();
//! }
//! ```
//!
//! Snapshots written by the `stats-snapshot` tool (or `--save-cache`) can be
//! replayed with `--cache` so repeated runs show the same numbers.

#![forbid(unsafe_code)]
#[macro_use]
extern crate log;

pub mod api;
pub mod cache;
pub mod config;
pub mod display;
pub mod driver;
pub mod error;
pub mod format;
pub mod poller;
pub mod source;
pub mod stats;
pub mod util;

use std::{future::Future, path::PathBuf, time::Duration};

use chrono::Local;

use crate::{
    cache,
    display::Printer,
    driver::DriverError,
    format::Formatter,
    source::StatsSource,
    stats::{ChannelStats, VideoStats},
    util,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Fetch,
    /// Channel statistics, plus the latest upload when it is recent
    Display(ChannelStats, Option<VideoStats>),
    Wait,
}

#[derive(thiserror::Error, Debug)]
pub enum PollerError {
    #[error("Display error: {0}")]
    DriverError(#[from] DriverError),
}

/// Fetches statistics, shows them, waits, and does it again.
pub struct Poller {
    source: Box<dyn StatsSource>,
    printer: Printer,
    formatter: Formatter,
    interval: Duration,
    save_cache: Option<PathBuf>,
}

impl Poller {
    pub fn new(
        source: Box<dyn StatsSource>,
        printer: Printer,
        formatter: Formatter,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            printer,
            formatter,
            interval,
            save_cache: None,
        }
    }

    pub fn with_save_cache(mut self, path: Option<PathBuf>) -> Self {
        self.save_cache = path;
        self
    }

    pub fn printer(&self) -> &Printer {
        &self.printer
    }

    pub async fn intro(&mut self) -> Result<(), PollerError> {
        let frames = self.formatter.intro(env!("CARGO_PKG_VERSION"));
        self.printer.print(&frames).await?;
        Ok(())
    }

    /// Runs one state and returns the next. Fetch failures are logged and
    /// lead to `Wait`; only display failures are returned.
    pub async fn step(&mut self, state: State) -> Result<State, PollerError> {
        match state {
            State::Fetch => {
                info!(
                    "--- {} Fetching update for {}, next update in {} ---",
                    Local::now().format("%Y-%m-%d %H:%M:%S"),
                    self.source.describe(),
                    util::format_duration(self.interval)
                );

                match self.source.fetch().await {
                    Ok(stats) => {
                        info!(
                            "'{}': {} subscribers, {} views, {} videos",
                            stats.title, stats.subscriber_count, stats.view_count, stats.video_count
                        );
                        self.save(&stats);
                        let video = self.recent_video().await;
                        Ok(State::Display(stats, video))
                    }
                    Err(e) => {
                        error!("{}", e);
                        Ok(State::Wait)
                    }
                }
            }
            State::Display(stats, video) => {
                let mut frames = video
                    .map(|v| self.formatter.recent_video(&v))
                    .unwrap_or_default();
                frames.extend(self.formatter.channel(&stats));
                self.printer.print(&frames).await?;
                Ok(State::Wait)
            }
            State::Wait => {
                info!("\t(sleeping for {})", util::format_duration(self.interval));
                tokio::time::sleep(self.interval).await;
                Ok(State::Fetch)
            }
        }
    }

    /// A failed lookup only costs the announcement, not the cycle.
    async fn recent_video(&self) -> Option<VideoStats> {
        match self.source.recent_video().await {
            Ok(Some(video)) => {
                info!(
                    "New video '{}': {} views, {} likes, {} comments",
                    video.title,
                    video.view_count,
                    video.like_count.map_or("hidden".to_string(), |n| n.to_string()),
                    video.comment_count.map_or("hidden".to_string(), |n| n.to_string())
                );
                Some(video)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Could not check for a recent video: {}", e);
                None
            }
        }
    }

    fn save(&self, stats: &ChannelStats) {
        if let Some(path) = &self.save_cache {
            match cache::write(path, stats) {
                Ok(()) => debug!("Saved statistics to {}", path.display()),
                Err(e) => warn!("Could not save statistics to {}: {}", path.display(), e),
            }
        }
    }

    /// Drives the loop until `shutdown` resolves, then releases the display.
    pub async fn run<F>(mut self, shutdown: F) -> Result<(), PollerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut state = State::Fetch;

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Interrupted, shutting down");
                    break Ok(());
                }
                next = self.step(state) => match next {
                    Ok(next) => state = next,
                    Err(e) => break Err(e),
                },
            }
        };

        let closed = self.printer.close();
        result?;
        closed?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        api::FetchError,
        config::{Args, Config, Output},
        display::{self, Display},
        source::SourceError,
    };
    use clap::Parser;

    fn sample() -> ChannelStats {
        ChannelStats {
            channel_id: "UCexample".into(),
            title: "Example Channel".into(),
            subscriber_count: 12_345,
            view_count: 1_234_567,
            video_count: 42,
            fetched_at: Utc.with_ymd_and_hms(2021, 3, 14, 15, 9, 26).unwrap(),
        }
    }

    fn video() -> VideoStats {
        VideoStats {
            video_id: "dQw4w9WgXcQ".into(),
            title: "Build Log".into(),
            published_at: Utc.with_ymd_and_hms(2021, 3, 13, 18, 0, 0).unwrap(),
            view_count: 1234,
            like_count: Some(56),
            comment_count: None,
        }
    }

    struct FakeSource {
        stats: Option<ChannelStats>,
        video: Result<Option<VideoStats>, ()>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StatsSource for FakeSource {
        async fn fetch(&self) -> Result<ChannelStats, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.stats.clone().ok_or_else(|| {
                SourceError::Fetch(FetchError::Api {
                    status: 400,
                    reason: Some("badRequest".into()),
                    message: "API key not valid. Please pass a valid API key.".into(),
                })
            })
        }

        async fn recent_video(&self) -> Result<Option<VideoStats>, SourceError> {
            self.video
                .clone()
                .map_err(|_| SourceError::Fetch(FetchError::VideoNotFound("gone".into())))
        }

        fn describe(&self) -> String {
            "fake channel".into()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingDisplay {
        shown: Arc<Mutex<Vec<String>>>,
        closed: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Display for RecordingDisplay {
        fn num_modules(&self) -> Option<usize> {
            Some(10)
        }

        fn show(&mut self, text: &str) -> Result<(), DriverError> {
            if self.fail {
                return Err(DriverError::Disconnected);
            }
            self.shown.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn close(&mut self) -> Result<(), DriverError> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn poller(stats: Option<ChannelStats>, display: RecordingDisplay) -> (Poller, Arc<AtomicUsize>) {
        poller_with_video(stats, Ok(None), display)
    }

    fn poller_with_video(
        stats: Option<ChannelStats>,
        video: Result<Option<VideoStats>, ()>,
        display: RecordingDisplay,
    ) -> (Poller, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = FakeSource {
            stats,
            video,
            calls: calls.clone(),
        };
        let poller = Poller::new(
            Box::new(source),
            Printer::new(Box::new(display)),
            Formatter::new(10).with_dwell(Duration::ZERO),
            Duration::from_millis(1),
        );
        (poller, calls)
    }

    #[tokio::test]
    async fn full_cycle() {
        let display = RecordingDisplay::default();
        let (mut poller, calls) = poller(Some(sample()), display.clone());

        let state = poller.step(State::Fetch).await.unwrap();
        assert_eq!(state, State::Display(sample(), None));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let state = poller.step(state).await.unwrap();
        assert_eq!(state, State::Wait);
        let shown = display.shown.lock().unwrap().clone();
        assert_eq!(shown.first().map(String::as_str), Some("channel   "));
        assert_eq!(shown.last().map(String::as_str), Some("sub 12,345"));

        let state = poller.step(state).await.unwrap();
        assert_eq!(state, State::Fetch);
    }

    #[tokio::test]
    async fn fetch_error_waits() {
        let display = RecordingDisplay::default();
        let (mut poller, calls) = poller(None, display.clone());

        let state = poller.step(State::Fetch).await.expect("fetch errors are not fatal");
        assert_eq!(state, State::Wait);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(display.shown.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn driver_error_is_fatal() {
        let display = RecordingDisplay {
            fail: true,
            ..Default::default()
        };
        let (mut poller, _) = poller(Some(sample()), display);

        let err = poller.step(State::Display(sample(), None)).await.unwrap_err();
        assert!(matches!(err, PollerError::DriverError(DriverError::Disconnected)));
    }

    #[tokio::test]
    async fn run_until_shutdown() {
        let display = RecordingDisplay::default();
        let (poller, calls) = poller(None, display.clone());

        let counter = calls.clone();
        let shutdown = async move {
            while counter.load(Ordering::SeqCst) < 3 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        };

        poller.run(shutdown).await.expect("run should end cleanly");
        assert!(calls.load(Ordering::SeqCst) >= 3);
        assert_eq!(display.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn demo_cycle_without_serial() {
        let args = Args::try_parse_from(["splitflap-stats", "KEY", "UCabc", "--demo"]).unwrap();
        let config = Config::from_args(args).unwrap();
        assert_eq!(config.output, Output::Console);

        let console = display::connect(&config.output, Formatter::new(8).charset()).unwrap();
        assert_eq!(console.num_modules(), None);

        let calls = Arc::new(AtomicUsize::new(0));
        let mut poller = Poller::new(
            Box::new(FakeSource {
                stats: Some(sample()),
                video: Ok(None),
                calls: calls.clone(),
            }),
            Printer::new(console),
            Formatter::new(8).with_dwell(Duration::ZERO),
            Duration::from_millis(1),
        );

        let mut state = State::Fetch;
        let mut visited = Vec::new();
        for _ in 0..3 {
            state = poller.step(state).await.unwrap();
            visited.push(std::mem::discriminant(&state));
        }
        assert_eq!(
            visited,
            vec![
                std::mem::discriminant(&State::Display(sample(), None)),
                std::mem::discriminant(&State::Wait),
                std::mem::discriminant(&State::Fetch),
            ]
        );
        assert_eq!(poller.printer().last_line(), Some("  12,345"));
    }

    #[tokio::test]
    async fn recent_video_shown_first() {
        let display = RecordingDisplay::default();
        let (mut poller, _) = poller_with_video(Some(sample()), Ok(Some(video())), display.clone());

        let state = poller.step(State::Fetch).await.unwrap();
        assert_eq!(state, State::Display(sample(), Some(video())));

        poller.step(state).await.unwrap();
        let shown = display.shown.lock().unwrap().clone();
        assert_eq!(shown.first().map(String::as_str), Some(" new vid  "));
        assert!(shown.contains(&"likes   56".to_string()));
        assert_eq!(shown.last().map(String::as_str), Some("sub 12,345"));
    }

    #[tokio::test]
    async fn recent_video_error_keeps_stats() {
        let display = RecordingDisplay::default();
        let (mut poller, _) = poller_with_video(Some(sample()), Err(()), display);

        let state = poller.step(State::Fetch).await.expect("lookup errors are not fatal");
        assert_eq!(state, State::Display(sample(), None));
    }

    #[tokio::test]
    async fn saves_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest.txt");
        let (poller, _) = poller(Some(sample()), RecordingDisplay::default());
        let mut poller = poller.with_save_cache(Some(path.clone()));

        poller.step(State::Fetch).await.unwrap();
        assert_eq!(cache::read(&path).unwrap().title, "Example Channel");
    }
}

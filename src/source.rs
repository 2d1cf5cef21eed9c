use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    api::{ChannelRef, FetchError, YouTubeClient},
    cache::{self, CacheError},
    config::Source,
    stats::{ChannelStats, VideoStats},
    util,
};

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("Could not fetch channel statistics: {0}")]
    Fetch(#[from] FetchError),
    #[error("Could not read cached statistics: {0}")]
    Cache(#[from] CacheError),
}

/// Produces one [`ChannelStats`] per poll cycle.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch(&self) -> Result<ChannelStats, SourceError>;

    /// The channel's latest upload, when it is new enough to announce.
    async fn recent_video(&self) -> Result<Option<VideoStats>, SourceError> {
        Ok(None)
    }

    fn describe(&self) -> String;
}

pub struct ApiSource {
    client: YouTubeClient,
    channel: ChannelRef,
    recent_window: Option<chrono::Duration>,
}

impl ApiSource {
    pub fn new(client: YouTubeClient, channel: ChannelRef) -> Self {
        Self {
            client,
            channel,
            recent_window: None,
        }
    }

    /// Also look for uploads published within `window` of each fetch.
    pub fn with_recent_window(mut self, window: Option<chrono::Duration>) -> Self {
        self.recent_window = window;
        self
    }
}

#[async_trait]
impl StatsSource for ApiSource {
    async fn fetch(&self) -> Result<ChannelStats, SourceError> {
        Ok(self.client.channel_stats(&self.channel).await?)
    }

    async fn recent_video(&self) -> Result<Option<VideoStats>, SourceError> {
        match self.recent_window {
            Some(window) => Ok(self.client.recent_video(&self.channel, window).await?),
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        format!("YouTube channel {}", self.channel)
    }
}

/// Replays a snapshot file, re-reading it every cycle so edits show up.
pub struct CacheSource {
    path: PathBuf,
}

impl CacheSource {
    /// Fails if the snapshot is unusable right now, since there is nothing
    /// else to fall back on.
    pub fn open(path: PathBuf) -> Result<Self, CacheError> {
        let stats = cache::read(&path)?;
        info!(
            "Using cached statistics for '{}' from {}",
            stats.title,
            path.display()
        );
        Ok(Self { path })
    }
}

#[async_trait]
impl StatsSource for CacheSource {
    async fn fetch(&self) -> Result<ChannelStats, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CacheError::IoError {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(cache::parse(&text)?)
    }

    fn describe(&self) -> String {
        format!("snapshot {}", self.path.display())
    }
}

/// Builds the source the configuration asks for.
pub fn from_config(source: &Source) -> Result<Box<dyn StatsSource>, SourceError> {
    match source {
        Source::Api {
            api_key,
            channel,
            retries,
            recent_days,
        } => {
            let http = util::HttpClient::new(*retries).map_err(FetchError::ReqwestError)?;
            let client = YouTubeClient::new(http, api_key);
            let window = recent_days.map(|days| chrono::Duration::days(days.into()));
            Ok(Box::new(
                ApiSource::new(client, channel.clone()).with_recent_window(window),
            ))
        }
        Source::Cache(path) => Ok(Box::new(CacheSource::open(path.clone())?)),
    }
}

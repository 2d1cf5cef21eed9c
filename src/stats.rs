use chrono::{DateTime, Utc};

/// One snapshot of a channel's public statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStats {
    pub channel_id: String,
    pub title: String,
    pub subscriber_count: u64,
    pub view_count: u64,
    pub video_count: u64,
    pub fetched_at: DateTime<Utc>,
}

/// A channel's latest upload and its public counters. Likes and comments
/// are `None` when the uploader hides them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoStats {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StatsError {
    #[error("channel id is empty")]
    EmptyChannelId,
    #[error("channel id {0:?} contains a line break or path separator")]
    InvalidChannelId(String),
    #[error("channel title is empty")]
    EmptyTitle,
    #[error("channel title contains a line break")]
    MultilineTitle,
}

impl ChannelStats {
    /// Checks the invariants every stored or displayed snapshot must hold.
    pub fn validate(&self) -> Result<(), StatsError> {
        if self.channel_id.is_empty() {
            return Err(StatsError::EmptyChannelId);
        }
        // The id ends up both on a cache line and in a snapshot file name
        if self.channel_id.contains(['\n', '\r', '/', '\\']) {
            return Err(StatsError::InvalidChannelId(self.channel_id.clone()));
        }
        if self.title.is_empty() {
            return Err(StatsError::EmptyTitle);
        }
        if self.title.contains(['\n', '\r']) {
            return Err(StatsError::MultilineTitle);
        }
        Ok(())
    }
}

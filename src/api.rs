use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize};
use serde_aux::prelude::*;

use crate::{
    stats::{ChannelStats, VideoStats},
    util,
};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub id: String,
    pub snippet: Option<Snippet>,
    pub statistics: Option<Statistics>,
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: String,
    pub custom_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub subscriber_count: u64,
    #[serde(default)]
    pub hidden_subscriber_count: bool,
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub video_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub snippet: Option<PlaylistItemSnippet>,
    pub content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    pub video_id: String,
    pub video_published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub like_count: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub comment_count: Option<u64>,
}

/// The newest entry of a channel's uploads playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorDetail {
    pub reason: String,
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("reqwest middleware error: {0}")]
    ReqwestMiddlewareError(#[from] reqwest_middleware::Error),
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        reason: Option<String>,
        message: String,
    },
    #[error("Channel {0} not found - check your channel ID")]
    ChannelNotFound(ChannelRef),
    #[error("Video '{0}' not found")]
    VideoNotFound(String),
    #[error("Response is missing {0}")]
    MissingField(&'static str),
    #[error("Could not parse API response")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    pub fn reason(&self) -> Option<&str> {
        match self {
            FetchError::Api { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    pub fn is_invalid_key(&self) -> bool {
        match self {
            FetchError::Api {
                status: 400,
                reason,
                message,
            } => reason.as_deref() == Some("keyInvalid") || message.contains("API key not valid"),
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self.reason(),
            Some("quotaExceeded") | Some("rateLimitExceeded") | Some("userRateLimitExceeded")
        ) || matches!(self, FetchError::Api { status: 429, .. })
    }
}

/// How a channel is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    Id(String),
    Username(String),
    Handle(String),
}

impl ChannelRef {
    fn query(&self) -> (&'static str, &str) {
        match self {
            ChannelRef::Id(id) => ("id", id),
            ChannelRef::Username(name) => ("forUsername", name),
            ChannelRef::Handle(handle) => ("forHandle", handle),
        }
    }
}

impl FromStr for ChannelRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let channel = if let Some(name) = s.strip_prefix("user:") {
            ChannelRef::Username(name.to_string())
        } else if s.starts_with('@') {
            ChannelRef::Handle(s.to_string())
        } else {
            ChannelRef::Id(s.to_string())
        };

        match &channel {
            ChannelRef::Id(v) | ChannelRef::Username(v) if v.is_empty() => {
                Err("channel identifier is empty".to_string())
            }
            ChannelRef::Handle(v) if v.len() < 2 => Err("channel handle is empty".to_string()),
            _ => Ok(channel),
        }
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Id(id) => write!(f, "'{}'", id),
            ChannelRef::Username(name) => write!(f, "user '{}'", name),
            ChannelRef::Handle(handle) => write!(f, "'{}'", handle),
        }
    }
}

/// Read-only client for the YouTube Data API channel statistics lookup.
pub struct YouTubeClient {
    http: util::HttpClient,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(http: util::HttpClient, api_key: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let resp = self
            .http
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(FetchError::Parse)
    }

    pub async fn channel_list(
        &self,
        channel: &ChannelRef,
        part: &str,
    ) -> Result<ChannelListResponse, FetchError> {
        let (selector, value) = channel.query();
        self.get("channels", &[("part", part), (selector, value)]).await
    }

    /// Performs one request and returns the channel's current statistics.
    pub async fn channel_stats(&self, channel: &ChannelRef) -> Result<ChannelStats, FetchError> {
        let response = self.channel_list(channel, "snippet,statistics").await?;
        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::ChannelNotFound(channel.clone()))?;

        let title = item
            .snippet
            .map(|s| s.title)
            .filter(|t| !t.trim().is_empty())
            .ok_or(FetchError::MissingField("snippet.title"))?;
        let statistics = item
            .statistics
            .ok_or(FetchError::MissingField("statistics"))?;

        if statistics.hidden_subscriber_count {
            warn!("Channel '{}' hides its subscriber count", title);
        }

        Ok(ChannelStats {
            channel_id: item.id,
            // Line breaks cannot be shown on the flaps or stored in the cache
            title: title.replace(['\r', '\n'], " "),
            subscriber_count: statistics.subscriber_count,
            view_count: statistics.view_count,
            video_count: statistics.video_count,
            fetched_at: Utc::now(),
        })
    }

    /// ID of the playlist holding the channel's uploads.
    pub async fn uploads_playlist(&self, channel: &ChannelRef) -> Result<String, FetchError> {
        let response = self.channel_list(channel, "contentDetails").await?;
        response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::ChannelNotFound(channel.clone()))?
            .content_details
            .and_then(|d| d.related_playlists.uploads)
            .filter(|p| !p.is_empty())
            .ok_or(FetchError::MissingField(
                "contentDetails.relatedPlaylists.uploads",
            ))
    }

    /// Newest upload in `playlist_id`, or `None` for an empty playlist.
    pub async fn latest_upload(&self, playlist_id: &str) -> Result<Option<Upload>, FetchError> {
        let response: PlaylistItemListResponse = self
            .get(
                "playlistItems",
                &[
                    ("part", "snippet,contentDetails"),
                    ("maxResults", "1"),
                    ("playlistId", playlist_id),
                ],
            )
            .await?;

        let item = match response.items.into_iter().next() {
            Some(item) => item,
            None => return Ok(None),
        };
        let details = item
            .content_details
            .ok_or(FetchError::MissingField("contentDetails"))?;
        let published_at = details
            .video_published_at
            .ok_or(FetchError::MissingField("contentDetails.videoPublishedAt"))?;
        let title = item
            .snippet
            .map(|s| s.title)
            .ok_or(FetchError::MissingField("snippet.title"))?;

        Ok(Some(Upload {
            video_id: details.video_id,
            title: title.replace(['\r', '\n'], " "),
            published_at,
        }))
    }

    pub async fn video_stats(&self, upload: Upload) -> Result<VideoStats, FetchError> {
        let response: VideoListResponse = self
            .get(
                "videos",
                &[("part", "statistics"), ("id", upload.video_id.as_str())],
            )
            .await?;

        let statistics = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::VideoNotFound(upload.video_id.clone()))?
            .statistics
            .ok_or(FetchError::MissingField("statistics"))?;

        Ok(VideoStats {
            video_id: upload.video_id,
            title: upload.title,
            published_at: upload.published_at,
            view_count: statistics.view_count,
            like_count: statistics.like_count,
            comment_count: statistics.comment_count,
        })
    }

    /// Statistics for the channel's latest upload if it was published within
    /// `window`. Costs three requests when it is, two when it is not.
    pub async fn recent_video(
        &self,
        channel: &ChannelRef,
        window: Duration,
    ) -> Result<Option<VideoStats>, FetchError> {
        let playlist = self.uploads_playlist(channel).await?;
        let upload = match self.latest_upload(&playlist).await? {
            Some(upload) => upload,
            None => {
                info!("Channel {} has no uploads", channel);
                return Ok(None);
            }
        };

        let cutoff = Utc::now().checked_sub_signed(window);
        if cutoff.map_or(false, |cutoff| upload.published_at <= cutoff) {
            info!(
                "Latest video, '{}', is not recent (published {})",
                upload.title,
                upload.published_at.format("%Y-%m-%d %H:%M:%S")
            );
            return Ok(None);
        }

        self.video_stats(upload).await.map(Some)
    }
}

fn api_error(status: u16, body: &str) -> FetchError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(resp) => FetchError::Api {
            status,
            reason: resp.error.errors.into_iter().next().map(|e| e.reason),
            message: resp.error.message,
        },
        Err(_) => FetchError::Api {
            status,
            reason: None,
            message: body.chars().take(200).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::SecondsFormat;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn get_test_file(fname: &str) -> String {
        let mut d = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push("resources/test/");
        d.push(fname);
        std::fs::read_to_string(d).expect(format!("Could not read {}", fname).as_str())
    }

    fn client(server: &MockServer) -> YouTubeClient {
        let http = util::HttpClient::new(0).expect("Could not create HttpClient");
        YouTubeClient::new(http, "test-key").with_base_url(&server.uri())
    }

    #[test]
    fn parse_channel_list() {
        let body = get_test_file("channels_response.json");
        let resp: ChannelListResponse = serde_json::from_str(&body).expect("Could not parse");
        let item = &resp.items[0];

        assert_eq!(item.id, "UCoMRklnEz2Lk21_AkwAGkog");
        assert_eq!(item.snippet.as_ref().unwrap().title, "Dave Madison");
        let stats = item.statistics.as_ref().unwrap();
        assert_eq!(stats.subscriber_count, 12_345);
        assert_eq!(stats.view_count, 1_234_567);
        assert_eq!(stats.video_count, 42);
    }

    #[test]
    fn channel_ref() {
        assert_eq!(
            "UCabc".parse::<ChannelRef>(),
            Ok(ChannelRef::Id("UCabc".into()))
        );
        assert_eq!(
            "user:colinfurze".parse::<ChannelRef>(),
            Ok(ChannelRef::Username("colinfurze".into()))
        );
        assert_eq!(
            "@scottbez1".parse::<ChannelRef>(),
            Ok(ChannelRef::Handle("@scottbez1".into()))
        );
        assert!("".parse::<ChannelRef>().is_err());
        assert!("user:".parse::<ChannelRef>().is_err());
        assert!("@".parse::<ChannelRef>().is_err());
    }

    #[tokio::test]
    async fn fetch_stats() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("id", "UCoMRklnEz2Lk21_AkwAGkog"))
            .and(query_param("key", "test-key"))
            .and(query_param("part", "snippet,statistics"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(get_test_file("channels_response.json")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let stats = client(&server)
            .channel_stats(&ChannelRef::Id("UCoMRklnEz2Lk21_AkwAGkog".into()))
            .await
            .expect("fetch should succeed");

        assert_eq!(stats.title, "Dave Madison");
        assert_eq!(stats.subscriber_count, 12_345);
        assert_eq!(stats.view_count, 1_234_567);
        assert_eq!(stats.video_count, 42);
    }

    #[tokio::test]
    async fn fetch_by_username() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("forUsername", "colinfurze"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(get_test_file("channels_response.json")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let stats = client(&server)
            .channel_stats(&ChannelRef::Username("colinfurze".into()))
            .await
            .expect("fetch should succeed");
        assert_eq!(stats.channel_id, "UCoMRklnEz2Lk21_AkwAGkog");
    }

    #[tokio::test]
    async fn invalid_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "errors": [{
                        "message": "API key not valid. Please pass a valid API key.",
                        "domain": "global",
                        "reason": "badRequest"
                    }]
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .channel_stats(&ChannelRef::Id("UCabc".into()))
            .await
            .expect_err("fetch should fail");

        assert!(err.is_invalid_key(), "unexpected error: {:?}", err);
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn quota_exceeded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {
                    "code": 403,
                    "message": "The request cannot be completed because you have exceeded your quota.",
                    "errors": [{ "reason": "quotaExceeded" }]
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .channel_stats(&ChannelRef::Id("UCabc".into()))
            .await
            .expect_err("fetch should fail");
        assert!(err.is_rate_limited());
        assert!(!err.is_invalid_key());
    }

    #[tokio::test]
    async fn unknown_channel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "youtube#channelListResponse",
                "pageInfo": { "totalResults": 0, "resultsPerPage": 5 }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .channel_stats(&ChannelRef::Id("UCnope".into()))
            .await
            .expect_err("fetch should fail");
        assert!(matches!(err, FetchError::ChannelNotFound(_)));
    }

    #[tokio::test]
    async fn missing_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "UCabc",
                    "snippet": { "title": "" },
                    "statistics": { "viewCount": "1", "subscriberCount": "2", "videoCount": "3" }
                }]
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .channel_stats(&ChannelRef::Id("UCabc".into()))
            .await
            .expect_err("fetch should fail");
        assert!(matches!(err, FetchError::MissingField("snippet.title")));
    }

    #[tokio::test]
    async fn hidden_subscribers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "UCabc",
                    "snippet": { "title": "Quiet" },
                    "statistics": { "viewCount": "10", "hiddenSubscriberCount": true, "videoCount": "3" }
                }]
            })))
            .mount(&server)
            .await;

        let stats = client(&server)
            .channel_stats(&ChannelRef::Id("UCabc".into()))
            .await
            .expect("fetch should succeed");
        assert_eq!(stats.subscriber_count, 0);
        assert_eq!(stats.view_count, 10);
    }

    async fn mount_uploads(server: &MockServer, published_at: DateTime<Utc>) {
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("part", "contentDetails"))
            .and(query_param("id", "UCabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "UCabc",
                    "contentDetails": { "relatedPlaylists": { "likes": "", "uploads": "UUabc" } }
                }]
            })))
            .expect(1)
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .and(query_param("playlistId", "UUabc"))
            .and(query_param("maxResults", "1"))
            .and(query_param("part", "snippet,contentDetails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "snippet": { "title": "Building a\nSplit-Flap Display" },
                    "contentDetails": {
                        "videoId": "dQw4w9WgXcQ",
                        "videoPublishedAt": published_at.to_rfc3339_opts(SecondsFormat::Secs, true)
                    }
                }]
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn recent_video() {
        let server = MockServer::start().await;
        let published_at = Utc::now() - Duration::hours(5);
        mount_uploads(&server, published_at).await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", "dQw4w9WgXcQ"))
            .and(query_param("part", "statistics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "dQw4w9WgXcQ",
                    "statistics": { "viewCount": "1234", "likeCount": "56", "favoriteCount": "0" }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let video = client(&server)
            .recent_video(&ChannelRef::Id("UCabc".into()), Duration::days(3))
            .await
            .expect("lookup should succeed")
            .expect("video should be recent");

        assert_eq!(video.video_id, "dQw4w9WgXcQ");
        assert_eq!(video.title, "Building a Split-Flap Display");
        assert_eq!(video.published_at.timestamp(), published_at.timestamp());
        assert_eq!(video.view_count, 1234);
        assert_eq!(video.like_count, Some(56));
        // Comments turned off
        assert_eq!(video.comment_count, None);
    }

    #[tokio::test]
    async fn old_video_is_not_fetched() {
        let server = MockServer::start().await;
        mount_uploads(&server, Utc::now() - Duration::days(4)).await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let video = client(&server)
            .recent_video(&ChannelRef::Id("UCabc".into()), Duration::days(3))
            .await
            .expect("lookup should succeed");
        assert_eq!(video, None);
    }

    #[tokio::test]
    async fn channel_without_uploads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "UCabc",
                    "contentDetails": { "relatedPlaylists": { "uploads": "UUabc" } }
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "youtube#playlistItemListResponse",
                "items": []
            })))
            .mount(&server)
            .await;

        let video = client(&server)
            .recent_video(&ChannelRef::Id("UCabc".into()), Duration::days(3))
            .await
            .expect("lookup should succeed");
        assert_eq!(video, None);
    }

    #[tokio::test]
    async fn missing_uploads_playlist() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "UCabc" }]
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .recent_video(&ChannelRef::Id("UCabc".into()), Duration::days(3))
            .await
            .expect_err("lookup should fail");
        assert!(matches!(
            err,
            FetchError::MissingField("contentDetails.relatedPlaylists.uploads")
        ));
    }

    #[tokio::test]
    async fn deleted_video() {
        let server = MockServer::start().await;
        mount_uploads(&server, Utc::now()).await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let err = client(&server)
            .recent_video(&ChannelRef::Id("UCabc".into()), Duration::days(3))
            .await
            .expect_err("lookup should fail");
        assert!(matches!(err, FetchError::VideoNotFound(id) if id == "dQw4w9WgXcQ"));
    }
}

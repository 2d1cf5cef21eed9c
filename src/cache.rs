//! Flat `key=value` snapshots of [`ChannelStats`].
//!
//! A snapshot file looks like this:
//!
//! ```text
//! channelId=UCoMRklnEz2Lk21_AkwAGkog
//! title=Dave Madison
//! subscriberCount=12345
//! viewCount=1234567
//! videoCount=42
//! fetchedAt=2021-03-14T15:09:26.535897Z
//! ```
//!
//! Reading is strict: every field must be present exactly once and nothing
//! else may appear apart from blank lines and `#` comments.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::stats::{ChannelStats, StatsError};

const KEY_CHANNEL_ID: &str = "channelId";
const KEY_TITLE: &str = "title";
const KEY_SUBSCRIBERS: &str = "subscriberCount";
const KEY_VIEWS: &str = "viewCount";
const KEY_VIDEOS: &str = "videoCount";
const KEY_FETCHED_AT: &str = "fetchedAt";

const KEYS: [&str; 6] = [
    KEY_CHANNEL_ID,
    KEY_TITLE,
    KEY_SUBSCRIBERS,
    KEY_VIEWS,
    KEY_VIDEOS,
    KEY_FETCHED_AT,
];

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("I/O error on {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected key=value")]
    MalformedLine { line: usize },
    #[error("line {line}: unknown key '{key}'")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: duplicate key '{key}'")]
    DuplicateKey { line: usize, key: String },
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("invalid value for '{key}': {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid snapshot: {0}")]
    InvalidStats(#[from] StatsError),
}

impl CacheError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        CacheError::IoError {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub fn render(stats: &ChannelStats) -> Result<String, CacheError> {
    stats.validate()?;

    Ok(format!(
        "{}={}\n{}={}\n{}={}\n{}={}\n{}={}\n{}={}\n",
        KEY_CHANNEL_ID,
        stats.channel_id,
        KEY_TITLE,
        stats.title,
        KEY_SUBSCRIBERS,
        stats.subscriber_count,
        KEY_VIEWS,
        stats.view_count,
        KEY_VIDEOS,
        stats.video_count,
        KEY_FETCHED_AT,
        stats.fetched_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    ))
}

pub fn parse(text: &str) -> Result<ChannelStats, CacheError> {
    let mut fields: HashMap<&'static str, &str> = HashMap::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() || raw.trim_start().starts_with('#') {
            continue;
        }

        let (key, value) = raw
            .split_once('=')
            .ok_or(CacheError::MalformedLine { line })?;
        let key = key.trim();
        let known = KEYS
            .iter()
            .copied()
            .find(|k| *k == key)
            .ok_or_else(|| CacheError::UnknownKey {
                line,
                key: key.to_string(),
            })?;

        if fields.insert(known, value).is_some() {
            return Err(CacheError::DuplicateKey {
                line,
                key: key.to_string(),
            });
        }
    }

    let field = |key: &'static str| fields.get(key).copied().ok_or(CacheError::MissingField(key));
    let count = |key: &'static str| -> Result<u64, CacheError> {
        let value = field(key)?;
        value.trim().parse().map_err(|_| CacheError::InvalidValue {
            key,
            value: value.to_string(),
        })
    };

    let fetched_at = field(KEY_FETCHED_AT)?;
    let stats = ChannelStats {
        channel_id: field(KEY_CHANNEL_ID)?.to_string(),
        title: field(KEY_TITLE)?.to_string(),
        subscriber_count: count(KEY_SUBSCRIBERS)?,
        view_count: count(KEY_VIEWS)?,
        video_count: count(KEY_VIDEOS)?,
        fetched_at: DateTime::parse_from_rfc3339(fetched_at.trim())
            .map_err(|_| CacheError::InvalidValue {
                key: KEY_FETCHED_AT,
                value: fetched_at.to_string(),
            })?
            .with_timezone(&Utc),
    };
    stats.validate()?;

    Ok(stats)
}

pub fn read(path: &Path) -> Result<ChannelStats, CacheError> {
    let text = std::fs::read_to_string(path).map_err(|e| CacheError::io(path, e))?;
    parse(&text)
}

/// Writes through a temporary file so a reader never sees a partial snapshot.
pub fn write(path: &Path, stats: &ChannelStats) -> Result<(), CacheError> {
    let text = render(stats)?;

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    std::fs::write(&temp_path, text).map_err(|e| CacheError::io(&temp_path, e))?;
    std::fs::rename(&temp_path, path).map_err(|e| CacheError::io(path, e))
}

pub fn snapshot_path(dir: &Path, stats: &ChannelStats) -> PathBuf {
    dir.join(format!(
        "{}_{}_channel.txt",
        stats.fetched_at.format("%Y-%m-%d"),
        stats.channel_id
    ))
}

pub fn save_snapshot(dir: &Path, stats: &ChannelStats) -> Result<PathBuf, CacheError> {
    stats.validate()?;
    std::fs::create_dir_all(dir).map_err(|e| CacheError::io(dir, e))?;
    let path = snapshot_path(dir, stats);
    write(&path, stats)?;
    Ok(path)
}

/// Loads every snapshot in `dir`. Files that do not parse are skipped.
pub fn read_snapshots(dir: &Path) -> Result<Vec<ChannelStats>, CacheError> {
    let entries = std::fs::read_dir(dir).map_err(|e| CacheError::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CacheError::io(dir, e))?.path();
        if path.is_file() && path.extension().map_or(true, |ext| ext != "tmp") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut snapshots = Vec::new();
    for path in paths {
        match read(&path) {
            Ok(stats) => {
                debug!("Read channel data from {}", path.display());
                snapshots.push(stats);
            }
            Err(e) => warn!("Could not read channel data from {}: {}", path.display(), e),
        }
    }

    Ok(snapshots)
}

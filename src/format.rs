//! Turns channel statistics into fixed-width frames for the flaps.
//!
//! Everything here is pure. A [`Frame`] is always exactly as wide as the
//! display, already filtered down to characters the flaps can show.

use std::{sync::OnceLock, time::Duration};

use clap::ValueEnum;
use regex::Regex;

use crate::stats::{ChannelStats, VideoStats};

/// Flap set of the stock 40-flap modules.
pub const DEFAULT_CHARSET: &str = " abcdefghijklmnopqrstuvwxyz0123456789.,'";
/// Width used when no display reports its size.
pub const DEFAULT_WIDTH: usize = 8;

const SCI_PREFIX: &str = "e";
const WORD_BREAKS: &str = r"[ ,.\-_]+";

const SUBSCRIBER_PREFIXES: [&str; 3] = ["Subscribers", "Subs", "Sub"];
const VIEW_PREFIXES: [&str; 1] = ["Views"];
const VIDEO_PREFIXES: [&str; 2] = ["Videos", "Vids"];
const LIKE_PREFIXES: [&str; 1] = ["Likes"];
const COMMENT_PREFIXES: [&str; 2] = ["Comments", "Comms"];

/// Label flash before a combined label + value frame.
const PREFIX_DWELL: Duration = Duration::from_millis(750);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NumberStyle {
    /// Thousands separated by commas when they fit, e.g. 12,345
    Grouped,
    /// Bare digits, e.g. 12345
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TitleMode {
    /// Show the whole title over as many frames as it needs
    Chunk,
    /// Cut the title down to a single frame
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    fn invert(self) -> Self {
        match self {
            Align::Left => Align::Right,
            Align::Right => Align::Left,
            Align::Center => Align::Center,
        }
    }
}

/// One line of text for the display and how long to leave it up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub text: String,
    pub dwell: Duration,
}

#[derive(Debug, Clone)]
pub struct Formatter {
    width: usize,
    charset: Vec<char>,
    replacement: char,
    numbers: NumberStyle,
    title_mode: TitleMode,
    dwell: Duration,
}

impl Formatter {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            charset: DEFAULT_CHARSET.chars().collect(),
            replacement: ' ',
            numbers: NumberStyle::Grouped,
            title_mode: TitleMode::Chunk,
            dwell: Duration::from_secs(2),
        }
    }

    pub fn with_charset(mut self, charset: &str) -> Self {
        self.charset = charset.chars().collect();
        self.replacement = if self.charset.contains(&'?') { '?' } else { ' ' };
        self
    }

    pub fn with_numbers(mut self, numbers: NumberStyle) -> Self {
        self.numbers = numbers;
        self
    }

    pub fn with_title_mode(mut self, title_mode: TitleMode) -> Self {
        self.title_mode = title_mode;
        self
    }

    pub fn with_dwell(mut self, dwell: Duration) -> Self {
        self.dwell = dwell;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn charset(&self) -> &[char] {
        &self.charset
    }

    /// Renders a count so that it fits on the display.
    pub fn number(&self, n: u64) -> String {
        let digits = n.to_string();

        if self.numbers == NumberStyle::Grouped {
            let grouped = group_thousands(n);
            if grouped.len() <= self.width {
                return grouped;
            }
        }
        if digits.len() <= self.width {
            return digits;
        }

        scientific(&digits, self.width)
    }

    /// Swaps characters the flaps do not have for ones they do.
    pub fn filter(&self, text: &str) -> String {
        text.chars()
            .map(|c| {
                if self.charset.contains(&c) {
                    return c;
                }
                let mut swapped: Vec<char> = if c.is_uppercase() {
                    c.to_lowercase().collect()
                } else {
                    c.to_uppercase().collect()
                };
                match swapped.pop() {
                    Some(alt) if swapped.is_empty() && self.charset.contains(&alt) => alt,
                    _ => self.replacement,
                }
            })
            .collect()
    }

    /// Pads (or cuts) text to exactly the display width.
    pub fn align(&self, text: &str, align: Align) -> String {
        let text: String = text.chars().take(self.width).collect();
        let pad = self.width - text.chars().count();

        let (left, right) = match align {
            Align::Left => (0, pad),
            Align::Right => (pad, 0),
            Align::Center => (pad / 2, pad - pad / 2),
        };

        format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
    }

    pub fn frame(&self, text: &str, align: Align, dwell: Duration) -> Frame {
        Frame {
            text: self.align(&self.filter(text), align),
            dwell,
        }
    }

    pub fn blank(&self, dwell: Duration) -> Frame {
        self.frame("", Align::Left, dwell)
    }

    /// Text split over as many frames as needed.
    pub fn text(&self, text: &str, align: Align, dwell: Duration) -> Vec<Frame> {
        chunk(text, self.width)
            .iter()
            .map(|c| self.frame(c, align, dwell))
            .collect()
    }

    /// Picks the longest prefix that fits next to `value`, then the longest
    /// that fits on its own, then the shortest.
    pub fn stat_prefix<'a>(&self, prefixes: &[&'a str], value: &str) -> Option<&'a str> {
        let mut sorted = prefixes.to_vec();
        sorted.sort_by_key(|p| std::cmp::Reverse(p.chars().count()));

        let value_len = value.chars().count();
        sorted
            .iter()
            .find(|p| p.chars().count() + 1 + value_len <= self.width)
            .or_else(|| sorted.iter().find(|p| p.chars().count() <= self.width))
            .or_else(|| sorted.last())
            .copied()
    }

    /// A labelled statistic. The label is flashed first, then shown alongside
    /// the value when both fit, otherwise the value follows on its own.
    pub fn stat(&self, prefixes: &[&str], value: u64, align: Align) -> Vec<Frame> {
        let value = self.number(value);
        let prefix = match self.stat_prefix(prefixes, &value) {
            Some(p) if !p.is_empty() => p,
            _ => return vec![self.frame(&value, align, self.dwell)],
        };

        let value_len = value.chars().count();
        let prefix_len = prefix.chars().count();

        if prefix_len + 1 + value_len <= self.width {
            let fill = self.width - value_len;
            let combined = match align {
                Align::Left => format!("{}{:>fill$}", value, prefix, fill = fill),
                Align::Right => format!("{:<fill$}{}", prefix, value, fill = fill),
                Align::Center => format!("{} {}", value, prefix),
            };

            vec![
                self.frame(prefix, align.invert(), PREFIX_DWELL),
                self.frame(&combined, align, self.dwell),
            ]
        } else {
            let mut frames = self.text(prefix, align.invert(), self.dwell);
            frames.push(self.frame(&value, align, self.dwell));
            frames
        }
    }

    pub fn title(&self, title: &str) -> Vec<Frame> {
        match self.title_mode {
            TitleMode::Chunk => self.text(title, Align::Left, self.dwell),
            TitleMode::Truncate => vec![self.frame(title, Align::Left, self.dwell)],
        }
    }

    /// Everything shown for one poll cycle.
    pub fn channel(&self, stats: &ChannelStats) -> Vec<Frame> {
        let mut frames = self.text("Channel", Align::Left, self.dwell);
        frames.extend(self.title(&stats.title));
        frames.extend(self.stat(&VIEW_PREFIXES, stats.view_count, Align::Right));
        frames.extend(self.stat(&VIDEO_PREFIXES, stats.video_count, Align::Right));
        frames.extend(self.stat(
            &SUBSCRIBER_PREFIXES,
            stats.subscriber_count,
            Align::Right,
        ));
        frames
    }

    /// Subscriber count preceded by the channel title, for the channel demo.
    pub fn subscribers(&self, stats: &ChannelStats) -> Vec<Frame> {
        let mut frames = self.title(&stats.title);
        frames.push(self.blank(PREFIX_DWELL));
        frames.extend(self.stat(
            &SUBSCRIBER_PREFIXES,
            stats.subscriber_count,
            Align::Right,
        ));
        frames
    }

    /// Announcement for a fresh upload, followed by whichever of its counters
    /// are public.
    pub fn recent_video(&self, video: &VideoStats) -> Vec<Frame> {
        let mut frames = self.text("New Vid!", Align::Center, self.dwell);
        frames.extend(self.title(&video.title));
        frames.push(self.blank(PREFIX_DWELL));
        frames.extend(self.stat(&VIEW_PREFIXES, video.view_count, Align::Right));
        if let Some(likes) = video.like_count {
            frames.extend(self.stat(&LIKE_PREFIXES, likes, Align::Right));
        }
        if let Some(comments) = video.comment_count {
            frames.extend(self.stat(&COMMENT_PREFIXES, comments, Align::Right));
        }
        frames
    }

    pub fn intro(&self, version: &str) -> Vec<Frame> {
        let mut frames = self.text("YouTube Stats", Align::Center, self.dwell);
        frames.extend(self.text(&format!("v{}", version), Align::Right, self.dwell));
        frames.push(self.blank(self.dwell));
        frames
    }
}

pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Shortens a digit string to `width` as `<mantissa>e<exponent>`. Displays too
/// narrow for that get the leading digits.
pub fn scientific(digits: &str, width: usize) -> String {
    let places = digits.len();
    if places <= width {
        return digits.to_string();
    }

    let mut exp_len = 1;
    while SCI_PREFIX.len() + exp_len < width {
        let kept = width - SCI_PREFIX.len() - exp_len;
        let exp = places - kept;
        if exp.to_string().len() == exp_len {
            return format!("{}{}{}", &digits[..kept], SCI_PREFIX, exp);
        }
        exp_len += 1;
    }

    digits[..width].to_string()
}

/// Splits text into pieces no longer than `size`, breaking between words where
/// possible.
pub fn chunk(text: &str, size: usize) -> Vec<String> {
    if size == 0 || text.chars().count() <= size {
        return vec![text.to_string()];
    }

    static BREAKS: OnceLock<Regex> = OnceLock::new();
    let breaks = BREAKS.get_or_init(|| Regex::new(WORD_BREAKS).expect("word break pattern is valid"));

    let mut words = Vec::new();
    for word in breaks.split(text).filter(|w| !w.is_empty()) {
        let chars: Vec<char> = word.chars().collect();
        words.extend(chars.chunks(size).map(|c| c.iter().collect::<String>()));
    }

    let mut chunks: Vec<String> = Vec::new();
    for word in words {
        match chunks.last_mut() {
            Some(last) if last.chars().count() + 1 + word.chars().count() <= size => {
                last.push(' ');
                last.push_str(&word);
            }
            _ => chunks.push(word),
        }
    }
    chunks
}

//! Raw item shapes as delivered by the collector.
//!
//! Field names follow what the platform scrapers emit, with aliases for the
//! variants seen in the wild. Every field is optional; the normalizer decides
//! what is usable.

use chrono::{DateTime, NaiveDateTime, Utc};
use leadscan_core::Platform;
use serde::{Deserialize, Deserializer, Serialize};

/// One raw post or comment, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlatformItem {
    InstagramPost(InstagramPost),
    InstagramComment(InstagramComment),
    FacebookPost(FacebookPost),
    YoutubeComment(YoutubeComment),
}

impl PlatformItem {
    #[must_use]
    pub fn platform(&self) -> Platform {
        match self {
            PlatformItem::InstagramPost(_) | PlatformItem::InstagramComment(_) => {
                Platform::Instagram
            }
            PlatformItem::FacebookPost(_) => Platform::Facebook,
            PlatformItem::YoutubeComment(_) => Platform::YouTube,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstagramPost {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub shortcode: Option<String>,
    pub caption: Option<String>,
    #[serde(alias = "owner_username")]
    pub username: Option<String>,
    pub profile_url: Option<String>,
    pub url: Option<String>,
    pub hashtag: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub likes: u64,
    #[serde(alias = "comments", deserialize_with = "lenient_count")]
    pub comments_count: u64,
    pub is_video: bool,
    #[serde(deserialize_with = "lenient_count")]
    pub video_view_count: u64,
    pub timestamp: Option<RawTimestamp>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstagramComment {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub text: Option<String>,
    #[serde(alias = "owner_username")]
    pub username: Option<String>,
    pub profile_url: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub likes: u64,
    pub post_url: Option<String>,
    pub post_caption: Option<String>,
    pub hashtag: Option<String>,
    pub timestamp: Option<RawTimestamp>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacebookPost {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(alias = "message")]
    pub text: Option<String>,
    #[serde(alias = "author")]
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    pub post_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub post_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub group_id: Option<String>,
    pub group_name: Option<String>,
    #[serde(alias = "likes", deserialize_with = "lenient_count")]
    pub likes_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub comments_count: u64,
    pub timestamp: Option<RawTimestamp>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeComment {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(alias = "cid")]
    pub comment_id: Option<String>,
    #[serde(alias = "content")]
    pub text: Option<String>,
    pub author: Option<String>,
    pub author_url: Option<String>,
    pub video_id: Option<String>,
    pub video_url: Option<String>,
    #[serde(alias = "votes", deserialize_with = "lenient_count")]
    pub likes: u64,
    #[serde(alias = "reply_count", deserialize_with = "lenient_count")]
    pub replies: u64,
    pub time_text: Option<String>,
    pub timestamp: Option<RawTimestamp>,
    pub date: Option<String>,
}

/// A timestamp that arrives either as epoch seconds or as a date string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Epoch(f64),
    Text(String),
}

impl RawTimestamp {
    /// Interpret the value as UTC. Naive date strings are taken as UTC.
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Epoch(secs) => {
                if !secs.is_finite() {
                    return None;
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let whole = secs.trunc() as i64;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let nanos = (secs.fract().abs() * 1e9) as u32;
                DateTime::from_timestamp(whole, nanos)
            }
            RawTimestamp::Text(s) => parse_date_text(s),
        }
    }
}

/// Parse RFC 3339 or the naive `YYYY-MM-DD[T ]HH:MM:SS[.f]` forms.
#[must_use]
pub fn parse_date_text(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Counts arrive as numbers, numeric strings, or display strings like
/// `"1.2K"`; anything unreadable becomes zero.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(float_count))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => parse_count_text(&s),
        _ => 0,
    })
}

fn parse_count_text(raw: &str) -> u64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let (digits, multiplier) = match cleaned.chars().last() {
        Some('K' | 'k') => (&cleaned[..cleaned.len() - 1], 1_000.0),
        Some('M' | 'm') => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    digits
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map_or(0, |f| float_count(f * multiplier))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_count(f: f64) -> u64 {
    f.round() as u64
}

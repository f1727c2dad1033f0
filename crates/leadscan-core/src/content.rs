use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Social platform a piece of content came from.
///
/// Declaration order is the per-tick processing order, so an ordered map
/// keyed by `Platform` iterates in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
    #[serde(rename = "youtube")]
    YouTube,
    Unknown,
}

impl Platform {
    /// Platforms visited by a scan tick, in order.
    pub const SCAN_ORDER: [Platform; 3] = [Platform::Instagram, Platform::Facebook, Platform::YouTube];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::YouTube => "youtube",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "facebook" => Ok(Platform::Facebook),
            "youtube" => Ok(Platform::YouTube),
            "unknown" => Ok(Platform::Unknown),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub comments: u64,
    pub replies: u64,
    pub views: u64,
}

/// Uniform view of one post or comment, produced by the content normalizer.
///
/// Every optional field defaults to `None`; nothing downstream looks at the
/// raw platform payload again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContentItem {
    pub text: String,
    pub platform: Option<Platform>,
    /// Hashtag, group or video the item was collected for.
    pub source_id: Option<String>,
    pub author: Option<String>,
    pub author_url: Option<String>,
    pub url: Option<String>,
    pub shortcode: Option<String>,
    pub post_id: Option<String>,
    pub group_id: Option<String>,
    pub video_id: Option<String>,
    pub comment_id: Option<String>,
    pub engagement: Engagement,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawContentItem {
    /// Length of the text once surrounding whitespace is removed, in characters.
    #[must_use]
    pub fn stripped_len(&self) -> usize {
        self.text.trim().chars().count()
    }
}

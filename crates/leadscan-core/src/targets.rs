use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Platform};

const MAX_TARGET_LEN: usize = 200;

const DEFAULT_HASHTAGS: &[&str] = &[
    "gurgaonproperty",
    "realestate",
    "property",
    "m3mheights",
    "m3mheights65",
    "gurugram65",
    "m3m65",
];

const DEFAULT_FACEBOOK_GROUPS: &[&str] = &[
    "gurgaonproperty",
    "realestate",
    "m3mheights",
    "gurugram65",
    "m3m65",
];

/// Per-platform lists of what a scan tick collects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTargets {
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub facebook_groups: Vec<String>,
    #[serde(default)]
    pub youtube_videos: Vec<String>,
}

impl Default for ScanTargets {
    fn default() -> Self {
        Self {
            hashtags: DEFAULT_HASHTAGS.iter().map(ToString::to_string).collect(),
            facebook_groups: DEFAULT_FACEBOOK_GROUPS
                .iter()
                .map(ToString::to_string)
                .collect(),
            youtube_videos: Vec::new(),
        }
    }
}

/// Partial replacement of [`ScanTargets`]. `None` leaves a list untouched;
/// `Some(vec![])` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetsUpdate {
    #[serde(default)]
    pub hashtags: Option<Vec<String>>,
    #[serde(default, alias = "groups")]
    pub facebook_groups: Option<Vec<String>>,
    #[serde(default, alias = "video_ids", alias = "videoIds")]
    pub youtube_videos: Option<Vec<String>>,
}

impl TargetsUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hashtags.is_none() && self.facebook_groups.is_none() && self.youtube_videos.is_none()
    }
}

impl ScanTargets {
    /// Targets configured for one platform.
    #[must_use]
    pub fn for_platform(&self, platform: Platform) -> &[String] {
        match platform {
            Platform::Instagram => &self.hashtags,
            Platform::Facebook => &self.facebook_groups,
            Platform::YouTube => &self.youtube_videos,
            Platform::Unknown => &[],
        }
    }

    /// Returns a copy with `update` applied, or the first invalid entry.
    ///
    /// `self` is never modified, so a rejected update leaves no trace.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTarget`] if any provided entry is blank,
    /// too long, or contains whitespace.
    pub fn with_update(&self, update: &TargetsUpdate) -> Result<Self, ConfigError> {
        let mut next = self.clone();
        if let Some(list) = &update.hashtags {
            next.hashtags = normalize_list(Platform::Instagram, list)?;
        }
        if let Some(list) = &update.facebook_groups {
            next.facebook_groups = normalize_list(Platform::Facebook, list)?;
        }
        if let Some(list) = &update.youtube_videos {
            next.youtube_videos = normalize_list(Platform::YouTube, list)?;
        }
        Ok(next)
    }

    /// Re-validate every list in place (used after loading from disk).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTarget`] for the first bad entry.
    pub fn normalized(self) -> Result<Self, ConfigError> {
        Ok(Self {
            hashtags: normalize_list(Platform::Instagram, &self.hashtags)?,
            facebook_groups: normalize_list(Platform::Facebook, &self.facebook_groups)?,
            youtube_videos: normalize_list(Platform::YouTube, &self.youtube_videos)?,
        })
    }
}

fn normalize_list(platform: Platform, raw: &[String]) -> Result<Vec<String>, ConfigError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for entry in raw {
        let value = normalize_target(platform, entry)?;
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    Ok(out)
}

fn normalize_target(platform: Platform, raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidTarget {
        platform,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let mut value = raw.trim();
    if platform == Platform::Instagram {
        value = value.trim_start_matches('#');
    }
    if value.is_empty() {
        return Err(invalid("target must not be blank"));
    }
    if value.chars().count() > MAX_TARGET_LEN {
        return Err(invalid("target is longer than 200 characters"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(invalid("target must not contain whitespace"));
    }
    Ok(value.to_string())
}

/// Load initial scan targets from a YAML file.
///
/// A missing file is not an error: the built-in defaults are returned.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// contains an invalid entry.
pub fn load_targets(path: &Path) -> Result<ScanTargets, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ScanTargets::default()),
        Err(e) => {
            return Err(ConfigError::TargetsFileIo {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let targets: ScanTargets = serde_yaml::from_str(&content)?;
    targets.normalized()
}

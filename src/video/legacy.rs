//! Migration of the legacy multi-video config list into a single association.
//!
//! The legacy file held a list of videos plus the index of the active one.
//! It is only ever read, never written.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::core::time;
use crate::video::config::{ConfigError, VideoAssociation};

/// Duration used when a legacy entry has none
const DEFAULT_LEGACY_DURATION: &str = "0:00";

/// Legacy on-disk wrapper
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyConfigList {
    #[serde(default)]
    pub active_video: i64,
    #[serde(default)]
    pub videos: Option<Vec<Option<LegacyVideo>>>,
}

/// One entry of the legacy list. Unknown legacy fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyVideo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Free text, `H:MM:SS` or `M:SS`
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, rename = "URL")]
    pub url: Option<String>,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    pub offset: i32,
    #[serde(default, rename = "loop")]
    pub looping: bool,
}

impl LegacyConfigList {
    /// The entry marked active, if the index points at one
    pub fn active(&self) -> Option<&LegacyVideo> {
        let index = usize::try_from(self.active_video).ok()?;
        self.videos.as_ref()?.get(index)?.as_ref()
    }
}

/// Build a current association from the active legacy entry
pub fn migrate(list: &LegacyConfigList) -> Result<VideoAssociation, ConfigError> {
    let entry = list.active().ok_or(ConfigError::MalformedLegacyData)?;

    let duration_text = entry.duration.as_deref().unwrap_or(DEFAULT_LEGACY_DURATION);
    let duration = parse_legacy_duration(duration_text)?;
    let video_id = extract_video_id(entry.url.as_deref().unwrap_or_default())?;

    let mut association = VideoAssociation::new(video_id)?;
    association.title = entry.title.clone();
    association.author = entry.author.clone();
    association.looping = entry.looping;
    association.offset = entry.offset;
    association.video_file = entry.video_path.clone();
    association.duration = duration;
    association.back_compat = true;
    Ok(association)
}

/// Parse a legacy duration string into whole seconds.
///
/// The legacy writer produced `H:MM:SS` or `M:SS`, but the clock parser reads a
/// single colon as `H:MM`, so single-colon values are divided by 60 afterwards.
/// Existing files depend on exactly this result.
pub fn parse_legacy_duration(text: &str) -> Result<i32, ConfigError> {
    let mut seconds = time::parse_clock(text)? as i32;
    if text.matches(':').count() == 1 {
        seconds /= 60;
    }
    Ok(seconds)
}

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)/watch\?v=([a-z0-9_-]+)").expect("video id pattern is valid")
    })
}

/// Pull the video id out of a `.../watch?v=<id>` URL
pub fn extract_video_id(url: &str) -> Result<String, ConfigError> {
    video_id_pattern()
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or(ConfigError::MissingSourceUrl)
}

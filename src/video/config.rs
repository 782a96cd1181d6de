//! Video association data structure: one video bound to one level.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::time::{self, ClockParseError, Seconds};
use crate::core::{Override, Vec3};
use crate::video::download::DownloadState;
use crate::video::environment::EnvironmentModification;
use crate::video::legacy::{self, LegacyConfigList};
use crate::video::loader::StorageResolver;

/// Schema version written to new association files
pub const CURRENT_FORMAT_VERSION: i32 = 1;

/// Error type for building, loading and saving associations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("legacy config list has no active video")]
    MalformedLegacyData,
    #[error("legacy video entry is missing the video URL")]
    MissingSourceUrl,
    #[error("video association has no video id")]
    MissingVideoId,
    #[error("video association is not bound to a level")]
    UnboundLevel,
    #[error("invalid legacy duration: {0}")]
    InvalidDuration(#[from] ClockParseError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reference to the level (performance) an association belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LevelRef {
    pub level_id: String,
}

impl LevelRef {
    pub fn new(level_id: impl Into<String>) -> Self {
        Self { level_id: level_id.into() }
    }
}

/// A video found by the external search service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub author: String,
    /// Seconds
    pub duration: i32,
}

/// Where the media backend should read the video from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// File inside the level directory
    Local(PathBuf),
    /// Remote URL, passed to the backend untouched
    Remote(String),
}

impl VideoSource {
    /// Source string handed to the media backend
    pub fn to_url(&self) -> String {
        match self {
            VideoSource::Local(path) => path.to_string_lossy().into_owned(),
            VideoSource::Remote(url) => url.clone(),
        }
    }
}

/// Binding of one external video to one level, plus its overrides.
///
/// Persisted fields use the on-disk camelCase names; absent optional fields
/// are omitted when written. Download state, progress and the dirty/back-compat
/// flags are runtime only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAssociation {
    #[serde(rename = "videoID")]
    pub video_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Relative file name inside the level directory, or a URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_file: Option<String>,
    /// Seconds, informational only
    #[serde(default)]
    pub duration: i32,
    /// Milliseconds the video start is shifted relative to the level start
    #[serde(default)]
    pub offset: i32,
    #[serde(default = "current_format_version")]
    pub format_version: i32,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_by_mapper: Option<bool>,

    #[serde(default, skip_serializing_if = "Override::is_inherit")]
    pub screen_position: Override<Vec3>,
    #[serde(default, skip_serializing_if = "Override::is_inherit")]
    pub screen_rotation: Override<Vec3>,
    /// Width follows from height and the source aspect ratio
    #[serde(default, skip_serializing_if = "Override::is_inherit")]
    pub screen_height: Override<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_big_mirror_override: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Vec<EnvironmentModification>>,

    #[serde(skip)]
    pub download_state: DownloadState,
    /// 0.0 to 1.0
    #[serde(skip)]
    pub download_progress: f32,
    #[serde(skip)]
    pub needs_to_save: bool,
    /// Produced by migrating a legacy config list
    #[serde(skip)]
    pub back_compat: bool,
    #[serde(skip)]
    level: Option<LevelRef>,
    #[serde(skip)]
    level_dir: Option<PathBuf>,
}

fn current_format_version() -> i32 {
    CURRENT_FORMAT_VERSION
}

impl VideoAssociation {
    /// Minimal association for a video id, not bound to any level
    pub fn new(video_id: impl Into<String>) -> Result<Self, ConfigError> {
        let video_id = video_id.into();
        if video_id.trim().is_empty() {
            return Err(ConfigError::MissingVideoId);
        }

        Ok(Self {
            video_id,
            title: None,
            author: None,
            video_file: None,
            duration: 0,
            offset: 0,
            format_version: CURRENT_FORMAT_VERSION,
            looping: false,
            config_by_mapper: None,
            screen_position: Override::Inherit,
            screen_rotation: Override::Inherit,
            screen_height: Override::Inherit,
            disable_big_mirror_override: None,
            environment: None,
            download_state: DownloadState::NotDownloaded,
            download_progress: 0.0,
            needs_to_save: false,
            back_compat: false,
            level: None,
            level_dir: None,
        })
    }

    /// Create an association for a search result and bind it to a level
    pub fn from_search_result(
        result: &SearchResult,
        level: LevelRef,
        storage: &dyn StorageResolver,
    ) -> Result<Self, ConfigError> {
        let mut association = Self::new(result.id.clone())?;
        association.title = Some(result.title.clone());
        association.author = Some(result.author.clone());
        association.duration = result.duration;
        association.bind_level(level, storage);
        Ok(association)
    }

    /// Migrate the active entry of a legacy config list
    pub fn from_legacy(list: &LegacyConfigList) -> Result<Self, ConfigError> {
        legacy::migrate(list)
    }

    /// Check invariants of a deserialized association
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.video_id.trim().is_empty() {
            return Err(ConfigError::MissingVideoId);
        }
        Ok(())
    }

    /// Attach the association to a level and remember its directory
    pub fn bind_level(&mut self, level: LevelRef, storage: &dyn StorageResolver) {
        self.level_dir = Some(storage.level_dir(&level));
        self.level = Some(level);
    }

    pub fn level(&self) -> Option<&LevelRef> {
        self.level.as_ref()
    }

    pub fn level_dir(&self) -> Option<&Path> {
        self.level_dir.as_deref()
    }

    /// Offset converted from milliseconds to seconds
    pub fn offset_seconds(&self) -> Seconds {
        time::from_millis(self.offset)
    }

    /// True when `video_file` is set and is not a URL
    pub fn is_local(&self) -> bool {
        self.video_file
            .as_deref()
            .map_or(false, |file| !file.starts_with("http"))
    }

    pub fn is_playable(&self) -> bool {
        self.download_state == DownloadState::Downloaded
    }

    /// Resolve the video file into a backend source.
    /// `None` when no file is set, or when a local file has no level directory.
    pub fn video_path(&self) -> Option<VideoSource> {
        let file = self.video_file.as_deref()?;
        if self.is_local() {
            let dir = self.level_dir.as_deref()?;
            Some(VideoSource::Local(dir.join(file)))
        } else {
            Some(VideoSource::Remote(file.to_string()))
        }
    }

    /// Recompute the download state from the presence of the local file.
    /// Remote and unset files count as not downloaded.
    pub fn update_download_state(&mut self) -> DownloadState {
        self.download_state = match self.video_path() {
            Some(VideoSource::Local(path)) if path.is_file() => DownloadState::Downloaded,
            _ => DownloadState::NotDownloaded,
        };
        self.download_state
    }

    pub fn set_offset(&mut self, offset_millis: i32) {
        if self.offset != offset_millis {
            self.offset = offset_millis;
            self.needs_to_save = true;
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        if self.looping != looping {
            self.looping = looping;
            self.needs_to_save = true;
        }
    }

    pub fn set_screen_placement(
        &mut self,
        position: Override<Vec3>,
        rotation: Override<Vec3>,
        height: Override<f32>,
    ) {
        self.screen_position = position;
        self.screen_rotation = rotation;
        self.screen_height = height;
        self.needs_to_save = true;
    }

    pub fn set_environment(&mut self, modifications: Vec<EnvironmentModification>) {
        self.environment = Some(modifications);
        self.needs_to_save = true;
    }

    /// Environment modifications, empty when none are configured
    pub fn environment_modifications(&self) -> &[EnvironmentModification] {
        self.environment.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for VideoAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} by {} ({})",
            self.video_id,
            self.title.as_deref().unwrap_or_default(),
            self.author.as_deref().unwrap_or_default(),
            self.duration
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::loader::CustomLevelsResolver;
    use std::fs;

    fn search_result() -> SearchResult {
        SearchResult {
            id: "dQw4w9WgXcQ".to_string(),
            title: "Song".to_string(),
            author: "Artist".to_string(),
            duration: 213,
        }
    }

    fn bound(root: &Path, video_file: Option<&str>) -> VideoAssociation {
        let resolver = CustomLevelsResolver::new(root);
        let level = LevelRef::new("level");
        let mut association =
            VideoAssociation::from_search_result(&search_result(), level, &resolver).unwrap();
        association.video_file = video_file.map(str::to_string);
        association
    }

    #[test]
    fn test_from_search_result() {
        let association = bound(Path::new("/levels"), None);
        assert_eq!(association.video_id, "dQw4w9WgXcQ");
        assert_eq!(association.duration, 213);
        assert_eq!(association.format_version, CURRENT_FORMAT_VERSION);
        assert_eq!(association.level(), Some(&LevelRef::new("level")));
        assert_eq!(association.level_dir(), Some(Path::new("/levels/level")));
        assert_eq!(association.to_string(), "[dQw4w9WgXcQ] Song by Artist (213)");
    }

    #[test]
    fn test_empty_video_id_rejected() {
        assert!(matches!(VideoAssociation::new("  "), Err(ConfigError::MissingVideoId)));
    }

    #[test]
    fn test_missing_video_id_fails_deserialization() {
        let result: Result<VideoAssociation, _> = serde_json::from_str(r#"{"offset":0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_offset_seconds() {
        let mut association = VideoAssociation::new("id").unwrap();
        association.offset = -300;
        assert!((association.offset_seconds() + 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_video_path_resolution() {
        let local = bound(Path::new("/levels"), Some("video.mp4"));
        assert!(local.is_local());
        assert_eq!(
            local.video_path(),
            Some(VideoSource::Local(PathBuf::from("/levels/level/video.mp4")))
        );

        let remote = bound(Path::new("/levels"), Some("https://example.com/video.mp4"));
        assert!(!remote.is_local());
        assert_eq!(
            remote.video_path(),
            Some(VideoSource::Remote("https://example.com/video.mp4".to_string()))
        );

        let unset = bound(Path::new("/levels"), None);
        assert!(!unset.is_local());
        assert_eq!(unset.video_path(), None);
    }

    #[test]
    fn test_update_download_state_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("level")).unwrap();
        let mut association = bound(dir.path(), Some("video.mp4"));

        assert_eq!(association.update_download_state(), DownloadState::NotDownloaded);
        assert_eq!(association.update_download_state(), DownloadState::NotDownloaded);
        assert!(!association.is_playable());

        fs::write(dir.path().join("level").join("video.mp4"), b"data").unwrap();
        assert_eq!(association.update_download_state(), DownloadState::Downloaded);
        assert_eq!(association.update_download_state(), DownloadState::Downloaded);
        assert!(association.is_playable());
    }

    #[test]
    fn test_remote_and_unset_are_not_downloaded() {
        let mut remote = bound(Path::new("/levels"), Some("http://example.com/v.mp4"));
        assert_eq!(remote.update_download_state(), DownloadState::NotDownloaded);

        let mut unset = bound(Path::new("/levels"), None);
        unset.download_state = DownloadState::Cancelled;
        assert_eq!(unset.update_download_state(), DownloadState::NotDownloaded);
    }

    #[test]
    fn test_is_playable_only_when_downloaded() {
        let mut association = VideoAssociation::new("id").unwrap();
        for (state, playable) in [
            (DownloadState::NotDownloaded, false),
            (DownloadState::Downloading, false),
            (DownloadState::Downloaded, true),
            (DownloadState::Cancelled, false),
        ] {
            association.download_state = state;
            assert_eq!(association.is_playable(), playable);
        }
    }

    #[test]
    fn test_optional_fields_omitted_on_write() {
        let association = VideoAssociation::new("abc").unwrap();
        let value = serde_json::to_value(&association).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "title",
            "author",
            "videoFile",
            "configByMapper",
            "screenPosition",
            "screenRotation",
            "screenHeight",
            "disableBigMirrorOverride",
            "environment",
        ] {
            assert!(!object.contains_key(key), "{} should be omitted", key);
        }
        assert_eq!(object["videoID"], "abc");
        assert_eq!(object["formatVersion"], 1);
        assert_eq!(object["loop"], false);

        let parsed: VideoAssociation = serde_json::from_value(value).unwrap();
        assert!(parsed.title.is_none());
        assert!(parsed.screen_height.is_inherit());
        assert!(parsed.environment.is_none());
        let rewritten = serde_json::to_value(&parsed).unwrap();
        assert_eq!(rewritten, serde_json::to_value(&association).unwrap());
    }

    #[test]
    fn test_overrides_round_trip() {
        let json = r#"{
            "videoID": "abc",
            "duration": 60,
            "offset": -120,
            "formatVersion": 1,
            "loop": true,
            "screenHeight": 5.0,
            "screenPosition": {"x": 0.0, "y": 1.0, "z": 2.0},
            "environment": [{"name": "BigMirror", "active": false}]
        }"#;
        let parsed: VideoAssociation = serde_json::from_str(json).unwrap();
        assert!(parsed.looping);
        assert_eq!(parsed.offset, -120);
        assert_eq!(parsed.screen_height, Override::Set(5.0));
        assert_eq!(parsed.screen_position, Override::Set(Vec3::new(0.0, 1.0, 2.0)));
        assert!(parsed.screen_rotation.is_inherit());
        assert_eq!(parsed.environment_modifications().len(), 1);
        assert_eq!(parsed.download_state, DownloadState::NotDownloaded);
    }

    #[test]
    fn test_edits_mark_dirty() {
        let mut association = VideoAssociation::new("id").unwrap();
        association.set_offset(0);
        assert!(!association.needs_to_save);
        association.set_offset(250);
        assert!(association.needs_to_save);
    }
}

//! Per-level persistence of video associations.
//!
//! Each level directory holds at most one `cinema-video.json`. Files in the
//! legacy list shape are migrated on load and flagged for re-saving in the
//! current shape.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::video::config::{ConfigError, LevelRef, VideoAssociation};
use crate::video::legacy::{self, LegacyConfigList};

/// Name of the association file inside a level directory
pub const CONFIG_FILENAME: &str = "cinema-video.json";

/// Host collaborator mapping a level to its on-disk directory
pub trait StorageResolver {
    fn level_dir(&self, level: &LevelRef) -> PathBuf;
}

/// Levels stored as sub-directories of a single root, named by level id
#[derive(Debug, Clone)]
pub struct CustomLevelsResolver {
    root: PathBuf,
}

impl CustomLevelsResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl StorageResolver for CustomLevelsResolver {
    fn level_dir(&self, level: &LevelRef) -> PathBuf {
        self.root.join(&level.level_id)
    }
}

pub fn config_path(level_dir: &Path) -> PathBuf {
    level_dir.join(CONFIG_FILENAME)
}

/// True for the legacy `{activeVideo, videos}` wrapper
fn is_legacy(value: &serde_json::Value) -> bool {
    value.get("videoID").is_none() && value.get("videos").is_some()
}

/// Load the level's association, migrating the legacy shape if needed.
///
/// Returns `Ok(None)` when the level has no association file. The returned
/// association is bound to the level and has a fresh download state.
pub fn load(
    level: &LevelRef,
    storage: &dyn StorageResolver,
) -> Result<Option<VideoAssociation>, ConfigError> {
    let path = config_path(&storage.level_dir(level));
    if !path.is_file() {
        debug!(level = %level.level_id, "No video association file");
        return Ok(None);
    }

    let text = fs::read_to_string(&path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;

    let mut association = if is_legacy(&value) {
        let list: LegacyConfigList = serde_json::from_value(value)?;
        let mut association = legacy::migrate(&list)?;
        association.needs_to_save = true;
        info!(
            level = %level.level_id,
            video_id = %association.video_id,
            "Migrated legacy video config"
        );
        association
    } else {
        serde_json::from_value::<VideoAssociation>(value)?
    };
    association.validate()?;

    association.bind_level(level.clone(), storage);
    let state = association.update_download_state();
    debug!(level = %level.level_id, association = %association, ?state, "Loaded video association");
    Ok(Some(association))
}

/// Write the association to its level directory and clear the dirty flag
pub fn save(association: &mut VideoAssociation) -> Result<PathBuf, ConfigError> {
    let dir = association.level_dir().ok_or(ConfigError::UnboundLevel)?;
    let path = config_path(dir);
    let json = serde_json::to_string_pretty(association)?;
    fs::write(&path, json)?;

    association.needs_to_save = false;
    association.back_compat = false;
    info!(path = %path.display(), video_id = %association.video_id, "Saved video association");
    Ok(path)
}

/// Remove the level's association file. Returns false if there was none.
pub fn delete(level: &LevelRef, storage: &dyn StorageResolver) -> Result<bool, ConfigError> {
    let path = config_path(&storage.level_dir(level));
    if !path.is_file() {
        return Ok(false);
    }
    fs::remove_file(&path)?;
    warn!(level = %level.level_id, "Deleted video association");
    Ok(true)
}

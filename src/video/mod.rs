//! Video association model: which video belongs to which level, where its
//! file lives, its download state and presentation overrides.

pub mod config;
pub mod download;
pub mod environment;
pub mod legacy;
pub mod loader;

pub use config::{ConfigError, LevelRef, SearchResult, VideoAssociation, VideoSource};
pub use download::{DownloadMonitor, DownloadReporter, DownloadState, DownloadUpdate, Downloader};
pub use environment::{EnvironmentApplier, EnvironmentModification};
pub use legacy::{LegacyConfigList, LegacyVideo};
pub use loader::{CustomLevelsResolver, StorageResolver};

//! Runtime settings loaded from environment variables.

use std::str::FromStr;

/// Error type for settings loading
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Drift-correction tuning
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    /// Drift, in frames, still counted as in sync
    pub frame_tolerance: f64,
    /// Out-of-sync frame count at which a correction episode starts
    pub out_of_sync_threshold: u32,
    /// Largest allowed speed change, as a fraction of nominal speed
    pub max_speed_deviation: f64,
    /// Speed change per second of drift, as a fraction of nominal speed
    pub correction_gain: f64,
    /// Drift beyond which the player seeks instead of nudging speed
    pub reseek_seconds: f64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            frame_tolerance: 1.0,
            out_of_sync_threshold: 5,
            max_speed_deviation: 0.05,
            correction_gain: 1.0,
            reseek_seconds: 1.0,
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// User toggle for video playback
    pub enabled: bool,
    /// Volume used by `unmute`, 0.0 to 1.0
    pub volume: f32,
    pub sync: SyncSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.8,
            sync: SyncSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables with defaults.
    ///
    /// | Env Var                           | Default |
    /// |-----------------------------------|---------|
    /// | `CINEMA_ENABLED`                  | `true`  |
    /// | `CINEMA_VOLUME`                   | `0.8`   |
    /// | `CINEMA_SYNC_FRAME_TOLERANCE`     | `1.0`   |
    /// | `CINEMA_SYNC_THRESHOLD`           | `5`     |
    /// | `CINEMA_SYNC_MAX_SPEED_DEVIATION` | `0.05`  |
    /// | `CINEMA_SYNC_CORRECTION_GAIN`     | `1.0`   |
    /// | `CINEMA_SYNC_RESEEK_SECONDS`      | `1.0`   |
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`Settings::from_env`] with an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let sync_defaults = defaults.sync;

        let settings = Self {
            enabled: read(&lookup, "CINEMA_ENABLED", defaults.enabled)?,
            volume: read(&lookup, "CINEMA_VOLUME", defaults.volume)?,
            sync: SyncSettings {
                frame_tolerance: read(
                    &lookup,
                    "CINEMA_SYNC_FRAME_TOLERANCE",
                    sync_defaults.frame_tolerance,
                )?,
                out_of_sync_threshold: read(
                    &lookup,
                    "CINEMA_SYNC_THRESHOLD",
                    sync_defaults.out_of_sync_threshold,
                )?,
                max_speed_deviation: read(
                    &lookup,
                    "CINEMA_SYNC_MAX_SPEED_DEVIATION",
                    sync_defaults.max_speed_deviation,
                )?,
                correction_gain: read(
                    &lookup,
                    "CINEMA_SYNC_CORRECTION_GAIN",
                    sync_defaults.correction_gain,
                )?,
                reseek_seconds: read(
                    &lookup,
                    "CINEMA_SYNC_RESEEK_SECONDS",
                    sync_defaults.reseek_seconds,
                )?,
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |var: &'static str, value: String| Err(SettingsError::Invalid { var, value });
        if !(0.0..=1.0).contains(&self.volume) {
            return invalid("CINEMA_VOLUME", self.volume.to_string());
        }
        if !(self.sync.frame_tolerance >= 0.0) {
            return invalid("CINEMA_SYNC_FRAME_TOLERANCE", self.sync.frame_tolerance.to_string());
        }
        if !(0.0..1.0).contains(&self.sync.max_speed_deviation) {
            return invalid(
                "CINEMA_SYNC_MAX_SPEED_DEVIATION",
                self.sync.max_speed_deviation.to_string(),
            );
        }
        if !(self.sync.correction_gain > 0.0) {
            return invalid("CINEMA_SYNC_CORRECTION_GAIN", self.sync.correction_gain.to_string());
        }
        if !(self.sync.reseek_seconds > 0.0) {
            return invalid("CINEMA_SYNC_RESEEK_SECONDS", self.sync.reseek_seconds.to_string());
        }
        Ok(())
    }
}

fn read<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, SettingsError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| SettingsError::Invalid { var, value }),
        None => Ok(default),
    }
}

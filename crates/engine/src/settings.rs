use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_true() -> bool {
    true
}

/// User-tunable engine behavior, read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Period of the playback position poll while playing.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Passed through to the player on every seek.
    #[serde(default = "default_true")]
    pub allow_seek_ahead: bool,
    /// Resume playback after jumping to a timestamp.
    #[serde(default)]
    pub play_after_seek: bool,
    /// Clamp typed times to the video duration once it is known.
    #[serde(default = "default_true")]
    pub clamp_to_duration: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            allow_seek_ahead: true,
            play_after_seek: false,
            clamp_to_duration: true,
        }
    }
}

impl Settings {
    /// Loads settings from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                debug!(path = ?path, "settings file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(EngineError::SettingsIo {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&text).map_err(|source| EngineError::SettingsSerialization {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Poll period; never shorter than 10 ms.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

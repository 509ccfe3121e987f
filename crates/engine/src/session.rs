use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, Result};
use crate::ledger::Ledger;
use crate::source::SourceDescriptor;

/// Current on-disk session format.
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// JSON document holding the timestamps of one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    pub version: u32,
    #[serde(default)]
    pub source: Option<SourceDescriptor>,
    #[serde(default)]
    pub timestamps: Vec<SessionEntry>,
}

/// One saved timestamp. Seconds are derived again on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub time: String,
    pub description: String,
}

impl SessionFile {
    /// Captures the ledger in sorted order.
    pub fn from_ledger(ledger: &Ledger, source: Option<SourceDescriptor>) -> Self {
        Self {
            version: SESSION_FORMAT_VERSION,
            source,
            timestamps: ledger
                .sorted_view()
                .into_iter()
                .map(|timestamp| SessionEntry {
                    time: timestamp.time().to_owned(),
                    description: timestamp.description().to_owned(),
                })
                .collect(),
        }
    }

    /// Rebuilds a ledger, validating every entry like a fresh commit.
    pub fn into_ledger(self) -> Result<Ledger> {
        let mut ledger = Ledger::new();
        for (index, entry) in self.timestamps.into_iter().enumerate() {
            ledger
                .add(&entry.time, &entry.description)
                .map_err(|error| EngineError::InvalidSessionFile {
                    reason: format!("entry {index}: {error}"),
                })?;
        }
        Ok(ledger)
    }

    /// Replaces the contents of `ledger` with the saved entries.
    ///
    /// Every entry is validated before `ledger` is touched. Restored entries
    /// get fresh ids from `ledger`, so ids handed out earlier stay retired.
    pub fn restore_into(self, ledger: &mut Ledger) -> Result<usize> {
        let restored = self.into_ledger()?;
        ledger.clear();
        for timestamp in restored.sorted_view() {
            ledger.add(timestamp.time(), timestamp.description())?;
        }
        Ok(ledger.len())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|source| EngineError::SessionSerialization {
                path: path.to_path_buf(),
                source,
            })?;
        std::fs::write(path, json).map_err(|source| EngineError::SessionIo {
            context: "failed to write session file",
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = ?path, entries = self.timestamps.len(), "session saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::SessionIo {
            context: "failed to read session file",
            path: path.to_path_buf(),
            source,
        })?;
        let file: Self =
            serde_json::from_str(&text).map_err(|source| EngineError::SessionSerialization {
                path: path.to_path_buf(),
                source,
            })?;
        if file.version != SESSION_FORMAT_VERSION {
            return Err(EngineError::InvalidSessionFile {
                reason: format!("unsupported version {}", file.version),
            });
        }
        Ok(file)
    }
}

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::time::{checked_seconds, validate_commit_format};

/// Opaque identifier for timestamps. Allocated once, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimestampId(pub u64);

impl Display for TimestampId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One committed note attached to a moment of the video.
///
/// Fields are private so `time` and `seconds` cannot drift apart after the
/// ledger created the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timestamp {
    id: TimestampId,
    time: String,
    seconds: u64,
    description: String,
}

impl Timestamp {
    pub fn id(&self) -> TimestampId {
        self.id
    }

    /// Display string as committed (`m:ss` or `h:mm:ss`).
    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Export line: `"<time> - <description>"`.
    pub fn export_line(&self) -> String {
        format!("{} - {}", self.time, self.description)
    }
}

/// In-memory collection of timestamps for the current video.
///
/// Storage keeps insertion order; every read goes through
/// [`Ledger::sorted_view`], which orders by seconds and keeps insertion order
/// among equal seconds.
///
/// # Example
/// ```
/// use stamp_engine::ledger::Ledger;
///
/// let mut ledger = Ledger::new();
/// ledger.add("1:05", "Intro").expect("valid");
/// ledger.add("0:30", "Hook").expect("valid");
///
/// assert_eq!(ledger.export_text(), "0:30 - Hook\n1:05 - Intro");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<Timestamp>,
    next_id: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Validates and appends a timestamp.
    ///
    /// Fails when `time` or `description` is blank, or when `time` does not
    /// pass [`validate_commit_format`] or does not decode to a `u64`.
    pub fn add(&mut self, time: &str, description: &str) -> Result<Timestamp> {
        let time = time.trim();
        let description = description.trim();
        if time.is_empty() {
            return Err(EngineError::EmptyTime);
        }
        if description.is_empty() {
            return Err(EngineError::EmptyDescription);
        }
        let seconds = validate_commit_format(time)
            .then(|| checked_seconds(time))
            .flatten();
        let Some(seconds) = seconds else {
            warn!(time, "timestamp rejected: invalid time format");
            return Err(EngineError::InvalidTimeFormat {
                time: time.to_owned(),
            });
        };

        let timestamp = Timestamp {
            id: self.allocate_id(),
            time: time.to_owned(),
            seconds,
            description: description.to_owned(),
        };
        debug!(
            id = timestamp.id.0,
            seconds = timestamp.seconds,
            entry_count = self.entries.len() + 1,
            "timestamp added"
        );
        self.entries.push(timestamp.clone());
        Ok(timestamp)
    }

    /// Removes the entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: TimestampId) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            debug!(id = id.0, "remove ignored: unknown timestamp");
            return false;
        };
        self.entries.remove(index);
        debug!(id = id.0, entry_count = self.entries.len(), "timestamp removed");
        true
    }

    pub fn get(&self, id: TimestampId) -> Option<&Timestamp> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entries ordered by seconds; ties keep insertion order.
    pub fn sorted_view(&self) -> Vec<Timestamp> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|entry| entry.seconds);
        sorted
    }

    /// Newline-joined export lines in sorted order.
    ///
    /// An empty ledger yields an empty string; callers treat that as
    /// "nothing to export".
    pub fn export_text(&self) -> String {
        self.sorted_view()
            .iter()
            .map(Timestamp::export_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry. Ids already handed out stay retired.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn allocate_id(&mut self) -> TimestampId {
        let id = self.next_id;
        self.next_id += 1;
        TimestampId(id)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

use stamp_engine::{SessionSnapshot, TimestampId};

/// One rendered row of the timestamp list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampRow {
    pub id: TimestampId,
    pub time: String,
    pub description: String,
    /// The latest timestamp at or before the playhead.
    pub is_current: bool,
}

/// Interaction result emitted by a list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampListInteraction {
    JumpRequested(TimestampId),
    RemoveRequested(TimestampId),
}

/// Builds list rows in display order and marks the row under the playhead.
pub fn build_rows(snapshot: &SessionSnapshot) -> Vec<TimestampRow> {
    let current = snapshot
        .timestamps
        .iter()
        .rposition(|timestamp| timestamp.seconds() <= snapshot.position_seconds);

    snapshot
        .timestamps
        .iter()
        .enumerate()
        .map(|(index, timestamp)| TimestampRow {
            id: timestamp.id(),
            time: timestamp.time().to_owned(),
            description: timestamp.description().to_owned(),
            is_current: Some(index) == current,
        })
        .collect()
}

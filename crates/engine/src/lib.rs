//! UI-agnostic core for collecting video timestamps.

pub mod api;
pub mod error;
pub mod export;
pub mod ledger;
pub mod metadata;
pub mod player;
pub mod session;
pub mod settings;
pub mod source;
pub mod ticker;
pub mod time;

pub use api::{
    Command, Engine, EngineErrorEvent, EngineErrorKind, Event, SessionSnapshot,
};
pub use error::{EngineError, Result};
pub use ledger::{Ledger, Timestamp, TimestampId};
pub use metadata::{LoadToken, MetadataProvider, StubMetadataProvider, VideoMetadata};
pub use player::{PlaybackControl, PlayerBackend, VideoSource};
pub use settings::Settings;
pub use source::{LocalMedia, SourceDescriptor, extract_video_id};
pub use time::{
    checked_seconds, format_seconds, sanitize_live_input, to_seconds, validate_commit_format,
};

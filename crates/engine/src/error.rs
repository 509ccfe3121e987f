use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Result type used by the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by engine commands, the ledger and session files.
#[derive(Debug)]
pub enum EngineError {
    EmptyUrl,
    InvalidVideoUrl {
        url: String,
    },
    EmptyTime,
    EmptyDescription,
    InvalidTimeFormat {
        time: String,
    },
    UnsupportedFileType {
        path: PathBuf,
        content_type: String,
    },
    NothingToExport,
    TimestampNotFound {
        id: u64,
    },
    SessionIo {
        context: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    SessionSerialization {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidSessionFile {
        reason: String,
    },
    SettingsIo {
        path: PathBuf,
        source: std::io::Error,
    },
    SettingsSerialization {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "please enter a video URL"),
            Self::InvalidVideoUrl { url } => write!(f, "not a recognised YouTube URL: {url}"),
            Self::EmptyTime => write!(f, "timestamp time is empty"),
            Self::EmptyDescription => write!(f, "timestamp description is empty"),
            Self::InvalidTimeFormat { time } => {
                write!(f, "invalid time format `{time}` (expected m:ss or h:mm:ss)")
            }
            Self::UnsupportedFileType { path, content_type } => write!(
                f,
                "unsupported file type `{content_type}`: {}",
                path.display()
            ),
            Self::NothingToExport => write!(f, "there are no timestamps to copy"),
            Self::TimestampNotFound { id } => write!(f, "timestamp not found: {id}"),
            Self::SessionIo {
                context,
                path,
                source,
            } => write!(f, "{context}: {} ({source})", path.display()),
            Self::SessionSerialization { path, source } => write!(
                f,
                "session serialization/deserialization failed at {} ({source})",
                path.display()
            ),
            Self::InvalidSessionFile { reason } => write!(f, "invalid session file: {reason}"),
            Self::SettingsIo { path, source } => {
                write!(f, "failed to read settings: {} ({source})", path.display())
            }
            Self::SettingsSerialization { path, source } => {
                write!(f, "invalid settings file {} ({source})", path.display())
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SessionIo { source, .. } => Some(source),
            Self::SessionSerialization { source, .. } => Some(source),
            Self::SettingsIo { source, .. } => Some(source),
            Self::SettingsSerialization { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl EngineError {
    /// Returns true for errors caused by what the user typed or picked.
    pub fn is_input_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyUrl
                | Self::InvalidVideoUrl { .. }
                | Self::EmptyTime
                | Self::EmptyDescription
                | Self::InvalidTimeFormat { .. }
        )
    }
}

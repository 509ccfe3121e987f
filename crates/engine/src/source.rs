use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Length of a YouTube video identifier.
pub const VIDEO_ID_LEN: usize = 11;

/// Content-type prefix accepted for local uploads.
pub const VIDEO_CONTENT_TYPE_PREFIX: &str = "video/";

/// Known URL shapes: `youtu.be/ID`, `/v/ID`, `/u/x/ID`, `/embed/ID`,
/// `watch?v=ID` and `...&v=ID`. The id runs until `#`, `&` or `?`.
static VIDEO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(?:youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*$")
        .expect("video id pattern must compile")
});

/// Extracts the 11-character video id from a YouTube URL.
///
/// # Example
/// ```
/// use stamp_engine::source::extract_video_id;
///
/// assert_eq!(
///     extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
///     Some("dQw4w9WgXcQ")
/// );
/// assert_eq!(extract_video_id("https://example.com/not-youtube"), None);
/// ```
pub fn extract_video_id(url: &str) -> Option<String> {
    let captures = VIDEO_ID_PATTERN.captures(url.trim())?;
    let id = captures.get(1)?.as_str();
    (id.len() == VIDEO_ID_LEN).then(|| id.to_owned())
}

/// Validates a user-submitted URL and returns its video id.
pub fn parse_video_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(EngineError::EmptyUrl);
    }
    extract_video_id(url).ok_or_else(|| EngineError::InvalidVideoUrl {
        url: url.to_owned(),
    })
}

/// A user-selected local video file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalMedia {
    path: PathBuf,
    content_type: String,
}

impl LocalMedia {
    /// Accepts the file only when its declared content type starts with `video/`.
    pub fn new(path: impl Into<PathBuf>, content_type: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let content_type = content_type.into();
        if !content_type.starts_with(VIDEO_CONTENT_TYPE_PREFIX) {
            return Err(EngineError::UnsupportedFileType { path, content_type });
        }
        Ok(Self { path, content_type })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// File name used as a display title.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Serializable description of where the current video comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDescriptor {
    Remote { video_id: String },
    Local { path: PathBuf, content_type: String },
}

impl Display for SourceDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote { video_id } => write!(f, "YouTube video {video_id}"),
            Self::Local { path, .. } => write!(f, "local file {}", path.display()),
        }
    }
}

impl From<&LocalMedia> for SourceDescriptor {
    fn from(value: &LocalMedia) -> Self {
        Self::Local {
            path: value.path.clone(),
            content_type: value.content_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LocalMedia, extract_video_id, parse_video_url};
    use crate::error::EngineError;

    #[test]
    fn extracts_id_from_known_url_shapes() {
        let urls = [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLrAXtmRdnEQy",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://www.youtube.com/u/w/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=30",
        ];
        for url in urls {
            assert_eq!(
                extract_video_id(url).as_deref(),
                Some("dQw4w9WgXcQ"),
                "{url}"
            );
        }
    }

    #[test]
    fn rejects_urls_without_an_eleven_character_id() {
        assert_eq!(extract_video_id("https://example.com/not-youtube"), None);
        assert_eq!(extract_video_id("https://youtu.be/short"), None);
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQextra"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn parse_video_url_distinguishes_empty_and_invalid_input() {
        assert!(matches!(parse_video_url("   "), Err(EngineError::EmptyUrl)));
        assert!(matches!(
            parse_video_url("https://vimeo.com/123456789"),
            Err(EngineError::InvalidVideoUrl { .. })
        ));
        assert_eq!(
            parse_video_url(" https://youtu.be/dQw4w9WgXcQ ").expect("valid url"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn local_media_requires_video_content_type() {
        assert!(LocalMedia::new("clip.mp4", "video/mp4").is_ok());
        assert!(matches!(
            LocalMedia::new("song.mp3", "audio/mpeg"),
            Err(EngineError::UnsupportedFileType { .. })
        ));
        assert!(LocalMedia::new("clip", "").is_err());
    }

    #[test]
    fn local_media_display_name_is_file_name() {
        let media = LocalMedia::new("/tmp/talks/keynote.webm", "video/webm").expect("video");
        assert_eq!(media.display_name(), "keynote.webm");
    }
}

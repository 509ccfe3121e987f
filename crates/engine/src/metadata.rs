use serde::{Deserialize, Serialize};

/// Sequence token identifying one metadata load.
///
/// Only the response carrying the latest token is applied; responses for
/// superseded loads are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadToken(pub u64);

/// Descriptive data shown next to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub author: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Resolves metadata for a remote video id.
pub trait MetadataProvider {
    fn fetch(&self, video_id: &str) -> VideoMetadata;
}

/// Provider returning canned data without touching the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubMetadataProvider;

impl MetadataProvider for StubMetadataProvider {
    fn fetch(&self, video_id: &str) -> VideoMetadata {
        VideoMetadata {
            title: format!("YouTube video {video_id}"),
            author: Some(String::from("Unknown channel")),
            thumbnail_url: Some(format!("https://img.youtube.com/vi/{video_id}/hqdefault.jpg")),
        }
    }
}

use std::fmt::{Debug, Formatter};

use crate::source::{LocalMedia, SourceDescriptor};

/// Operations the engine needs from a video player.
///
/// Implemented by the embedded remote widget and by the local media element
/// alike, so control code never branches on where the video comes from.
pub trait PlaybackControl: Send {
    /// Whether the player finished initializing and accepts controls.
    fn is_ready(&self) -> bool;

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Total duration in seconds, `0.0` while unknown.
    fn duration(&self) -> f64;

    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool);

    fn play(&mut self);

    fn pause(&mut self);
}

/// Creates players for the two kinds of sources.
pub trait PlayerBackend {
    /// Opens the embeddable widget for a remote video id.
    fn open_remote(&mut self, video_id: &str) -> Box<dyn PlaybackControl>;

    /// Opens a media element for a local file.
    fn open_local(&mut self, media: &LocalMedia) -> Box<dyn PlaybackControl>;
}

/// The video currently loaded, tagged by where it comes from.
pub enum VideoSource {
    Remote {
        video_id: String,
        widget: Box<dyn PlaybackControl>,
    },
    Local {
        media: LocalMedia,
        element: Box<dyn PlaybackControl>,
    },
}

impl VideoSource {
    /// Serializable description of the source.
    pub fn descriptor(&self) -> SourceDescriptor {
        match self {
            Self::Remote { video_id, .. } => SourceDescriptor::Remote {
                video_id: video_id.clone(),
            },
            Self::Local { media, .. } => SourceDescriptor::from(media),
        }
    }

    fn control(&self) -> &dyn PlaybackControl {
        match self {
            Self::Remote { widget, .. } => widget.as_ref(),
            Self::Local { element, .. } => element.as_ref(),
        }
    }

    fn control_mut(&mut self) -> &mut dyn PlaybackControl {
        match self {
            Self::Remote { widget, .. } => widget.as_mut(),
            Self::Local { element, .. } => element.as_mut(),
        }
    }
}

impl PlaybackControl for VideoSource {
    fn is_ready(&self) -> bool {
        self.control().is_ready()
    }

    fn current_time(&self) -> f64 {
        self.control().current_time()
    }

    fn duration(&self) -> f64 {
        self.control().duration()
    }

    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) {
        self.control_mut().seek_to(seconds, allow_seek_ahead);
    }

    fn play(&mut self) {
        self.control_mut().play();
    }

    fn pause(&mut self) {
        self.control_mut().pause();
    }
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoSource")
            .field("descriptor", &self.descriptor())
            .field("ready", &self.is_ready())
            .finish()
    }
}

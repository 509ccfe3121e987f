use std::path::PathBuf;
use std::sync::mpsc::{SyncSender, TrySendError};

use crate::error::{EngineError, Result};
use crate::export::build_export_text;
use crate::ledger::{Ledger, Timestamp, TimestampId};
use crate::metadata::{LoadToken, VideoMetadata};
use crate::player::{PlaybackControl, PlayerBackend, VideoSource};
use crate::session::SessionFile;
use crate::settings::Settings;
use crate::source::{LocalMedia, SourceDescriptor, parse_video_url};
use crate::ticker::PlaybackTicker;
use crate::time::{format_seconds, sanitize_live_input, whole_seconds};
use tracing::{debug, info, warn};

/// Commands accepted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Starts loading a YouTube URL.
    ///
    /// The engine answers with [`Event::MetadataRequested`]; the host resolves
    /// it and replies with [`Command::MetadataResolved`] carrying the same
    /// token. Submitting another URL first supersedes the pending load.
    LoadUrl {
        url: String,
    },
    MetadataResolved {
        token: LoadToken,
        metadata: VideoMetadata,
    },
    OpenLocalFile {
        path: PathBuf,
        content_type: String,
    },
    /// The player finished initializing and can report its duration.
    PlayerReady,
    /// The player switched between playing and not playing.
    PlayerStateChanged {
        playing: bool,
    },
    /// Re-reads the playback position; sent by the ticker while playing.
    PollPosition,
    Play,
    Pause,
    SeekTo {
        seconds: f64,
    },
    /// Copies the current playback position into the time field.
    CaptureCurrentTime,
    /// Raw text typed into the time field; sanitized on arrival.
    EditTime {
        raw: String,
    },
    EditDescription {
        text: String,
    },
    /// Turns the time and description fields into a timestamp.
    CommitTimestamp,
    RemoveTimestamp {
        id: TimestampId,
    },
    SeekToTimestamp {
        id: TimestampId,
    },
    /// Exports all timestamps to the clipboard.
    CopyTimestamps,
    SaveSession {
        path: PathBuf,
    },
    LoadSession {
        path: PathBuf,
    },
    /// Releases the player and stops position polling.
    Teardown,
}

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SessionChanged(SessionSnapshot),
    MetadataRequested { token: LoadToken, video_id: String },
    PositionChanged { position_seconds: u64 },
    /// Text to hand to the clipboard. Fire-and-forget.
    ClipboardWrite { text: String },
    SessionSaved { path: PathBuf },
    /// Transient success message for the user.
    Notice(String),
    Error(EngineErrorEvent),
}

/// Category of a user-facing error notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    InputValidation,
    UnsupportedFileType,
    NothingToExport,
    Other,
}

impl From<&EngineError> for EngineErrorKind {
    fn from(value: &EngineError) -> Self {
        match value {
            error if error.is_input_validation() => Self::InputValidation,
            EngineError::UnsupportedFileType { .. } => Self::UnsupportedFileType,
            EngineError::NothingToExport => Self::NothingToExport,
            _ => Self::Other,
        }
    }
}

/// User-facing error payload emitted as an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineErrorEvent {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineErrorEvent {
    pub fn from_error(error: &EngineError) -> Self {
        Self {
            kind: EngineErrorKind::from(error),
            message: error.to_string(),
        }
    }
}

/// Immutable session snapshot consumed by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub source: Option<SourceDescriptor>,
    pub metadata: Option<VideoMetadata>,
    pub loading: bool,
    pub player_ready: bool,
    pub playing: bool,
    /// `0` until the player reports a real duration.
    pub duration_seconds: u64,
    pub position_seconds: u64,
    pub time_input: String,
    pub description_input: String,
    /// Timestamps in display order.
    pub timestamps: Vec<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingLoad {
    token: LoadToken,
    video_id: String,
}

/// Edit and playback state of the current video.
#[derive(Debug, Clone, Default)]
struct Session {
    ledger: Ledger,
    metadata: Option<VideoMetadata>,
    pending_load: Option<PendingLoad>,
    playing: bool,
    duration_seconds: u64,
    position_seconds: u64,
    time_input: String,
    description_input: String,
}

impl Session {
    fn reset_for_new_video(&mut self, metadata: Option<VideoMetadata>) {
        self.ledger.clear();
        self.metadata = metadata;
        self.playing = false;
        self.duration_seconds = 0;
        self.position_seconds = 0;
        self.time_input.clear();
        self.description_input.clear();
    }
}

/// State container applying commands for one video at a time.
#[derive(Debug)]
pub struct Engine<B> {
    backend: B,
    settings: Settings,
    session: Session,
    source: Option<VideoSource>,
    ticker: Option<PlaybackTicker>,
    tick_sender: Option<SyncSender<Command>>,
    next_load_token: u64,
}

impl<B> Engine<B>
where
    B: PlayerBackend,
{
    /// Creates an engine with default settings.
    pub fn new(backend: B) -> Self {
        Self::with_settings(backend, Settings::default())
    }

    pub fn with_settings(backend: B, settings: Settings) -> Self {
        Self {
            backend,
            settings,
            session: Session::default(),
            source: None,
            ticker: None,
            tick_sender: None,
            next_load_token: 1,
        }
    }

    /// Channel the playback ticker posts [`Command::PollPosition`] into.
    ///
    /// Without one, playback position only updates on explicit commands.
    pub fn attach_tick_sender(&mut self, sender: SyncSender<Command>) {
        self.tick_sender = Some(sender);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ledger(&self) -> &Ledger {
        &self.session.ledger
    }

    /// Whether a playback ticker is currently running.
    pub fn ticker_active(&self) -> bool {
        self.ticker.is_some()
    }

    /// Applies one command and returns emitted events.
    pub fn handle_command(&mut self, command: Command) -> Result<Vec<Event>> {
        match command {
            Command::LoadUrl { url } => self.load_url(&url),
            Command::MetadataResolved { token, metadata } => {
                self.resolve_metadata(token, metadata)
            }
            Command::OpenLocalFile { path, content_type } => {
                self.open_local_file(path, content_type)
            }
            Command::PlayerReady => self.player_ready(),
            Command::PlayerStateChanged { playing } => self.player_state_changed(playing),
            Command::PollPosition => self.poll_position(),
            Command::Play => Ok(self.with_ready_source("play", |source| source.play())),
            Command::Pause => Ok(self.with_ready_source("pause", |source| source.pause())),
            Command::SeekTo { seconds } => self.seek_to(seconds),
            Command::CaptureCurrentTime => self.capture_current_time(),
            Command::EditTime { raw } => self.edit_time(&raw),
            Command::EditDescription { text } => {
                self.session.description_input = text;
                Ok(vec![self.session_changed()])
            }
            Command::CommitTimestamp => self.commit_timestamp(),
            Command::RemoveTimestamp { id } => self.remove_timestamp(id),
            Command::SeekToTimestamp { id } => self.seek_to_timestamp(id),
            Command::CopyTimestamps => self.copy_timestamps(),
            Command::SaveSession { path } => self.save_session(path),
            Command::LoadSession { path } => self.load_session(path),
            Command::Teardown => Ok(self.teardown()),
        }
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            source: self.source.as_ref().map(VideoSource::descriptor),
            metadata: self.session.metadata.clone(),
            loading: self.session.pending_load.is_some(),
            player_ready: self.source.as_ref().is_some_and(|source| source.is_ready()),
            playing: self.session.playing,
            duration_seconds: self.session.duration_seconds,
            position_seconds: self.session.position_seconds,
            time_input: self.session.time_input.clone(),
            description_input: self.session.description_input.clone(),
            timestamps: self.session.ledger.sorted_view(),
        }
    }

    fn load_url(&mut self, url: &str) -> Result<Vec<Event>> {
        let video_id = parse_video_url(url).inspect_err(|error| {
            warn!(%error, "load rejected");
        })?;
        let token = self.allocate_load_token();
        let pending = PendingLoad {
            token,
            video_id: video_id.clone(),
        };
        if let Some(previous) = self.session.pending_load.replace(pending) {
            debug!(
                superseded_token = previous.token.0,
                token = token.0,
                "pending metadata load superseded"
            );
        }

        info!(token = token.0, %video_id, "metadata load requested");
        Ok(vec![
            Event::MetadataRequested { token, video_id },
            self.session_changed(),
        ])
    }

    fn resolve_metadata(&mut self, token: LoadToken, metadata: VideoMetadata) -> Result<Vec<Event>> {
        let Some(pending) = self
            .session
            .pending_load
            .take_if(|pending| pending.token == token)
        else {
            debug!(token = token.0, "stale metadata response dropped");
            return Ok(Vec::new());
        };

        let widget = self.backend.open_remote(&pending.video_id);
        info!(
            token = token.0,
            video_id = %pending.video_id,
            title = %metadata.title,
            "remote video opened"
        );
        self.replace_source(
            VideoSource::Remote {
                video_id: pending.video_id,
                widget,
            },
            Some(metadata),
        );
        Ok(vec![self.session_changed()])
    }

    fn open_local_file(&mut self, path: PathBuf, content_type: String) -> Result<Vec<Event>> {
        let media = LocalMedia::new(path, content_type).inspect_err(|error| {
            warn!(%error, "local file rejected");
        })?;
        let element = self.backend.open_local(&media);
        let metadata = VideoMetadata {
            title: media.display_name(),
            author: None,
            thumbnail_url: None,
        };
        if let Some(pending) = self.session.pending_load.take() {
            debug!(token = pending.token.0, "pending metadata load cancelled by local file");
        }

        info!(path = ?media.path(), content_type = media.content_type(), "local video opened");
        self.replace_source(VideoSource::Local { media, element }, Some(metadata));
        Ok(vec![self.session_changed()])
    }

    fn replace_source(&mut self, source: VideoSource, metadata: Option<VideoMetadata>) {
        self.stop_ticker();
        if let Some(mut previous) = self.source.take() {
            previous.pause();
        }
        self.session.reset_for_new_video(metadata);
        if source.is_ready() {
            self.session.duration_seconds = whole_seconds(source.duration());
        }
        self.source = Some(source);
    }

    fn player_ready(&mut self) -> Result<Vec<Event>> {
        let Some(source) = self.source.as_ref() else {
            debug!("player ready ignored: no source loaded");
            return Ok(Vec::new());
        };
        self.session.duration_seconds = whole_seconds(source.duration());
        info!(
            duration_seconds = self.session.duration_seconds,
            "player ready"
        );
        Ok(vec![self.session_changed()])
    }

    fn player_state_changed(&mut self, playing: bool) -> Result<Vec<Event>> {
        if self.source.is_none() {
            debug!(playing, "player state ignored: no source loaded");
            return Ok(Vec::new());
        }

        self.session.playing = playing;
        if playing {
            self.start_ticker();
        } else {
            self.stop_ticker();
        }
        self.refresh_position();
        debug!(playing, ticker_active = self.ticker.is_some(), "player state changed");
        Ok(vec![self.session_changed()])
    }

    fn poll_position(&mut self) -> Result<Vec<Event>> {
        if !self.session.playing {
            return Ok(Vec::new());
        }
        if !self.refresh_position() {
            return Ok(Vec::new());
        }
        Ok(vec![Event::PositionChanged {
            position_seconds: self.session.position_seconds,
        }])
    }

    fn seek_to(&mut self, seconds: f64) -> Result<Vec<Event>> {
        let target = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        let allow_seek_ahead = self.settings.allow_seek_ahead;
        let Some(source) = self.ready_source() else {
            debug!(seconds, "seek ignored: player not ready");
            return Ok(Vec::new());
        };
        source.seek_to(target, allow_seek_ahead);

        self.session.position_seconds = self.bounded_position(whole_seconds(target));
        Ok(vec![self.session_changed()])
    }

    fn capture_current_time(&mut self) -> Result<Vec<Event>> {
        if !self.refresh_position() {
            debug!("capture ignored: player not ready");
            return Ok(Vec::new());
        }
        self.session.time_input = format_seconds(self.session.position_seconds);
        debug!(time = %self.session.time_input, "current time captured");
        Ok(vec![self.session_changed()])
    }

    fn edit_time(&mut self, raw: &str) -> Result<Vec<Event>> {
        let bound = if self.settings.clamp_to_duration {
            self.session.duration_seconds
        } else {
            0
        };
        self.session.time_input = sanitize_live_input(raw, bound);
        Ok(vec![self.session_changed()])
    }

    fn commit_timestamp(&mut self) -> Result<Vec<Event>> {
        let timestamp = self
            .session
            .ledger
            .add(&self.session.time_input, &self.session.description_input)?;
        self.session.time_input.clear();
        self.session.description_input.clear();

        info!(
            id = timestamp.id().0,
            seconds = timestamp.seconds(),
            entry_count = self.session.ledger.len(),
            "timestamp committed"
        );
        Ok(vec![
            self.session_changed(),
            Event::Notice(format!("Added {}", timestamp.export_line())),
        ])
    }

    fn remove_timestamp(&mut self, id: TimestampId) -> Result<Vec<Event>> {
        if !self.session.ledger.remove(id) {
            return Ok(Vec::new());
        }
        info!(
            id = id.0,
            entry_count = self.session.ledger.len(),
            "timestamp removed"
        );
        Ok(vec![self.session_changed()])
    }

    fn seek_to_timestamp(&mut self, id: TimestampId) -> Result<Vec<Event>> {
        let seconds = self
            .session
            .ledger
            .get(id)
            .map(Timestamp::seconds)
            .ok_or(EngineError::TimestampNotFound { id: id.0 })?;
        let allow_seek_ahead = self.settings.allow_seek_ahead;
        let play_after_seek = self.settings.play_after_seek;

        let Some(source) = self.ready_source() else {
            debug!(id = id.0, "seek to timestamp ignored: player not ready");
            return Ok(Vec::new());
        };
        source.seek_to(seconds as f64, allow_seek_ahead);
        if play_after_seek {
            source.play();
        }

        self.session.position_seconds = self.bounded_position(seconds);
        debug!(id = id.0, seconds, play_after_seek, "seeked to timestamp");
        Ok(vec![self.session_changed()])
    }

    fn copy_timestamps(&mut self) -> Result<Vec<Event>> {
        let payload = build_export_text(&self.session.ledger)?;
        info!(lines = payload.line_count, "timestamps exported");
        Ok(vec![
            Event::ClipboardWrite { text: payload.text },
            Event::Notice(format!("Copied {} timestamps", payload.line_count)),
        ])
    }

    fn save_session(&mut self, path: PathBuf) -> Result<Vec<Event>> {
        let source = self.source.as_ref().map(VideoSource::descriptor);
        SessionFile::from_ledger(&self.session.ledger, source).save(&path)?;
        Ok(vec![Event::SessionSaved { path }])
    }

    fn load_session(&mut self, path: PathBuf) -> Result<Vec<Event>> {
        let file = SessionFile::load(&path)?;
        let recorded = file.source.clone();
        let count = file.restore_into(&mut self.session.ledger)?;
        info!(path = ?path, count, "session loaded");

        let mut events = vec![
            self.session_changed(),
            Event::Notice(format!("Loaded {count} timestamps")),
        ];
        let current = self.source.as_ref().map(VideoSource::descriptor);
        if let Some(recorded) = recorded.filter(|recorded| current.as_ref() != Some(recorded)) {
            warn!(%recorded, "session recorded for another video");
            events.push(Event::Notice(format!(
                "Session was recorded for {recorded}, not the open video"
            )));
        }
        Ok(events)
    }

    fn teardown(&mut self) -> Vec<Event> {
        self.stop_ticker();
        if let Some(mut source) = self.source.take() {
            source.pause();
        }
        self.tick_sender = None;
        self.session.pending_load = None;
        self.session.playing = false;
        info!("session torn down");
        vec![self.session_changed()]
    }

    fn start_ticker(&mut self) {
        self.stop_ticker();
        let Some(sender) = self.tick_sender.clone() else {
            debug!("no tick sender attached, position is not polled");
            return;
        };

        let interval = self.settings.poll_interval();
        self.ticker = Some(PlaybackTicker::spawn(interval, move || {
            match sender.try_send(Command::PollPosition) {
                Ok(()) | Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Disconnected(_)) => false,
            }
        }));
        debug!(interval_ms = interval.as_millis() as u64, "playback ticker started");
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
            debug!("playback ticker cancelled");
        }
    }

    /// Reads position (and a still-unknown duration) from a ready player.
    fn refresh_position(&mut self) -> bool {
        let Some(source) = self.source.as_ref().filter(|source| source.is_ready()) else {
            return false;
        };
        let position = whole_seconds(source.current_time());
        if self.session.duration_seconds == 0 {
            self.session.duration_seconds = whole_seconds(source.duration());
        }
        self.session.position_seconds = position;
        true
    }

    fn ready_source(&mut self) -> Option<&mut VideoSource> {
        self.source.as_mut().filter(|source| source.is_ready())
    }

    /// Runs `action` on a ready player; otherwise a logged no-op.
    fn with_ready_source<F>(&mut self, operation: &'static str, action: F) -> Vec<Event>
    where
        F: FnOnce(&mut VideoSource),
    {
        match self.ready_source() {
            Some(source) => action(source),
            None => debug!(operation, "ignored: player not ready"),
        }
        Vec::new()
    }

    fn bounded_position(&self, seconds: u64) -> u64 {
        match self.session.duration_seconds {
            0 => seconds,
            duration => seconds.min(duration),
        }
    }

    fn session_changed(&self) -> Event {
        Event::SessionChanged(self.snapshot())
    }

    fn allocate_load_token(&mut self) -> LoadToken {
        let token = LoadToken(self.next_load_token);
        self.next_load_token += 1;
        token
    }
}

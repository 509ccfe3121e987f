use std::path::PathBuf;

use stamp_engine::{Command, EngineErrorKind, Event, SessionSnapshot, TimestampId};

use crate::widgets::player_bar::{self, PlayerBarInteraction, PlayerBarRenderModel};
use crate::widgets::timestamp_list::{self, TimestampListInteraction, TimestampRow};

/// Signals raised by the embedded player itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetSignal {
    Ready,
    StateChanged { playing: bool },
}

/// UI message consumed by update.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Engine(Event),
    Widget(WidgetSignal),
    UrlChanged(String),
    UrlSubmitted,
    FileSelected { path: PathBuf, content_type: String },
    TimeTyped(String),
    DescriptionTyped(String),
    CaptureRequested,
    CommitRequested,
    CopyRequested,
    SaveRequested(PathBuf),
    LoadRequested(PathBuf),
    PlayerBar(PlayerBarInteraction),
    TimestampList(TimestampListInteraction),
}

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient message shown to the user until replaced or dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// UI state for the timestamp editor screen.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    snapshot: SessionSnapshot,
    url_input: String,
    notice: Option<Notice>,
    clipboard: Option<String>,
}

impl AppState {
    /// Creates an empty app state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one UI message and returns outgoing engine commands.
    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::Engine(event) => {
                self.apply_engine_event(event);
                Vec::new()
            }
            Message::Widget(WidgetSignal::Ready) => vec![Command::PlayerReady],
            Message::Widget(WidgetSignal::StateChanged { playing }) => {
                vec![Command::PlayerStateChanged { playing }]
            }
            Message::UrlChanged(url) => {
                self.url_input = url;
                Vec::new()
            }
            Message::UrlSubmitted => vec![Command::LoadUrl {
                url: self.url_input.clone(),
            }],
            Message::FileSelected { path, content_type } => {
                vec![Command::OpenLocalFile { path, content_type }]
            }
            Message::TimeTyped(raw) => vec![Command::EditTime { raw }],
            Message::DescriptionTyped(text) => vec![Command::EditDescription { text }],
            Message::CaptureRequested => vec![Command::CaptureCurrentTime],
            Message::CommitRequested => vec![Command::CommitTimestamp],
            Message::CopyRequested => vec![Command::CopyTimestamps],
            Message::SaveRequested(path) => vec![Command::SaveSession { path }],
            Message::LoadRequested(path) => vec![Command::LoadSession { path }],
            Message::PlayerBar(PlayerBarInteraction::Scrubbed(seconds)) => {
                vec![Command::SeekTo { seconds }]
            }
            Message::PlayerBar(PlayerBarInteraction::PlayPressed) => vec![Command::Play],
            Message::PlayerBar(PlayerBarInteraction::PausePressed) => vec![Command::Pause],
            Message::TimestampList(TimestampListInteraction::JumpRequested(id)) => {
                vec![Command::SeekToTimestamp { id }]
            }
            Message::TimestampList(TimestampListInteraction::RemoveRequested(id)) => {
                vec![Command::RemoveTimestamp { id }]
            }
        }
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Hands the pending clipboard payload to the host, once.
    pub fn take_clipboard(&mut self) -> Option<String> {
        self.clipboard.take()
    }

    /// Returns render rows for the timestamp list.
    pub fn timestamp_rows(&self) -> Vec<TimestampRow> {
        timestamp_list::build_rows(&self.snapshot)
    }

    /// Returns render data for the progress bar.
    pub fn player_bar_render_model(&self, width_px: f32) -> PlayerBarRenderModel {
        player_bar::build_render_model(&self.snapshot, width_px)
    }

    /// Finds the id of the `index`-th row in display order.
    pub fn timestamp_id_at(&self, index: usize) -> Option<TimestampId> {
        self.snapshot.timestamps.get(index).map(|timestamp| timestamp.id())
    }

    fn apply_engine_event(&mut self, event: Event) {
        match event {
            Event::SessionChanged(snapshot) => {
                self.snapshot = snapshot;
            }
            Event::PositionChanged { position_seconds } => {
                self.snapshot.position_seconds = position_seconds;
            }
            Event::ClipboardWrite { text } => {
                self.clipboard = Some(text);
            }
            Event::Notice(message) => {
                self.notice = Some(Notice {
                    level: NoticeLevel::Info,
                    message,
                });
            }
            Event::SessionSaved { path } => {
                self.notice = Some(Notice {
                    level: NoticeLevel::Info,
                    message: format!("Saved session to {}", path.display()),
                });
            }
            Event::Error(error) => {
                let level = match error.kind {
                    EngineErrorKind::NothingToExport => NoticeLevel::Warning,
                    _ => NoticeLevel::Error,
                };
                self.notice = Some(Notice {
                    level,
                    message: error.message,
                });
            }
            Event::MetadataRequested { .. } => {}
        }
    }
}

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stamp_engine::{
    Command, Engine, EngineError, EngineErrorEvent, EngineErrorKind, Event, LoadToken,
    LocalMedia, MetadataProvider, PlaybackControl, PlayerBackend, SessionSnapshot, Settings,
    SourceDescriptor, StubMetadataProvider,
};

#[derive(Debug, Default)]
struct PlayerState {
    ready: bool,
    current_time: f64,
    duration: f64,
    seeks: Vec<(f64, bool)>,
    plays: usize,
    pauses: usize,
}

type SharedState = Arc<Mutex<PlayerState>>;

struct FakePlayer {
    state: SharedState,
}

impl PlaybackControl for FakePlayer {
    fn is_ready(&self) -> bool {
        self.state.lock().expect("state lock").ready
    }

    fn current_time(&self) -> f64 {
        self.state.lock().expect("state lock").current_time
    }

    fn duration(&self) -> f64 {
        self.state.lock().expect("state lock").duration
    }

    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) {
        let mut state = self.state.lock().expect("state lock");
        state.seeks.push((seconds, allow_seek_ahead));
        state.current_time = seconds;
    }

    fn play(&mut self) {
        self.state.lock().expect("state lock").plays += 1;
    }

    fn pause(&mut self) {
        self.state.lock().expect("state lock").pauses += 1;
    }
}

#[derive(Debug, Default)]
struct FakeBackend {
    state: SharedState,
    opened: Arc<Mutex<Vec<String>>>,
}

impl FakeBackend {
    fn ready_with_duration(duration: f64) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock().expect("state lock");
            state.ready = true;
            state.duration = duration;
        }
        backend
    }
}

impl PlayerBackend for FakeBackend {
    fn open_remote(&mut self, video_id: &str) -> Box<dyn PlaybackControl> {
        self.opened
            .lock()
            .expect("opened lock")
            .push(format!("remote:{video_id}"));
        Box::new(FakePlayer {
            state: Arc::clone(&self.state),
        })
    }

    fn open_local(&mut self, media: &LocalMedia) -> Box<dyn PlaybackControl> {
        self.opened
            .lock()
            .expect("opened lock")
            .push(format!("local:{}", media.path().display()));
        Box::new(FakePlayer {
            state: Arc::clone(&self.state),
        })
    }
}

fn last_snapshot(events: &[Event]) -> SessionSnapshot {
    events
        .iter()
        .rev()
        .find_map(|event| match event {
            Event::SessionChanged(snapshot) => Some(snapshot.clone()),
            _ => None,
        })
        .expect("events should contain a snapshot")
}

fn requested_token(events: &[Event]) -> LoadToken {
    events
        .iter()
        .find_map(|event| match event {
            Event::MetadataRequested { token, .. } => Some(*token),
            _ => None,
        })
        .expect("events should contain a metadata request")
}

fn load_remote(engine: &mut Engine<FakeBackend>, url: &str) {
    let events = engine
        .handle_command(Command::LoadUrl {
            url: url.to_owned(),
        })
        .expect("load url");
    let token = requested_token(&events);
    let video_id = match &events[0] {
        Event::MetadataRequested { video_id, .. } => video_id.clone(),
        other => panic!("unexpected event {other:?}"),
    };
    engine
        .handle_command(Command::MetadataResolved {
            token,
            metadata: StubMetadataProvider.fetch(&video_id),
        })
        .expect("resolve metadata");
    engine
        .handle_command(Command::PlayerReady)
        .expect("player ready");
}

fn commit(engine: &mut Engine<FakeBackend>, time: &str, description: &str) -> Vec<Event> {
    engine
        .handle_command(Command::EditTime {
            raw: time.to_owned(),
        })
        .expect("edit time");
    engine
        .handle_command(Command::EditDescription {
            text: description.to_owned(),
        })
        .expect("edit description");
    engine
        .handle_command(Command::CommitTimestamp)
        .expect("commit")
}

#[test]
fn committed_timestamps_are_copied_in_time_order() {
    let mut engine = Engine::new(FakeBackend::ready_with_duration(300.0));
    load_remote(&mut engine, "https://youtu.be/dQw4w9WgXcQ");

    commit(&mut engine, "1:05", "Intro");
    let events = commit(&mut engine, "0:30", "Hook");
    let snapshot = last_snapshot(&events);
    assert_eq!(snapshot.timestamps.len(), 2);
    assert!(snapshot.time_input.is_empty());
    assert!(snapshot.description_input.is_empty());

    let events = engine
        .handle_command(Command::CopyTimestamps)
        .expect("copy");
    assert_eq!(
        events[0],
        Event::ClipboardWrite {
            text: "0:30 - Hook\n1:05 - Intro".to_owned()
        }
    );
}

#[test]
fn stale_metadata_response_is_dropped() {
    let backend = FakeBackend::ready_with_duration(120.0);
    let opened = Arc::clone(&backend.opened);
    let mut engine = Engine::new(backend);

    let first = engine
        .handle_command(Command::LoadUrl {
            url: "https://youtu.be/aaaaaaaaaaa".to_owned(),
        })
        .expect("first load");
    let second = engine
        .handle_command(Command::LoadUrl {
            url: "https://youtu.be/bbbbbbbbbbb".to_owned(),
        })
        .expect("second load");
    let first_token = requested_token(&first);
    let second_token = requested_token(&second);
    assert_ne!(first_token, second_token);

    let stale = engine
        .handle_command(Command::MetadataResolved {
            token: first_token,
            metadata: StubMetadataProvider.fetch("aaaaaaaaaaa"),
        })
        .expect("stale response");
    assert!(stale.is_empty());
    assert!(engine.snapshot().source.is_none());
    assert!(engine.snapshot().loading);

    engine
        .handle_command(Command::MetadataResolved {
            token: second_token,
            metadata: StubMetadataProvider.fetch("bbbbbbbbbbb"),
        })
        .expect("current response");

    let snapshot = engine.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(
        snapshot.source,
        Some(SourceDescriptor::Remote {
            video_id: "bbbbbbbbbbb".to_owned()
        })
    );
    assert_eq!(
        *opened.lock().expect("opened lock"),
        vec!["remote:bbbbbbbbbbb".to_owned()]
    );
}

#[test]
fn invalid_urls_are_reported_as_input_validation() {
    let mut engine = Engine::new(FakeBackend::default());

    let empty = engine
        .handle_command(Command::LoadUrl { url: String::new() })
        .expect_err("empty url");
    let invalid = engine
        .handle_command(Command::LoadUrl {
            url: "https://example.com/not-youtube".to_owned(),
        })
        .expect_err("invalid url");

    assert!(matches!(empty, EngineError::EmptyUrl));
    assert_eq!(
        EngineErrorEvent::from_error(&invalid).kind,
        EngineErrorKind::InputValidation
    );
}

#[test]
fn controls_are_ignored_until_player_is_ready() {
    let backend = FakeBackend::default();
    let state = Arc::clone(&backend.state);
    let mut engine = Engine::new(backend);
    engine
        .handle_command(Command::OpenLocalFile {
            path: PathBuf::from("clip.mp4"),
            content_type: "video/mp4".to_owned(),
        })
        .expect("open local");

    assert!(engine.handle_command(Command::Play).expect("play").is_empty());
    assert!(
        engine
            .handle_command(Command::SeekTo { seconds: 10.0 })
            .expect("seek")
            .is_empty()
    );
    assert!(
        engine
            .handle_command(Command::CaptureCurrentTime)
            .expect("capture")
            .is_empty()
    );

    let state = state.lock().expect("state lock");
    assert_eq!(state.plays, 0);
    assert!(state.seeks.is_empty());
}

#[test]
fn unsupported_local_files_are_rejected() {
    let mut engine = Engine::new(FakeBackend::default());

    let error = engine
        .handle_command(Command::OpenLocalFile {
            path: PathBuf::from("song.mp3"),
            content_type: "audio/mpeg".to_owned(),
        })
        .expect_err("audio rejected");

    assert_eq!(
        EngineErrorEvent::from_error(&error).kind,
        EngineErrorKind::UnsupportedFileType
    );
    assert!(engine.snapshot().source.is_none());
}

#[test]
fn typed_time_is_clamped_once_duration_is_known() {
    let mut engine = Engine::new(FakeBackend::ready_with_duration(125.4));
    load_remote(&mut engine, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");

    let events = engine
        .handle_command(Command::EditTime {
            raw: "9:59".to_owned(),
        })
        .expect("edit time");

    let snapshot = last_snapshot(&events);
    assert_eq!(snapshot.duration_seconds, 125);
    assert_eq!(snapshot.time_input, "2:05");
}

#[test]
fn clamping_can_be_disabled_in_settings() {
    let settings = Settings {
        clamp_to_duration: false,
        ..Settings::default()
    };
    let mut engine = Engine::with_settings(FakeBackend::ready_with_duration(60.0), settings);
    load_remote(&mut engine, "https://youtu.be/dQw4w9WgXcQ");

    engine
        .handle_command(Command::EditTime {
            raw: "9:59".to_owned(),
        })
        .expect("edit time");

    assert_eq!(engine.snapshot().time_input, "9:59");
}

#[test]
fn capture_and_seek_use_the_ready_player() {
    let backend = FakeBackend::ready_with_duration(600.0);
    let state = Arc::clone(&backend.state);
    let settings = Settings {
        play_after_seek: true,
        ..Settings::default()
    };
    let mut engine = Engine::with_settings(backend, settings);
    load_remote(&mut engine, "https://youtu.be/dQw4w9WgXcQ");
    state.lock().expect("state lock").current_time = 95.8;

    let events = engine
        .handle_command(Command::CaptureCurrentTime)
        .expect("capture");
    assert_eq!(last_snapshot(&events).time_input, "1:35");

    engine
        .handle_command(Command::EditDescription {
            text: "Verse".to_owned(),
        })
        .expect("description");
    engine
        .handle_command(Command::CommitTimestamp)
        .expect("commit");
    let id = engine.snapshot().timestamps[0].id();
    state.lock().expect("state lock").current_time = 300.0;

    engine
        .handle_command(Command::SeekToTimestamp { id })
        .expect("seek to timestamp");

    {
        let state = state.lock().expect("state lock");
        assert_eq!(state.seeks, vec![(95.0, true)]);
        assert_eq!(state.plays, 1);
    }
    assert_eq!(engine.snapshot().position_seconds, 95);
}

#[test]
fn commit_errors_keep_the_typed_input() {
    let mut engine = Engine::new(FakeBackend::ready_with_duration(600.0));
    load_remote(&mut engine, "https://youtu.be/dQw4w9WgXcQ");
    engine
        .handle_command(Command::EditTime {
            raw: "1:30".to_owned(),
        })
        .expect("edit time");

    let error = engine
        .handle_command(Command::CommitTimestamp)
        .expect_err("description missing");

    assert!(matches!(error, EngineError::EmptyDescription));
    assert_eq!(engine.snapshot().time_input, "1:30");
    assert!(engine.ledger().is_empty());
}

#[test]
fn removing_twice_only_changes_state_once() {
    let mut engine = Engine::new(FakeBackend::ready_with_duration(600.0));
    load_remote(&mut engine, "https://youtu.be/dQw4w9WgXcQ");
    commit(&mut engine, "0:10", "only");
    let id = engine.snapshot().timestamps[0].id();

    let first = engine
        .handle_command(Command::RemoveTimestamp { id })
        .expect("first remove");
    let second = engine
        .handle_command(Command::RemoveTimestamp { id })
        .expect("second remove");

    assert_eq!(last_snapshot(&first).timestamps.len(), 0);
    assert!(second.is_empty());
}

#[test]
fn copying_an_empty_ledger_is_blocked() {
    let mut engine = Engine::new(FakeBackend::ready_with_duration(600.0));

    let error = engine
        .handle_command(Command::CopyTimestamps)
        .expect_err("nothing to copy");

    assert_eq!(
        EngineErrorEvent::from_error(&error).kind,
        EngineErrorKind::NothingToExport
    );
}

#[test]
fn loading_another_video_starts_a_fresh_ledger() {
    let mut engine = Engine::new(FakeBackend::ready_with_duration(600.0));
    load_remote(&mut engine, "https://youtu.be/dQw4w9WgXcQ");
    commit(&mut engine, "0:10", "first video");

    load_remote(&mut engine, "https://youtu.be/bbbbbbbbbbb");

    assert!(engine.snapshot().timestamps.is_empty());
}

#[test]
fn playing_runs_exactly_one_position_ticker() {
    let backend = FakeBackend::ready_with_duration(600.0);
    let state = Arc::clone(&backend.state);
    let settings = Settings {
        poll_interval_ms: 10,
        ..Settings::default()
    };
    let mut engine = Engine::with_settings(backend, settings);
    let (tick_tx, tick_rx) = mpsc::sync_channel::<Command>(4);
    engine.attach_tick_sender(tick_tx);
    load_remote(&mut engine, "https://youtu.be/dQw4w9WgXcQ");

    engine
        .handle_command(Command::PlayerStateChanged { playing: true })
        .expect("playing");
    engine
        .handle_command(Command::PlayerStateChanged { playing: true })
        .expect("playing again");
    assert!(engine.ticker_active());

    let tick = tick_rx
        .recv_timeout(Duration::from_secs(1))
        .expect("tick while playing");
    assert_eq!(tick, Command::PollPosition);

    state.lock().expect("state lock").current_time = 42.3;
    let events = engine.handle_command(tick).expect("poll");
    assert_eq!(
        events,
        vec![Event::PositionChanged {
            position_seconds: 42
        }]
    );

    engine
        .handle_command(Command::PlayerStateChanged { playing: false })
        .expect("paused");
    assert!(!engine.ticker_active());
    while tick_rx.try_recv().is_ok() {}
    assert!(tick_rx.recv_timeout(Duration::from_millis(50)).is_err());
    assert!(
        engine
            .handle_command(Command::PollPosition)
            .expect("poll while paused")
            .is_empty()
    );
}

#[test]
fn teardown_cancels_ticker_and_releases_player() {
    let backend = FakeBackend::ready_with_duration(600.0);
    let state = Arc::clone(&backend.state);
    let mut engine = Engine::new(backend);
    let (tick_tx, _tick_rx) = mpsc::sync_channel::<Command>(4);
    engine.attach_tick_sender(tick_tx);
    load_remote(&mut engine, "https://youtu.be/dQw4w9WgXcQ");
    engine
        .handle_command(Command::PlayerStateChanged { playing: true })
        .expect("playing");

    let events = engine.handle_command(Command::Teardown).expect("teardown");

    assert!(!engine.ticker_active());
    assert!(last_snapshot(&events).source.is_none());
    assert_eq!(state.lock().expect("state lock").pauses, 1);
}

#[test]
fn sessions_round_trip_through_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    let mut engine = Engine::new(FakeBackend::ready_with_duration(600.0));
    load_remote(&mut engine, "https://youtu.be/dQw4w9WgXcQ");
    commit(&mut engine, "1:05", "Intro");
    commit(&mut engine, "0:30", "Hook");

    let saved = engine
        .handle_command(Command::SaveSession { path: path.clone() })
        .expect("save");
    assert_eq!(saved, vec![Event::SessionSaved { path: path.clone() }]);

    let mut restored = Engine::new(FakeBackend::ready_with_duration(600.0));
    restored
        .handle_command(Command::LoadSession { path })
        .expect("load");

    assert_eq!(restored.ledger().export_text(), "0:30 - Hook\n1:05 - Intro");
}

#[test]
fn loading_a_session_for_another_video_warns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    let mut engine = Engine::new(FakeBackend::ready_with_duration(600.0));
    load_remote(&mut engine, "https://youtu.be/dQw4w9WgXcQ");
    commit(&mut engine, "0:30", "Hook");
    engine
        .handle_command(Command::SaveSession { path: path.clone() })
        .expect("save");

    let same = engine
        .handle_command(Command::LoadSession { path: path.clone() })
        .expect("load into same video");
    assert!(!same.iter().any(|event| matches!(
        event,
        Event::Notice(message) if message.contains("recorded for")
    )));

    load_remote(&mut engine, "https://youtu.be/9bZkp7q19f0");
    let other = engine
        .handle_command(Command::LoadSession { path })
        .expect("load into other video");

    assert!(other.iter().any(|event| matches!(
        event,
        Event::Notice(message) if message.contains("YouTube video dQw4w9WgXcQ")
    )));
    assert_eq!(engine.ledger().export_text(), "0:30 - Hook");
}

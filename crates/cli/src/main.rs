mod player;
mod repl;

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use clipboard_rs::{Clipboard, ClipboardContext};
use stamp_app::widgets::player_bar::PlayerBarInteraction;
use stamp_app::widgets::timestamp_list::TimestampListInteraction;
use stamp_app::{AppState, EngineBridge, Message, NoticeLevel, WidgetSignal, spawn_engine_bridge};
use stamp_engine::{Engine, Settings, SourceDescriptor, StubMetadataProvider};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use player::SimulatedBackend;
use repl::{HELP, ReplCommand};

const QUIET_WINDOW: Duration = Duration::from_millis(150);
const MAX_PUMP_TIME: Duration = Duration::from_secs(2);
const BAR_WIDTH: usize = 30;

/// Collect timestamps for a video and copy them as a chapter list.
#[derive(Parser, Debug)]
#[command(name = "stamp", version, about, long_about = None)]
struct Cli {
    /// Path to a JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Session file restored at startup
    #[arg(long)]
    session: Option<PathBuf>,

    /// Length reported by the simulated player, in seconds
    #[arg(long, default_value_t = 600.0)]
    duration: f64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "stamp failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    info!(
        poll_interval_ms = settings.poll_interval_ms,
        clamp_to_duration = settings.clamp_to_duration,
        "settings loaded"
    );

    let engine = Engine::with_settings(SimulatedBackend::new(cli.duration), settings);
    let mut shell = Shell::new(spawn_engine_bridge(engine, StubMetadataProvider));

    if let Some(path) = &cli.session {
        shell.dispatch(Message::LoadRequested(path.clone()))?;
    }
    println!("{HELP}");
    prompt()?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        shell.pump_pending()?;
        match repl::parse_line(&line) {
            Ok(None) => {}
            Ok(Some(ReplCommand::Quit)) => break,
            Ok(Some(command)) => shell.execute(command)?,
            Err(err) => println!("{err}"),
        }
        prompt()?;
    }

    shell.finish();
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("stamp> ");
    io::stdout().flush()
}

/// Terminal host for the app state: feeds messages in, pumps engine events
/// back, and performs the side effects a GUI shell would.
struct Shell {
    app: AppState,
    bridge: EngineBridge,
    last_source: Option<SourceDescriptor>,
}

impl Shell {
    fn new(bridge: EngineBridge) -> Self {
        Self {
            app: AppState::new(),
            bridge,
            last_source: None,
        }
    }

    fn execute(&mut self, command: ReplCommand) -> Result<(), Box<dyn Error>> {
        match command {
            ReplCommand::Load(url) => {
                self.app.update(Message::UrlChanged(url));
                self.dispatch(Message::UrlSubmitted)?;
            }
            ReplCommand::Open(path) => {
                let content_type = repl::infer_content_type(&path);
                self.dispatch(Message::FileSelected { path, content_type })?;
            }
            ReplCommand::Play => self.set_playing(true)?,
            ReplCommand::Pause => self.set_playing(false)?,
            ReplCommand::Seek(seconds) => {
                self.dispatch(Message::PlayerBar(PlayerBarInteraction::Scrubbed(seconds)))?;
            }
            ReplCommand::Capture => self.dispatch(Message::CaptureRequested)?,
            ReplCommand::Time(raw) => self.dispatch(Message::TimeTyped(raw))?,
            ReplCommand::Description(text) => self.dispatch(Message::DescriptionTyped(text))?,
            ReplCommand::Add { time, description } => {
                if let Some(time) = time {
                    self.dispatch(Message::TimeTyped(time))?;
                }
                if let Some(description) = description {
                    self.dispatch(Message::DescriptionTyped(description))?;
                }
                self.dispatch(Message::CommitRequested)?;
            }
            ReplCommand::Remove(row) => {
                let Some(id) = self.app.timestamp_id_at(row - 1) else {
                    println!("no row {row}");
                    return Ok(());
                };
                self.dispatch(Message::TimestampList(
                    TimestampListInteraction::RemoveRequested(id),
                ))?;
            }
            ReplCommand::Jump(row) => {
                let Some(id) = self.app.timestamp_id_at(row - 1) else {
                    println!("no row {row}");
                    return Ok(());
                };
                self.dispatch(Message::TimestampList(
                    TimestampListInteraction::JumpRequested(id),
                ))?;
            }
            ReplCommand::List => {}
            ReplCommand::Copy => {
                self.dispatch(Message::CopyRequested)?;
                return Ok(());
            }
            ReplCommand::Save(path) => {
                self.dispatch(Message::SaveRequested(path))?;
                return Ok(());
            }
            ReplCommand::Restore(path) => self.dispatch(Message::LoadRequested(path))?,
            ReplCommand::Help => {
                println!("{HELP}");
                return Ok(());
            }
            ReplCommand::Quit => return Ok(()),
        }
        self.render();
        Ok(())
    }

    /// Presses play or pause and reports the resulting state change the way
    /// an embedded player would.
    fn set_playing(&mut self, playing: bool) -> Result<(), Box<dyn Error>> {
        let pressed = if playing {
            PlayerBarInteraction::PlayPressed
        } else {
            PlayerBarInteraction::PausePressed
        };
        self.dispatch(Message::PlayerBar(pressed))?;
        if self.app.snapshot().player_ready {
            self.dispatch(Message::Widget(WidgetSignal::StateChanged { playing }))?;
        }
        Ok(())
    }

    fn dispatch(&mut self, message: Message) -> Result<(), Box<dyn Error>> {
        for command in self.app.update(message) {
            self.bridge.send_command(command)?;
        }
        self.pump()
    }

    /// Applies events until the worker has been quiet for a short window.
    fn pump(&mut self) -> Result<(), Box<dyn Error>> {
        let deadline = Instant::now() + MAX_PUMP_TIME;
        while Instant::now() < deadline {
            match self.bridge.recv_event(QUIET_WINDOW)? {
                Some(event) => {
                    self.app.update(Message::Engine(event));
                }
                None => break,
            }
        }
        self.after_events()
    }

    /// Applies events that arrived while waiting for input.
    fn pump_pending(&mut self) -> Result<(), Box<dyn Error>> {
        for event in self.bridge.drain_events()? {
            self.app.update(Message::Engine(event));
        }
        self.after_events()
    }

    fn after_events(&mut self) -> Result<(), Box<dyn Error>> {
        if let Some(text) = self.app.take_clipboard() {
            match copy_to_clipboard(&text) {
                Ok(()) => info!(bytes = text.len(), "clipboard updated"),
                Err(err) => {
                    warn!(error = %err, "clipboard unavailable, printing instead");
                    println!("{text}");
                }
            }
        }

        if let Some(notice) = self.app.notice() {
            match notice.level {
                NoticeLevel::Info => println!("{}", notice.message),
                NoticeLevel::Warning => println!("warning: {}", notice.message),
                NoticeLevel::Error => println!("error: {}", notice.message),
            }
            self.app.dismiss_notice();
        }

        let source = self.app.snapshot().source.clone();
        if source != self.last_source {
            self.last_source = source;
            if self.last_source.is_some() {
                self.dispatch(Message::Widget(WidgetSignal::Ready))?;
            }
        }
        Ok(())
    }

    fn render(&self) {
        let snapshot = self.app.snapshot();
        match (&snapshot.metadata, &snapshot.source) {
            (Some(metadata), _) => println!("{}", metadata.title),
            (None, _) if snapshot.loading => println!("loading..."),
            (None, None) => println!("no video loaded"),
            (None, Some(_)) => {}
        }

        let bar = self.app.player_bar_render_model(BAR_WIDTH as f32);
        let filled = (bar.playhead_x.round() as usize).min(BAR_WIDTH);
        println!(
            "[{}{}] {} {}",
            "=".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            bar.label,
            if bar.playing { "playing" } else { "paused" }
        );
        println!(
            "time: {:?}  desc: {:?}",
            snapshot.time_input, snapshot.description_input
        );

        for (index, row) in self.app.timestamp_rows().iter().enumerate() {
            let marker = if row.is_current { '>' } else { ' ' };
            println!("{marker}{:>3}  {:>8}  {}", index + 1, row.time, row.description);
        }
    }

    fn finish(self) {
        let events = self.bridge.shutdown();
        info!(events = events.len(), "engine shut down");
    }
}

fn copy_to_clipboard(text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let ctx = ClipboardContext::new()?;
    ctx.set_text(text.to_owned())?;
    Ok(())
}

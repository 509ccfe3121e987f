use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use stamp_engine::{
    Command, Engine, EngineErrorEvent, Event, LoadToken, MetadataProvider, PlayerBackend,
};
use tracing::{debug, warn};

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const EVENT_CHANNEL_CAPACITY: usize = 64;
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_millis(10);

/// Channel-backed bridge between UI state and the engine worker thread.
#[derive(Debug)]
pub struct EngineBridge {
    command_tx: SyncSender<Command>,
    event_rx: Receiver<Event>,
    worker: Option<JoinHandle<()>>,
}

impl EngineBridge {
    /// Sends one command to the engine worker.
    pub fn send_command(&self, command: Command) -> Result<(), BridgeError> {
        self.command_tx
            .send(command)
            .map_err(|_| BridgeError::Disconnected)
    }

    /// Receives all currently queued events without blocking.
    pub fn drain_events(&self) -> Result<Vec<Event>, BridgeError> {
        let mut events = Vec::new();
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => return Ok(events),
                Err(TryRecvError::Disconnected) if events.is_empty() => {
                    return Err(BridgeError::Disconnected);
                }
                Err(TryRecvError::Disconnected) => return Ok(events),
            }
        }
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_event(&self, timeout: Duration) -> Result<Option<Event>, BridgeError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::Disconnected),
        }
    }

    /// Tears the session down and waits for the worker to exit.
    ///
    /// Returns the events emitted during teardown.
    pub fn shutdown(mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let mut teardown = Command::Teardown;
        // Keep draining while the command queue is full so a worker blocked
        // on a full event channel can make progress.
        loop {
            match self.command_tx.try_send(teardown) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => break,
                Err(TrySendError::Full(command)) => {
                    teardown = command;
                    match self.event_rx.recv_timeout(SHUTDOWN_DRAIN_TIMEOUT) {
                        Ok(event) => events.push(event),
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            }
        }
        events.extend(self.event_rx.iter());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("engine worker panicked");
            }
        }
        events
    }
}

impl Drop for EngineBridge {
    fn drop(&mut self) {
        if self.worker.is_some() {
            // The worker keeps a loopback sender, so it only stops on teardown
            // or once its event receiver is gone.
            let _ = self.command_tx.try_send(Command::Teardown);
        }
    }
}

/// Error raised by the UI-engine bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    Disconnected,
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "engine worker disconnected"),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Spawns the engine worker and wires metadata lookups and playback polling
/// back into its command channel.
pub fn spawn_engine_bridge<B, P>(mut engine: Engine<B>, provider: P) -> EngineBridge
where
    B: PlayerBackend + Send + 'static,
    P: MetadataProvider + Send + Sync + 'static,
{
    let (command_tx, command_rx) = mpsc::sync_channel::<Command>(COMMAND_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::sync_channel::<Event>(EVENT_CHANNEL_CAPACITY);
    let provider = Arc::new(provider);

    engine.attach_tick_sender(command_tx.clone());
    let loopback = command_tx.clone();

    let worker = thread::spawn(move || {
        debug!("engine worker started");
        while let Ok(command) = command_rx.recv() {
            let is_teardown = matches!(command, Command::Teardown);
            let events = match engine.handle_command(command) {
                Ok(events) => events,
                Err(error) => vec![Event::Error(EngineErrorEvent::from_error(&error))],
            };

            for event in events {
                if let Event::MetadataRequested { token, video_id } = &event {
                    resolve_metadata(Arc::clone(&provider), loopback.clone(), *token, video_id);
                }
                if event_tx.send(event).is_err() {
                    debug!("event receiver dropped, engine worker stopping");
                    let _ = engine.handle_command(Command::Teardown);
                    return;
                }
            }

            if is_teardown {
                break;
            }
        }
        debug!("engine worker stopped");
    });

    EngineBridge {
        command_tx,
        event_rx,
        worker: Some(worker),
    }
}

fn resolve_metadata<P>(
    provider: Arc<P>,
    loopback: SyncSender<Command>,
    token: LoadToken,
    video_id: &str,
) where
    P: MetadataProvider + Send + Sync + 'static,
{
    let video_id = video_id.to_owned();
    thread::spawn(move || {
        let metadata = provider.fetch(&video_id);
        if loopback
            .send(Command::MetadataResolved { token, metadata })
            .is_err()
        {
            debug!(token = token.0, "engine gone before metadata resolved");
        }
    });
}

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

/// Periodic callback running on its own thread until cancelled.
///
/// Dropping the handle cancels the ticker and waits for the worker to exit,
/// so no tick fires after the handle is gone. The callback must not block;
/// returning `false` stops the ticker early.
///
/// # Example
/// ```
/// use std::sync::mpsc;
/// use std::time::Duration;
///
/// use stamp_engine::ticker::PlaybackTicker;
///
/// let (tx, rx) = mpsc::channel();
/// let ticker = PlaybackTicker::spawn(Duration::from_millis(5), move || tx.send(()).is_ok());
/// rx.recv_timeout(Duration::from_secs(1)).expect("tick");
/// ticker.cancel();
/// ```
#[derive(Debug)]
pub struct PlaybackTicker {
    cancel_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl PlaybackTicker {
    pub fn spawn<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let worker = thread::spawn(move || {
            loop {
                match cancel_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if !on_tick() {
                            debug!("ticker stopped by callback");
                            return;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        });

        Self {
            cancel_tx: Some(cancel_tx),
            worker: Some(worker),
        }
    }

    /// Stops the ticker and waits for its thread.
    pub fn cancel(self) {
        drop(self);
    }

    fn stop(&mut self) {
        drop(self.cancel_tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for PlaybackTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::PlaybackTicker;

    #[test]
    fn ticks_until_cancelled() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let ticker = PlaybackTicker::spawn(Duration::from_millis(2), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        thread::sleep(Duration::from_millis(50));
        ticker.cancel();
        let after_cancel = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));

        assert!(after_cancel > 0);
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn callback_returning_false_stops_ticking() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let _ticker = PlaybackTicker::spawn(Duration::from_millis(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });

        thread::sleep(Duration::from_millis(30));

        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }
}

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::store::StoreEvent;

/// Unified event type consumed by the app runner
#[derive(Debug)]
pub enum QuizEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    Store(StoreEvent),
}

/// Source of events (keyboard, resize, storage completions)
pub trait QuizEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError>;

    /// Sender other producers (the store worker) can post into this queue with.
    fn sender(&self) -> Sender<QuizEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<QuizEvent>,
    rx: Receiver<QuizEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => QuizEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => QuizEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if input_tx.send(evt).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<QuizEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed event source for headless runs and tests
pub struct TestEventSource {
    tx: Sender<QuizEvent>,
    rx: Receiver<QuizEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<QuizEvent> {
        self.tx.clone()
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: QuizEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: QuizEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn sender(&self) -> Sender<QuizEvent> {
        self.event_source.sender()
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> QuizEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => QuizEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_returns_tick_on_timeout() {
        let es = TestEventSource::new();
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        assert!(matches!(runner.step(), QuizEvent::Tick));
    }

    #[test]
    fn step_passes_through_events() {
        let es = TestEventSource::new();
        let tx = es.sender();
        tx.send(QuizEvent::Resize).unwrap();
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(10)));

        assert!(matches!(runner.step(), QuizEvent::Resize));
    }

    #[test]
    fn store_events_share_the_queue() {
        let es = TestEventSource::new();
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(10)));
        runner
            .sender()
            .send(QuizEvent::Store(StoreEvent::Reset(Ok(()))))
            .unwrap();

        assert!(matches!(
            runner.step(),
            QuizEvent::Store(StoreEvent::Reset(Ok(())))
        ));
    }
}

use log::{error, info, warn};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use super::{ResultStore, StoreError, StoreProvider};
use crate::result::QuizResult;

#[derive(Debug, Clone)]
pub enum StoreRequest {
    Append(QuizResult),
    ReadAll,
    Reset,
}

/// Completion of a request, delivered back to the UI thread.
#[derive(Debug)]
pub enum StoreEvent {
    Appended(Result<i64, StoreError>),
    Loaded(Result<Vec<QuizResult>, StoreError>),
    Reset(Result<(), StoreError>),
}

/// Owns the store and serves requests one at a time.
pub struct StoreWorker<P: StoreProvider> {
    provider: P,
    store: Option<Box<dyn ResultStore + Send>>,
}

impl<P: StoreProvider> StoreWorker<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            store: None,
        }
    }

    fn ensure_open(&mut self) -> Result<&mut Box<dyn ResultStore + Send>, StoreError> {
        if self.store.is_none() {
            self.store = Some(self.provider.open()?);
        }
        self.store
            .as_mut()
            .ok_or_else(|| StoreError::StoreUnavailable("store not open".into()))
    }

    pub fn handle(&mut self, request: StoreRequest) -> StoreEvent {
        match request {
            StoreRequest::Append(result) => {
                let outcome = self
                    .ensure_open()
                    .and_then(|store| store.append(&result));
                match &outcome {
                    Ok(id) => info!("saved quiz result #{}", id),
                    Err(e) => error!("failed to save results: {}", e),
                }
                StoreEvent::Appended(outcome)
            }
            StoreRequest::ReadAll => {
                let outcome = self.ensure_open().and_then(|store| store.read_all());
                if let Err(e) = &outcome {
                    error!("failed to load quiz history: {}", e);
                }
                StoreEvent::Loaded(outcome)
            }
            StoreRequest::Reset => StoreEvent::Reset(self.reset()),
        }
    }

    /// In-place reset first; if the store can't even do that, wipe it and reopen.
    fn reset(&mut self) -> Result<(), StoreError> {
        if let Some(store) = self.store.as_mut() {
            match store.reset() {
                Ok(()) => return Ok(()),
                Err(e) => warn!("in-place reset failed, recreating store: {}", e),
            }
        }
        self.store = None;
        self.provider.destroy()?;
        self.store = Some(self.provider.open()?);
        info!("result store recreated");
        Ok(())
    }

    /// Run on a background thread; completions are passed to `notify`.
    pub fn spawn<F>(provider: P, notify: F) -> StoreHandle
    where
        F: Fn(StoreEvent) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<StoreRequest>();
        let join = thread::spawn(move || {
            let mut worker = StoreWorker::new(provider);
            for request in rx {
                notify(worker.handle(request));
            }
        });

        StoreHandle {
            tx: Some(tx),
            join: Some(join),
        }
    }
}

/// Sending side of a spawned worker.
#[derive(Debug)]
pub struct StoreHandle {
    tx: Option<Sender<StoreRequest>>,
    join: Option<JoinHandle<()>>,
}

impl StoreHandle {
    /// Returns false if the worker is gone.
    pub fn send(&self, request: StoreRequest) -> bool {
        self.tx
            .as_ref()
            .is_some_and(|tx| tx.send(request).is_ok())
    }

    pub fn append(&self, result: QuizResult) -> bool {
        self.send(StoreRequest::Append(result))
    }

    pub fn load(&self) -> bool {
        self.send(StoreRequest::ReadAll)
    }

    pub fn reset(&self) -> bool {
        self.send(StoreRequest::Reset)
    }

    /// Let queued requests finish, then stop the worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.tx.take();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("store worker panicked");
            }
        }
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

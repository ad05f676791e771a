//! Debounced background saving of an editor
//!
//! `Backup` listens to an editor's change notifications and writes the
//! editor document to a store once changes have stopped for the debounce
//! period. Every new change restarts the quiet period, so a drag that
//! paints hundreds of pixels results in one write. The write runs on a
//! worker thread and only holds the editor lock while serializing.
//!
//! Dropping the `Backup` (or calling `shutdown`) saves any pending
//! change before returning.

use log::{debug, warn};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

use crate::editor::Editor;
use crate::envelope::EnvelopeError;
use crate::storage::{StorageError, Store};

/// Error type for backup writes
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("failed to serialize editor: {0}")]
    Envelope(#[from] EnvelopeError),
    #[error("failed to write backup: {0}")]
    Storage(#[from] StorageError),
    #[error("editor lock poisoned")]
    Poisoned,
    #[error("backup worker could not be started: {0}")]
    Spawn(std::io::Error),
}

enum Signal {
    Changed,
    Stop,
}

/// Serializes the editor and writes it to the store.
struct Persister {
    editor: Arc<Mutex<Editor>>,
    store: Arc<dyn Store>,
    key: String,
    /// Keeps a flush and a worker write from interleaving.
    write_lock: Mutex<()>,
}

impl Persister {
    fn persist(&self) -> Result<(), BackupError> {
        let _guard = self.write_lock.lock().map_err(|_| BackupError::Poisoned)?;
        let json = {
            let editor = self.editor.lock().map_err(|_| BackupError::Poisoned)?;
            editor.save()?
        };
        self.store.set(&self.key, &json)?;
        debug!("backed up editor under {}", self.key);
        Ok(())
    }

    fn persist_logged(&self) {
        if let Err(e) = self.persist() {
            warn!("editor backup failed: {}", e);
        }
    }
}

/// Handle to a running backup worker.
pub struct Backup {
    persister: Arc<Persister>,
    signals: Sender<Signal>,
    worker: Option<JoinHandle<()>>,
}

impl Backup {
    /// Start saving `editor` to `store` under `key`, `debounce` after the
    /// last change.
    pub fn start(
        editor: Arc<Mutex<Editor>>,
        store: Arc<dyn Store>,
        key: impl Into<String>,
        debounce: Duration,
    ) -> Result<Backup, BackupError> {
        let (tx, rx) = mpsc::channel();
        {
            let mut guard = editor.lock().map_err(|_| BackupError::Poisoned)?;
            let state_tx = tx.clone();
            guard.subscribe_state_while(move |_| state_tx.send(Signal::Changed).is_ok());
            // Begin and commit change the history without touching pixels.
            let actions_tx = tx.clone();
            guard.subscribe_actions_while(move |_| actions_tx.send(Signal::Changed).is_ok());
        }

        let persister = Arc::new(Persister {
            editor,
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        });

        let worker_persister = Arc::clone(&persister);
        let worker = thread::Builder::new()
            .name("editor-backup".to_string())
            .spawn(move || run_worker(&worker_persister, &rx, debounce))
            .map_err(BackupError::Spawn)?;

        Ok(Backup { persister, signals: tx, worker: Some(worker) })
    }

    /// Save now, regardless of the debounce timer.
    pub fn flush(&self) -> Result<(), BackupError> {
        self.persister.persist()
    }

    /// Stop the worker, saving any pending change first.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.signals.send(Signal::Stop);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("editor backup worker panicked");
            }
        }
    }
}

impl Drop for Backup {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(persister: &Persister, signals: &mpsc::Receiver<Signal>, debounce: Duration) {
    loop {
        // Idle until something changes.
        match signals.recv() {
            Ok(Signal::Changed) => {}
            Ok(Signal::Stop) | Err(_) => return,
        }

        // Wait for a quiet period.
        loop {
            match signals.recv_timeout(debounce) {
                Ok(Signal::Changed) => continue,
                Err(RecvTimeoutError::Timeout) => {
                    persister.persist_logged();
                    break;
                }
                Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => {
                    persister.persist_logged();
                    return;
                }
            }
        }
    }
}

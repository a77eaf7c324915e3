//! Fire-and-forget history writes.
//!
//! Calculations hand their result to a bounded queue and return immediately. A single
//! background task drains the queue into the [`HistoryStore`]. Write failures, a full
//! queue and a closed queue are logged and otherwise ignored.

use async_channel::{Receiver, Sender, TrySendError};
use calculator_core::NewCalculation;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::store::HistoryStore;

/// Default queue capacity.
pub const QUEUE_CAPACITY: usize = 256;

/// Sending half handed to the service.
#[derive(Clone)]
pub struct HistoryRecorder {
    sender: Sender<NewCalculation>,
}

/// Owns the background task; held by the process entry point.
pub struct RecorderWorker {
    sender: Sender<NewCalculation>,
    handle: JoinHandle<()>,
}

/// Starts the background writer on the current tokio runtime.
pub fn spawn(store: Arc<dyn HistoryStore>, capacity: usize) -> (HistoryRecorder, RecorderWorker) {
    let (sender, receiver) = async_channel::bounded(capacity.max(1));
    let handle = tokio::spawn(drain(store, receiver));

    (
        HistoryRecorder {
            sender: sender.clone(),
        },
        RecorderWorker { sender, handle },
    )
}

async fn drain(store: Arc<dyn HistoryStore>, receiver: Receiver<NewCalculation>) {
    while let Ok(entry) = receiver.recv().await {
        let store = store.clone();
        let created_at = chrono::Utc::now().timestamp_millis();

        let outcome = tokio::task::spawn_blocking(move || {
            let result = store.store_calculation(&entry, created_at);
            (entry, result)
        })
        .await;

        match outcome {
            Ok((entry, Ok(()))) => {
                log::debug!("Stored calculation history: {}", entry.expression);
            }
            Ok((entry, Err(e))) => {
                log::error!(
                    "Failed to store calculation history for '{}': {e}",
                    entry.expression
                );
            }
            Err(e) => log::error!("History writer task failed: {e}"),
        }
    }

    log::debug!("History recorder stopped");
}

impl HistoryRecorder {
    /// Queues `entry` without waiting. Never fails the caller.
    pub fn record(&self, entry: NewCalculation) {
        match self.sender.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                log::warn!(
                    "History queue full, dropping calculation '{}'",
                    entry.expression
                );
            }
            Err(TrySendError::Closed(entry)) => {
                log::warn!(
                    "History recorder closed, dropping calculation '{}'",
                    entry.expression
                );
            }
        }
    }
}

impl RecorderWorker {
    /// Stops accepting entries, flushes the ones already queued and waits for the task.
    pub async fn shutdown(self) {
        self.sender.close();
        if let Err(e) = self.handle.await {
            log::error!("History recorder did not shut down cleanly: {e}");
        }
    }
}

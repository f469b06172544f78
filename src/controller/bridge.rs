//! Completion bridge for manual execution.
//!
//! A [`run`](crate::RequestController::run) that replaces the subscription
//! must resolve with the *eventual* fetch outcome, which arrives through the
//! collaborator's success/error hooks rather than the call itself. The
//! bridge is the seam between those hooks and the awaiting caller: a
//! per-controller map from call id to a one-shot sender.
//!
//! Registration happens *before* the key/params replacement, so a fetch that
//! settles synchronously cannot slip past its listener. Settling drains the
//! whole map and delivers the outcome to every pending registration:
//! overlapping `run` calls on the same slot all resolve, instead of the
//! last registrant clobbering earlier ones. Each registration is delivered
//! to at most once.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::{RefetchError, Result};

/// Per-controller registry of pending `run` completions.
pub(crate) struct CompletionBridge {
    pending: Mutex<HashMap<u64, oneshot::Sender<Result<Value>>>>,
    next_id: AtomicU64,
}

impl CompletionBridge {
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a one-shot listener for the next settlement.
    pub(crate) fn register(&self) -> PendingRun {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(id, tx);
        }
        PendingRun { rx }
    }

    /// Deliver `outcome` to every pending registration and clear the map.
    ///
    /// Senders whose receivers were dropped in the meantime fail silently;
    /// that is the at-most-once contract, not an error.
    pub(crate) fn settle(&self, outcome: &Result<Value>) {
        let drained: Vec<oneshot::Sender<Result<Value>>> = match self.pending.lock() {
            Ok(mut pending) => pending.drain().map(|(_, tx)| tx).collect(),
            Err(_) => Vec::new(),
        };
        for tx in drained {
            let _ = tx.send(outcome.clone());
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

/// Receiver half of one registered `run` call.
pub(crate) struct PendingRun {
    rx: oneshot::Receiver<Result<Value>>,
}

impl PendingRun {
    /// Await the settled outcome.
    ///
    /// A sender dropped without settling (subscription discarded, controller
    /// torn down) surfaces as [`RefetchError::BridgeClosed`].
    pub(crate) async fn outcome(self) -> Result<Value> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(RefetchError::BridgeClosed),
        }
    }
}

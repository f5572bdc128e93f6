//! # RetryScheduler: generation-guarded deferred actions.
//!
//! ```text
//! schedule(gen, action, delay)
//!     ├─ pending == Some(gen) ─► skipped (one pending action per generation)
//!     └─ spawn: select! { sleep(delay) ─► tx.send(Deferred{gen, action}),
//!                         token.cancelled() ─► drop }
//!
//! controller receives Deferred{gen, action}
//!     ├─ scheduler.fired(gen)
//!     └─ gen != current || state ∉ {Completed, Error} ─► no-op (StaleIgnored)
//! ```
//!
//! Timers are never cancelled individually; a stray timer firing late is
//! harmless because the controller checks its generation.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::Command;

/// What a deferred action does once it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredAction {
    /// Re-request after a failure.
    Retry,
    /// Re-request after a completed ad break.
    Recycle,
}

impl DeferredAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeferredAction::Retry => "retry",
            DeferredAction::Recycle => "recycle",
        }
    }
}

/// Fixed-delay timer service feeding the controller's command queue.
pub(crate) struct RetryScheduler {
    tx: mpsc::UnboundedSender<Command>,
    token: CancellationToken,
    pending: Option<u64>,
}

impl RetryScheduler {
    pub fn new(tx: mpsc::UnboundedSender<Command>, token: CancellationToken) -> Self {
        Self {
            tx,
            token,
            pending: None,
        }
    }

    /// Schedules `action` for `generation`. Returns `false` if one is already pending for it.
    pub fn schedule(&mut self, generation: u64, action: DeferredAction, delay: Duration) -> bool {
        if self.pending == Some(generation) {
            return false;
        }
        self.pending = Some(generation);

        let tx = self.tx.clone();
        let token = self.token.child_token();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(Command::Deferred { generation, action });
                }
            }
        });
        true
    }

    /// Marks the pending action for `generation` as delivered.
    pub fn fired(&mut self, generation: u64) {
        if self.pending == Some(generation) {
            self.pending = None;
        }
    }

    #[cfg(test)]
    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    /// Drops every timer that has not fired yet.
    pub fn cancel_all(&mut self) {
        self.token.cancel();
        self.pending = None;
    }
}

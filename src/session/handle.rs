use tokio::sync::{mpsc, watch};

use crate::{error::ControllerError, viewport::Viewport};

use super::{Command, SessionSnapshot, Trigger};

/// Handle for driving and observing a [`SessionController`](super::SessionController).
///
/// Cheap to clone. Every call is a non-blocking enqueue; the controller applies
/// commands in order.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<Command>,
        state: watch::Receiver<SessionSnapshot>,
    ) -> Self {
        Self { tx, state }
    }

    fn send(&self, cmd: Command) -> Result<(), ControllerError> {
        self.tx.send(cmd).map_err(|_| ControllerError::Closed)
    }

    /// Requests a session start. A no-op unless the session is idle.
    pub fn start(&self, trigger: Trigger) -> Result<(), ControllerError> {
        self.send(Command::Start(trigger))
    }

    /// Reports a new viewport size.
    pub fn resize(&self, viewport: Viewport) -> Result<(), ControllerError> {
        self.send(Command::Resize(viewport))
    }

    /// User-initiated volume change. Raising it above zero counts as interaction.
    pub fn set_volume(&self, level: f32) -> Result<(), ControllerError> {
        self.send(Command::Volume(level))
    }

    /// The play control was activated (start, or reload when showing the retry prompt).
    pub fn activate_control(&self) -> Result<(), ControllerError> {
        self.send(Command::ControlActivated)
    }

    pub(crate) fn report_engine_unavailable(&self) -> Result<(), ControllerError> {
        self.send(Command::EngineUnavailable)
    }

    /// Destroys the live manager and stops the controller.
    pub fn shutdown(&self) -> Result<(), ControllerError> {
        self.send(Command::Shutdown)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        *self.state.borrow()
    }

    /// `true` while the session is `Loaded` or `Playing`.
    pub fn is_active(&self) -> bool {
        self.snapshot().state.is_active()
    }

    /// Waits until a published snapshot satisfies `pred`.
    pub async fn wait_for<F>(&self, mut pred: F) -> Result<SessionSnapshot, ControllerError>
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        let mut rx = self.state.clone();
        let snap = rx
            .wait_for(|s| pred(s))
            .await
            .map_err(|_| ControllerError::Closed)?;
        Ok(*snap)
    }
}

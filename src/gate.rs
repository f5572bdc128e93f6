//! # InteractionGate: standalone start policy.
//!
//! Decides how a standalone page begins its first session:
//!
//! ```text
//! arm()
//!   ├─ play control present ─► control.show()            (wait for the user)
//!   │      user clicks ─► activate() ─► controller: hide control, start(UserInteraction)
//!   └─ no control          ─► start(Autoplay)            (muted)
//! ```
//!
//! Embedded pages never arm the gate; they wait for the parent's `initAds`.

use std::sync::Arc;

use crate::{
    error::ControllerError,
    session::{SessionHandle, Trigger},
    ui::PlayControl,
};

/// What [`InteractionGate::arm`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// Control is visible; the session starts on activation.
    Armed,
    /// No control was configured; a muted autoplay start was requested.
    AutoStarted,
}

/// Start policy for pages that are not embedded.
#[derive(Clone)]
pub struct InteractionGate {
    control: Option<Arc<dyn PlayControl>>,
    handle: SessionHandle,
}

impl InteractionGate {
    pub fn new(control: Option<Arc<dyn PlayControl>>, handle: SessionHandle) -> Self {
        Self { control, handle }
    }

    /// Shows the play control, or autostarts when there is none.
    pub fn arm(&self) -> Result<GateOutcome, ControllerError> {
        match &self.control {
            Some(control) => {
                control.show();
                Ok(GateOutcome::Armed)
            }
            None => {
                self.handle.start(Trigger::Autoplay)?;
                Ok(GateOutcome::AutoStarted)
            }
        }
    }

    /// The play control was clicked.
    ///
    /// Starts the session with interaction recorded, or reloads the page when
    /// the control is showing the retry prompt.
    pub fn activate(&self) -> Result<(), ControllerError> {
        self.handle.activate_control()
    }
}

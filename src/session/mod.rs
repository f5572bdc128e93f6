//! Session lifecycle controller.
//!
//! ## Contents
//! - [`SessionController`] the actor owning the single [`Session`](state::Session)
//! - [`SessionHandle`] cloneable front used by the gate, bridge, viewport adapter and host
//! - [`SessionState`], [`SessionSnapshot`], [`Trigger`] the data model
//! - `RetryScheduler` generation-guarded timers (internal)
//!
//! ## Wiring
//! ```text
//!   SessionHandle ──┐
//!   EngineSink    ──┼──► mpsc<Command> ──► SessionController::run()
//!   RetryScheduler──┘                          │  one command at a time
//!                                              ├─► AdEngine / AdsManager calls
//!                                              ├─► Overlay / PlayControl / Page
//!                                              ├─► Bus::publish(Event)
//!                                              └─► watch<SessionSnapshot>
//! ```

mod controller;
mod handle;
mod scheduler;
mod state;

pub(crate) use controller::Affordances;
pub use controller::SessionController;
pub use handle::SessionHandle;
pub use scheduler::DeferredAction;
pub use state::{SessionSnapshot, SessionState, Trigger};

use crate::{engine::EngineEvent, viewport::Viewport};

/// Inputs to the controller. Everything that can change the session goes through here.
#[derive(Debug)]
pub(crate) enum Command {
    Start(Trigger),
    Engine {
        generation: Option<u64>,
        event: EngineEvent,
    },
    Resize(Viewport),
    Volume(f32),
    ControlActivated,
    Deferred {
        generation: u64,
        action: DeferredAction,
    },
    EngineUnavailable,
    Shutdown,
}

//! # Viewport measurement and resize forwarding.
//!
//! [`ViewportSource`] reports the current viewport size; it is read fresh at
//! every resize notification and at every ad request, never cached.
//!
//! [`ViewportAdapter`] is what the host calls from its resize listener. It
//! reads the size and hands it to the controller, which forwards it to the
//! live ads manager only while the session is `Loaded` or `Playing`.
//!
//! ```text
//! window resize ──► ViewportAdapter::on_resize()
//!                       ├─► source.current()            (synchronous read)
//!                       └─► SessionHandle::resize(v)
//!                               └─► controller: Loaded|Playing ? manager.resize(v, Normal) : record only
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{error::ControllerError, session::SessionHandle};

/// Width and height of the viewport in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Display mode passed to the engine on init and resize. The slot always renders inline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Normal,
}

/// Source of the current viewport size.
pub trait ViewportSource: Send + Sync + 'static {
    /// Reads the current size. Must be cheap and side-effect free.
    fn current(&self) -> Viewport;
}

impl<F> ViewportSource for F
where
    F: Fn() -> Viewport + Send + Sync + 'static,
{
    fn current(&self) -> Viewport {
        self()
    }
}

/// Forwards resize notifications to the session controller.
#[derive(Clone)]
pub struct ViewportAdapter {
    source: Arc<dyn ViewportSource>,
    handle: SessionHandle,
}

impl ViewportAdapter {
    pub fn new(source: Arc<dyn ViewportSource>, handle: SessionHandle) -> Self {
        Self { source, handle }
    }

    /// Call on every viewport dimension change.
    ///
    /// Returns the size that was read. Whether it reaches the engine is decided
    /// by the controller from its own state, so a resize racing a request is
    /// never forwarded to a manager that does not exist yet.
    pub fn on_resize(&self) -> Result<Viewport, ControllerError> {
        let viewport = self.source.current();
        self.handle.resize(viewport)?;
        Ok(viewport)
    }
}

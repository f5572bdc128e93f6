//! # UI affordances consumed by the controller.
//!
//! The crate never creates DOM elements. Hosts hand in opaque handles:
//! - [`PlayControl`] start button, doubling as the retry button on persistent failure;
//! - [`Overlay`] transition/loading screen shown between ad breaks;
//! - [`Page`] the blunt recovery instrument (reload).
//!
//! All methods take `&self`: handles are shared between the interaction gate
//! and the controller, and DOM handles are interior-mutable anyway.

use std::time::Duration;

/// Start/play control.
pub trait PlayControl: Send + Sync + 'static {
    /// Make the control visible as a start button.
    fn show(&self);
    /// Hide the control.
    fn hide(&self);
    /// Make the control visible as a retry button (activation reloads the page).
    fn show_retry(&self);
}

/// Transition/loading overlay.
pub trait Overlay: Send + Sync + 'static {
    /// Fade the overlay in.
    fn show(&self, fade: Duration);
    /// Fade the overlay out.
    fn hide(&self, fade: Duration);
}

/// The hosting page.
pub trait Page: Send + Sync + 'static {
    fn reload(&self);
}

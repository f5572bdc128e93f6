//! Parent/child handshake for embedded pages.
//!
//! ## Contents
//! - [`HandshakeBridge`] origin check, command dispatch, readiness announcement
//! - [`OriginAllowList`] / [`OriginRule`] exact and prefix origin rules
//! - [`InboundCommand`] / [`OutboundNotification`] wire messages
//! - [`ParentChannel`] outbound endpoint implemented by the host

mod bridge;
mod message;
mod origin;

pub use bridge::{HandshakeBridge, InboundMessage, ParentChannel};
pub use message::{INIT_ADS, InboundCommand, NotificationKind, OutboundNotification};
pub use origin::{OriginAllowList, OriginRule};

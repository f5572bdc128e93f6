//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `SessionController`, `RetryScheduler`, `HandshakeBridge`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the launcher's listener (fans out to `SubscriberSet`) and
//!   any receiver obtained from [`Launched::subscribe`](crate::Launched::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

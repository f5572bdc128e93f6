//! # Event subscribers.
//!
//! ```text
//! SessionController ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                  │
//!                                                   ┌──────────────┼──────────────┐
//!                                                   ▼              ▼              ▼
//!                                               LogWriter     ParentRelay      Custom
//! ```
//!
//! - [`Subscribe`] the extension trait
//! - [`SubscriberSet`] non-blocking fan-out with per-subscriber queues
//! - [`LogWriter`] / [`ParentRelay`] built-ins

mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use embedded::ParentRelay;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

//! # Built-in subscribers
//!
//! - [`LogWriter`]: structured `tracing` output for every runtime event.
//! - [`ParentRelay`]: forwards ad events and failures to the parent frame.

#[cfg(feature = "logging")]
mod log;
mod relay;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use relay::ParentRelay;

//! Retry policies.
//!
//! ## Contents
//! - [`RetryPolicy`] how long to wait after a failure, and when to give up
//! - [`JitterPolicy`] randomization of retry delays
//!
//! ## Quick wiring
//! ```text
//! Config { retry: RetryPolicy, recycle_delay, .. }
//!      └─► session::controller uses:
//!           - retry.next(retry_count) after every failure
//!           - recycle_delay after every completed ad break
//! ```
//!
//! ## Defaults
//! - `RetryPolicy::default()` → delay=2s, factor=1.0 (fixed), unbounded attempts.
//! - `JitterPolicy::None`.

mod jitter;
mod retry;

pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;

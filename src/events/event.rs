//! # Runtime events emitted by the session controller and its collaborators.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Session lifecycle**: start, request, manager ready, playback, completion, recycle
//! - **Failure handling**: failures, retry scheduling, exhaustion, stale deferrals
//! - **Handshake**: readiness announcement and inbound command verdicts
//! - **Subscriber plumbing**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries the metadata: timestamps, session generation,
//! retry count, reasons, delays, viewport sizes and ad-level event kinds.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use adcycle::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_generation(3)
//!     .with_attempt(1)
//!     .with_delay(Duration::from_secs(2));
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.delay_ms, Some(2000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::{engine::EngineEventKind, viewport::Viewport};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Session lifecycle ===
    /// `start()` accepted while idle.
    ///
    /// Sets: `reason` (trigger name)
    SessionStarting,

    /// `start()` ignored because a session is already underway.
    ///
    /// Sets: `generation`, `reason` (trigger name)
    StartIgnored,

    /// Ad request handed to the engine.
    ///
    /// Sets: `generation`, `viewport`
    RequestIssued,

    /// Manager created, wired and started; session is `Loaded`.
    ///
    /// Sets: `generation`
    ManagerReady,

    /// Manager muted because the user had not interacted yet.
    ///
    /// Sets: `generation`
    Muted,

    /// First ad-level event arrived; overlay hidden, session is `Playing`.
    ///
    /// Sets: `generation`
    PlaybackStarted,

    /// Ad-level engine event (loaded, started, skipped, complete, all_completed).
    ///
    /// Sets: `generation`, `ad_event`
    AdEvent,

    /// All ads of the break completed; overlay shown, recycle scheduled.
    ///
    /// Sets: `generation`
    BreakCompleted,

    /// Scheduled action fired and a fresh request follows.
    ///
    /// Sets: `generation` (of the session being recycled), `reason` (`retry` or `recycle`)
    Recycled,

    /// Viewport change forwarded to the live manager.
    ///
    /// Sets: `generation`, `viewport`
    ResizeForwarded,

    // === Failure handling ===
    /// Session entered `Error`.
    ///
    /// Sets: `generation`, `attempt` (consecutive failures), `reason`
    SessionFailed,

    /// Retry or recycle scheduled.
    ///
    /// Sets: `generation`, `attempt`, `delay_ms`, `reason` (`retry` or `recycle`)
    RetryScheduled,

    /// Retry bound reached; retry control shown.
    ///
    /// Sets: `generation`, `attempt`
    RetriesExhausted,

    /// A fired deferral or engine event belonged to an older generation and was dropped.
    ///
    /// Sets: `generation` (stale one), `reason`
    StaleIgnored,

    /// Controller stopped (page teardown).
    ShutdownRequested,

    // === Handshake ===
    /// `adsReady` sent to the parent.
    ReadyAnnounced,

    /// Inbound start command accepted.
    ///
    /// Sets: `reason` (origin)
    CommandAccepted,

    /// Inbound message dropped.
    ///
    /// Sets: `reason` (rejection label)
    CommandRejected,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `subscriber`, `reason`
    SubscriberOverflow,
}

impl EventKind {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SessionStarting => "session_starting",
            EventKind::StartIgnored => "start_ignored",
            EventKind::RequestIssued => "request_issued",
            EventKind::ManagerReady => "manager_ready",
            EventKind::Muted => "muted",
            EventKind::PlaybackStarted => "playback_started",
            EventKind::AdEvent => "ad_event",
            EventKind::BreakCompleted => "break_completed",
            EventKind::Recycled => "recycled",
            EventKind::ResizeForwarded => "resize_forwarded",
            EventKind::SessionFailed => "session_failed",
            EventKind::RetryScheduled => "retry_scheduled",
            EventKind::RetriesExhausted => "retries_exhausted",
            EventKind::StaleIgnored => "stale_ignored",
            EventKind::ShutdownRequested => "shutdown_requested",
            EventKind::ReadyAnnounced => "ready_announced",
            EventKind::CommandAccepted => "command_accepted",
            EventKind::CommandRejected => "command_rejected",
            EventKind::SubscriberPanicked => "subscriber_panicked",
            EventKind::SubscriberOverflow => "subscriber_overflow",
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Session generation the event belongs to.
    pub generation: Option<u64>,
    /// Consecutive failure count.
    pub attempt: Option<u32>,
    /// Delay before a scheduled action in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, triggers, rejection labels...).
    pub reason: Option<Arc<str>>,
    /// Viewport size, for request and resize events.
    pub viewport: Option<Viewport>,
    /// Ad-level engine event, for [`EventKind::AdEvent`].
    pub ad_event: Option<EngineEventKind>,
    /// Subscriber name, for subscriber plumbing events.
    pub subscriber: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            generation: None,
            attempt: None,
            delay_ms: None,
            reason: None,
            viewport: None,
            ad_event: None,
            subscriber: None,
        }
    }

    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    #[inline]
    pub fn with_ad_event(mut self, kind: EngineEventKind) -> Self {
        self.ad_event = Some(kind);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow).with_reason(reason);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }
}

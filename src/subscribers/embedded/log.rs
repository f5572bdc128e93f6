//! # LogWriter: tracing-backed event writer
//!
//! Turns runtime [`Event`]s into structured `tracing` records under the
//! `adcycle` target. Failures log at `warn`, lifecycle transitions at `info`,
//! plumbing at `debug`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO adcycle: request issued generation=1 width=1280 height=720
//! INFO adcycle: manager ready generation=1
//! WARN adcycle: session failed generation=1 attempt=1 reason="ad error: no fill"
//! INFO adcycle: retry scheduled generation=1 attempt=1 delay_ms=2000 action="retry"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        let (width, height) = e.viewport.map_or((0, 0), |v| (v.width, v.height));

        match e.kind {
            EventKind::SessionStarting => {
                info!(target: "adcycle", trigger = reason, "session starting");
            }
            EventKind::RequestIssued => {
                info!(target: "adcycle", generation = e.generation, width, height, "request issued");
            }
            EventKind::ManagerReady => {
                info!(target: "adcycle", generation = e.generation, "manager ready");
            }
            EventKind::PlaybackStarted => {
                info!(target: "adcycle", generation = e.generation, "playback started");
            }
            EventKind::BreakCompleted => {
                info!(target: "adcycle", generation = e.generation, "ad break completed");
            }
            EventKind::Recycled => {
                info!(target: "adcycle", generation = e.generation, action = reason, "recycling session");
            }
            EventKind::RetryScheduled => {
                info!(
                    target: "adcycle",
                    generation = e.generation,
                    attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    action = reason,
                    "retry scheduled"
                );
            }
            EventKind::SessionFailed => {
                warn!(target: "adcycle", generation = e.generation, attempt = e.attempt, reason, "session failed");
            }
            EventKind::RetriesExhausted => {
                warn!(target: "adcycle", generation = e.generation, attempt = e.attempt, "retries exhausted");
            }
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
                warn!(
                    target: "adcycle",
                    kind = e.kind.as_str(),
                    subscriber = e.subscriber.unwrap_or("unknown"),
                    reason,
                    "subscriber trouble"
                );
            }
            EventKind::AdEvent => {
                debug!(
                    target: "adcycle",
                    generation = e.generation,
                    ad_event = e.ad_event.map(|k| k.as_str()),
                    "ad event"
                );
            }
            EventKind::ResizeForwarded => {
                debug!(target: "adcycle", generation = e.generation, width, height, "resize forwarded");
            }
            EventKind::StartIgnored
            | EventKind::Muted
            | EventKind::StaleIgnored
            | EventKind::ShutdownRequested
            | EventKind::ReadyAnnounced
            | EventKind::CommandAccepted
            | EventKind::CommandRejected => {
                debug!(target: "adcycle", kind = e.kind.as_str(), generation = e.generation, reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

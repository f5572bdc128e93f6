//! # ParentRelay: best-effort telemetry to the parent frame
//!
//! When the page runs embedded, the parent may want to know what the ad slot
//! is doing. This subscriber forwards:
//!
//! ```text
//! EventKind::AdEvent        ─► {"type":"adEvent","event":"<kind>"}
//! EventKind::SessionFailed  ─► {"type":"error","message":"<reason>"}
//! ```
//!
//! Fire-and-forget: nothing is awaited and delivery is not confirmed.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::events::{Event, EventKind};
use crate::handshake::{OutboundNotification, ParentChannel};
use crate::subscribers::Subscribe;

/// Forwards ad events and failures to the parent context.
pub struct ParentRelay {
    parent: Arc<dyn ParentChannel>,
}

impl ParentRelay {
    pub fn new(parent: Arc<dyn ParentChannel>) -> Self {
        Self { parent }
    }

    fn translate(e: &Event) -> Option<OutboundNotification> {
        match e.kind {
            EventKind::AdEvent => e
                .ad_event
                .map(|event| OutboundNotification::AdEvent { event }),
            EventKind::SessionFailed => Some(OutboundNotification::Error {
                message: e.reason.as_deref().unwrap_or("unknown error").to_string(),
            }),
            _ => None,
        }
    }
}

#[async_trait]
impl Subscribe for ParentRelay {
    async fn on_event(&self, e: &Event) {
        if let Some(notification) = Self::translate(e) {
            debug!(kind = notification.kind().as_str(), seq = e.seq, "relaying to parent");
            self.parent.post(&notification);
        }
    }

    fn name(&self) -> &'static str {
        "parent-relay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineEventKind;
    use crate::handshake::NotificationKind;

    #[test]
    fn test_translation() {
        let ev = Event::new(EventKind::AdEvent).with_ad_event(EngineEventKind::Started);
        assert_eq!(
            ParentRelay::translate(&ev),
            Some(OutboundNotification::AdEvent {
                event: EngineEventKind::Started
            })
        );

        let ev = Event::new(EventKind::SessionFailed).with_reason("ad error: no fill");
        assert_eq!(
            ParentRelay::translate(&ev),
            Some(OutboundNotification::Error {
                message: "ad error: no fill".into()
            })
        );

        assert_eq!(
            ParentRelay::translate(&Event::new(EventKind::RequestIssued)),
            None
        );
    }

    #[test]
    fn test_relayed_kinds() {
        let kinds: Vec<_> = [
            Event::new(EventKind::AdEvent).with_ad_event(EngineEventKind::AllCompleted),
            Event::new(EventKind::SessionFailed),
            Event::new(EventKind::ReadyAnnounced),
        ]
        .iter()
        .filter_map(ParentRelay::translate)
        .map(|n| n.kind())
        .collect();
        assert_eq!(kinds, vec![NotificationKind::Event, NotificationKind::Error]);
        assert_eq!(NotificationKind::Error.as_str(), "error");
    }
}

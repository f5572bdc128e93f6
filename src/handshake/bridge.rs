//! # HandshakeBridge: parent/child protocol for embedded pages.
//!
//! ```text
//! startup ──► announce_ready() ──► parent.post({"type":"adsReady"})   (once, not acknowledged)
//!
//! parent postMessage ──► host ──► inbox ──► on_command listener
//!                                             ├─ origin not allowed  ─► drop (CommandRejected)
//!                                             ├─ payload malformed   ─► drop (CommandRejected)
//!                                             └─ {"type":"initAds"}  ─► handler()
//! ```
//!
//! ## Rules
//! - Rejections are silent towards the sender; a hostile or misconfigured
//!   parent cannot crash the child.
//! - The handler runs once per valid command, repeats included. Whether a
//!   repeat starts anything is the controller's call, not the bridge's.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    error::HandshakeRejection,
    events::{Bus, Event, EventKind},
};

use super::{InboundCommand, OriginAllowList, OutboundNotification};

/// Outbound endpoint towards the parent browsing context.
///
/// Browser hosts serialize with [`OutboundNotification::to_json`] and post with target `*`.
pub trait ParentChannel: Send + Sync + 'static {
    fn post(&self, notification: &OutboundNotification);
}

/// A raw message received from another browsing context.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Origin reported by the host for the sender.
    pub origin: String,
    /// Message payload.
    pub data: Value,
}

impl InboundMessage {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }
}

/// Parent/child handshake endpoint.
pub struct HandshakeBridge {
    origins: OriginAllowList,
    parent: Arc<dyn ParentChannel>,
    bus: Bus,
    announced: AtomicBool,
}

impl HandshakeBridge {
    pub fn new(origins: OriginAllowList, parent: Arc<dyn ParentChannel>, bus: Bus) -> Self {
        Self {
            origins,
            parent,
            bus,
            announced: AtomicBool::new(false),
        }
    }

    /// Tells the parent the child is ready. Only the first call sends anything.
    pub fn announce_ready(&self) -> bool {
        if self.announced.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.parent.post(&OutboundNotification::Ready);
        self.bus.publish(Event::new(EventKind::ReadyAnnounced));
        true
    }

    /// Validates origin, then shape.
    pub fn accept(&self, msg: &InboundMessage) -> Result<InboundCommand, HandshakeRejection> {
        if !self.origins.allows(&msg.origin) {
            return Err(HandshakeRejection::UntrustedOrigin {
                origin: msg.origin.clone(),
            });
        }
        InboundCommand::parse(&msg.data)
    }

    /// Runs `handler` if `msg` is a valid command. Returns whether it ran.
    pub fn dispatch<F>(&self, msg: &InboundMessage, handler: &F) -> bool
    where
        F: Fn() + ?Sized,
    {
        match self.accept(msg) {
            Ok(InboundCommand::Start) => {
                self.bus
                    .publish(Event::new(EventKind::CommandAccepted).with_reason(msg.origin.as_str()));
                handler();
                true
            }
            Err(rejection) => {
                debug!(origin = %msg.origin, reason = rejection.as_label(), "inbound message dropped");
                self.bus
                    .publish(Event::new(EventKind::CommandRejected).with_reason(rejection.as_label()));
                false
            }
        }
    }

    /// Spawns the listener that feeds `inbox` through [`dispatch`](Self::dispatch).
    ///
    /// Stops when `token` is cancelled or every inbox sender is dropped.
    pub fn on_command<F>(
        self: Arc<Self>,
        mut inbox: mpsc::Receiver<InboundMessage>,
        token: CancellationToken,
        handler: F,
    ) -> JoinHandle<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = inbox.recv() => match msg {
                        Some(msg) => { self.dispatch(&msg, &handler); }
                        None => break,
                    },
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct RecordingParent {
        posted: Mutex<Vec<OutboundNotification>>,
    }

    impl ParentChannel for RecordingParent {
        fn post(&self, notification: &OutboundNotification) {
            self.posted.lock().unwrap().push(notification.clone());
        }
    }

    fn bridge() -> (HandshakeBridge, Arc<RecordingParent>) {
        let parent = Arc::new(RecordingParent::default());
        let bridge = HandshakeBridge::new(
            OriginAllowList::new(["https://host.example", "http://localhost*"]),
            parent.clone(),
            Bus::new(16),
        );
        (bridge, parent)
    }

    #[test]
    fn test_announce_ready_once() {
        let (bridge, parent) = bridge();
        assert!(bridge.announce_ready());
        assert!(!bridge.announce_ready());
        assert_eq!(*parent.posted.lock().unwrap(), vec![OutboundNotification::Ready]);
    }

    #[test]
    fn test_untrusted_origin_never_runs_handler() {
        let (bridge, _) = bridge();
        let calls = AtomicUsize::new(0);
        let handler = || {
            calls.fetch_add(1, Ordering::SeqCst);
        };

        for payload in [json!({"type": "initAds"}), json!("initAds"), json!(null)] {
            let msg = InboundMessage::new("https://evil.example", payload);
            assert!(!bridge.dispatch(&msg, &handler));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_origin_checked_before_shape() {
        let (bridge, _) = bridge();
        let msg = InboundMessage::new("https://evil.example", json!(17));
        assert!(matches!(
            bridge.accept(&msg),
            Err(HandshakeRejection::UntrustedOrigin { .. })
        ));
    }

    #[test]
    fn test_each_valid_command_runs_handler() {
        let (bridge, _) = bridge();
        let calls = AtomicUsize::new(0);
        let handler = || {
            calls.fetch_add(1, Ordering::SeqCst);
        };

        let ok = InboundMessage::new("http://localhost:3000", json!({"type": "initAds"}));
        let bad = InboundMessage::new("https://host.example", json!({"type": "pause"}));
        assert!(bridge.dispatch(&ok, &handler));
        assert!(!bridge.dispatch(&bad, &handler));
        assert!(bridge.dispatch(&ok, &handler));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_listener_stops_when_inbox_closes() {
        let (bridge, _) = bridge();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let (tx, rx) = mpsc::channel(4);

        let join = Arc::new(bridge).on_command(rx, CancellationToken::new(), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        tx.send(InboundMessage::new("https://host.example", json!("initAds")))
            .await
            .unwrap();
        drop(tx);
        join.await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

//! # Cross-context wire messages.
//!
//! Inbound (parent → child):
//! ```text
//! {"type":"initAds"}   or   "initAds"      ─► InboundCommand::Start
//! ```
//!
//! Outbound (child → parent), fire-and-forget:
//! ```text
//! OutboundNotification::Ready            ─► {"type":"adsReady"}
//! OutboundNotification::Error{message}   ─► {"type":"error","message":"..."}
//! OutboundNotification::AdEvent{event}   ─► {"type":"adEvent","event":"started"}
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::{engine::EngineEventKind, error::HandshakeRejection};

/// Wire name of the start command.
pub const INIT_ADS: &str = "initAds";

/// A validated command from the parent context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundCommand {
    /// Begin an ad session.
    Start,
}

impl InboundCommand {
    /// Parses a message payload. Origin is checked separately, before this.
    ///
    /// # Example
    /// ```
    /// use adcycle::InboundCommand;
    /// use serde_json::json;
    ///
    /// assert_eq!(InboundCommand::parse(&json!({"type": "initAds"})), Ok(InboundCommand::Start));
    /// assert_eq!(InboundCommand::parse(&json!("initAds")), Ok(InboundCommand::Start));
    /// assert!(InboundCommand::parse(&json!({"type": "play"})).is_err());
    /// ```
    pub fn parse(payload: &Value) -> Result<Self, HandshakeRejection> {
        let kind = match payload {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map.get("type").and_then(Value::as_str),
            _ => None,
        };
        match kind {
            Some(INIT_ADS) => Ok(InboundCommand::Start),
            _ => Err(HandshakeRejection::MalformedPayload),
        }
    }
}

/// Classification of outbound notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Ready,
    Error,
    Event,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Ready => "ready",
            NotificationKind::Error => "error",
            NotificationKind::Event => "event",
        }
    }
}

/// A best-effort message to the parent context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum OutboundNotification {
    #[serde(rename = "adsReady")]
    Ready,
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "adEvent")]
    AdEvent { event: EngineEventKind },
}

impl OutboundNotification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            OutboundNotification::Ready => NotificationKind::Ready,
            OutboundNotification::Error { .. } => NotificationKind::Error,
            OutboundNotification::AdEvent { .. } => NotificationKind::Event,
        }
    }

    /// JSON value suitable for `postMessage`.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_other_shapes() {
        for payload in [
            json!(null),
            json!(42),
            json!("initads"),
            json!({}),
            json!({"type": 1}),
            json!({"kind": "initAds"}),
            json!(["initAds"]),
        ] {
            assert_eq!(
                InboundCommand::parse(&payload),
                Err(HandshakeRejection::MalformedPayload),
                "payload {payload} should be rejected"
            );
        }
    }

    #[test]
    fn test_extra_fields_are_tolerated() {
        assert_eq!(
            InboundCommand::parse(&json!({"type": "initAds", "muted": true})),
            Ok(InboundCommand::Start)
        );
    }

    #[test]
    fn test_outbound_wire_forms() {
        assert_eq!(OutboundNotification::Ready.kind(), NotificationKind::Ready);
        assert_eq!(
            OutboundNotification::Ready.to_json().unwrap(),
            json!({"type": "adsReady"})
        );
        assert_eq!(
            OutboundNotification::Error {
                message: "no fill".into()
            }
            .to_json()
            .unwrap(),
            json!({"type": "error", "message": "no fill"})
        );
        assert_eq!(
            OutboundNotification::AdEvent {
                event: EngineEventKind::AllCompleted
            }
            .to_json()
            .unwrap(),
            json!({"type": "adEvent", "event": "all_completed"})
        );
    }
}

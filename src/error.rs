//! Error types used by the session controller and its collaborators.
//!
//! This module defines the error enums of the crate:
//!
//! - [`SessionError`]: failures of one ad-playback attempt (engine, wiring, request).
//! - [`HandshakeRejection`]: why an inbound cross-context message was dropped.
//! - [`ConfigError`]: invalid or unparsable configuration.
//! - [`ControllerError`]: calls made on a [`SessionHandle`](crate::SessionHandle) after the controller stopped.
//! - [`LaunchError`]: failures while wiring the page at startup.
//!
//! The first two provide `as_label` / `as_message` helpers for logs and telemetry.

use thiserror::Error;

/// # Errors produced by an ad-playback attempt.
///
/// None of these escape the controller: every variant is converted into the
/// `Error` session state and (unless retries are exhausted) a scheduled retry.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The ad engine is not present in the page.
    #[error("ad engine unavailable")]
    EngineUnavailable,

    /// The rendering target the engine draws into could not be found.
    #[error("display surface missing: {surface}")]
    DisplaySurfaceMissing {
        /// Identifier of the missing surface.
        surface: String,
    },

    /// The engine reported an ad error (network, no fill, VAST parse failure...).
    #[error("ad request failed: {message}")]
    RequestFailure {
        /// Message reported by the engine.
        message: String,
    },

    /// Wiring the engine failed at the given stage.
    #[error("engine wiring failed at {stage}: {message}")]
    Wiring {
        /// Which step failed (`attach`, `request`, `manager`, `subscribe`, `init`, `start`).
        stage: &'static str,
        /// Underlying message.
        message: String,
    },
}

impl SessionError {
    /// Shorthand for [`SessionError::Wiring`].
    pub fn wiring(stage: &'static str, message: impl Into<String>) -> Self {
        SessionError::Wiring {
            stage,
            message: message.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/telemetry.
    ///
    /// # Example
    /// ```
    /// use adcycle::SessionError;
    ///
    /// let err = SessionError::RequestFailure { message: "no fill".into() };
    /// assert_eq!(err.as_label(), "session_request_failure");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SessionError::EngineUnavailable => "session_engine_unavailable",
            SessionError::DisplaySurfaceMissing { .. } => "session_display_surface_missing",
            SessionError::RequestFailure { .. } => "session_request_failure",
            SessionError::Wiring { .. } => "session_wiring_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SessionError::EngineUnavailable => "ad engine is not loaded".to_string(),
            SessionError::DisplaySurfaceMissing { surface } => {
                format!("display surface '{surface}' not found")
            }
            SessionError::RequestFailure { message } => format!("ad error: {message}"),
            SessionError::Wiring { stage, message } => format!("{stage}: {message}"),
        }
    }
}

/// # Reasons an inbound cross-context message is dropped.
///
/// Rejections are never surfaced to the sender and never change session state.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeRejection {
    /// Sender origin is not in the allow-list.
    #[error("untrusted origin: {origin}")]
    UntrustedOrigin {
        /// Origin reported for the message.
        origin: String,
    },

    /// Payload is not a recognised command.
    #[error("malformed payload")]
    MalformedPayload,
}

impl HandshakeRejection {
    /// Returns a short stable label (snake_case) for use in logs/telemetry.
    ///
    /// # Example
    /// ```
    /// use adcycle::HandshakeRejection;
    ///
    /// assert_eq!(HandshakeRejection::MalformedPayload.as_label(), "handshake_malformed_payload");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandshakeRejection::UntrustedOrigin { .. } => "handshake_untrusted_origin",
            HandshakeRejection::MalformedPayload => "handshake_malformed_payload",
        }
    }
}

/// Errors raised while loading or validating a [`Config`](crate::Config).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// JSON could not be parsed into a config.
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config parsed but a field is unusable.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

/// Error returned by [`SessionHandle`](crate::SessionHandle) calls.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    /// The controller task has stopped (shutdown or page teardown).
    #[error("session controller closed")]
    Closed,
}

/// Errors returned by [`Launcher::launch`](crate::Launcher::launch).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LaunchError {
    /// Configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A collaborator required by the detected context was not supplied.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_labels_are_stable() {
        assert_eq!(
            SessionError::EngineUnavailable.as_label(),
            "session_engine_unavailable"
        );
        assert_eq!(
            SessionError::DisplaySurfaceMissing {
                surface: "content".into()
            }
            .as_label(),
            "session_display_surface_missing"
        );
        assert_eq!(
            SessionError::wiring("init", "boom").as_label(),
            "session_wiring_failed"
        );
    }

    #[test]
    fn test_wiring_message_names_stage() {
        let err = SessionError::wiring("start", "manager refused");
        assert_eq!(err.as_message(), "start: manager refused");
        assert_eq!(
            err.to_string(),
            "engine wiring failed at start: manager refused"
        );
    }

    #[test]
    fn test_rejection_labels() {
        let err = HandshakeRejection::UntrustedOrigin {
            origin: "https://evil.example".into(),
        };
        assert_eq!(err.as_label(), "handshake_untrusted_origin");
        assert!(err.to_string().contains("evil.example"));
    }
}

//! Session data model.

use crate::viewport::Viewport;

/// Lifecycle state of the ad session.
///
/// ```text
/// Idle ──start──► Requesting ──ManagerReady──► Loaded ──Loaded/Started──► Playing
///                    ▲   │                       │                          │
///                    │   └──────── AdError ──────┴──────────► Error ◄───────┤
///                    │                                          │           │ AllCompleted
///                    └──────── scheduled retry / recycle ───────┴─ Completed◄┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    #[default]
    Idle,
    Requesting,
    Loaded,
    Playing,
    Completed,
    Error,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Requesting => "requesting",
            SessionState::Loaded => "loaded",
            SessionState::Playing => "playing",
            SessionState::Completed => "completed",
            SessionState::Error => "error",
        }
    }

    /// A request or manager is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SessionState::Requesting | SessionState::Loaded | SessionState::Playing
        )
    }

    /// A manager is live and accepts resizes.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Loaded | SessionState::Playing)
    }

    /// Waiting for a scheduled retry or recycle.
    pub fn is_recyclable(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Error)
    }
}

/// What caused `start()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// The user activated the play control.
    UserInteraction,
    /// The parent frame sent a start command.
    Handshake,
    /// No play control configured; start muted right away.
    Autoplay,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::UserInteraction => "user_interaction",
            Trigger::Handshake => "handshake",
            Trigger::Autoplay => "autoplay",
        }
    }
}

/// The single ad-playback attempt owned by the controller.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Session {
    pub state: SessionState,
    /// Set once, never reset.
    pub has_user_interacted: bool,
    pub viewport: Viewport,
    /// Consecutive failures; reset when a manager comes up.
    pub retry_count: u32,
    /// Incremented on every transition into `Requesting`.
    pub generation: u64,
    pub muted: bool,
}

/// Read-only view of the session, published after every command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub has_user_interacted: bool,
    pub viewport: Viewport,
    pub retry_count: u32,
    pub generation: u64,
    pub muted: bool,
    /// A manager handle is alive.
    pub manager_alive: bool,
    /// The play control is showing the reload prompt.
    pub retry_prompt: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_groups() {
        use SessionState::*;
        for s in [Requesting, Loaded, Playing] {
            assert!(s.is_in_flight());
            assert!(!s.is_recyclable());
        }
        for s in [Idle, Completed, Error] {
            assert!(!s.is_in_flight());
            assert!(!s.is_active());
        }
        assert!(Loaded.is_active() && Playing.is_active());
        assert!(!Requesting.is_active());
        assert!(Completed.is_recyclable() && Error.is_recyclable());
    }
}

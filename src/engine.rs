//! # Ad-engine collaborator.
//!
//! The engine (an ad-serving SDK) decides what plays and renders it. This
//! module defines the seam the controller drives it through:
//!
//! - [`AdEngine`] the loader side: attach to the display surface, issue requests,
//!   hand out a manager once one is ready;
//! - [`AdsManager`] the live manager handle for one ad break;
//! - [`EngineEvent`] the closed set of lifecycle events the engine reports;
//! - [`EngineSink`] the callback endpoint handed to the engine for those events.
//!
//! ## Event flow
//! ```text
//! AdEngine::attach(sink)            ─► loader events: ManagerReady | AdError
//! AdsManager::subscribe(kinds, sink) ─► manager events: AdError | Loaded | Started
//!                                                       | Skipped | Complete | AllCompleted
//!                       sink.emit(ev) ──► controller command queue (never blocks)
//! ```
//!
//! Manager sinks are tagged with the session generation that created them;
//! the controller drops events whose generation is no longer current.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{
    error::SessionError,
    session::Command,
    viewport::{ViewMode, Viewport},
};

/// Reference width the non-linear slot height is scaled from.
const NON_LINEAR_REFERENCE_WIDTH: u64 = 640;
/// Non-linear slot height at the reference width.
const NON_LINEAR_REFERENCE_HEIGHT: u64 = 150;

/// Lifecycle events reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Loader produced a manager for the outstanding request.
    ManagerReady,
    /// Loader or manager reported an error.
    AdError { message: String },
    /// An ad's media loaded.
    Loaded,
    /// An ad started rendering.
    Started,
    /// The viewer skipped an ad.
    Skipped,
    /// One ad finished.
    Complete,
    /// Every ad of the break finished.
    AllCompleted,
}

impl EngineEvent {
    /// Payload-free classification of this event.
    pub fn kind(&self) -> EngineEventKind {
        match self {
            EngineEvent::ManagerReady => EngineEventKind::ManagerReady,
            EngineEvent::AdError { .. } => EngineEventKind::AdError,
            EngineEvent::Loaded => EngineEventKind::Loaded,
            EngineEvent::Started => EngineEventKind::Started,
            EngineEvent::Skipped => EngineEventKind::Skipped,
            EngineEvent::Complete => EngineEventKind::Complete,
            EngineEvent::AllCompleted => EngineEventKind::AllCompleted,
        }
    }
}

/// Classification of [`EngineEvent`]s, used for subscriptions and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineEventKind {
    ManagerReady,
    AdError,
    Loaded,
    Started,
    Skipped,
    Complete,
    AllCompleted,
}

impl EngineEventKind {
    /// Events the controller subscribes to on every manager.
    pub const MANAGER_EVENTS: &'static [EngineEventKind] = &[
        EngineEventKind::AdError,
        EngineEventKind::Loaded,
        EngineEventKind::Started,
        EngineEventKind::Skipped,
        EngineEventKind::Complete,
        EngineEventKind::AllCompleted,
    ];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineEventKind::ManagerReady => "manager_ready",
            EngineEventKind::AdError => "ad_error",
            EngineEventKind::Loaded => "loaded",
            EngineEventKind::Started => "started",
            EngineEventKind::Skipped => "skipped",
            EngineEventKind::Complete => "complete",
            EngineEventKind::AllCompleted => "all_completed",
        }
    }

    /// `true` for events about individual ads (as opposed to loader/manager plumbing).
    pub fn is_ad_level(&self) -> bool {
        !matches!(
            self,
            EngineEventKind::ManagerReady | EngineEventKind::AdError
        )
    }
}

/// Request descriptor handed to [`AdEngine::request_ads`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdRequest {
    /// Ad tag / endpoint identifier.
    pub ad_tag_url: String,
    /// Linear slot size (the full viewport).
    pub linear_slot: Viewport,
    /// Non-linear slot size: full width, height scaled as `150 * width / 640`.
    pub non_linear_slot: Viewport,
}

impl AdRequest {
    /// Builds a request sized for `viewport`.
    ///
    /// # Example
    /// ```
    /// use adcycle::{AdRequest, Viewport};
    ///
    /// let req = AdRequest::new("https://ads.example/tag", Viewport::new(1280, 720));
    /// assert_eq!(req.non_linear_slot, Viewport::new(1280, 300));
    /// ```
    pub fn new(ad_tag_url: impl Into<String>, viewport: Viewport) -> Self {
        let scaled = u64::from(viewport.width) * NON_LINEAR_REFERENCE_HEIGHT
            / NON_LINEAR_REFERENCE_WIDTH;
        Self {
            ad_tag_url: ad_tag_url.into(),
            linear_slot: viewport,
            non_linear_slot: Viewport::new(viewport.width, scaled.min(u64::from(u32::MAX)) as u32),
        }
    }
}

/// Rendering settings applied when a manager is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingSettings {
    /// How long the engine waits for ad media before giving up.
    #[serde(with = "humantime_serde")]
    pub load_video_timeout: Duration,
    /// Restore the content's playback state once an ad break completes.
    pub restore_playback_state: bool,
}

impl Default for RenderingSettings {
    fn default() -> Self {
        Self {
            load_video_timeout: Duration::from_millis(16_000),
            restore_playback_state: true,
        }
    }
}

/// Loader side of the ad engine.
///
/// All calls are synchronous and happen on the controller task. Errors returned
/// here are treated exactly like an engine-reported [`EngineEvent::AdError`].
pub trait AdEngine: Send + 'static {
    /// Live manager handle type.
    type Manager: AdsManager;

    /// Whether the engine is present in the page at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Binds the engine to its display surface and registers the loader-level sink.
    ///
    /// Called before the first request, and again after a failed attach.
    fn attach(&mut self, sink: EngineSink) -> Result<(), SessionError>;

    /// Issues an ad request. The outcome arrives later as `ManagerReady` or `AdError`.
    fn request_ads(&mut self, request: &AdRequest) -> Result<(), SessionError>;

    /// Produces the manager for the request that just reported `ManagerReady`.
    fn create_manager(
        &mut self,
        settings: &RenderingSettings,
    ) -> Result<Self::Manager, SessionError>;
}

/// Live manager handle for one ad break. At most one exists at a time.
pub trait AdsManager: Send + 'static {
    /// Registers `sink` for the given events.
    fn subscribe(
        &mut self,
        events: &[EngineEventKind],
        sink: EngineSink,
    ) -> Result<(), SessionError>;

    fn init(&mut self, viewport: Viewport, mode: ViewMode) -> Result<(), SessionError>;

    fn start(&mut self) -> Result<(), SessionError>;

    fn resize(&mut self, viewport: Viewport, mode: ViewMode);

    /// Volume in `0.0..=1.0`.
    fn set_volume(&mut self, level: f32);

    fn volume(&self) -> f32;

    /// Releases the handle and everything it rendered.
    fn destroy(self)
    where
        Self: Sized;
}

/// Callback endpoint through which the engine reports [`EngineEvent`]s.
///
/// Cheap to clone; `emit` never blocks, so it is safe to call from inside any
/// engine callback, including synchronously from `start()`.
#[derive(Clone, Debug)]
pub struct EngineSink {
    tx: mpsc::UnboundedSender<Command>,
    generation: Option<u64>,
}

impl EngineSink {
    /// Loader-level sink: its events always refer to the outstanding request.
    pub(crate) fn loader(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self {
            tx,
            generation: None,
        }
    }

    /// Manager-level sink bound to one session generation.
    pub(crate) fn manager(tx: mpsc::UnboundedSender<Command>, generation: u64) -> Self {
        Self {
            tx,
            generation: Some(generation),
        }
    }

    /// Generation this sink is bound to, if any.
    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    /// Reports an event. Returns `false` if the controller is gone.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx
            .send(Command::Engine {
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}

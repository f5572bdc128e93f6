//! # adcycle
//!
//! **adcycle** drives the lifecycle of an ad-playback session on a page that
//! embeds an ad SDK: deciding when to start, requesting ads, wiring the
//! returned manager, recycling after every completed break, and recovering
//! from failures. The SDK itself sits behind the [`AdEngine`] / [`AdsManager`]
//! traits, so hosts plug in the real engine and tests plug in fakes.
//!
//! ## Architecture
//! ```text
//!   parent frame                      host page
//!  ┌─────────────┐  initAds   ┌──────────────────┐   ┌────────────────┐
//!  │ postMessage ├───────────►│ HandshakeBridge  │   │ InteractionGate│◄── click
//!  └──────▲──────┘            │ (origin check)   │   │ (standalone)   │
//!         │ adsReady/adEvent  └────────┬─────────┘   └───────┬────────┘
//!         │ /error                     │ start(Handshake)    │ start(UserInteraction|Autoplay)
//!         │                            ▼                     ▼
//!         │            ┌────────────────────────────────────────────────┐
//!         │            │ SessionController (one task, one Session)      │◄── ViewportAdapter
//!         │            │  Idle→Requesting→Loaded→Playing→Completed      │
//!         │            │        └────────────► Error ◄─────┘            │
//!         │            │  RetryScheduler: retry / recycle timers        │◄── EngineSink
//!         │            └────┬──────────────┬───────────────┬────────────┘     (AdEngine/AdsManager)
//!         │                 │ Event        │ calls         │ show/hide
//!         │                 ▼              ▼               ▼
//!         │               Bus        AdEngine/AdsManager   PlayControl / Overlay / Page
//!         │                 │
//!         │                 ▼
//!         │          SubscriberSet ──► LogWriter (tracing)
//!         └──────────────────────────► ParentRelay (embedded only)
//! ```
//!
//! ## Session lifecycle
//! ```text
//! start(trigger)
//!   ├─ state != Idle ─► ignored (StartIgnored)
//!   └─ Requesting: destroy old manager, generation += 1, fresh viewport, request_ads
//!        ├─ ManagerReady ─► Loaded: mute unless interacted, subscribe, init, start
//!        │     └─ Loaded|Started ─► Playing: hide overlay
//!        │           └─ AllCompleted ─► Completed: show overlay, recycle after recycle_delay
//!        └─ AdError / wiring failure ─► Error: destroy manager, retry_count += 1
//!              ├─ retry.next(n) = Some(d) ─► re-request after d
//!              └─ None ─► retry prompt (control.show_retry, activation reloads page)
//! ```
//!
//! ## Features
//! | Area             | Description                                               | Key types / traits                          |
//! |------------------|-----------------------------------------------------------|---------------------------------------------|
//! | **Launch**       | Context detection and startup wiring.                     | [`Launcher`], [`Launched`], [`SdkLoader`]   |
//! | **Session**      | The state machine and its handle.                         | [`SessionController`], [`SessionHandle`]    |
//! | **Engine seam**  | What the ad SDK must provide.                             | [`AdEngine`], [`AdsManager`], [`EngineSink`]|
//! | **Handshake**    | Parent/child messages with an origin allow-list.          | [`HandshakeBridge`], [`OriginAllowList`]    |
//! | **Subscribers**  | Observe runtime events.                                   | [`Subscribe`], [`LogWriter`], [`ParentRelay`]|
//! | **Policies**     | Retry delay and bound.                                    | [`RetryPolicy`], [`JitterPolicy`]           |
//! | **Configuration**| All knobs, JSON-loadable.                                 | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a `tracing`-backed subscriber.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use adcycle::{
//!     AdEngine, AdRequest, AdsManager, Config, EngineEventKind, EngineSink, Launcher,
//!     RenderingSettings, SessionError, ViewMode, Viewport,
//! };
//!
//! struct Sdk;
//! struct Manager;
//!
//! impl AdEngine for Sdk {
//!     type Manager = Manager;
//!     fn attach(&mut self, _sink: EngineSink) -> Result<(), SessionError> { Ok(()) }
//!     fn request_ads(&mut self, _req: &AdRequest) -> Result<(), SessionError> { Ok(()) }
//!     fn create_manager(&mut self, _s: &RenderingSettings) -> Result<Manager, SessionError> {
//!         Ok(Manager)
//!     }
//! }
//!
//! impl AdsManager for Manager {
//!     fn subscribe(&mut self, _e: &[EngineEventKind], _s: EngineSink) -> Result<(), SessionError> { Ok(()) }
//!     fn init(&mut self, _v: Viewport, _m: ViewMode) -> Result<(), SessionError> { Ok(()) }
//!     fn start(&mut self) -> Result<(), SessionError> { Ok(()) }
//!     fn resize(&mut self, _v: Viewport, _m: ViewMode) {}
//!     fn set_volume(&mut self, _level: f32) {}
//!     fn volume(&self) -> f32 { 1.0 }
//!     fn destroy(self) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::new("https://ads.example/tag?output=vast");
//!     let launched = Launcher::builder(cfg, Sdk, Arc::new(|| Viewport::new(1280, 720)))
//!         .launch()
//!         .await?;
//!
//!     // No play control was configured, so the gate requested a muted autoplay.
//!     launched.on_resize()?;
//!     launched.shutdown().await;
//!     Ok(())
//! }
//! ```

mod config;
mod engine;
mod environment;
mod error;
mod events;
mod gate;
mod handshake;
mod launcher;
mod policies;
mod session;
mod subscribers;
mod ui;
mod viewport;

// ---- Public re-exports ----

pub use config::Config;
pub use engine::{
    AdEngine, AdRequest, AdsManager, EngineEvent, EngineEventKind, EngineSink, RenderingSettings,
};
pub use environment::{Context, Environment, EnvironmentDetector, FixedEnvironment};
pub use error::{ConfigError, ControllerError, HandshakeRejection, LaunchError, SessionError};
pub use events::{Bus, Event, EventKind};
pub use gate::{GateOutcome, InteractionGate};
pub use handshake::{
    HandshakeBridge, INIT_ADS, InboundCommand, InboundMessage, NotificationKind, OriginAllowList,
    OriginRule, OutboundNotification, ParentChannel,
};
pub use launcher::{Launched, Launcher, SdkLoader};
pub use policies::{JitterPolicy, RetryPolicy};
pub use session::{
    DeferredAction, SessionController, SessionHandle, SessionSnapshot, SessionState, Trigger,
};
pub use subscribers::{ParentRelay, Subscribe, SubscriberSet};
pub use ui::{Overlay, Page, PlayControl};
pub use viewport::{ViewMode, Viewport, ViewportAdapter, ViewportSource};

// ---- Optional features ----

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

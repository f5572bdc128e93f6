//! # Launcher: page startup wiring.
//!
//! Builds the runtime for one page and decides how the first session begins.
//!
//! ```text
//! Launcher::builder(cfg, engine, viewport)
//!     .with_environment(..) .with_parent(..) .with_play_control(..)
//!     .with_overlay(..) .with_page(..) .with_subscribers(..) .with_loader(..)
//!     .launch().await
//!         │
//!         ├─ cfg.validate()
//!         ├─ Bus + SubscriberSet (+ ParentRelay when embedded) + listener
//!         ├─ engine missing? ─► loader.load() once (allow_dynamic_load)
//!         ├─ spawn SessionController::run()
//!         ├─ engine still missing ─► EngineUnavailable (retry prompt), done
//!         ├─ Embedded   ─► bridge.on_command(inbox, start(Handshake)); announce_ready()
//!         └─ Standalone ─► gate.arm()  (show control, or start(Autoplay))
//! ```
//!
//! The returned [`Launched`] is what the host keeps: it delivers inbound
//! messages, resize notifications and control clicks, and shuts everything down.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    engine::AdEngine,
    environment::{Context, Environment, EnvironmentDetector, FixedEnvironment},
    error::{ControllerError, LaunchError, SessionError},
    events::{Bus, Event},
    gate::{GateOutcome, InteractionGate},
    handshake::{HandshakeBridge, InboundMessage, ParentChannel},
    session::{Affordances, SessionController, SessionHandle, Trigger},
    subscribers::{ParentRelay, Subscribe, SubscriberSet},
    ui::{Overlay, Page, PlayControl},
    viewport::{Viewport, ViewportAdapter, ViewportSource},
};

/// Injects the ad SDK into a page that did not ship it.
#[async_trait]
pub trait SdkLoader: Send + Sync + 'static {
    /// Loads the SDK. The engine's `is_available` is checked again afterwards.
    async fn load(&self) -> Result<(), SessionError>;
}

/// Builder for a page's ad runtime.
pub struct Launcher<E: AdEngine> {
    cfg: Config,
    engine: E,
    viewport: Arc<dyn ViewportSource>,
    environment: Arc<dyn Environment>,
    parent: Option<Arc<dyn ParentChannel>>,
    control: Option<Arc<dyn PlayControl>>,
    overlay: Option<Arc<dyn Overlay>>,
    page: Option<Arc<dyn Page>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    loader: Option<Arc<dyn SdkLoader>>,
}

impl<E: AdEngine> Launcher<E> {
    /// Starts a builder. The environment defaults to standalone.
    pub fn builder(cfg: Config, engine: E, viewport: Arc<dyn ViewportSource>) -> Self {
        Self {
            cfg,
            engine,
            viewport,
            environment: Arc::new(FixedEnvironment::standalone()),
            parent: None,
            control: None,
            overlay: None,
            page: None,
            subscribers: Vec::new(),
            loader: None,
        }
    }

    /// Probe used to tell embedded pages from standalone ones.
    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = environment;
        self
    }

    /// Channel to the parent context. Required when embedded.
    pub fn with_parent(mut self, parent: Arc<dyn ParentChannel>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_play_control(mut self, control: Arc<dyn PlayControl>) -> Self {
        self.control = Some(control);
        self
    }

    pub fn with_overlay(mut self, overlay: Arc<dyn Overlay>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn with_page(mut self, page: Arc<dyn Page>) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets event subscribers for observability.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// SDK loader tried once when the engine is missing and `allow_dynamic_load` is set.
    pub fn with_loader(mut self, loader: Arc<dyn SdkLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Wires the runtime and begins the first session according to the page context.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn launch(self) -> Result<Launched, LaunchError> {
        self.cfg.validate()?;

        let context = EnvironmentDetector::new(Arc::clone(&self.environment)).context();
        let parent = match (context, &self.parent) {
            (Context::Embedded, None) => {
                return Err(LaunchError::MissingCollaborator("parent channel"));
            }
            (Context::Embedded, Some(parent)) => Some(Arc::clone(parent)),
            (Context::Standalone, _) => None,
        };
        info!(context = context.as_str(), "launching ad runtime");

        let token = CancellationToken::new();
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        let mut subs = self.subscribers;
        if let Some(parent) = &parent {
            subs.push(Arc::new(ParentRelay::new(Arc::clone(parent))));
        }
        let set = Arc::new(SubscriberSet::new(subs, bus.clone()));
        let listener = subscriber_listener(&bus, Arc::clone(&set), token.clone());

        let available = engine_available(&self.engine, &self.cfg, self.loader.as_deref()).await;

        let origins = self.cfg.trusted_origins.clone();
        let inbox_capacity = self.cfg.inbox_capacity_clamped();
        let ui = Affordances {
            control: self.control.clone(),
            overlay: self.overlay,
            page: self.page,
        };
        let (ctrl, handle) = SessionController::with_affordances(
            self.cfg,
            self.engine,
            Arc::clone(&self.viewport),
            ui,
            bus.clone(),
            token.child_token(),
        );
        let controller = tokio::spawn(ctrl.run());

        let mut launched = Launched {
            handle: handle.clone(),
            context,
            inbox: None,
            gate: None,
            viewport: ViewportAdapter::new(self.viewport, handle.clone()),
            bus: bus.clone(),
            token: token.clone(),
            controller,
            listener,
            subscribers: set,
        };

        if !available {
            warn!("ad engine unavailable; offering manual retry");
            // A closed controller here means it already stopped; nothing left to report to.
            let _ = handle.report_engine_unavailable();
            return Ok(launched);
        }

        match parent {
            Some(parent) => {
                let bridge = Arc::new(HandshakeBridge::new(origins, parent, bus));
                let (tx, rx) = mpsc::channel(inbox_capacity);
                let starter = handle.clone();
                bridge.clone().on_command(rx, token.child_token(), move || {
                    if starter.start(Trigger::Handshake).is_err() {
                        debug!("handshake start after controller shutdown");
                    }
                });
                bridge.announce_ready();
                launched.inbox = Some(tx);
            }
            None => {
                let gate = InteractionGate::new(self.control, handle);
                match gate.arm() {
                    Ok(GateOutcome::Armed) => debug!("play control armed"),
                    Ok(GateOutcome::AutoStarted) => debug!("no play control; autoplay requested"),
                    Err(ControllerError::Closed) => warn!("controller closed before gate armed"),
                }
                launched.gate = Some(gate);
            }
        }
        Ok(launched)
    }
}

/// Checks the engine, trying the loader once when allowed.
async fn engine_available<E: AdEngine>(
    engine: &E,
    cfg: &Config,
    loader: Option<&dyn SdkLoader>,
) -> bool {
    if engine.is_available() {
        return true;
    }
    let Some(loader) = loader.filter(|_| cfg.allow_dynamic_load) else {
        return false;
    };
    info!("ad engine missing; loading sdk");
    if let Err(err) = loader.load().await {
        warn!(error = %err, "sdk load failed");
        return false;
    }
    engine.is_available()
}

/// Forwards bus events to the subscriber set until cancelled, then drains what is buffered.
fn subscriber_listener(
    bus: &Bus,
    set: Arc<SubscriberSet>,
    token: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    while let Ok(ev) = rx.try_recv() {
                        set.emit(&ev);
                    }
                    break;
                }
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    })
}

/// A running page runtime.
pub struct Launched {
    handle: SessionHandle,
    context: Context,
    inbox: Option<mpsc::Sender<InboundMessage>>,
    gate: Option<InteractionGate>,
    viewport: ViewportAdapter,
    bus: Bus,
    token: CancellationToken,
    controller: JoinHandle<()>,
    listener: JoinHandle<()>,
    subscribers: Arc<SubscriberSet>,
}

impl Launched {
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn context(&self) -> Context {
        self.context
    }

    /// The interaction gate; `None` when embedded or when the engine was unavailable.
    pub fn gate(&self) -> Option<&InteractionGate> {
        self.gate.as_ref()
    }

    /// Hands a message received from another browsing context to the handshake bridge.
    ///
    /// Returns `false` when standalone or after shutdown.
    pub async fn deliver(&self, msg: InboundMessage) -> bool {
        match &self.inbox {
            Some(tx) => tx.send(msg).await.is_ok(),
            None => false,
        }
    }

    /// The play control was clicked.
    pub fn activate_control(&self) -> Result<(), ControllerError> {
        self.handle.activate_control()
    }

    /// Call on every viewport dimension change.
    pub fn on_resize(&self) -> Result<Viewport, ControllerError> {
        self.viewport.on_resize()
    }

    /// User-initiated volume change.
    pub fn set_volume(&self, level: f32) -> Result<(), ControllerError> {
        self.handle.set_volume(level)
    }

    /// Receiver for runtime events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Destroys the live manager, stops every task and flushes subscribers.
    pub async fn shutdown(self) {
        if self.handle.shutdown().is_ok() {
            let _ = self.controller.await;
        }
        self.token.cancel();
        let _ = self.listener.await;
        match Arc::try_unwrap(self.subscribers) {
            Ok(set) => set.shutdown().await,
            Err(_) => debug!("subscriber set still shared; skipping flush"),
        }
    }
}

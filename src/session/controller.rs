//! # SessionController: the ad session state machine.
//!
//! Owns the single [`Session`], the engine, the live manager handle and the
//! retry scheduler. Runs as one tokio task draining its command queue, so
//! every transition happens on one logical thread with no locks.
//!
//! ## Transitions
//! ```text
//! Idle       ── start(trigger) ───────────► Requesting   attach engine (once), request with fresh viewport
//! Requesting ── ManagerReady ─────────────► Loaded       settings, mute unless interacted, subscribe, init, start
//! Loaded     ── Loaded | Started ──────────► Playing      hide overlay
//! Playing    ── AllCompleted ─────────────► Completed    show overlay, schedule recycle
//! Requesting
//! | Loaded   ── AdError | wiring failure ──► Error        destroy manager, retry_count += 1, schedule retry
//! | Playing
//! Completed
//! | Error    ── scheduled action fires ───► Requesting   destroy stale manager, generation += 1, re-request
//! ```
//!
//! ## Rules
//! - **One manager**: every entry into `Requesting` destroys the previous handle first.
//! - **One request**: `start()` outside `Idle` is a no-op; deferred actions only
//!   act in `Completed`/`Error` and only for the current generation.
//! - **Mute**: a manager is muted before `init` unless the user has interacted;
//!   an explicit unmute counts as interaction, so it is never undone.
//! - **Containment**: wiring errors become the `Error` transition; nothing escapes `run()`.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    engine::{AdEngine, AdRequest, AdsManager, EngineEvent, EngineEventKind, EngineSink},
    error::SessionError,
    events::{Bus, Event, EventKind},
    ui::{Overlay, Page, PlayControl},
    viewport::{ViewMode, Viewport, ViewportSource},
};

use super::{
    Command, SessionHandle,
    scheduler::{DeferredAction, RetryScheduler},
    state::{Session, SessionSnapshot, SessionState, Trigger},
};

/// UI affordances the controller toggles. All optional.
#[derive(Clone, Default)]
pub(crate) struct Affordances {
    pub control: Option<Arc<dyn PlayControl>>,
    pub overlay: Option<Arc<dyn Overlay>>,
    pub page: Option<Arc<dyn Page>>,
}

/// The session lifecycle state machine.
pub struct SessionController<E: AdEngine> {
    cfg: Config,
    engine: E,
    attached: bool,
    manager: Option<E::Manager>,
    session: Session,
    retry_prompt: bool,

    viewport: Arc<dyn ViewportSource>,
    ui: Affordances,
    scheduler: RetryScheduler,
    bus: Bus,

    tx: mpsc::UnboundedSender<Command>,
    rx: mpsc::UnboundedReceiver<Command>,
    snapshot: watch::Sender<SessionSnapshot>,
    token: CancellationToken,
}

impl<E: AdEngine> SessionController<E> {
    /// Creates a controller and its handle. Call [`run`](Self::run) (or spawn it) to start processing.
    pub fn new(
        cfg: Config,
        engine: E,
        viewport: Arc<dyn ViewportSource>,
        bus: Bus,
        token: CancellationToken,
    ) -> (Self, SessionHandle) {
        Self::with_affordances(cfg, engine, viewport, Affordances::default(), bus, token)
    }

    pub(crate) fn with_affordances(
        cfg: Config,
        engine: E,
        viewport: Arc<dyn ViewportSource>,
        ui: Affordances,
        bus: Bus,
        token: CancellationToken,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session {
            viewport: viewport.current(),
            ..Session::default()
        };
        let (snapshot, state_rx) = watch::channel(SessionSnapshot {
            viewport: session.viewport,
            ..SessionSnapshot::default()
        });
        let scheduler = RetryScheduler::new(tx.clone(), token.child_token());
        let handle = SessionHandle::new(tx.clone(), state_rx);

        let ctrl = Self {
            cfg,
            engine,
            attached: false,
            manager: None,
            session,
            retry_prompt: false,
            viewport,
            ui,
            scheduler,
            bus,
            tx,
            rx,
            snapshot,
            token,
        };
        (ctrl, handle)
    }

    /// Processes commands until shutdown or cancellation, then releases the manager.
    pub async fn run(mut self) {
        loop {
            let cmd = tokio::select! {
                _ = self.token.cancelled() => break,
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => cmd,
                    None => break,
                },
            };
            let keep_going = self.handle(cmd);
            self.publish_snapshot();
            if !keep_going {
                break;
            }
        }
        self.teardown();
        self.publish_snapshot();
    }

    /// Applies one command. Returns `false` when the controller should stop.
    fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Start(trigger) => self.start(trigger),
            Command::Engine { generation, event } => self.on_engine_event(generation, event),
            Command::Resize(viewport) => self.on_resize(viewport),
            Command::Volume(level) => self.on_volume(level),
            Command::ControlActivated => self.on_control_activated(),
            Command::Deferred { generation, action } => self.on_deferred(generation, action),
            Command::EngineUnavailable => {
                self.publish(
                    Event::new(EventKind::SessionFailed)
                        .with_reason(SessionError::EngineUnavailable.as_message()),
                );
                self.prompt_retry();
            }
            Command::Shutdown => {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                return false;
            }
        }
        true
    }

    fn start(&mut self, trigger: Trigger) {
        if self.session.state != SessionState::Idle || self.retry_prompt {
            debug!(state = self.session.state.as_str(), trigger = trigger.as_str(), "start ignored");
            self.publish(Event::new(EventKind::StartIgnored).with_reason(trigger.as_str()));
            return;
        }
        if trigger == Trigger::UserInteraction {
            self.session.has_user_interacted = true;
            if let Some(control) = &self.ui.control {
                control.hide();
            }
        }
        info!(trigger = trigger.as_str(), "session starting");
        self.bus
            .publish(Event::new(EventKind::SessionStarting).with_reason(trigger.as_str()));
        self.enter_requesting();
    }

    /// The only way into `Requesting`.
    fn enter_requesting(&mut self) {
        self.destroy_manager();
        self.session.generation += 1;
        self.session.viewport = self.viewport.current();
        self.session.state = SessionState::Requesting;

        if let Err(err) = self.issue_request() {
            self.fail(err);
        }
    }

    fn issue_request(&mut self) -> Result<(), SessionError> {
        if !self.attached {
            self.engine.attach(EngineSink::loader(self.tx.clone()))?;
            self.attached = true;
        }
        let request = AdRequest::new(self.cfg.ad_tag_url.as_str(), self.session.viewport);
        self.engine.request_ads(&request)?;
        self.publish(Event::new(EventKind::RequestIssued).with_viewport(self.session.viewport));
        Ok(())
    }

    fn on_engine_event(&mut self, generation: Option<u64>, event: EngineEvent) {
        if let Some(generation) = generation.filter(|g| *g != self.session.generation) {
            debug!(generation, current = self.session.generation, event = event.kind().as_str(), "stale engine event");
            self.bus.publish(
                Event::new(EventKind::StaleIgnored)
                    .with_generation(generation)
                    .with_reason(event.kind().as_str()),
            );
            return;
        }

        let kind = event.kind();
        if kind.is_ad_level() && self.session.state.is_active() {
            self.publish(Event::new(EventKind::AdEvent).with_ad_event(kind));
        }

        match (self.session.state, event) {
            (SessionState::Requesting, EngineEvent::ManagerReady) => self.on_manager_ready(),
            (state, EngineEvent::AdError { message }) if state.is_in_flight() => {
                self.fail(SessionError::RequestFailure { message });
            }
            (SessionState::Loaded, EngineEvent::Loaded | EngineEvent::Started) => {
                if let Some(overlay) = &self.ui.overlay {
                    overlay.hide(self.cfg.overlay_fade);
                }
                self.session.state = SessionState::Playing;
                self.publish(Event::new(EventKind::PlaybackStarted));
            }
            (SessionState::Loaded | SessionState::Playing, EngineEvent::AllCompleted) => {
                self.complete();
            }
            (state, event) => {
                debug!(state = state.as_str(), event = event.kind().as_str(), "no transition");
            }
        }
    }

    fn on_manager_ready(&mut self) {
        match self.wire_manager() {
            Ok(()) => {
                self.session.retry_count = 0;
                self.session.state = SessionState::Loaded;
                self.publish(Event::new(EventKind::ManagerReady));
            }
            Err(err) => self.fail(err),
        }
    }

    fn wire_manager(&mut self) -> Result<(), SessionError> {
        let mut manager = self.engine.create_manager(&self.cfg.rendering)?;

        if !self.session.has_user_interacted {
            manager.set_volume(0.0);
            self.session.muted = true;
            self.publish(Event::new(EventKind::Muted));
        }

        let sink = EngineSink::manager(self.tx.clone(), self.session.generation);
        let viewport = self.session.viewport;
        let wired = manager
            .subscribe(EngineEventKind::MANAGER_EVENTS, sink)
            .and_then(|()| manager.init(viewport, ViewMode::Normal))
            .and_then(|()| manager.start());

        // Held even on failure so `fail` destroys it.
        self.manager = Some(manager);
        wired
    }

    fn complete(&mut self) {
        self.session.state = SessionState::Completed;
        if let Some(overlay) = &self.ui.overlay {
            overlay.show(self.cfg.overlay_fade);
        }
        self.publish(Event::new(EventKind::BreakCompleted));
        self.schedule(DeferredAction::Recycle, self.cfg.recycle_delay);
    }

    fn fail(&mut self, err: SessionError) {
        warn!(
            generation = self.session.generation,
            label = err.as_label(),
            error = %err,
            "session failed"
        );
        self.destroy_manager();
        self.session.retry_count = self.session.retry_count.saturating_add(1);
        self.session.state = SessionState::Error;
        self.publish(
            Event::new(EventKind::SessionFailed)
                .with_attempt(self.session.retry_count)
                .with_reason(err.as_message()),
        );

        match self.cfg.retry.next(self.session.retry_count) {
            Some(delay) => self.schedule(DeferredAction::Retry, delay),
            None => {
                self.publish(
                    Event::new(EventKind::RetriesExhausted).with_attempt(self.session.retry_count),
                );
                self.prompt_retry();
            }
        }
    }

    fn schedule(&mut self, action: DeferredAction, delay: std::time::Duration) {
        let generation = self.session.generation;
        if self.scheduler.schedule(generation, action, delay) {
            self.publish(
                Event::new(EventKind::RetryScheduled)
                    .with_attempt(self.session.retry_count)
                    .with_delay(delay)
                    .with_reason(action.as_str()),
            );
        } else {
            debug!(generation, action = action.as_str(), "deferred action already pending");
        }
    }

    fn on_deferred(&mut self, generation: u64, action: DeferredAction) {
        self.scheduler.fired(generation);

        if generation != self.session.generation
            || !self.session.state.is_recyclable()
            || self.retry_prompt
        {
            debug!(
                generation,
                current = self.session.generation,
                state = self.session.state.as_str(),
                action = action.as_str(),
                "stale deferred action"
            );
            self.bus.publish(
                Event::new(EventKind::StaleIgnored)
                    .with_generation(generation)
                    .with_reason(action.as_str()),
            );
            return;
        }

        self.publish(Event::new(EventKind::Recycled).with_reason(action.as_str()));
        self.enter_requesting();
    }

    fn on_resize(&mut self, viewport: Viewport) {
        self.session.viewport = viewport;
        if !self.session.state.is_active() {
            return;
        }
        if let Some(manager) = self.manager.as_mut() {
            manager.resize(viewport, ViewMode::Normal);
            self.publish(Event::new(EventKind::ResizeForwarded).with_viewport(viewport));
        }
    }

    fn on_volume(&mut self, level: f32) {
        let level = if level.is_finite() { level.clamp(0.0, 1.0) } else { 0.0 };
        if level > 0.0 {
            self.session.has_user_interacted = true;
            self.session.muted = false;
        }
        if let Some(manager) = self.manager.as_mut() {
            manager.set_volume(level);
        }
    }

    fn on_control_activated(&mut self) {
        if self.retry_prompt {
            info!("retry prompt activated; reloading page");
            match &self.ui.page {
                Some(page) => page.reload(),
                None => warn!("retry prompt activated but no page handle configured"),
            }
            return;
        }
        self.start(Trigger::UserInteraction);
    }

    /// Stops automatic recovery and offers the manual reload.
    fn prompt_retry(&mut self) {
        self.retry_prompt = true;
        match &self.ui.control {
            Some(control) => control.show_retry(),
            None => warn!("no play control configured; retry prompt cannot be shown"),
        }
    }

    fn destroy_manager(&mut self) {
        if let Some(manager) = self.manager.take() {
            debug!(generation = self.session.generation, "destroying manager");
            manager.destroy();
        }
    }

    fn teardown(&mut self) {
        self.scheduler.cancel_all();
        self.destroy_manager();
        self.rx.close();
    }

    /// Publishes an event stamped with the current generation.
    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_generation(self.session.generation));
    }

    fn publish_snapshot(&self) {
        let s = &self.session;
        self.snapshot.send_replace(SessionSnapshot {
            state: s.state,
            has_user_interacted: s.has_user_interacted,
            viewport: s.viewport,
            retry_count: s.retry_count,
            generation: s.generation,
            muted: s.muted,
            manager_alive: self.manager.is_some(),
            retry_prompt: self.retry_prompt,
        });
    }
}

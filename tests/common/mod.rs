#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adcycle::{
    AdEngine, AdRequest, AdsManager, EngineEvent, EngineEventKind, EngineSink,
    OutboundNotification, Overlay, Page, ParentChannel, PlayControl, RenderingSettings,
    SessionError, ViewMode, Viewport, ViewportSource,
};

pub const TAG: &str = "https://ads.example/tag?output=vast";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Attach,
    Request(AdRequest),
    CreateManager(u32),
    Subscribe(u32, Vec<EngineEventKind>),
    Init(u32, Viewport, ViewMode),
    Start(u32),
    Resize(u32, Viewport, ViewMode),
    Volume(u32, f32),
    Destroy(u32),
}

/// Shared log and knobs behind [`FakeEngine`] and its managers.
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
    loader_sink: Mutex<Option<EngineSink>>,
    manager_sinks: Mutex<Vec<EngineSink>>,
    live: AtomicUsize,
    max_live: AtomicUsize,
    pub unavailable: AtomicBool,
    pub fail_attach: AtomicBool,
    pub fail_init: AtomicBool,
}

impl Recorder {
    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn requests(&self) -> Vec<AdRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::Request(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// Managers created and not yet destroyed.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live managers ever observed.
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    /// Emits through the loader-level sink (ManagerReady / AdError).
    pub fn emit_loader(&self, event: EngineEvent) -> bool {
        match self.loader_sink.lock().unwrap().as_ref() {
            Some(sink) => sink.emit(event),
            None => false,
        }
    }

    /// Emits through the most recently subscribed manager sink.
    pub fn emit_manager(&self, event: EngineEvent) -> bool {
        match self.manager_sinks.lock().unwrap().last() {
            Some(sink) => sink.emit(event),
            None => false,
        }
    }

    /// Emits through the manager sink subscribed `index`-th (0-based).
    pub fn emit_manager_at(&self, index: usize, event: EngineEvent) -> bool {
        match self.manager_sinks.lock().unwrap().get(index) {
            Some(sink) => sink.emit(event),
            None => false,
        }
    }

    pub fn last_volume(&self) -> Option<f32> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|c| match c {
                Call::Volume(_, v) => Some(*v),
                _ => None,
            })
    }
}

pub struct FakeEngine {
    rec: Arc<Recorder>,
    next_id: u32,
}

impl FakeEngine {
    pub fn new() -> (Self, Arc<Recorder>) {
        let rec = Arc::new(Recorder::default());
        (
            Self {
                rec: Arc::clone(&rec),
                next_id: 0,
            },
            rec,
        )
    }
}

impl AdEngine for FakeEngine {
    type Manager = FakeManager;

    fn is_available(&self) -> bool {
        !self.rec.unavailable.load(Ordering::SeqCst)
    }

    fn attach(&mut self, sink: EngineSink) -> Result<(), SessionError> {
        self.rec.push(Call::Attach);
        if self.rec.fail_attach.load(Ordering::SeqCst) {
            return Err(SessionError::DisplaySurfaceMissing {
                surface: "ad-container".into(),
            });
        }
        *self.rec.loader_sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn request_ads(&mut self, request: &AdRequest) -> Result<(), SessionError> {
        self.rec.push(Call::Request(request.clone()));
        Ok(())
    }

    fn create_manager(
        &mut self,
        _settings: &RenderingSettings,
    ) -> Result<FakeManager, SessionError> {
        self.next_id += 1;
        let id = self.next_id;
        self.rec.push(Call::CreateManager(id));
        let live = self.rec.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.rec.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(FakeManager {
            id,
            rec: Arc::clone(&self.rec),
            volume: 1.0,
        })
    }
}

pub struct FakeManager {
    id: u32,
    rec: Arc<Recorder>,
    volume: f32,
}

impl AdsManager for FakeManager {
    fn subscribe(
        &mut self,
        events: &[EngineEventKind],
        sink: EngineSink,
    ) -> Result<(), SessionError> {
        self.rec.push(Call::Subscribe(self.id, events.to_vec()));
        self.rec.manager_sinks.lock().unwrap().push(sink);
        Ok(())
    }

    fn init(&mut self, viewport: Viewport, mode: ViewMode) -> Result<(), SessionError> {
        self.rec.push(Call::Init(self.id, viewport, mode));
        if self.rec.fail_init.load(Ordering::SeqCst) {
            return Err(SessionError::wiring("init", "malformed rendering settings"));
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), SessionError> {
        self.rec.push(Call::Start(self.id));
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport, mode: ViewMode) {
        self.rec.push(Call::Resize(self.id, viewport, mode));
    }

    fn set_volume(&mut self, level: f32) {
        self.volume = level;
        self.rec.push(Call::Volume(self.id, level));
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn destroy(self) {
        self.rec.push(Call::Destroy(self.id));
        self.rec.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Viewport the test can resize.
pub struct TestViewport(Mutex<Viewport>);

impl TestViewport {
    pub fn new(width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self(Mutex::new(Viewport::new(width, height))))
    }

    pub fn set(&self, width: u32, height: u32) {
        *self.0.lock().unwrap() = Viewport::new(width, height);
    }
}

impl ViewportSource for TestViewport {
    fn current(&self) -> Viewport {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
pub struct RecordingParent {
    posted: Mutex<Vec<OutboundNotification>>,
}

impl RecordingParent {
    pub fn posted(&self) -> Vec<OutboundNotification> {
        self.posted.lock().unwrap().clone()
    }
}

impl ParentChannel for RecordingParent {
    fn post(&self, notification: &OutboundNotification) {
        self.posted.lock().unwrap().push(notification.clone());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ui {
    ControlShown,
    ControlHidden,
    RetryShown,
    OverlayShown,
    OverlayHidden,
    Reloaded,
}

/// One log for every UI affordance, so ordering across them is observable.
#[derive(Default)]
pub struct RecordingUi {
    log: Mutex<Vec<Ui>>,
}

impl RecordingUi {
    pub fn log(&self) -> Vec<Ui> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, what: Ui) -> usize {
        self.log.lock().unwrap().iter().filter(|u| **u == what).count()
    }

    fn push(&self, what: Ui) {
        self.log.lock().unwrap().push(what);
    }
}

impl PlayControl for RecordingUi {
    fn show(&self) {
        self.push(Ui::ControlShown);
    }

    fn hide(&self) {
        self.push(Ui::ControlHidden);
    }

    fn show_retry(&self) {
        self.push(Ui::RetryShown);
    }
}

impl Overlay for RecordingUi {
    fn show(&self, _fade: Duration) {
        self.push(Ui::OverlayShown);
    }

    fn hide(&self, _fade: Duration) {
        self.push(Ui::OverlayHidden);
    }
}

impl Page for RecordingUi {
    fn reload(&self) {
        self.push(Ui::Reloaded);
    }
}

/// Lets every ready task run without advancing the paused clock meaningfully.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

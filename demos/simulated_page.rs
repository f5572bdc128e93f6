//! A standalone page driven by a simulated ad engine.
//!
//! The engine fills every other request and plays a short break; unfilled
//! requests fail and are retried. Run with:
//!
//! ```text
//! RUST_LOG=adcycle=debug cargo run --example simulated_page
//! ```

use std::sync::Arc;
use std::time::Duration;

use adcycle::{
    AdEngine, AdRequest, AdsManager, Config, EngineEvent, EngineEventKind, EngineSink, Launcher,
    LogWriter, RenderingSettings, SessionError, Subscribe, ViewMode, Viewport,
};
use tracing_subscriber::EnvFilter;

struct SimulatedSdk {
    loader: Option<EngineSink>,
    requests: u32,
}

impl AdEngine for SimulatedSdk {
    type Manager = SimulatedManager;

    fn attach(&mut self, sink: EngineSink) -> Result<(), SessionError> {
        self.loader = Some(sink);
        Ok(())
    }

    fn request_ads(&mut self, request: &AdRequest) -> Result<(), SessionError> {
        self.requests += 1;
        let Some(sink) = self.loader.clone() else {
            return Err(SessionError::wiring("request", "not attached"));
        };
        let filled = self.requests % 2 == 1;
        println!(
            "request #{} for {}x{} -> {}",
            self.requests,
            request.linear_slot.width,
            request.linear_slot.height,
            if filled { "fill" } else { "no fill" }
        );
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            if filled {
                sink.emit(EngineEvent::ManagerReady);
            } else {
                sink.emit(EngineEvent::AdError {
                    message: "no fill".into(),
                });
            }
        });
        Ok(())
    }

    fn create_manager(
        &mut self,
        _settings: &RenderingSettings,
    ) -> Result<SimulatedManager, SessionError> {
        Ok(SimulatedManager {
            sink: None,
            volume: 1.0,
        })
    }
}

struct SimulatedManager {
    sink: Option<EngineSink>,
    volume: f32,
}

impl AdsManager for SimulatedManager {
    fn subscribe(
        &mut self,
        _events: &[EngineEventKind],
        sink: EngineSink,
    ) -> Result<(), SessionError> {
        self.sink = Some(sink);
        Ok(())
    }

    fn init(&mut self, _viewport: Viewport, _mode: ViewMode) -> Result<(), SessionError> {
        Ok(())
    }

    fn start(&mut self) -> Result<(), SessionError> {
        let Some(sink) = self.sink.clone() else {
            return Err(SessionError::wiring("start", "no subscription"));
        };
        tokio::spawn(async move {
            for event in [
                EngineEvent::Loaded,
                EngineEvent::Started,
                EngineEvent::Complete,
                EngineEvent::AllCompleted,
            ] {
                tokio::time::sleep(Duration::from_millis(200)).await;
                if !sink.emit(event) {
                    break;
                }
            }
        });
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport, _mode: ViewMode) {
        println!("manager resized to {}x{}", viewport.width, viewport.height);
    }

    fn set_volume(&mut self, level: f32) {
        self.volume = level;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn destroy(self) {}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("adcycle=info")),
        )
        .init();

    let cfg = Config::from_json(
        r#"{
            "ad_tag_url": "https://ads.example/tag?output=vast",
            "retry": { "delay": "1s" },
            "recycle_delay": "500ms"
        }"#,
    )?;

    let sdk = SimulatedSdk {
        loader: None,
        requests: 0,
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let launched = Launcher::builder(cfg, sdk, Arc::new(|| Viewport::new(1280, 720)))
        .with_subscribers(subs)
        .launch()
        .await?;

    tokio::time::sleep(Duration::from_secs(6)).await;
    println!("final snapshot: {:?}", launched.handle().snapshot());
    launched.shutdown().await;
    Ok(())
}

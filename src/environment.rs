//! # Execution context detection.
//!
//! Decides whether the page runs embedded in another browsing context (an
//! iframe it does not control) or standalone. The verdict picks the start path:
//!
//! ```text
//! Embedded   ─► HandshakeBridge (announce ready, wait for start command)
//! Standalone ─► InteractionGate (play control, or autoplay muted)
//! ```
//!
//! [`EnvironmentDetector`] queries its probe once and caches the answer: the
//! verdict is constant for the page's lifetime.

use std::sync::{Arc, OnceLock};

/// Where the page is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Context {
    /// Top-level page.
    Standalone,
    /// Nested inside another browsing context.
    Embedded,
}

impl Context {
    pub fn as_str(&self) -> &'static str {
        match self {
            Context::Standalone => "standalone",
            Context::Embedded => "embedded",
        }
    }
}

/// Probe answering "is this context nested inside another one?".
///
/// Implementations must be side-effect free; a browser host compares its own
/// window with the top window.
pub trait Environment: Send + Sync + 'static {
    fn is_embedded(&self) -> bool;
}

impl<F> Environment for F
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    fn is_embedded(&self) -> bool {
        self()
    }
}

/// Probe with a verdict known up front.
#[derive(Clone, Copy, Debug)]
pub struct FixedEnvironment(pub Context);

impl FixedEnvironment {
    pub fn standalone() -> Self {
        Self(Context::Standalone)
    }

    pub fn embedded() -> Self {
        Self(Context::Embedded)
    }
}

impl Environment for FixedEnvironment {
    fn is_embedded(&self) -> bool {
        matches!(self.0, Context::Embedded)
    }
}

/// Caching front for an [`Environment`] probe.
pub struct EnvironmentDetector {
    probe: Arc<dyn Environment>,
    verdict: OnceLock<Context>,
}

impl EnvironmentDetector {
    pub fn new(probe: Arc<dyn Environment>) -> Self {
        Self {
            probe,
            verdict: OnceLock::new(),
        }
    }

    /// The page's context; the probe runs at most once.
    pub fn context(&self) -> Context {
        *self.verdict.get_or_init(|| {
            if self.probe.is_embedded() {
                Context::Embedded
            } else {
                Context::Standalone
            }
        })
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.context(), Context::Embedded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn test_fixed_verdicts() {
        let d = EnvironmentDetector::new(Arc::new(FixedEnvironment::embedded()));
        assert!(d.is_embedded());
        assert_eq!(d.context(), Context::Embedded);

        let d = EnvironmentDetector::new(Arc::new(FixedEnvironment::standalone()));
        assert!(!d.is_embedded());
    }

    #[test]
    fn test_probe_runs_once_and_verdict_sticks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let flip = Arc::new(AtomicBool::new(true));
        let (c, f) = (calls.clone(), flip.clone());
        let d = EnvironmentDetector::new(Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            f.load(Ordering::SeqCst)
        }));

        assert!(d.is_embedded());
        flip.store(false, Ordering::SeqCst);
        for _ in 0..5 {
            assert!(d.is_embedded());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

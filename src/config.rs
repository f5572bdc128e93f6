//! # Runtime configuration.
//!
//! [`Config`] centralizes every knob of the controller. Hosts build it in code
//! or pass JSON (durations in humantime form):
//!
//! ```json
//! {
//!   "ad_tag_url": "https://ads.example/tag?output=vast",
//!   "trusted_origins": ["https://player.example.com", "http://localhost*"],
//!   "retry": { "delay": "2s", "max_attempts": null },
//!   "recycle_delay": "500ms",
//!   "rendering": { "load_video_timeout": "16s" }
//! }
//! ```
//!
//! ## Field semantics
//! - `ad_tag_url`: ad tag handed to the engine on every request (required)
//! - `trusted_origins`: allow-list for inbound handshake messages
//! - `retry`: delay and optional bound after failures
//! - `recycle_delay`: pause between a completed break and the next request
//! - `rendering`: settings applied to every manager
//! - `overlay_fade`: fade duration for the transition overlay
//! - `bus_capacity`: event bus ring buffer size (min 1)
//! - `inbox_capacity`: queued inbound messages for the handshake listener (min 1)
//! - `allow_dynamic_load`: try the SDK loader once if the engine is missing at launch

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    engine::RenderingSettings, error::ConfigError, handshake::OriginAllowList,
    policies::RetryPolicy,
};

/// Configuration for the launcher and session controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ad_tag_url: String,
    pub trusted_origins: OriginAllowList,
    pub retry: RetryPolicy,
    #[serde(with = "humantime_serde")]
    pub recycle_delay: Duration,
    pub rendering: RenderingSettings,
    #[serde(with = "humantime_serde")]
    pub overlay_fade: Duration,
    pub bus_capacity: usize,
    pub inbox_capacity: usize,
    pub allow_dynamic_load: bool,
}

impl Config {
    /// Default configuration for the given ad tag.
    pub fn new(ad_tag_url: impl Into<String>) -> Self {
        Self {
            ad_tag_url: ad_tag_url.into(),
            ..Self::default()
        }
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks fields that have no usable default.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ad_tag_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "ad_tag_url is empty".into(),
            });
        }
        if !self.retry.factor.is_finite() || self.retry.factor < 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!("retry.factor must be finite and >= 0, got {}", self.retry.factor),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    #[inline]
    pub fn inbox_capacity_clamped(&self) -> usize {
        self.inbox_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `ad_tag_url = ""` (must be set)
    /// - `trusted_origins = localhost and file:// prefixes`
    /// - `retry = 2s fixed, unbounded`
    /// - `recycle_delay = 500ms`, `overlay_fade = 500ms`
    /// - `rendering = 16s load timeout, restore playback state`
    /// - `bus_capacity = 1024`, `inbox_capacity = 64`
    /// - `allow_dynamic_load = false`
    fn default() -> Self {
        Self {
            ad_tag_url: String::new(),
            trusted_origins: OriginAllowList::local_development(),
            retry: RetryPolicy::default(),
            recycle_delay: Duration::from_millis(500),
            rendering: RenderingSettings::default(),
            overlay_fade: Duration::from_millis(500),
            bus_capacity: 1024,
            inbox_capacity: 64,
            allow_dynamic_load: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_overrides_and_defaults() {
        let cfg = Config::from_json(
            r#"{
                "ad_tag_url": "https://ads.example/tag",
                "trusted_origins": ["https://player.example.com"],
                "retry": {"delay": "3s", "max_attempts": 4},
                "recycle_delay": "1s"
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.retry.delay, Duration::from_secs(3));
        assert_eq!(cfg.retry.max_attempts, Some(4));
        assert_eq!(cfg.recycle_delay, Duration::from_secs(1));
        assert!(cfg.trusted_origins.allows("https://player.example.com"));
        assert!(!cfg.trusted_origins.allows("http://localhost"));
        assert_eq!(cfg.rendering.load_video_timeout, Duration::from_secs(16));
        assert_eq!(cfg.bus_capacity, 1024);
    }

    #[test]
    fn test_long_retry_delay_is_honoured() {
        let cfg = Config::from_json(r#"{"ad_tag_url":"t","retry":{"delay":"120s"}}"#).unwrap();
        assert_eq!(cfg.retry.next(1), Some(Duration::from_secs(120)));
        assert_eq!(cfg.retry.next(5), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_missing_tag_is_invalid() {
        let err = Config::from_json("{}").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(Config::default().validate().is_err());
        assert!(Config::new("https://ads.example/tag").validate().is_ok());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            Config::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_clamps() {
        let cfg = Config {
            bus_capacity: 0,
            inbox_capacity: 0,
            ..Config::new("t")
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.inbox_capacity_clamped(), 1);
    }
}

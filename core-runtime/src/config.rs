//! # Bridge Configuration
//!
//! Configuration for bootstrapping the bridge.
//!
//! ## Overview
//!
//! The configuration uses a builder pattern that enforces fail-fast
//! validation: the tunnel endpoint is required and checked up front, so a
//! bad endpoint surfaces here with an actionable message instead of as a
//! delegate load failure deep inside the worker.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::BridgeConfig;
//!
//! let config = BridgeConfig::builder()
//!     .endpoint("wss://tunnel.example.net/")
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.event_buffer, 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default capacity of the bridge event channel, per subscriber.
pub const DEFAULT_EVENT_BUFFER: usize = 100;

const MAX_EVENT_BUFFER: usize = 65_536;

/// Settings for one bridge instance.
///
/// Use [`BridgeConfig::builder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// WebSocket tunnel endpoint the delegate module attaches to.
    pub endpoint: String,

    /// Capacity of the bridge event channel. Subscribers that fall behind
    /// by more than this many events observe a lag error.
    pub event_buffer: usize,
}

impl BridgeConfig {
    /// Creates a new builder.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(Error::Config("Tunnel endpoint cannot be empty".to_string()));
        }
        if !self.endpoint.starts_with("ws://") && !self.endpoint.starts_with("wss://") {
            return Err(Error::Config(format!(
                "Tunnel endpoint must use a ws:// or wss:// URL, got '{}'",
                self.endpoint
            )));
        }
        if self.event_buffer == 0 {
            return Err(Error::Config(
                "Event buffer must be greater than 0".to_string(),
            ));
        }
        if self.event_buffer > MAX_EVENT_BUFFER {
            return Err(Error::Config(format!(
                "Event buffer exceeds maximum of {MAX_EVENT_BUFFER} events"
            )));
        }
        Ok(())
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Default)]
pub struct BridgeConfigBuilder {
    endpoint: Option<String>,
    event_buffer: Option<usize>,
}

impl BridgeConfigBuilder {
    /// Sets the tunnel endpoint (required).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the event channel capacity.
    ///
    /// Default: [`DEFAULT_EVENT_BUFFER`].
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    /// Builds and validates the final configuration.
    pub fn build(self) -> Result<BridgeConfig> {
        let endpoint = self.endpoint.ok_or_else(|| {
            Error::Config("Tunnel endpoint is required. Use .endpoint() to set it.".to_string())
        })?;

        let config = BridgeConfig {
            endpoint,
            event_buffer: self.event_buffer.unwrap_or(DEFAULT_EVENT_BUFFER),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_endpoint() {
        let result = BridgeConfig::builder().build();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("endpoint is required"));
    }

    #[test]
    fn builder_rejects_empty_endpoint() {
        let result = BridgeConfig::builder().endpoint("").build();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn builder_rejects_non_websocket_scheme() {
        let result = BridgeConfig::builder()
            .endpoint("https://tunnel.example.net/")
            .build();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("ws:// or wss://"));
    }

    #[test]
    fn builder_accepts_both_schemes() {
        for endpoint in ["ws://localhost:9000/", "wss://tunnel.example.net/"] {
            let config = BridgeConfig::builder().endpoint(endpoint).build().unwrap();
            assert_eq!(config.endpoint, endpoint);
        }
    }

    #[test]
    fn builder_defaults_event_buffer() {
        let config = BridgeConfig::builder()
            .endpoint("wss://tunnel.example.net/")
            .build()
            .unwrap();
        assert_eq!(config.event_buffer, DEFAULT_EVENT_BUFFER);
    }

    #[test]
    fn builder_rejects_zero_event_buffer() {
        let result = BridgeConfig::builder()
            .endpoint("wss://tunnel.example.net/")
            .event_buffer(0)
            .build();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("greater than 0"));
    }

    #[test]
    fn builder_rejects_excessive_event_buffer() {
        let result = BridgeConfig::builder()
            .endpoint("wss://tunnel.example.net/")
            .event_buffer(1_000_000)
            .build();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = BridgeConfig::builder()
            .endpoint("wss://tunnel.example.net/")
            .event_buffer(32)
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: BridgeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

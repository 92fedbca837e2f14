//! Ambient runtime concerns for the bridge workspace: configuration,
//! logging, and the lifecycle event bus.
//!
//! The bridge machinery itself lives in `core-bridge`; this crate holds
//! everything around it that is not part of the call path: the validating
//! [`BridgeConfig`](config::BridgeConfig) builder, the `tracing`-based
//! [`logging`] setup, and the broadcast [`EventBus`](events::EventBus)
//! the dispatcher publishes on.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{BridgeConfig, BridgeConfigBuilder, DEFAULT_EVENT_BUFFER};
pub use error::{Error, Result};
pub use events::{BridgeEvent, EventBus};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};

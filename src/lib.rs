//! Workspace facade crate.
//!
//! This crate exists so host applications can depend on `wst-workspace`
//! and reach the whole bridge surface without wiring each member crate
//! individually. The pieces live in their own crates:
//!
//! - `core-shm` - shared regions and the blocking-slot handoff cell
//! - `bridge-traits` - error taxonomy, lookup tables, delegate seams
//! - `core-bridge` - messages, registry, engine, dispatcher
//! - `bridge-caller` - the synchronous caller proxy
//! - `core-runtime` - config, logging, and the event bus

pub use bridge_caller::CallerProxy;
pub use bridge_traits::{
    BridgeError, ModuleLoader, NetworkKind, SocketHandle, TransportKind, TunnelModule,
};
pub use core_bridge::{
    CommandRequest, ControlMessage, Dispatcher, DispatcherHandle, Reply,
};
pub use core_runtime::{BridgeConfig, BridgeEvent, EventBus, LoggingConfig};
pub use core_shm::{BlockingSlot, SharedRegion};

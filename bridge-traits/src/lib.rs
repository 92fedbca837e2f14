//! # Bridge Traits
//!
//! Shared vocabulary and seams of the call bridge.
//!
//! ## Overview
//!
//! This crate defines the contract between the bridge's two sides and its
//! external collaborator, the delegate compute module. It carries no
//! runtime machinery of its own:
//!
//! - [`BridgeError`](error::BridgeError) - the error taxonomy every crate
//!   in the workspace speaks.
//! - [`NetworkKind`](net::NetworkKind) / [`TransportKind`](net::TransportKind) -
//!   the fixed lookup tables that caller-supplied numeric codes are
//!   validated against.
//! - [`TunnelModule`](module::TunnelModule) - the export surface of the
//!   loaded compute module, consumed by the worker.
//! - [`ModuleLoader`](module::ModuleLoader) - one-shot async module boot,
//!   specified only at its interface.
//!
//! ## Error Handling
//!
//! All seams use [`BridgeError`](error::BridgeError). Implementations
//! should convert their internal failures into it with actionable
//! messages; the dispatcher stringifies whatever reaches its boundary.
//!
//! ## Thread Safety
//!
//! The traits require `Send + Sync`: module implementations are held by
//! the worker task and may be called from whichever thread the runtime
//! schedules it on.

pub mod error;
pub mod module;
pub mod net;

pub use error::{BridgeError, Result};
pub use module::{ModuleLoader, SocketHandle, TunnelModule};
pub use net::{NetworkKind, TransportKind};

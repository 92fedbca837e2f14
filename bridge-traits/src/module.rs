//! Delegate compute-module seams.
//!
//! The worker does not implement networking itself; it delegates to a
//! loaded compute module. These traits pin down that boundary without
//! saying anything about how the module works internally: loading,
//! booting, and the wire semantics of individual operations all live on
//! the other side of the seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::net::{NetworkKind, TransportKind};

/// Handle returned by a successful socket operation.
///
/// Non-negative by contract; the bridge reserves negative values for its
/// failure sentinel.
pub type SocketHandle = i32;

/// Export surface of the loaded compute module, as consumed by the worker.
///
/// Implementations may suspend freely; the dispatcher awaits them inside
/// its exclusive region, so a slow call serializes everything behind it.
#[async_trait]
pub trait TunnelModule: Send + Sync {
    /// Opens a socket of the given network/transport flavor and returns
    /// its handle.
    async fn socket(&self, network: NetworkKind, transport: TransportKind)
        -> Result<SocketHandle>;
}

/// One-shot loader for the compute module.
///
/// `endpoint` is the tunnel the module should attach to; everything else
/// about booting the module is the loader's business.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, endpoint: &str) -> Result<Arc<dyn TunnelModule>>;
}

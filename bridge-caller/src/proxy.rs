//! The synchronous caller's capability surface.
//!
//! A [`CallerProxy`] is what gets handed to the context that cannot
//! suspend: every call either returns immediately (validation failures,
//! placeholders) or blocks the calling OS thread on a freshly allocated
//! [`BlockingSlot`] until the worker publishes a result.

use std::sync::Arc;

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::module::SocketHandle;
use bridge_traits::net::{NetworkKind, TransportKind};
use core_bridge::dispatch::DispatcherHandle;
use core_bridge::message::{CommandRequest, ControlMessage};
use core_shm::BlockingSlot;
use tracing::debug;

/// Capability surface exposed to the synchronous caller context.
///
/// Cloning the proxy clones the underlying dispatcher handle; proxies are
/// cheap and independent.
#[derive(Clone, Debug)]
pub struct CallerProxy {
    handle: DispatcherHandle,
}

impl CallerProxy {
    pub fn new(handle: DispatcherHandle) -> Self {
        Self { handle }
    }

    /// Opens a socket through the bridge and returns its handle.
    ///
    /// `network_code` and `transport_code` are validated against the fixed
    /// lookup tables before anything is posted: an out-of-table code fails
    /// here, synchronously, and the dispatcher never sees a message.
    ///
    /// On the happy path this **blocks the calling thread** until the
    /// worker completes the command, with no timeout (the protocol's
    /// documented hazard). Never call it from an async context; wrap it
    /// in `spawn_blocking` there.
    ///
    /// The slot channel carries no error detail: any failure on the worker
    /// side comes back as the negative sentinel and is reported as an
    /// opaque [`BridgeError::OperationFailed`].
    pub fn socket(&self, network_code: u32, transport_code: u32) -> Result<SocketHandle> {
        let network = NetworkKind::from_code(network_code)?;
        let transport = TransportKind::from_code(transport_code)?;

        let slot = Arc::new(BlockingSlot::new());
        self.handle
            .post(ControlMessage::Command {
                request: CommandRequest::Socket { network, transport },
                slot: Arc::clone(&slot),
            })
            .map_err(|err| BridgeError::OperationFailed(err.to_string()))?;

        debug!(
            network = network.as_str(),
            transport = transport.as_str(),
            "socket command posted, blocking on slot"
        );
        let result = slot.wait();
        if result < 0 {
            return Err(BridgeError::OperationFailed(format!(
                "socket command failed with result {result}"
            )));
        }
        Ok(result)
    }

    /// Declared placeholder for a future zero-copy submission ring.
    ///
    /// Fails synchronously; nothing is posted to the dispatcher.
    pub fn ring(&self) -> Result<()> {
        Err(BridgeError::OperationFailed("ring is not implemented".into()))
    }

    /// Declared placeholder, paired with [`ring`](Self::ring).
    ///
    /// Fails synchronously; nothing is posted to the dispatcher.
    pub fn enter(&self) -> Result<()> {
        Err(BridgeError::OperationFailed(
            "enter is not implemented".into(),
        ))
    }

    /// The underlying dispatcher handle.
    pub fn dispatcher(&self) -> &DispatcherHandle {
        &self.handle
    }
}

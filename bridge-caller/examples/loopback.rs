//! End-to-end wiring of the bridge with an in-process stub delegate.
//!
//! Run with: `cargo run -p bridge-caller --example loopback`

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bridge_caller::CallerProxy;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::module::{ModuleLoader, SocketHandle, TunnelModule};
use bridge_traits::net::{NetworkKind, TransportKind};
use core_bridge::Dispatcher;
use core_runtime::config::BridgeConfig;
use core_runtime::events::EventBus;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_shm::SharedRegion;
use tracing::info;

/// Stub delegate that hands out sequential handles without any network.
struct LoopbackModule {
    next_handle: AtomicI32,
}

#[async_trait]
impl TunnelModule for LoopbackModule {
    async fn socket(
        &self,
        network: NetworkKind,
        transport: TransportKind,
    ) -> BridgeResult<SocketHandle> {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        info!(
            network = network.as_str(),
            transport = transport.as_str(),
            handle,
            "loopback socket opened"
        );
        Ok(handle)
    }
}

struct LoopbackLoader;

#[async_trait]
impl ModuleLoader for LoopbackLoader {
    async fn load(&self, endpoint: &str) -> BridgeResult<Arc<dyn TunnelModule>> {
        info!(endpoint, "loading loopback module");
        Ok(Arc::new(LoopbackModule {
            next_handle: AtomicI32::new(0),
        }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default().with_format(LogFormat::Compact))?;

    let config = BridgeConfig::builder()
        .endpoint("wss://tunnel.example.net/")
        .build()?;

    let events = EventBus::new(config.event_buffer);
    let mut stream = events.subscribe();
    let handle = Dispatcher::spawn(Arc::new(LoopbackLoader), events);

    handle.init(config.endpoint.clone()).await?;

    let session = handle.session_open(SharedRegion::new(64)?).await?;
    info!(session, "session registered");

    // The proxy blocks its thread, exactly like the real synchronous
    // caller context would.
    let proxy = CallerProxy::new(handle.clone());
    let socket = tokio::task::spawn_blocking(move || proxy.socket(0, 0)).await??;
    info!(socket, "bridged socket handle received");

    handle.session_close(session).await?;

    while let Ok(event) = stream.try_recv() {
        info!(?event, "bridge event");
    }

    Ok(())
}

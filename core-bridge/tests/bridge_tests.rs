//! End-to-end tests for the dispatcher, engine lifecycle, session
//! registry, and the slot command path.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::module::{ModuleLoader, SocketHandle, TunnelModule};
use bridge_traits::net::{NetworkKind, TransportKind};
use core_bridge::{CommandRequest, ControlMessage, Dispatcher, DispatcherHandle};
use core_runtime::events::{BridgeEvent, EventBus};
use core_shm::{BlockingSlot, SharedRegion, RESULT_FAILURE};
use tokio::sync::Notify;
use tokio::time::timeout;

const ENDPOINT: &str = "wss://tunnel.example.net/";

/// Healthy delegate: hands out sequential non-negative handles.
struct CountingModule {
    next_handle: AtomicI32,
}

impl CountingModule {
    fn new() -> Self {
        Self {
            next_handle: AtomicI32::new(0),
        }
    }
}

#[async_trait]
impl TunnelModule for CountingModule {
    async fn socket(
        &self,
        _network: NetworkKind,
        _transport: TransportKind,
    ) -> BridgeResult<SocketHandle> {
        Ok(self.next_handle.fetch_add(1, Ordering::SeqCst))
    }
}

/// Delegate whose calls always fail.
struct BrokenModule;

#[async_trait]
impl TunnelModule for BrokenModule {
    async fn socket(
        &self,
        _network: NetworkKind,
        _transport: TransportKind,
    ) -> BridgeResult<SocketHandle> {
        Err(BridgeError::OperationFailed("tunnel down".into()))
    }
}

/// Delegate that parks inside the handler until released, to observe the
/// dispatcher's exclusivity.
struct GatedModule {
    gate: Arc<Notify>,
}

#[async_trait]
impl TunnelModule for GatedModule {
    async fn socket(
        &self,
        _network: NetworkKind,
        _transport: TransportKind,
    ) -> BridgeResult<SocketHandle> {
        self.gate.notified().await;
        Ok(99)
    }
}

struct StubLoader {
    module: Arc<dyn TunnelModule>,
}

#[async_trait]
impl ModuleLoader for StubLoader {
    async fn load(&self, _endpoint: &str) -> BridgeResult<Arc<dyn TunnelModule>> {
        Ok(Arc::clone(&self.module))
    }
}

fn spawn_bridge(module: Arc<dyn TunnelModule>) -> (DispatcherHandle, EventBus) {
    let events = EventBus::new(64);
    let handle = Dispatcher::spawn(Arc::new(StubLoader { module }), events.clone());
    (handle, events)
}

fn socket_command(
    network: NetworkKind,
    transport: TransportKind,
) -> (ControlMessage, Arc<BlockingSlot>) {
    let slot = Arc::new(BlockingSlot::new());
    let message = ControlMessage::Command {
        request: CommandRequest::Socket { network, transport },
        slot: Arc::clone(&slot),
    };
    (message, slot)
}

/// Awaits slot completion without parking the test's runtime thread.
async fn wait_ready(slot: &BlockingSlot) -> i32 {
    timeout(Duration::from_secs(5), async {
        while !slot.is_ready() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("slot was never completed");
    slot.result()
}

#[tokio::test]
async fn every_valid_pair_yields_a_non_negative_handle() {
    let (handle, _events) = spawn_bridge(Arc::new(CountingModule::new()));
    handle.init(ENDPOINT).await.unwrap();

    for network in [NetworkKind::Ip4, NetworkKind::Ip6] {
        for transport in [TransportKind::Tcp, TransportKind::Udp] {
            let (message, slot) = socket_command(network, transport);
            handle.post(message).unwrap();
            let result = wait_ready(&slot).await;
            assert!(result >= 0, "({network:?}, {transport:?}) returned {result}");
        }
    }
}

#[tokio::test]
async fn second_init_fails_without_disturbing_the_engine() {
    let (handle, _events) = spawn_bridge(Arc::new(CountingModule::new()));
    handle.init(ENDPOINT).await.unwrap();

    let err = handle.init("wss://elsewhere.example.net/").await.unwrap_err();
    assert!(err.to_string().contains("init called twice"));

    // The failed attempt must not have clobbered the ready engine.
    let (message, slot) = socket_command(NetworkKind::Ip4, TransportKind::Tcp);
    handle.post(message).unwrap();
    assert!(wait_ready(&slot).await >= 0);
}

#[tokio::test]
async fn sequential_session_opens_return_one_then_two() {
    let (handle, _events) = spawn_bridge(Arc::new(CountingModule::new()));
    handle.init(ENDPOINT).await.unwrap();

    let first = handle
        .session_open(SharedRegion::new(64).unwrap())
        .await
        .unwrap();
    let second = handle
        .session_open(SharedRegion::new(64).unwrap())
        .await
        .unwrap();
    assert_eq!((first, second), (1, 2));
}

#[tokio::test]
async fn session_ids_survive_interleaved_close_without_reuse() {
    let (handle, _events) = spawn_bridge(Arc::new(CountingModule::new()));
    handle.init(ENDPOINT).await.unwrap();

    let a = handle
        .session_open(SharedRegion::new(16).unwrap())
        .await
        .unwrap();
    handle.session_close(a).await.unwrap();
    let b = handle
        .session_open(SharedRegion::new(16).unwrap())
        .await
        .unwrap();
    handle.session_close(b).await.unwrap();
    let c = handle
        .session_open(SharedRegion::new(16).unwrap())
        .await
        .unwrap();

    assert!(a < b && b < c, "ids reused or non-monotonic: {a}, {b}, {c}");
}

#[tokio::test]
async fn update_memory_on_unknown_session_fails() {
    let (handle, _events) = spawn_bridge(Arc::new(CountingModule::new()));
    handle.init(ENDPOINT).await.unwrap();

    let err = handle
        .session_update_memory(41, SharedRegion::new(16).unwrap())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unknown session id 41"));
}

#[tokio::test]
async fn close_on_unknown_session_fails() {
    let (handle, _events) = spawn_bridge(Arc::new(CountingModule::new()));
    handle.init(ENDPOINT).await.unwrap();

    let err = handle.session_close(5).await.unwrap_err();
    assert!(err.to_string().contains("unknown session id 5"));
}

#[tokio::test]
async fn commands_before_init_fail_with_not_initialized() {
    let (handle, _events) = spawn_bridge(Arc::new(CountingModule::new()));

    // Message-based command: the error travels in the reply.
    let err = handle
        .session_open(SharedRegion::new(16).unwrap())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not yet initialized"));

    // Slot-based command: the only signal is the failure sentinel, but the
    // caller must still be unblocked.
    let (message, slot) = socket_command(NetworkKind::Ip4, TransportKind::Tcp);
    handle.post(message).unwrap();
    assert_eq!(wait_ready(&slot).await, RESULT_FAILURE);
}

#[tokio::test]
async fn delegate_failure_surfaces_as_the_sentinel_and_loop_survives() {
    let (handle, _events) = spawn_bridge(Arc::new(BrokenModule));
    handle.init(ENDPOINT).await.unwrap();

    let (message, slot) = socket_command(NetworkKind::Ip6, TransportKind::Udp);
    handle.post(message).unwrap();
    assert_eq!(wait_ready(&slot).await, RESULT_FAILURE);

    // The worker loop keeps serving messages after a failed handler.
    let session = handle
        .session_open(SharedRegion::new(16).unwrap())
        .await
        .unwrap();
    assert_eq!(session, 1);
}

#[tokio::test]
async fn suspended_handler_blocks_all_later_submissions() {
    let gate = Arc::new(Notify::new());
    let (handle, _events) = spawn_bridge(Arc::new(GatedModule {
        gate: Arc::clone(&gate),
    }));
    handle.init(ENDPOINT).await.unwrap();

    // A slot command whose handler suspends inside the exclusive region.
    let (message, slot) = socket_command(NetworkKind::Ip4, TransportKind::Tcp);
    handle.post(message).unwrap();

    // A later message must not begin while the first handler is parked.
    let open = handle.session_open(SharedRegion::new(16).unwrap());
    tokio::pin!(open);
    assert!(
        timeout(Duration::from_millis(100), &mut open).await.is_err(),
        "session_open completed while an earlier handler was still running"
    );
    assert!(!slot.is_ready());

    // Releasing the gate lets the queue drain in order.
    gate.notify_one();
    assert_eq!(wait_ready(&slot).await, 99);
    assert_eq!(open.await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_submissions_are_handled_in_a_total_order() {
    let (handle, _events) = spawn_bridge(Arc::new(CountingModule::new()));
    handle.init(ENDPOINT).await.unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move {
                handle
                    .session_open(SharedRegion::new(16).unwrap())
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap());
    }
    ids.sort_unstable();

    // Serialized handling hands out exactly 1..=8, each id once.
    assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
}

#[tokio::test]
async fn slot_ready_flag_never_reverts() {
    let (handle, _events) = spawn_bridge(Arc::new(CountingModule::new()));
    handle.init(ENDPOINT).await.unwrap();

    let (message, slot) = socket_command(NetworkKind::Ip4, TransportKind::Udp);
    handle.post(message).unwrap();
    wait_ready(&slot).await;

    for _ in 0..1_000 {
        assert!(slot.is_ready());
    }
}

#[tokio::test]
async fn dispatcher_emits_lifecycle_events_in_order() {
    let (handle, events) = spawn_bridge(Arc::new(CountingModule::new()));
    let mut stream = events.subscribe();

    handle.init(ENDPOINT).await.unwrap();
    let session = handle
        .session_open(SharedRegion::new(16).unwrap())
        .await
        .unwrap();
    let (message, slot) = socket_command(NetworkKind::Ip4, TransportKind::Tcp);
    handle.post(message).unwrap();
    wait_ready(&slot).await;
    handle.session_close(session).await.unwrap();

    assert_eq!(
        stream.recv().await.unwrap(),
        BridgeEvent::Initialized {
            endpoint: ENDPOINT.to_string()
        }
    );
    assert_eq!(
        stream.recv().await.unwrap(),
        BridgeEvent::SessionOpened { session_id: 1 }
    );
    assert_eq!(
        stream.recv().await.unwrap(),
        BridgeEvent::CommandCompleted {
            command: "socket".to_string(),
            result: 0
        }
    );
    assert_eq!(
        stream.recv().await.unwrap(),
        BridgeEvent::SessionClosed { session_id: 1 }
    );
}

#[tokio::test]
async fn submitted_counter_tracks_accepted_messages() {
    let (handle, _events) = spawn_bridge(Arc::new(CountingModule::new()));
    assert_eq!(handle.submitted(), 0);

    handle.init(ENDPOINT).await.unwrap();
    assert_eq!(handle.submitted(), 1);

    let (message, slot) = socket_command(NetworkKind::Ip4, TransportKind::Tcp);
    handle.post(message).unwrap();
    wait_ready(&slot).await;
    assert_eq!(handle.submitted(), 2);
}

#[tokio::test]
async fn handle_survives_clone_and_shares_the_counter() {
    let (handle, _events) = spawn_bridge(Arc::new(CountingModule::new()));
    let clone = handle.clone();

    handle.init(ENDPOINT).await.unwrap();
    let id = clone
        .session_open(SharedRegion::new(16).unwrap())
        .await
        .unwrap();
    assert_eq!(id, 1);
    assert_eq!(handle.submitted(), 2);
    assert_eq!(clone.submitted(), 2);
}

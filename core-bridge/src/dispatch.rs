//! The single-consumer dispatcher.
//!
//! # Overview
//!
//! The original system serialized its worker with a message mutex held
//! across the whole handler, suspension points included. Here the same
//! discipline is modeled as a single-worker task executor: every
//! [`ControlMessage`] becomes one unit of work on an unbounded channel
//! drained by exactly one task, which owns the [`Engine`] and
//! [`SessionRegistry`] outright. Mutual exclusion and
//! handled-in-submission-order both fall out of the loop structure; there
//! is no lock to mis-scope.
//!
//! The flip side is intentional: a handler that suspends (the `init` load,
//! a slow delegate call) stalls every later submission, slot commands from
//! other callers included. That is a deliberate simplicity/consistency
//! trade-off carried over from the source design, a system-wide
//! bottleneck rather than an accident.
//!
//! # Error channels
//!
//! Non-slot messages get exactly one [`Reply`]; handler failures are
//! stringified into `Reply.error` and the loop moves on. Slot commands
//! never get a reply: any failure, including a pre-delegate state
//! assertion, is published as the slot's negative sentinel so the blocked
//! caller always wakes. The sentinel carries no detail; that asymmetry is
//! part of the protocol.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bridge_traits::error::BridgeError;
use bridge_traits::module::ModuleLoader;
use core_runtime::events::{BridgeEvent, EventBus};
use core_shm::{BlockingSlot, SharedRegion, RESULT_FAILURE};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::engine::Engine;
use crate::message::{CommandRequest, ControlMessage, Reply};
use crate::registry::SessionRegistry;

/// Submission failed because the worker task is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("dispatcher task has shut down")]
pub struct DispatcherClosed;

struct Envelope {
    request_id: u64,
    message: ControlMessage,
    reply_tx: Option<oneshot::Sender<Reply>>,
}

/// The worker half: owns all mutable bridge state and drains the inbox
/// one message at a time.
pub struct Dispatcher {
    engine: Engine,
    registry: SessionRegistry,
    events: EventBus,
    inbox: mpsc::UnboundedReceiver<Envelope>,
}

impl Dispatcher {
    /// Creates a dispatcher and its handle without spawning; callers that
    /// want control over the task (tests, custom runtimes) drive
    /// [`Dispatcher::run`] themselves.
    pub fn new(loader: Arc<dyn ModuleLoader>, events: EventBus) -> (Self, DispatcherHandle) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let dispatcher = Self {
            engine: Engine::new(loader),
            registry: SessionRegistry::new(),
            events,
            inbox,
        };
        let handle = DispatcherHandle {
            tx,
            next_request_id: Arc::new(AtomicU64::new(1)),
            submitted: Arc::new(AtomicU64::new(0)),
        };
        (dispatcher, handle)
    }

    /// Creates the dispatcher and spawns its worker task on the current
    /// tokio runtime.
    pub fn spawn(loader: Arc<dyn ModuleLoader>, events: EventBus) -> DispatcherHandle {
        let (dispatcher, handle) = Self::new(loader, events);
        tokio::spawn(dispatcher.run());
        handle
    }

    /// The worker loop. Runs until every handle is dropped.
    pub async fn run(mut self) {
        while let Some(envelope) = self.inbox.recv().await {
            self.handle_envelope(envelope).await;
        }
        debug!("dispatcher inbox closed, worker loop exiting");
    }

    async fn handle_envelope(&mut self, envelope: Envelope) {
        let Envelope {
            request_id,
            message,
            reply_tx,
        } = envelope;
        let message_type = message.message_type();
        debug!(request_id, message_type, "handling control message");

        let outcome = match message {
            ControlMessage::Command { request, slot } => {
                self.handle_command(request, slot).await;
                return;
            }
            ControlMessage::Init { endpoint } => self.handle_init(endpoint).await,
            ControlMessage::SessionOpen { memory } => self.handle_session_open(memory),
            ControlMessage::SessionClose { session_id } => self.handle_session_close(session_id),
            ControlMessage::SessionUpdateMemory { session_id, memory } => {
                self.handle_session_update(session_id, memory)
            }
        };

        let mut reply = Reply::ok(request_id);
        match outcome {
            Ok(session_id) => reply.session_id = session_id,
            Err(err) => {
                warn!(request_id, message_type, error = %err, "control message failed");
                reply.error = Some(err.to_string());
            }
        }
        if let Some(tx) = reply_tx {
            if tx.send(reply).is_err() {
                debug!(request_id, "reply receiver dropped before delivery");
            }
        }
    }

    async fn handle_init(&mut self, endpoint: String) -> Result<Option<u64>, BridgeError> {
        self.engine.init(&endpoint).await?;
        self.events.emit(BridgeEvent::Initialized { endpoint }).ok();
        Ok(None)
    }

    fn handle_session_open(&mut self, memory: SharedRegion) -> Result<Option<u64>, BridgeError> {
        self.ensure_ready()?;
        let session_id = self.registry.open(memory);
        debug!(session_id, "session opened");
        self.events
            .emit(BridgeEvent::SessionOpened { session_id })
            .ok();
        Ok(Some(session_id))
    }

    fn handle_session_close(&mut self, session_id: u64) -> Result<Option<u64>, BridgeError> {
        self.ensure_ready()?;
        self.registry.close(session_id)?;
        debug!(session_id, "session closed");
        self.events
            .emit(BridgeEvent::SessionClosed { session_id })
            .ok();
        Ok(None)
    }

    fn handle_session_update(
        &mut self,
        session_id: u64,
        memory: SharedRegion,
    ) -> Result<Option<u64>, BridgeError> {
        self.ensure_ready()?;
        self.registry.update_memory(session_id, memory)?;
        debug!(session_id, "session memory updated");
        self.events
            .emit(BridgeEvent::SessionMemoryUpdated { session_id })
            .ok();
        Ok(None)
    }

    /// Runs a slot command and always completes the slot, so the blocked
    /// caller wakes whether the delegate succeeded, failed, or was never
    /// reached.
    async fn handle_command(&mut self, request: CommandRequest, slot: Arc<BlockingSlot>) {
        let command = request.kind();
        let result = match self.execute_command(&request).await {
            Ok(value) => value,
            Err(err) => {
                warn!(command, error = %err, "slot command failed");
                RESULT_FAILURE
            }
        };
        if !slot.complete(result) {
            warn!(command, "slot already completed; dropping result");
        }
        self.events
            .emit(BridgeEvent::CommandCompleted {
                command: command.to_string(),
                result,
            })
            .ok();
    }

    async fn execute_command(&self, request: &CommandRequest) -> Result<i32, BridgeError> {
        let module = Arc::clone(self.engine.module()?);
        match *request {
            CommandRequest::Socket { network, transport } => {
                module.socket(network, transport).await
            }
        }
    }

    fn ensure_ready(&self) -> Result<(), BridgeError> {
        self.engine.module().map(|_| ())
    }
}

/// Clonable submission handle to a running [`Dispatcher`].
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::UnboundedSender<Envelope>,
    next_request_id: Arc<AtomicU64>,
    submitted: Arc<AtomicU64>,
}

impl DispatcherHandle {
    /// Posts a message fire-and-forget, without waiting for any reply.
    ///
    /// This is the entry the synchronous caller side uses for slot
    /// commands: the send itself never blocks and never suspends.
    pub fn post(&self, message: ControlMessage) -> Result<(), DispatcherClosed> {
        self.send_envelope(message, None).map(|_| ())
    }

    /// Submits a message and waits for its correlated reply.
    ///
    /// Returns `None` for slot-based commands, which reply solely through
    /// their slot; exactly one reply for everything else.
    pub async fn submit(
        &self,
        message: ControlMessage,
    ) -> Result<Option<Reply>, DispatcherClosed> {
        if !message.expects_reply() {
            self.send_envelope(message, None)?;
            return Ok(None);
        }
        let (tx, rx) = oneshot::channel();
        self.send_envelope(message, Some(tx))?;
        match rx.await {
            Ok(reply) => Ok(Some(reply)),
            Err(_) => Err(DispatcherClosed),
        }
    }

    /// Number of messages accepted so far, across all clones of this
    /// handle.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::SeqCst)
    }

    fn send_envelope(
        &self,
        message: ControlMessage,
        reply_tx: Option<oneshot::Sender<Reply>>,
    ) -> Result<u64, DispatcherClosed> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let envelope = Envelope {
            request_id,
            message,
            reply_tx,
        };
        self.tx.send(envelope).map_err(|_| DispatcherClosed)?;
        self.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(request_id)
    }

    // ------------------------------------------------------------------
    // Typed wrappers over submit(): build the message, decode the reply.
    // ------------------------------------------------------------------

    /// Initializes the engine against `endpoint`.
    pub async fn init(&self, endpoint: impl Into<String>) -> Result<(), BridgeError> {
        let reply = self
            .expect_reply(ControlMessage::Init {
                endpoint: endpoint.into(),
            })
            .await?;
        reply_into_result(reply)
    }

    /// Registers a caller-owned memory region; returns the session id.
    pub async fn session_open(&self, memory: SharedRegion) -> Result<u64, BridgeError> {
        let reply = self
            .expect_reply(ControlMessage::SessionOpen { memory })
            .await?;
        let session_id = reply.session_id;
        reply_into_result(reply)?;
        session_id.ok_or_else(|| {
            BridgeError::OperationFailed("session_open reply carried no session id".into())
        })
    }

    /// Removes a session.
    pub async fn session_close(&self, session_id: u64) -> Result<(), BridgeError> {
        let reply = self
            .expect_reply(ControlMessage::SessionClose { session_id })
            .await?;
        reply_into_result(reply)
    }

    /// Replaces a session's memory handle.
    pub async fn session_update_memory(
        &self,
        session_id: u64,
        memory: SharedRegion,
    ) -> Result<(), BridgeError> {
        let reply = self
            .expect_reply(ControlMessage::SessionUpdateMemory { session_id, memory })
            .await?;
        reply_into_result(reply)
    }

    async fn expect_reply(&self, message: ControlMessage) -> Result<Reply, BridgeError> {
        match self.submit(message).await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(BridgeError::OperationFailed(
                "message produced no reply".into(),
            )),
            Err(err) => Err(BridgeError::OperationFailed(err.to_string())),
        }
    }
}

impl std::fmt::Debug for DispatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherHandle")
            .field("submitted", &self.submitted())
            .finish()
    }
}

/// The reply's error string, decoded back to an error value.
///
/// The message channel deliberately carries failures as opaque strings,
/// so typed variants do not survive the round trip.
fn reply_into_result(reply: Reply) -> Result<(), BridgeError> {
    match reply.error {
        None => Ok(()),
        Some(message) => Err(BridgeError::OperationFailed(message)),
    }
}

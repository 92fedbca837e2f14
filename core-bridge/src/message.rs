//! Control messages and replies.
//!
//! The caller/worker boundary speaks a small tagged union. Unknown tags
//! are unrepresentable here: the enum is matched exhaustively at the
//! dispatcher boundary, which is this design's rendition of an
//! "invalid event type" rejection.
//!
//! Wire tags: `init`, `session_open`, `session_close`,
//! `session_update_memory`, `command`. The messages themselves carry live
//! shared-memory references, so only [`Reply`] has a serialized form; it
//! uses the original camelCase field names (`requestId`, `sessionId`,
//! `error`).

use std::fmt;
use std::sync::Arc;

use bridge_traits::net::{NetworkKind, TransportKind};
use core_shm::{BlockingSlot, SharedRegion};
use serde::{Deserialize, Serialize};

/// A command executed through the blocking-slot channel.
///
/// The kind tag and its arguments fold into one tagged variant, so an
/// argument set can never disagree with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRequest {
    /// Open a socket of the given flavor on the delegate module.
    Socket {
        network: NetworkKind,
        transport: TransportKind,
    },
}

impl CommandRequest {
    /// Stable tag for logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandRequest::Socket { .. } => "socket",
        }
    }
}

/// One requested operation, as posted to the dispatcher.
#[derive(Clone)]
pub enum ControlMessage {
    /// Load the delegate module against `endpoint`. One-shot.
    Init { endpoint: String },
    /// Register a caller-owned memory region; the reply carries the new id.
    SessionOpen { memory: SharedRegion },
    /// Remove a session. Fails on unknown ids.
    SessionClose { session_id: u64 },
    /// Replace a session's memory handle. Fails on unknown ids.
    SessionUpdateMemory {
        session_id: u64,
        memory: SharedRegion,
    },
    /// Slot-based command: the result comes back through `slot`, never as
    /// a reply.
    Command {
        request: CommandRequest,
        slot: Arc<BlockingSlot>,
    },
}

impl ControlMessage {
    /// The message's wire tag.
    pub fn message_type(&self) -> &'static str {
        match self {
            ControlMessage::Init { .. } => "init",
            ControlMessage::SessionOpen { .. } => "session_open",
            ControlMessage::SessionClose { .. } => "session_close",
            ControlMessage::SessionUpdateMemory { .. } => "session_update_memory",
            ControlMessage::Command { .. } => "command",
        }
    }

    /// Whether the dispatcher owes this message a [`Reply`].
    ///
    /// Exactly one reply per non-slot message; slot commands reply solely
    /// through their slot.
    pub fn expects_reply(&self) -> bool {
        !matches!(self, ControlMessage::Command { .. })
    }
}

impl fmt::Debug for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMessage::Init { endpoint } => {
                f.debug_struct("Init").field("endpoint", endpoint).finish()
            }
            ControlMessage::SessionOpen { memory } => f
                .debug_struct("SessionOpen")
                .field("memory", memory)
                .finish(),
            ControlMessage::SessionClose { session_id } => f
                .debug_struct("SessionClose")
                .field("session_id", session_id)
                .finish(),
            ControlMessage::SessionUpdateMemory { session_id, memory } => f
                .debug_struct("SessionUpdateMemory")
                .field("session_id", session_id)
                .field("memory", memory)
                .finish(),
            ControlMessage::Command { request, slot } => f
                .debug_struct("Command")
                .field("request", request)
                .field("slot", slot)
                .finish(),
        }
    }
}

/// Correlated reply to a non-slot [`ControlMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Correlates the reply with its request.
    pub request_id: u64,

    /// The allocated id, on a successful `session_open`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<u64>,

    /// Stringified handler failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    /// A successful reply with no payload.
    pub fn ok(request_id: u64) -> Self {
        Self {
            request_id,
            session_id: None,
            error: None,
        }
    }

    /// Whether the handler reported a failure.
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

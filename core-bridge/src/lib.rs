//! # Core Bridge
//!
//! The worker side of the call bridge: message schema, session registry,
//! engine lifecycle, and the single-consumer dispatcher.
//!
//! ## Overview
//!
//! An asynchronous worker serves operations for callers that cannot
//! receive asynchronous replies. Callers post [`ControlMessage`]s to a
//! [`Dispatcher`], which handles them strictly one at a time with
//! exclusive ownership of all bridge state:
//!
//! ```text
//! CallerProxy ──(command + slot)──► Dispatcher ──► Engine / Registry
//!      ▲                            (one task,          │
//!      │                             one message        ▼
//!      └────── park / unpark ◄── BlockingSlot ◄── result word
//! ```
//!
//! Message-based clients (an async-capable host) use
//! [`DispatcherHandle::submit`] and get one correlated [`Reply`] per
//! message. The synchronous side instead posts slot-based commands and
//! blocks on shared memory; see the `bridge-caller` crate.
//!
//! ## Serialization model
//!
//! The dispatcher is an executor with concurrency 1. A handler that
//! suspends (the `init` module load, a slow delegate call) holds the
//! exclusive region for its whole execution, stalling every later
//! message. This reproduces the source design's mutex-across-await
//! discipline and is an intentional bottleneck: registry and engine state
//! can never be observed mid-mutation.

pub mod dispatch;
pub mod engine;
pub mod message;
pub mod registry;

pub use dispatch::{Dispatcher, DispatcherClosed, DispatcherHandle};
pub use engine::{Engine, EngineState};
pub use message::{CommandRequest, ControlMessage, Reply};
pub use registry::SessionRegistry;

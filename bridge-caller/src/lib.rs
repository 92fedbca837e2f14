//! # Bridge Caller
//!
//! The caller side of the call bridge: the capability surface handed to a
//! fully synchronous execution context.
//!
//! The context this crate serves cannot suspend; it can only block or
//! return. Results therefore come back through blocking waits on shared
//! memory rather than replies. See [`CallerProxy`] for the protocol, and
//! the `core-bridge` crate for the worker it talks to.

pub mod proxy;

pub use proxy::CallerProxy;

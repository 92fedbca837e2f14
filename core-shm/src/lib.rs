//! Shared-memory primitives for the call bridge.
//!
//! This crate is the leaf of the workspace: a word-addressed shared byte
//! region ([`SharedRegion`]) and the two-word result handoff cell built on
//! top of it ([`BlockingSlot`]).
//!
//! # Overview
//!
//! The bridge's synchronous side cannot receive asynchronous replies; its
//! only way to wait is to block on a memory location. `BlockingSlot`
//! packages that protocol: the caller allocates a fresh cell, hands a
//! reference to the worker, and parks on the ready word; the worker writes
//! the result word, release-stores the ready flag, and wakes the parked
//! thread. The pairing is a single-producer/single-consumer handoff per
//! call, not a reusable channel.
//!
//! Nothing in this crate is async: the waiting side is deliberately a
//! plain OS thread, and the producing side only needs two atomic stores
//! and an unpark.

pub mod region;
pub mod slot;

pub use region::{RegionError, SharedRegion, WORD_BYTES};
pub use slot::{
    BlockingSlot, SlotLayoutError, READY_OFFSET, RESULT_FAILURE, RESULT_OFFSET, SLOT_BYTES,
    SLOT_PENDING, SLOT_READY,
};

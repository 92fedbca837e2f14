//! The blocking result-handoff cell.
//!
//! A [`BlockingSlot`] is an 8-byte shared cell with a fixed layout:
//!
//! | offset | width | meaning                               |
//! |--------|-------|---------------------------------------|
//! | 0      | 4     | ready flag: 0 = pending, 1 = ready    |
//! | 4      | 4     | result word (`i32`, native byte order)|
//!
//! The ready flag makes exactly one transition, pending to ready, for the
//! slot's lifetime; a slot is discarded after a single use. The producer
//! must write the result word *before* release-storing the flag, so that a
//! woken waiter always observes the result; [`BlockingSlot::complete`]
//! encapsulates that order.
//!
//! The waiting side emulates a futex wait with `std::thread::park`: the
//! waiter registers its thread handle, re-checks the flag, and parks; the
//! producer flips the flag and then unparks whatever is registered. The
//! re-check between registration and parking closes the lost-wakeup
//! window, and `unpark` tokens make the race between the final check and
//! the actual park benign.

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, Thread};

use thiserror::Error;

use crate::region::SharedRegion;

/// Total size of a slot cell, in bytes.
pub const SLOT_BYTES: usize = 8;
/// Byte offset of the ready flag.
pub const READY_OFFSET: usize = 0;
/// Byte offset of the result word.
pub const RESULT_OFFSET: usize = 4;

/// Ready-flag value while the result is outstanding.
pub const SLOT_PENDING: u32 = 0;
/// Ready-flag value once the result word is valid.
pub const SLOT_READY: u32 = 1;

/// Conventional sentinel stored in the result word on failure.
///
/// The slot channel carries no error text; a negative result word is the
/// only failure signal the waiting side receives. Success payloads are
/// non-negative, so the sentinel does not collide with them in practice,
/// but nothing in the cell itself distinguishes "handle -1" from
/// "failure"; callers that need richer errors must use the reply channel
/// instead.
pub const RESULT_FAILURE: i32 = -1;

const READY_WORD: usize = READY_OFFSET / crate::region::WORD_BYTES;
const RESULT_WORD: usize = RESULT_OFFSET / crate::region::WORD_BYTES;

/// Error from [`BlockingSlot::from_region`]: the region cannot serve as a
/// slot cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("blocking slot requires an 8-byte region, got {0} bytes")]
pub struct SlotLayoutError(pub usize);

/// A single-use blocking result cell shared between one waiter and one
/// producer.
pub struct BlockingSlot {
    region: SharedRegion,
    waiter: Mutex<Option<Thread>>,
}

impl BlockingSlot {
    /// Allocates a fresh slot with the ready flag cleared.
    pub fn new() -> Self {
        // SLOT_BYTES is a valid region size, so this cannot fail.
        let region = match SharedRegion::new(SLOT_BYTES) {
            Ok(region) => region,
            Err(_) => unreachable!("slot size is word aligned and non-zero"),
        };
        Self {
            region,
            waiter: Mutex::new(None),
        }
    }

    /// Builds a slot over an existing region.
    ///
    /// The region must be exactly [`SLOT_BYTES`] long; anything else is a
    /// wrong-kind handle.
    pub fn from_region(region: SharedRegion) -> Result<Self, SlotLayoutError> {
        if region.len_bytes() != SLOT_BYTES {
            return Err(SlotLayoutError(region.len_bytes()));
        }
        Ok(Self {
            region,
            waiter: Mutex::new(None),
        })
    }

    /// The underlying shared region.
    pub fn region(&self) -> &SharedRegion {
        &self.region
    }

    /// Whether the result has been published.
    pub fn is_ready(&self) -> bool {
        self.region.load_word(READY_WORD, Ordering::Acquire) == SLOT_READY
    }

    /// Reads the result word.
    ///
    /// Only meaningful once [`is_ready`](Self::is_ready) has returned
    /// `true` (or [`wait`](Self::wait) has returned).
    pub fn result(&self) -> i32 {
        self.region.load_word(RESULT_WORD, Ordering::Acquire) as i32
    }

    /// Blocks the calling thread until the slot is completed, then returns
    /// the result word.
    ///
    /// There is no timeout: if the producer never completes the slot
    /// (worker crash, hung delegate), the caller stays parked forever.
    /// That matches the protocol this cell implements; it is a documented
    /// hazard, not an oversight of this type.
    ///
    /// A slot has at most one waiter. Calling `wait` from two threads on
    /// the same slot is a protocol violation; only one of them is
    /// guaranteed to be woken.
    pub fn wait(&self) -> i32 {
        loop {
            if self.is_ready() {
                break;
            }
            let mut waiter = self.waiter.lock().unwrap_or_else(PoisonError::into_inner);
            // Re-check with the registration lock held: the producer takes
            // the same lock after flipping the flag, so a pending flag here
            // means our registered handle will be seen.
            if self.is_ready() {
                break;
            }
            *waiter = Some(thread::current());
            drop(waiter);
            thread::park();
        }
        self.result()
    }

    /// Publishes `result` and wakes the waiter, if any.
    ///
    /// Writes the result word first, then release-stores the ready flag,
    /// then unparks the registered waiter. Returns `false` if the slot was
    /// already completed; the flag is never reset and the earlier result
    /// stands as far as any already-woken waiter is concerned.
    pub fn complete(&self, result: i32) -> bool {
        self.region
            .store_word(RESULT_WORD, result as u32, Ordering::Release);
        let first = self
            .region
            .word(READY_WORD)
            .compare_exchange(
                SLOT_PENDING,
                SLOT_READY,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if first {
            let waiter = self
                .waiter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(thread) = waiter {
                thread.unpark();
            }
        }
        first
    }
}

impl Default for BlockingSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlockingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingSlot")
            .field("ready", &self.is_ready())
            .finish()
    }
}

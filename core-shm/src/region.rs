//! Word-addressed shared byte regions.
//!
//! A [`SharedRegion`] is the Rust stand-in for the original system's shared
//! array buffer: a fixed-size block of memory that several parties hold
//! references to at once. Cloning a region clones the handle, not the
//! bytes. All access goes through 32-bit words with explicit atomic
//! orderings, which keeps the region safely shareable across threads
//! without any locking of its own.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Size of one addressable word, in bytes.
pub const WORD_BYTES: usize = 4;

/// Errors from [`SharedRegion::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegionError {
    /// A region must hold at least one word.
    #[error("shared region must not be empty")]
    Empty,

    /// Region sizes are word-granular.
    #[error("shared region size {0} is not a multiple of 4 bytes")]
    Misaligned(usize),
}

/// A fixed-size shared memory region addressed as 32-bit words.
///
/// The handle is cheap to clone; every clone refers to the same storage.
#[derive(Clone)]
pub struct SharedRegion {
    words: Arc<[AtomicU32]>,
}

impl SharedRegion {
    /// Allocates a zeroed region of `len_bytes` bytes.
    ///
    /// `len_bytes` must be non-zero and a multiple of [`WORD_BYTES`].
    pub fn new(len_bytes: usize) -> Result<Self, RegionError> {
        if len_bytes == 0 {
            return Err(RegionError::Empty);
        }
        if len_bytes % WORD_BYTES != 0 {
            return Err(RegionError::Misaligned(len_bytes));
        }
        let words: Vec<AtomicU32> = (0..len_bytes / WORD_BYTES)
            .map(|_| AtomicU32::new(0))
            .collect();
        Ok(Self {
            words: words.into(),
        })
    }

    /// Region size in bytes.
    pub fn len_bytes(&self) -> usize {
        self.words.len() * WORD_BYTES
    }

    /// Region size in words.
    pub fn len_words(&self) -> usize {
        self.words.len()
    }

    /// Returns the word at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds, like slice indexing.
    pub fn word(&self, index: usize) -> &AtomicU32 {
        &self.words[index]
    }

    /// Atomically loads the word at `index`.
    pub fn load_word(&self, index: usize, order: Ordering) -> u32 {
        self.words[index].load(order)
    }

    /// Atomically stores `value` into the word at `index`.
    pub fn store_word(&self, index: usize, value: u32, order: Ordering) {
        self.words[index].store(value, order);
    }

    /// Whether two handles refer to the same underlying storage.
    pub fn ptr_eq(&self, other: &SharedRegion) -> bool {
        Arc::ptr_eq(&self.words, &other.words)
    }
}

impl fmt::Debug for SharedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRegion")
            .field("len_bytes", &self.len_bytes())
            .finish()
    }
}

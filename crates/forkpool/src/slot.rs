//! Per-worker partition ranges.
//!
//! Each worker owns a half-open range of partition indices. The owner
//! claims from the front, stealers claim from the back, and a shared
//! signed counter arbitrates so a partition is never run twice. Slots are
//! cache-line aligned so workers hammering their own counters do not
//! false-share.

use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};

/// Cache line size assumed for alignment.
pub const CACHE_LINE: usize = 64;

/// Work range owned by one pool thread.
///
/// `head` moves forward as the owner claims partitions; `tail` moves
/// backward as stealers claim them. `remaining` is decremented before
/// either pointer moves and may briefly go negative under contention;
/// a non-positive observation means the range is exhausted.
#[repr(C, align(64))]
pub struct WorkerSlot {
    head: AtomicUsize,
    tail: AtomicUsize,
    remaining: AtomicIsize,
    _pad: [u8; CACHE_LINE - 3 * std::mem::size_of::<usize>()],
}

const _: () = assert!(std::mem::size_of::<WorkerSlot>() == CACHE_LINE);
const _: () = assert!(std::mem::align_of::<WorkerSlot>() == CACHE_LINE);

impl WorkerSlot {
    pub fn new() -> Self {
        Self {
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            remaining: AtomicIsize::new(0),
            _pad: [0; CACHE_LINE - 3 * std::mem::size_of::<usize>()],
        }
    }

    /// Assign `[start, end)` to this slot before a fork.
    #[inline]
    pub fn assign(&self, start: usize, end: usize) {
        self.head.store(start, Ordering::Relaxed);
        self.tail.store(end, Ordering::Relaxed);
        self.remaining
            .store((end - start) as isize, Ordering::Release);
    }

    /// Owner-side claim: take the next partition from the front.
    #[inline]
    pub fn claim_front(&self) -> Option<usize> {
        if self.remaining.fetch_sub(1, Ordering::Acquire) > 0 {
            Some(self.head.fetch_add(1, Ordering::Relaxed))
        } else {
            // Undo the speculative decrement; racing undos are harmless
            // because only positive observations grant a claim.
            self.remaining.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Stealer-side claim: take the last partition from the back.
    #[inline]
    pub fn claim_back(&self) -> Option<usize> {
        if self.remaining.fetch_sub(1, Ordering::Acquire) > 0 {
            // fetch_sub returns the pre-decrement end; the stolen index is
            // one below it.
            Some(self.tail.fetch_sub(1, Ordering::Relaxed) - 1)
        } else {
            self.remaining.fetch_add(1, Ordering::Relaxed);
            None
        }
    }
}

impl Default for WorkerSlot {
    fn default() -> Self {
        Self::new()
    }
}

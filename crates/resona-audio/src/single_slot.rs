//! Lock-free single-slot channel for cross-thread parameter handoff.
//!
//! Double-buffered: two slots, each guarded by an atomic busy flag. One
//! writer thread publishes the latest value of a parameter, one reader
//! thread takes it. Neither side ever blocks or spins unboundedly: the
//! other side holds at most one slot at a time, so the second probe always
//! succeeds. Intermediate values are lost when the writer outpaces the
//! reader; only the latest value matters.
//!
//! Used to carry values such as live meter levels between the audio
//! callback and a UI refresh timer. A blocking lock here would risk audio
//! dropouts.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

struct Slot<T> {
    busy: AtomicBool,
    value: UnsafeCell<T>,
}

/// A wait-free single-writer/single-reader channel holding the latest
/// value of `T`.
///
/// Contract: exactly one thread calls [`write`](Self::write) and exactly
/// one (possibly different) thread calls [`read`](Self::read). Concurrent
/// write/write or read/read is not supported and is not runtime-checked.
pub struct SingleSlotChannel<T> {
    slots: [Slot<T>; 2],
    /// Index of the most recently written slot. A routing hint: the writer
    /// prefers the other slot, the reader prefers this one.
    last_written: AtomicUsize,
}

// SAFETY: a slot's payload is only accessed while its busy flag is held.
// The flag is taken with compare_exchange(Acquire) and dropped with a
// Release store, so payload accesses on different threads are ordered.
// Under the single-writer/single-reader contract there is never more than
// one holder per slot.
unsafe impl<T: Send> Send for SingleSlotChannel<T> {}
unsafe impl<T: Send> Sync for SingleSlotChannel<T> {}

impl<T: Default> SingleSlotChannel<T> {
    /// Create a channel with both slots holding `T::default()`.
    ///
    /// Construction happens on one thread before the channel is shared,
    /// which is the single-threaded initialization the contract requires.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot {
                busy: AtomicBool::new(false),
                value: UnsafeCell::new(T::default()),
            }),
            last_written: AtomicUsize::new(0),
        }
    }

    /// Reset both slots to `T::default()` and forget the write history.
    ///
    /// Takes `&mut self`: exclusive access is what makes this safe to do
    /// without touching the atomics, and the borrow checker enforces that
    /// no concurrent `read`/`write` can be in flight.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot.busy.get_mut() = false;
            *slot.value.get_mut() = T::default();
        }
        *self.last_written.get_mut() = 0;
    }

    /// Publish a value, replacing whatever the reader has not yet taken.
    ///
    /// Never blocks. Writer-thread only.
    #[inline]
    pub fn write(&self, value: T) {
        // Prefer the slot the reader is least likely to be probing.
        let preferred = 1 - self.last_written.load(Ordering::Acquire);
        let idx = self.acquire(preferred);
        // SAFETY: the busy flag grants exclusive access to the payload.
        unsafe { *self.slots[idx].value.get() = value };
        self.last_written.store(idx, Ordering::Release);
        self.slots[idx].busy.store(false, Ordering::Release);
    }

    /// Take the most recently published value.
    ///
    /// Returns `T::default()` when nothing new has been published since
    /// the last read. Never blocks. Reader-thread only.
    #[inline]
    pub fn read(&self) -> T {
        // Prefer the most recently written slot.
        let preferred = self.last_written.load(Ordering::Acquire);
        let idx = self.acquire(preferred);
        // SAFETY: the busy flag grants exclusive access to the payload.
        let value = unsafe { std::mem::take(&mut *self.slots[idx].value.get()) };
        self.slots[idx].busy.store(false, Ordering::Release);
        value
    }

    /// Acquire a free slot, starting at `preferred`.
    ///
    /// The other side holds at most one slot, so this succeeds within two
    /// probes; the loop only alternates between the two indices.
    #[inline]
    fn acquire(&self, preferred: usize) -> usize {
        let mut idx = preferred;
        loop {
            if self.slots[idx]
                .busy
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return idx;
            }
            idx = 1 - idx;
        }
    }
}

impl<T: Default> Default for SingleSlotChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

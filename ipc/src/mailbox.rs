//! Bounded lock-free mailbox
//!
//! A ring of [`MAILBOX_SLOTS`] fixed slots. Each slot carries a turn counter
//! that says whose move it is:
//!
//! - `turn == i` (or `i + k·N`): empty, ready for the production with head
//!   index `turn`
//! - `turn == head + 1`: full, ready for the consumption with tail index
//!   `head`
//!
//! `head` and `tail` are free-running `u32` counters; [`MAILBOX_SLOTS`]
//! divides `2^32`, so wrapping keeps the slot mapping consistent.
//!
//! A slot's message is written only by the producer holding the matching
//! head claim, between its successful CAS and its turn publish, and read
//! only by the consumer holding the matching tail claim, between its CAS and
//! its turn republish. No other path touches slot contents.

use crate::message::Message;
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Number of slots in every mailbox.
pub const MAILBOX_SLOTS: usize = 8;

const UNINIT: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;

struct Slot {
    turn: AtomicU32,
    message: UnsafeCell<Message>,
}

impl Slot {
    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: Slot = Slot {
        turn: AtomicU32::new(0),
        message: UnsafeCell::new(Message::EMPTY),
    };
}

/// Fixed-capacity multi-producer message queue
///
/// Any number of producers may call [`try_send`](Mailbox::try_send) and
/// [`send`](Mailbox::send) concurrently. Consumption is specified for a
/// single consumer per mailbox: the algorithm is a general bounded MPMC
/// queue, but only the single-consumer case is tested and relied upon.
///
/// "Full" and "empty" are ordinary return values, not errors.
///
/// # Example
///
/// ```
/// use core_types::Endpoint;
/// use ipc::{Mailbox, Message};
///
/// static INBOX: Mailbox = Mailbox::new();
///
/// let msg = Message::new(Endpoint::Ping, Endpoint::Pong, 2, b"hello");
/// assert!(INBOX.try_send(&msg));
/// assert_eq!(INBOX.try_receive().unwrap().payload(), b"hello");
/// assert!(INBOX.try_receive().is_none());
/// ```
pub struct Mailbox {
    slots: [Slot; MAILBOX_SLOTS],
    head: AtomicU32,
    tail: AtomicU32,
    init: AtomicU8,
}

// SAFETY: slot contents are only accessed by the single producer or
// consumer that won the head/tail claim for that slot's current turn; the
// turn counter's release/acquire pair orders those accesses.
unsafe impl Sync for Mailbox {}

impl Mailbox {
    /// Number of messages a mailbox holds.
    pub const CAPACITY: usize = MAILBOX_SLOTS;

    /// Returns the zero-valued mailbox
    ///
    /// No further setup is needed: turn counters are initialized by
    /// whichever operation touches the mailbox first.
    pub const fn new() -> Self {
        Self {
            slots: [Slot::EMPTY; MAILBOX_SLOTS],
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
            init: AtomicU8::new(UNINIT),
        }
    }

    /// Seeds `slots[i].turn = i` exactly once
    ///
    /// The winner of the `UNINIT -> INITIALIZING` CAS does the work; everyone
    /// else yields until the flag reads `READY`.
    fn ensure_init(&self) {
        if self.init.load(Ordering::Acquire) == READY {
            return;
        }

        if self
            .init
            .compare_exchange(UNINIT, INITIALIZING, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
        {
            for (i, slot) in self.slots.iter().enumerate() {
                slot.turn.store(i as u32, Ordering::Relaxed);
            }
            self.init.store(READY, Ordering::Release);
            return;
        }

        while self.init.load(Ordering::Acquire) != READY {
            hal::yield_now();
        }
    }

    fn slot(&self, index: u32) -> &Slot {
        &self.slots[index as usize % MAILBOX_SLOTS]
    }

    /// Enqueues a copy of `msg` without blocking
    ///
    /// Returns `false` if the mailbox is full at the current head.
    pub fn try_send(&self, msg: &Message) -> bool {
        self.ensure_init();

        loop {
            let head = self.head.load(Ordering::Relaxed);
            let slot = self.slot(head);
            let turn = slot.turn.load(Ordering::Acquire);
            let diff = turn.wrapping_sub(head) as i32;

            if diff == 0 {
                if self
                    .head
                    .compare_exchange_weak(
                        head,
                        head.wrapping_add(1),
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    )
                    .is_ok()
                {
                    // SAFETY: the head claim for this turn is ours until the
                    // turn store below publishes the slot to the consumer.
                    unsafe { *slot.message.get() = *msg };
                    slot.turn.store(head.wrapping_add(1), Ordering::Release);
                    return true;
                }
            } else if diff < 0 {
                return false;
            }
            // diff > 0 or a lost CAS: another producer moved head, retry.
        }
    }

    /// Enqueues a copy of `msg`, yielding until there is room
    ///
    /// No timeout. Callers that need one build it on
    /// [`try_send`](Mailbox::try_send).
    pub fn send(&self, msg: &Message) {
        while !self.try_send(msg) {
            hal::yield_now();
        }
    }

    /// Dequeues the oldest message without blocking
    ///
    /// Returns `None` if the mailbox is empty at the current tail.
    pub fn try_receive(&self) -> Option<Message> {
        self.ensure_init();

        loop {
            let tail = self.tail.load(Ordering::Relaxed);
            let slot = self.slot(tail);
            let turn = slot.turn.load(Ordering::Acquire);
            let diff = turn.wrapping_sub(tail.wrapping_add(1)) as i32;

            if diff == 0 {
                if self
                    .tail
                    .compare_exchange_weak(
                        tail,
                        tail.wrapping_add(1),
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    )
                    .is_ok()
                {
                    // SAFETY: the tail claim for this turn is ours until the
                    // turn store below hands the slot back to producers.
                    let msg = unsafe { *slot.message.get() };
                    slot.turn.store(tail.wrapping_add(MAILBOX_SLOTS as u32), Ordering::Release);
                    return Some(msg);
                }
            } else if diff < 0 {
                return None;
            }
        }
    }

    /// Dequeues the oldest message, yielding until one arrives
    pub fn receive(&self) -> Message {
        loop {
            if let Some(msg) = self.try_receive() {
                return msg;
            }
            hal::yield_now();
        }
    }

    /// Returns the number of claimed-but-unconsumed slots
    ///
    /// Advisory only: exact when no producer or consumer is running.
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        (head.wrapping_sub(tail) as usize).min(MAILBOX_SLOTS)
    }

    /// Returns true if no message is waiting (advisory, see [`len`](Mailbox::len))
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Mailbox")
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .field("init", &self.init.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Endpoint;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn numbered(n: u32) -> Message {
        Message::new(Endpoint::Ping, Endpoint::Pong, 2, &n.to_le_bytes())
    }

    fn number_of(msg: &Message) -> u32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&msg.payload()[..4]);
        u32::from_le_bytes(bytes)
    }

    #[test]
    fn test_try_receive_empty() {
        let mb = Mailbox::new();
        assert!(mb.try_receive().is_none());
        assert!(mb.is_empty());
    }

    #[test]
    fn test_try_send_until_full() {
        let mb = Mailbox::new();
        let msg = Message::EMPTY;

        for i in 0..MAILBOX_SLOTS {
            assert!(mb.try_send(&msg), "try_send failed at slot {}", i);
        }
        assert!(!mb.try_send(&msg), "try_send succeeded on a full mailbox");
        assert_eq!(mb.len(), MAILBOX_SLOTS);

        for i in 0..MAILBOX_SLOTS {
            assert!(mb.try_receive().is_some(), "try_receive failed at slot {}", i);
        }
        assert!(mb.try_receive().is_none());
    }

    #[test]
    fn test_full_then_one_receive_frees_one_slot() {
        let mb = Mailbox::new();
        for n in 0..MAILBOX_SLOTS as u32 {
            assert!(mb.try_send(&numbered(n)));
        }
        assert!(!mb.try_send(&numbered(99)));

        let first = mb.try_receive().unwrap();
        assert_eq!(number_of(&first), 0);

        assert!(mb.try_send(&numbered(8)));
        assert!(!mb.try_send(&numbered(9)));
    }

    #[test]
    fn test_fifo_order_across_wraparound() {
        let mb = Mailbox::new();
        let mut next_out = 0u32;
        for n in 0..100u32 {
            if !mb.try_send(&numbered(n)) {
                let msg = mb.try_receive().unwrap();
                assert_eq!(number_of(&msg), next_out);
                next_out += 1;
                assert!(mb.try_send(&numbered(n)));
            }
        }
        while let Some(msg) = mb.try_receive() {
            assert_eq!(number_of(&msg), next_out);
            next_out += 1;
        }
        assert_eq!(next_out, 100);
    }

    #[test]
    fn test_counters_wrap() {
        let mb = Mailbox::new();
        mb.ensure_init();
        // Fast-forward both counters to just below u32::MAX, keeping the
        // turn invariant: slot (start + k) % N expects turn start + k.
        let start = u32::MAX - 3;
        mb.head.store(start, Ordering::Relaxed);
        mb.tail.store(start, Ordering::Relaxed);
        for k in 0..MAILBOX_SLOTS as u32 {
            let idx = start.wrapping_add(k);
            mb.slot(idx).turn.store(idx, Ordering::Relaxed);
        }

        for n in 0..20u32 {
            assert!(mb.try_send(&numbered(n)));
            assert_eq!(number_of(&mb.try_receive().unwrap()), n);
        }
        assert!(mb.try_receive().is_none());
    }

    #[test]
    fn test_static_zero_value_mailbox() {
        static MB: Mailbox = Mailbox::new();
        assert!(MB.try_receive().is_none());
        assert!(MB.try_send(&numbered(7)));
        assert_eq!(number_of(&MB.receive()), 7);
    }

    #[test]
    fn test_racing_first_touch_initializes_once() {
        const THREADS: usize = 16;
        let mb = Arc::new(Mailbox::new());
        let barrier = Arc::new(Barrier::new(THREADS));
        let accepted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|n| {
                let mb = Arc::clone(&mb);
                let barrier = Arc::clone(&barrier);
                let accepted = Arc::clone(&accepted);
                thread::spawn(move || {
                    barrier.wait();
                    if mb.try_send(&numbered(n as u32)) {
                        accepted.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(accepted.load(Ordering::Relaxed), MAILBOX_SLOTS);
        let mut seen = Vec::new();
        while let Some(msg) = mb.try_receive() {
            seen.push(number_of(&msg));
        }
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), MAILBOX_SLOTS);
    }

    #[test]
    fn test_blocking_send_waits_for_consumer() {
        let mb = Arc::new(Mailbox::new());
        for n in 0..MAILBOX_SLOTS as u32 {
            mb.send(&numbered(n));
        }

        let producer = {
            let mb = Arc::clone(&mb);
            thread::spawn(move || mb.send(&numbered(100)))
        };

        for n in 0..MAILBOX_SLOTS as u32 {
            assert_eq!(number_of(&mb.receive()), n);
        }
        assert_eq!(number_of(&mb.receive()), 100);
        producer.join().unwrap();
    }
}

//! Resilience Test Utilities
//!
//! This crate provides shared utilities for resilience and integration tests.
//!
//! ## Test Philosophy
//!
//! - **No loss, no duplication**: Every accepted message is received exactly once
//! - **Per-producer order**: One producer's messages arrive in the order sent
//! - **Real threads**: Contention is produced with OS threads, not simulated
//! - **Bounded runs**: Every wait has a tick or wall-clock limit

use core_types::Endpoint;
use ipc::Mailbox;
use kernel_api::KernelApi;
use kernel_core::test_utils::{tag_of, tagged};
use kernel_core::Kernel;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Bootstrap helper for tests
///
/// Creates a kernel shared behind an `Arc`, tick task not started.
pub fn test_bootstrap() -> Arc<Kernel> {
    Arc::new(Kernel::new())
}

/// Tag for message `seq` of `producer` when each sends `per_producer`
pub fn producer_tag(producer: u32, seq: u32, per_producer: u32) -> u32 {
    producer * per_producer + seq
}

/// Spawns `producers` threads, each sending `per_producer` tagged messages
/// to `to` through the blocking kernel send
pub fn spawn_kernel_producers(
    kernel: &Arc<Kernel>,
    to: Endpoint,
    producers: u32,
    per_producer: u32,
) -> Vec<JoinHandle<()>> {
    (0..producers)
        .map(|p| {
            let kernel = Arc::clone(kernel);
            thread::spawn(move || {
                for seq in 0..per_producer {
                    let msg = tagged(Endpoint::Ping, to, producer_tag(p, seq, per_producer));
                    kernel.send(msg.from, msg.to, msg.kind, msg.payload());
                }
            })
        })
        .collect()
}

/// Spawns `producers` threads pushing straight into `mailbox`
pub fn spawn_mailbox_producers(
    mailbox: &'static Mailbox,
    producers: u32,
    per_producer: u32,
) -> Vec<JoinHandle<()>> {
    (0..producers)
        .map(|p| {
            thread::spawn(move || {
                for seq in 0..per_producer {
                    let tag = producer_tag(p, seq, per_producer);
                    mailbox.send(&tagged(Endpoint::Ping, Endpoint::Pong, tag));
                }
            })
        })
        .collect()
}

/// Tracks which tags a consumer has seen
#[derive(Debug)]
pub struct Coverage {
    per_producer: u32,
    seen: Vec<bool>,
    next_seq: Vec<u32>,
    received: usize,
}

impl Coverage {
    /// Creates an empty coverage set for `producers * per_producer` tags
    pub fn new(producers: u32, per_producer: u32) -> Self {
        Self {
            per_producer,
            seen: vec![false; (producers * per_producer) as usize],
            next_seq: vec![0; producers as usize],
            received: 0,
        }
    }

    /// Records one received tag
    ///
    /// Panics on an unknown tag, a repeat, or a message that overtook an
    /// earlier one from the same producer.
    pub fn record(&mut self, tag: u32) {
        let slot = self
            .seen
            .get_mut(tag as usize)
            .unwrap_or_else(|| panic!("tag {} out of range", tag));
        assert!(!*slot, "tag {} received twice", tag);
        *slot = true;

        let producer = (tag / self.per_producer) as usize;
        let seq = tag % self.per_producer;
        assert_eq!(
            seq, self.next_seq[producer],
            "producer {} out of order",
            producer
        );
        self.next_seq[producer] += 1;
        self.received += 1;
    }

    /// Number of tags recorded so far
    pub fn received(&self) -> usize {
        self.received
    }

    /// Returns true once every tag has been seen exactly once
    pub fn is_complete(&self) -> bool {
        self.received == self.seen.len() && self.seen.iter().all(|&s| s)
    }
}

/// Receives `count` messages on `endpoint` and records them
pub fn consume_into(kernel: &Kernel, endpoint: Endpoint, count: usize, coverage: &mut Coverage) {
    for _ in 0..count {
        let msg = kernel.receive(endpoint);
        let tag = tag_of(&msg).unwrap_or_else(|| panic!("untagged message {:?}", msg));
        coverage.record(tag);
    }
}

//! # Kernel Core
//!
//! This crate provides the kernel aggregate: one mailbox per endpoint, one
//! shared region and the tick counter, behind [`KernelApi`].
//!
//! ## Purpose
//!
//! Every other component (filesystem service, VFS router, application
//! manager, device tasks) synchronizes through this object and nothing else.
//!
//! ## Philosophy
//!
//! **The kernel is handed to tasks, never looked up.**
//!
//! A [`Kernel`] is built once at startup and shared by reference (usually an
//! `Arc<Kernel>`) with every task. There are no ambient globals, no heap
//! allocation after construction and no shutdown path: once built, the
//! kernel is running until the process exits.
//!
//! ## Waiting
//!
//! Blocking calls spin on the non-blocking ones and yield between attempts.
//! That keeps the footprint minimal at the cost of CPU while idle; bounded
//! waits are built on top with [`retry`].

pub mod retry;
pub mod test_utils;
pub mod tick;

use core_types::{Endpoint, ENDPOINT_COUNT};
use hal::TimerDevice;
use ipc::{Mailbox, Message, SharedRegion, MAX_PAYLOAD};
use kernel_api::{KernelApi, KernelConfig, KernelError};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tick::TickCounter;

/// The kernel aggregate
///
/// # Example
///
/// ```
/// use core_types::Endpoint;
/// use ipc::MessageKind;
/// use kernel_api::KernelApi;
/// use kernel_core::Kernel;
///
/// let kernel = Kernel::new();
/// kernel.send(Endpoint::Ping, Endpoint::Pong, MessageKind::Ping.into(), b"hello");
///
/// let msg = kernel.receive(Endpoint::Pong);
/// assert_eq!(msg.from, Endpoint::Ping);
/// assert_eq!(msg.payload(), b"hello");
/// ```
pub struct Kernel {
    /// One mailbox per endpoint, indexed by `Endpoint::index`
    mailboxes: [Mailbox; ENDPOINT_COUNT],
    /// Lossy side channel
    shared: SharedRegion,
    /// Coarse timebase
    ticks: TickCounter,
    /// Set once the background tick task has been started
    tick_running: AtomicBool,
    config: KernelConfig,
}

impl Kernel {
    /// Creates a kernel with the default configuration
    pub fn new() -> Self {
        Self::build(KernelConfig::default())
    }

    /// Creates a kernel with an explicit configuration
    pub fn with_config(config: KernelConfig) -> Result<Self, KernelError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: KernelConfig) -> Self {
        Self {
            mailboxes: core::array::from_fn(|_| Mailbox::new()),
            shared: SharedRegion::new(),
            ticks: TickCounter::new(),
            tick_running: AtomicBool::new(false),
            config,
        }
    }

    /// Returns the configuration the kernel was built with
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Returns the mailbox owned by `endpoint`
    ///
    /// Direct access is for layers that want the raw `bool`/`Option`
    /// results of [`Mailbox::try_send`] and [`Mailbox::try_receive`].
    pub fn mailbox(&self, endpoint: Endpoint) -> &Mailbox {
        &self.mailboxes[endpoint.index()]
    }

    pub(crate) fn tick_counter(&self) -> &TickCounter {
        &self.ticks
    }

    /// Starts the background task advancing the tick counter
    ///
    /// The task runs once per configured quantum (1 ms by default) for the
    /// rest of the process. Only one tick task may run per kernel.
    pub fn start_tick(self: &Arc<Self>) -> Result<(), KernelError> {
        if self
            .tick_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(KernelError::TickAlreadyRunning);
        }

        let kernel = Arc::clone(self);
        let quantum = self.config.tick_quantum();
        if let Err(e) = tick::spawn_tick_task(quantum, move || {
            kernel.tick();
        }) {
            self.tick_running.store(false, Ordering::Release);
            return Err(KernelError::TickSpawnFailed(e.to_string()));
        }

        info!(
            "tick task started (quantum {} us)",
            self.config.tick_quantum_micros
        );
        Ok(())
    }

    /// Returns true once [`start_tick`](Kernel::start_tick) has succeeded
    pub fn is_ticking(&self) -> bool {
        self.tick_running.load(Ordering::Acquire)
    }

    /// Advances the tick counter by one and returns the new count
    pub fn tick(&self) -> u64 {
        self.ticks.tick()
    }

    /// Advances the tick counter by `delta` and returns the new count
    ///
    /// For hosts that drive time themselves instead of running the tick task.
    pub fn advance_ticks(&self, delta: u64) -> u64 {
        self.ticks.advance(delta)
    }

    /// Yields until the tick counter moves past `after`, returning the new count
    pub fn wait_tick(&self, after: u64) -> u64 {
        let counter = self.tick_counter();
        while !counter.has_passed(after) {
            hal::yield_now();
        }
        counter.current()
    }

    fn build_message(from: Endpoint, to: Endpoint, kind: u8, payload: &[u8]) -> Message {
        if Message::would_truncate(payload) {
            debug!(
                "payload of {} bytes from {} to {} truncated to {}",
                payload.len(),
                from,
                to,
                MAX_PAYLOAD
            );
        }
        Message::new(from, to, kind, payload)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("ticks", &self.ticks.current())
            .field("tick_running", &self.is_ticking())
            .field("shared", &self.shared)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl KernelApi for Kernel {
    fn send(&self, from: Endpoint, to: Endpoint, kind: u8, payload: &[u8]) {
        let msg = Self::build_message(from, to, kind, payload);
        self.mailbox(to).send(&msg);
    }

    fn try_send(
        &self,
        from: Endpoint,
        to: Endpoint,
        kind: u8,
        payload: &[u8],
    ) -> Result<(), KernelError> {
        let msg = Self::build_message(from, to, kind, payload);
        if self.mailbox(to).try_send(&msg) {
            Ok(())
        } else {
            Err(KernelError::MailboxFull { endpoint: to })
        }
    }

    fn receive(&self, endpoint: Endpoint) -> Message {
        self.mailbox(endpoint).receive()
    }

    fn try_receive(&self, endpoint: Endpoint) -> Option<Message> {
        self.mailbox(endpoint).try_receive()
    }

    fn shared_region(&self) -> &SharedRegion {
        &self.shared
    }

    fn ticks(&self) -> u64 {
        self.ticks.current()
    }

    fn yield_now(&self) {
        hal::yield_now();
    }
}

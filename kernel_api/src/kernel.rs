//! Kernel API trait

use crate::KernelError;
use core_types::Endpoint;
use ipc::{Message, SharedRegion};

/// The kernel API trait
///
/// This is the whole contract every task above the substrate relies on.
/// The production implementation is `kernel_core::Kernel`; tests substitute
/// doubles with scripted mailboxes or synthetic clocks.
///
/// # Blocking
///
/// [`send`](KernelApi::send) and [`receive`](KernelApi::receive) spin and
/// yield until they complete; they have no timeout and cannot be cancelled.
/// Everything else returns immediately.
///
/// # Example
///
/// ```
/// use core_types::Endpoint;
/// use ipc::MessageKind;
/// use kernel_api::{KernelApi, KernelError};
///
/// fn ping<K: KernelApi>(kernel: &K) -> Result<(), KernelError> {
///     kernel.try_send(Endpoint::Ping, Endpoint::Pong, MessageKind::Ping.into(), b"hello")
/// }
/// ```
pub trait KernelApi {
    /// Sends a message, yielding until the destination mailbox has room
    ///
    /// Payloads longer than [`ipc::MAX_PAYLOAD`] are truncated silently.
    fn send(&self, from: Endpoint, to: Endpoint, kind: u8, payload: &[u8]);

    /// Sends a message if the destination mailbox has room
    ///
    /// Fails with [`KernelError::MailboxFull`] otherwise. Truncates like
    /// [`send`](KernelApi::send).
    fn try_send(
        &self,
        from: Endpoint,
        to: Endpoint,
        kind: u8,
        payload: &[u8],
    ) -> Result<(), KernelError>;

    /// Receives the next message for `endpoint`, yielding until one arrives
    fn receive(&self, endpoint: Endpoint) -> Message;

    /// Receives the next message for `endpoint` if one is waiting
    fn try_receive(&self, endpoint: Endpoint) -> Option<Message>;

    /// Returns the single shared region
    fn shared_region(&self) -> &SharedRegion;

    /// Returns the current tick count
    fn ticks(&self) -> u64;

    /// Cedes the current task's turn without blocking
    fn yield_now(&self);
}

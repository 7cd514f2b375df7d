//! Budgeted retry loops over the non-blocking kernel calls
//!
//! `send` and `receive` on [`KernelApi`] wait forever. Tasks that must stay
//! responsive use `try_send`/`try_receive` through these helpers instead,
//! bounding the wait with a tick [`Deadline`] or an attempt count.
//!
//! Budgets are in kernel ticks, so they only expire while something advances
//! the tick counter (normally the task started by `Kernel::start_tick`).

use core_types::Endpoint;
use ipc::Message;
use kernel_api::{Deadline, KernelApi, KernelError};
use log::trace;

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// deadline expires
///
/// Only [`KernelError::is_retryable`] errors are retried. The deadline is
/// checked after each failed attempt, so `op` always runs at least once.
pub fn retry_until<K, T, F>(kernel: &K, deadline: Deadline, mut op: F) -> Result<T, KernelError>
where
    K: KernelApi + ?Sized,
    F: FnMut() -> Result<T, KernelError>,
{
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => {
                let now = kernel.ticks();
                if deadline.is_expired(now) {
                    let waited_ticks = deadline.waited(now);
                    trace!("giving up after {} ticks: {}", waited_ticks, e);
                    return Err(KernelError::Timeout { waited_ticks });
                }
                kernel.yield_now();
            }
            Err(e) => return Err(e),
        }
    }
}

/// Sends a message, giving up after `budget_ticks`
pub fn send_budgeted<K: KernelApi + ?Sized>(
    kernel: &K,
    from: Endpoint,
    to: Endpoint,
    kind: u8,
    payload: &[u8],
    budget_ticks: u64,
) -> Result<(), KernelError> {
    let deadline = Deadline::after(kernel.ticks(), budget_ticks);
    retry_until(kernel, deadline, || kernel.try_send(from, to, kind, payload))
}

/// Receives the next message for `endpoint`, giving up after `budget_ticks`
pub fn receive_budgeted<K: KernelApi + ?Sized>(
    kernel: &K,
    endpoint: Endpoint,
    budget_ticks: u64,
) -> Result<Message, KernelError> {
    let deadline = Deadline::after(kernel.ticks(), budget_ticks);
    retry_until(kernel, deadline, || {
        kernel
            .try_receive(endpoint)
            .ok_or(KernelError::MailboxEmpty { endpoint })
    })
}

/// Sends a message with at most `max_attempts` tries, one tick apart
///
/// Between attempts the caller yields until the tick counter moves. A zero
/// attempt count fails immediately with [`KernelError::MailboxFull`] without
/// touching the mailbox.
pub fn send_with_attempts<K: KernelApi + ?Sized>(
    kernel: &K,
    from: Endpoint,
    to: Endpoint,
    kind: u8,
    payload: &[u8],
    max_attempts: u32,
) -> Result<(), KernelError> {
    for attempt in 0..max_attempts {
        match kernel.try_send(from, to, kind, payload) {
            Err(KernelError::MailboxFull { .. }) if attempt + 1 < max_attempts => {
                let seen = kernel.ticks();
                while kernel.ticks() <= seen {
                    kernel.yield_now();
                }
            }
            other => return other,
        }
    }
    Err(KernelError::MailboxFull { endpoint: to })
}

//! Kernel error types

use core_types::Endpoint;
use thiserror::Error;

/// Errors reported by the kernel layer
///
/// The mailbox itself never fails: "full" and "empty" are ordinary results
/// there. They become errors only at this layer, where callers asked for an
/// outcome (`Result`) rather than a flag.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// The destination mailbox had no free slot
    #[error("Mailbox full: {endpoint}")]
    MailboxFull { endpoint: Endpoint },

    /// The mailbox held no message
    #[error("Mailbox empty: {endpoint}")]
    MailboxEmpty { endpoint: Endpoint },

    /// A tick budget ran out before the operation could complete
    #[error("Operation timed out after {waited_ticks} ticks")]
    Timeout { waited_ticks: u64 },

    /// `start_tick` was called on a kernel whose tick task already runs
    #[error("Tick task already running")]
    TickAlreadyRunning,

    /// The platform refused to start the tick task
    #[error("Failed to start tick task: {0}")]
    TickSpawnFailed(String),

    /// Configuration rejected
    #[error("Invalid kernel configuration: {0}")]
    InvalidConfig(String),
}

impl KernelError {
    /// Returns true for conditions a retry loop may wait out
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            KernelError::MailboxFull { .. } | KernelError::MailboxEmpty { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(KernelError::MailboxFull {
            endpoint: Endpoint::Pong
        }
        .is_retryable());
        assert!(KernelError::MailboxEmpty {
            endpoint: Endpoint::Ping
        }
        .is_retryable());
        assert!(!KernelError::Timeout { waited_ticks: 3 }.is_retryable());
        assert!(!KernelError::TickAlreadyRunning.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = KernelError::MailboxFull {
            endpoint: Endpoint::Logger,
        };
        assert_eq!(err.to_string(), "Mailbox full: Endpoint(logger)");
        let err = KernelError::Timeout { waited_ticks: 12 };
        assert_eq!(err.to_string(), "Operation timed out after 12 ticks");
    }
}

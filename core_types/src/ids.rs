//! Endpoint identifiers for kernel mailboxes

use core::fmt;
use serde::{Deserialize, Serialize};

/// Number of endpoints (and therefore mailboxes) known to the kernel.
pub const ENDPOINT_COUNT: usize = 4;

/// Address of a kernel mailbox
///
/// The set is closed at compile time. An endpoint carries no authority of
/// its own; it is only compared and used as an index into the kernel's
/// mailbox array.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Endpoint {
    /// The kernel itself
    #[default]
    Kernel = 0,
    /// Logger task
    Logger = 1,
    /// Ping side of the round-trip demo
    Ping = 2,
    /// Pong side of the round-trip demo
    Pong = 3,
}

impl Endpoint {
    /// Every endpoint, in index order.
    pub const ALL: [Endpoint; ENDPOINT_COUNT] = [
        Endpoint::Kernel,
        Endpoint::Logger,
        Endpoint::Ping,
        Endpoint::Pong,
    ];

    /// Returns the mailbox index for this endpoint
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the raw wire value
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns a short lowercase name, used in log lines
    pub const fn name(self) -> &'static str {
        match self {
            Endpoint::Kernel => "kernel",
            Endpoint::Logger => "logger",
            Endpoint::Ping => "ping",
            Endpoint::Pong => "pong",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Endpoint({})", self.name())
    }
}

/// A raw value that does not name any endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidEndpoint(pub u8);

impl fmt::Display for InvalidEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid endpoint {} (expected < {})",
            self.0, ENDPOINT_COUNT
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidEndpoint {}

impl TryFrom<u8> for Endpoint {
    type Error = InvalidEndpoint;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Endpoint::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(InvalidEndpoint(value))
    }
}

impl From<Endpoint> for u8 {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.as_u8()
    }
}

//! Message types and envelope structure

use core::fmt;
use core_types::Endpoint;
use serde::{Deserialize, Serialize};

/// Largest payload a single message can carry, in bytes.
///
/// Larger transfers belong in a [`SharedRegion`](crate::SharedRegion) plus a
/// [`MessageKind::NotifyShared`] message, not in mailbox copies.
pub const MAX_PAYLOAD: usize = 1024;

/// Well-known message tags
///
/// The envelope keeps the raw `u8` so that tags unknown to this crate pass
/// through untouched; this enum only names the ones the system defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageKind {
    /// A UTF-8 log line, without trailing newline
    Log = 1,
    /// Round-trip request
    Ping = 2,
    /// Round-trip reply
    Pong = 3,
    /// The shared region holds a fresh snapshot
    NotifyShared = 4,
}

impl MessageKind {
    /// Returns the raw tag
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<MessageKind> for u8 {
    fn from(kind: MessageKind) -> Self {
        kind.as_u8()
    }
}

/// A tag that does not name a [`MessageKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessageKind(pub u8);

impl fmt::Display for UnknownMessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown message kind {}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownMessageKind {}

impl TryFrom<u8> for MessageKind {
    type Error = UnknownMessageKind;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MessageKind::Log),
            2 => Ok(MessageKind::Ping),
            3 => Ok(MessageKind::Pong),
            4 => Ok(MessageKind::NotifyShared),
            other => Err(UnknownMessageKind(other)),
        }
    }
}

/// Fixed-size message envelope
///
/// Messages are always copied, never referenced: the copy is the only way
/// ownership moves from a producer to a consumer.
///
/// # Example
///
/// ```
/// use core_types::Endpoint;
/// use ipc::{Message, MessageKind};
///
/// let msg = Message::new(Endpoint::Ping, Endpoint::Pong, MessageKind::Ping.into(), b"hi");
/// assert_eq!(msg.payload(), b"hi");
/// assert_eq!(msg.message_kind(), Ok(MessageKind::Ping));
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Message {
    /// Sending endpoint
    pub from: Endpoint,
    /// Destination endpoint
    pub to: Endpoint,
    /// Message tag, see [`MessageKind`]
    pub kind: u8,
    /// Number of meaningful bytes in `data`
    pub len: u16,
    /// Inline payload storage
    pub data: [u8; MAX_PAYLOAD],
}

impl Message {
    /// The zero-valued message: kernel to kernel, kind 0, no payload.
    pub const EMPTY: Message = Message {
        from: Endpoint::Kernel,
        to: Endpoint::Kernel,
        kind: 0,
        len: 0,
        data: [0; MAX_PAYLOAD],
    };

    /// Builds a message, copying `payload` inline
    ///
    /// Payloads longer than [`MAX_PAYLOAD`] are truncated to `MAX_PAYLOAD`
    /// bytes. No error is reported; use [`Message::would_truncate`] to check
    /// beforehand.
    pub fn new(from: Endpoint, to: Endpoint, kind: u8, payload: &[u8]) -> Self {
        let mut msg = Message {
            from,
            to,
            kind,
            ..Message::EMPTY
        };
        let len = payload.len().min(MAX_PAYLOAD);
        msg.data[..len].copy_from_slice(&payload[..len]);
        msg.len = len as u16;
        msg
    }

    /// Returns true if `payload` exceeds what one message can carry
    pub fn would_truncate(payload: &[u8]) -> bool {
        payload.len() > MAX_PAYLOAD
    }

    /// Returns the meaningful part of the payload
    ///
    /// A `len` field larger than [`MAX_PAYLOAD`] is clamped.
    pub fn payload(&self) -> &[u8] {
        let len = usize::from(self.len).min(MAX_PAYLOAD);
        &self.data[..len]
    }

    /// Decodes the tag into a [`MessageKind`]
    pub fn message_kind(&self) -> Result<MessageKind, UnknownMessageKind> {
        MessageKind::try_from(self.kind)
    }

    /// Returns true if the tag is `kind`
    pub fn is(&self, kind: MessageKind) -> bool {
        self.kind == kind.as_u8()
    }
}

impl Default for Message {
    fn default() -> Self {
        Message::EMPTY
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("kind", &self.kind)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

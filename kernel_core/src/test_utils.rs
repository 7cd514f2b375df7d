//! Helpers shared by unit tests and the resilience suite

use crate::Kernel;
use core_types::Endpoint;
use ipc::{Message, MessageKind, MAILBOX_SLOTS};

/// Builds a `Ping` message whose payload is `tag` in little-endian order
pub fn tagged(from: Endpoint, to: Endpoint, tag: u32) -> Message {
    Message::new(from, to, MessageKind::Ping.into(), &tag.to_le_bytes())
}

/// Decodes the tag written by [`tagged`], if the payload has the right size
pub fn tag_of(msg: &Message) -> Option<u32> {
    let bytes: [u8; 4] = msg.payload().try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// Fills `to`'s mailbox with tags `0..MAILBOX_SLOTS`
///
/// Panics if the mailbox was not empty.
pub fn fill_mailbox(kernel: &Kernel, from: Endpoint, to: Endpoint) {
    for tag in 0..MAILBOX_SLOTS as u32 {
        assert!(
            kernel.mailbox(to).try_send(&tagged(from, to, tag)),
            "mailbox for {} filled early at tag {}",
            to,
            tag
        );
    }
}

/// Drains every waiting message for `endpoint`
pub fn drain(kernel: &Kernel, endpoint: Endpoint) -> Vec<Message> {
    std::iter::from_fn(|| kernel.mailbox(endpoint).try_receive()).collect()
}

//! # Inter-Task Communication (IPC)
//!
//! This crate defines Spark's message-passing primitives.
//!
//! ## Philosophy
//!
//! - **Fixed size, copied by value**: A [`Message`] is a plain value with an
//!   inline payload. Queuing never allocates and never aliases.
//! - **Lock-free**: A [`Mailbox`] arbitrates producers and consumers with
//!   compare-and-swap and per-slot turn counters. There is no mutex.
//! - **Zero value is ready**: A `Mailbox` needs no constructor call beyond
//!   its `const` zero value; it initializes itself on first touch.
//! - **Lossy side channel**: A [`SharedRegion`] carries the freshest
//!   snapshot of high-rate state with a sequence number, and nothing more.
//!
//! ## Architecture
//!
//! ```text
//!  producer ── try_send ──▶ ┌────────── Mailbox (8 slots) ──────────┐ ── try_receive ──▶ consumer
//!                           │ turn │ turn │ turn │ ... │ turn │ turn │
//!                           └───────────────────────────────────────┘
//! ```
//!
//! `send`/`receive` wrap the non-blocking calls in a yield-and-spin loop.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod mailbox;
pub mod message;
pub mod shared;

pub use mailbox::{Mailbox, MAILBOX_SLOTS};
pub use message::{Message, MessageKind, UnknownMessageKind, MAX_PAYLOAD};
pub use shared::SharedRegion;

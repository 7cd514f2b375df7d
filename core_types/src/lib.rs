//! # Core Types
//!
//! This crate defines the fundamental types shared by every Spark crate.
//!
//! ## Philosophy
//!
//! - **Closed address space**: A mailbox is reached through a fixed, compile-time
//!   set of endpoints. There is no runtime registration.
//! - **Values, not handles**: Endpoints are small `Copy` integers that index
//!   straight into the kernel's mailbox array.
//!
//! ## Key Types
//!
//! - [`Endpoint`]: Address of a kernel mailbox
//! - [`ENDPOINT_COUNT`]: Number of mailboxes the kernel owns

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod ids;

pub use ids::{Endpoint, InvalidEndpoint, ENDPOINT_COUNT};

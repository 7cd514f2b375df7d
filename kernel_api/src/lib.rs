//! # Kernel API
//!
//! This crate defines the contract between tasks and the kernel substrate.
//!
//! ## Philosophy
//!
//! The kernel provides **mechanisms**, not policies:
//! - Message passing through fixed mailboxes (not channels created at runtime)
//! - A lossy shared cell for high-rate state
//! - A coarse tick counter (explicit, not ambient)
//! - Cooperative yielding (no blocking OS primitives)
//!
//! Bounded waits, retries and deadlines are policies. They live above this
//! API and are built from the non-blocking calls plus [`Deadline`].
//!
//! ## Design Goals
//!
//! 1. **Testability**: The entire API can be replaced by a test double
//! 2. **Explicitness**: The kernel is handed to tasks, never reached as a global
//! 3. **No allocation**: Every operation works on fixed-size values

pub mod config;
pub mod error;
pub mod kernel;
pub mod time;

pub use config::KernelConfig;
pub use error::KernelError;
pub use kernel::KernelApi;
pub use time::{ticks_to_duration, Deadline};

//! # Spark Host Runtime
//!
//! This crate runs the kernel substrate as a host process.
//!
//! ## Philosophy
//!
//! - **Host owns I/O**: Tasks never print, they message the logger
//! - **One kernel per process**: Built once, handed to every task
//! - **Time is ticks**: Budgets and reports are measured on the kernel clock
//!
//! ## Responsibilities
//!
//! The host runtime:
//! - Loads kernel tunables from flags or a JSON file
//! - Starts the tick task
//! - Runs the logger, ping and pong tasks on their own threads
//! - Reports what the run did
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Provide device drivers or a filesystem
//! - Restart tasks that fail
//! - Shut the tick task down (it lives until the process exits)

pub mod runtime;

pub use runtime::{HostRuntime, HostRuntimeConfig, HostRuntimeError, RunReport};

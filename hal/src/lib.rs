//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines the small set of platform hooks the kernel substrate
//! relies on.
//!
//! ## Philosophy
//!
//! **The kernel assumes nothing beyond "execution contexts that can be
//! yielded to".**
//!
//! On the host, a context is an OS thread and yielding defers to the OS
//! scheduler. On bare metal without the `std` feature, yielding degrades to
//! a spin-loop hint.
//!
//! ## Design Principles
//!
//! 1. **No blocking primitives**: Nothing here parks or sleeps
//! 2. **Trait-based time**: Tick sources are reached through [`TimerDevice`]
//! 3. **Testable**: Every hook can be replaced by a deterministic stand-in

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod cpu;
pub mod timer;

pub use cpu::yield_now;
pub use timer::{TimerDevice, DEFAULT_TICK_QUANTUM_MICROS};

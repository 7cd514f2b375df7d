//! # Timer Device
//!
//! Hardware abstraction for the kernel's coarse timebase.
//!
//! ## Philosophy
//!
//! **Time is a service, not a global variable.**
//!
//! A timer device exposes a monotonic tick counter. It does NOT:
//! - Provide wall-clock time (no UTC, no timezones)
//! - Block or sleep (polling only)
//! - Implement scheduling
//!
//! ## Design Principles
//!
//! 1. **Monotonic**: Ticks never go backwards
//! 2. **Non-blocking**: Always returns immediately
//! 3. **Cumulative**: Returns total ticks since the counter started
//! 4. **Shared**: Polling takes `&self`, so any number of tasks may read it

/// Tick quantum documented for every platform: one millisecond.
pub const DEFAULT_TICK_QUANTUM_MICROS: u64 = 1_000;

/// Monotonic tick source
///
/// # Implementation Notes
///
/// - Must be monotonic (never return a smaller value)
/// - Must not block
/// - Tick frequency is implementation-defined (see [`DEFAULT_TICK_QUANTUM_MICROS`])
///
/// # Examples
///
/// ```
/// use hal::TimerDevice;
///
/// fn elapsed<T: TimerDevice>(timer: &T, since: u64) -> u64 {
///     timer.poll_ticks().saturating_sub(since)
/// }
/// ```
pub trait TimerDevice {
    /// Returns the current tick count
    fn poll_ticks(&self) -> u64;

    /// Returns true once the counter has moved past `after`
    fn has_passed(&self, after: u64) -> bool {
        self.poll_ticks() > after
    }
}

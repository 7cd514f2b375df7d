//! Tick-based time abstractions

use core::time::Duration;
use hal::TimerDevice;

/// A point on the tick counter after which an operation gives up
///
/// Deadlines are measured in kernel ticks, not wall-clock time: a kernel
/// whose tick task is not running never expires a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline {
    started_at: u64,
    expires_at: u64,
}

impl Deadline {
    /// Creates a deadline `budget` ticks after `now`
    pub fn after(now: u64, budget: u64) -> Self {
        Self {
            started_at: now,
            expires_at: now.saturating_add(budget),
        }
    }

    /// Creates a deadline `budget` ticks after the timer's current count
    pub fn from_timer<T: TimerDevice + ?Sized>(timer: &T, budget: u64) -> Self {
        Self::after(timer.poll_ticks(), budget)
    }

    /// Returns the tick at which the deadline expires
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Returns true once `now` has reached the deadline
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    /// Returns the ticks left before expiry
    pub fn remaining(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }

    /// Returns the ticks elapsed since the deadline was set
    pub fn waited(&self, now: u64) -> u64 {
        now.saturating_sub(self.started_at)
    }
}

/// Converts a tick count into wall-clock time for a given quantum
pub fn ticks_to_duration(ticks: u64, quantum_micros: u64) -> Duration {
    Duration::from_micros(ticks.saturating_mul(quantum_micros))
}

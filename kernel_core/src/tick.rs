//! # Kernel Timebase
//!
//! The tick counter and the background task that drives it.
//!
//! ## Philosophy
//!
//! **Ticks are coarse and monotonic, nothing more.**
//!
//! The counter only moves forward. On the host a detached thread advances it
//! once per quantum; tests and external timebases advance it by hand through
//! [`TickCounter::advance`]. Readers never block.

use hal::TimerDevice;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Name given to the host tick thread.
pub const TICK_THREAD_NAME: &str = "kernel-tick";

/// Monotonic tick counter shared by every task
///
/// # Examples
///
/// ```
/// use kernel_core::tick::TickCounter;
/// use hal::TimerDevice;
///
/// let counter = TickCounter::new();
/// assert_eq!(counter.poll_ticks(), 0);
///
/// counter.advance(100);
/// assert_eq!(counter.poll_ticks(), 100);
///
/// counter.tick();
/// assert_eq!(counter.poll_ticks(), 101);
/// ```
#[derive(Debug, Default)]
pub struct TickCounter {
    ticks: AtomicU64,
}

impl TickCounter {
    /// Creates a counter starting at tick 0
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
        }
    }

    /// Creates a counter starting at a specific tick count
    pub const fn with_initial_ticks(ticks: u64) -> Self {
        Self {
            ticks: AtomicU64::new(ticks),
        }
    }

    /// Advances the counter by one tick and returns the new count
    pub fn tick(&self) -> u64 {
        self.advance(1)
    }

    /// Advances the counter by `delta` ticks and returns the new count
    pub fn advance(&self, delta: u64) -> u64 {
        self.ticks
            .fetch_add(delta, Ordering::AcqRel)
            .wrapping_add(delta)
    }

    /// Returns the current tick count
    pub fn current(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }
}

impl TimerDevice for TickCounter {
    fn poll_ticks(&self) -> u64 {
        self.current()
    }
}

/// Spawns a detached thread calling `on_tick` once per `quantum`, forever
///
/// Ticks are scheduled against absolute instants, so a late wake-up is
/// followed by catch-up ticks rather than permanent drift.
pub fn spawn_tick_task<F>(quantum: Duration, mut on_tick: F) -> io::Result<()>
where
    F: FnMut() + Send + 'static,
{
    thread::Builder::new()
        .name(TICK_THREAD_NAME.to_string())
        .spawn(move || {
            let mut next = Instant::now() + quantum;
            loop {
                let now = Instant::now();
                if next > now {
                    thread::sleep(next - now);
                }
                on_tick();
                next += quantum;
            }
        })
        .map(|_detached| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_new_counter_starts_at_zero() {
        let counter = TickCounter::new();
        assert_eq!(counter.poll_ticks(), 0);
    }

    #[test]
    fn test_counter_with_initial_ticks() {
        let counter = TickCounter::with_initial_ticks(1000);
        assert_eq!(counter.poll_ticks(), 1000);
    }

    #[test]
    fn test_monotonic_progression() {
        let counter = TickCounter::new();
        let t1 = counter.poll_ticks();
        counter.advance(10);
        let t2 = counter.poll_ticks();
        counter.advance(20);
        let t3 = counter.poll_ticks();

        assert!(t2 >= t1);
        assert!(t3 >= t2);
        assert_eq!(t2 - t1, 10);
        assert_eq!(t3 - t2, 20);
    }

    #[test]
    fn test_zero_advance() {
        let counter = TickCounter::new();
        assert_eq!(counter.advance(0), 0);
    }

    #[test]
    fn test_tick_returns_new_count() {
        let counter = TickCounter::with_initial_ticks(41);
        assert_eq!(counter.tick(), 42);
        assert!(counter.has_passed(41));
    }

    #[test]
    fn test_tick_task_fires_repeatedly() {
        let (tx, rx) = mpsc::channel();
        let mut fired = 0u32;
        spawn_tick_task(Duration::from_micros(200), move || {
            fired += 1;
            let _ = tx.send(fired);
        })
        .unwrap();

        let mut last = 0;
        for _ in 0..5 {
            last = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }
        assert_eq!(last, 5);
    }
}

//! Cooperative scheduling hooks

/// Cedes the current execution context's turn to the scheduler
///
/// Never blocks. With `std` this is [`std::thread::yield_now`]; without it
/// the best a single core can do is a spin-loop hint.
#[inline]
pub fn yield_now() {
    #[cfg(feature = "std")]
    std::thread::yield_now();

    #[cfg(not(feature = "std"))]
    core::hint::spin_loop();
}

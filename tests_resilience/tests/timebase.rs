//! Timebase Tests
//!
//! Validates the tick task and the tick-budgeted retry helpers against a
//! real running clock.

use core_types::Endpoint;
use kernel_api::{KernelApi, KernelConfig, KernelError};
use kernel_core::retry::{receive_budgeted, send_budgeted, send_with_attempts};
use kernel_core::test_utils::fill_mailbox;
use kernel_core::Kernel;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn ticking_kernel(quantum_micros: u64) -> Arc<Kernel> {
    let kernel = Arc::new(
        Kernel::with_config(KernelConfig {
            tick_quantum_micros: quantum_micros,
            ..KernelConfig::default()
        })
        .unwrap(),
    );
    kernel.start_tick().unwrap();
    kernel
}

/// Test: the tick counter is monotonic and keeps advancing
#[test]
fn test_ticks_advance_monotonically() {
    let kernel = ticking_kernel(200);
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut last = kernel.ticks();

    while last < 20 {
        assert!(Instant::now() < deadline, "ticks stalled at {}", last);
        let now = kernel.ticks();
        assert!(now >= last);
        last = now;
        kernel.yield_now();
    }
}

/// Test: only one tick task per kernel
#[test]
fn test_second_start_rejected() {
    let kernel = ticking_kernel(1_000);
    assert_eq!(kernel.start_tick(), Err(KernelError::TickAlreadyRunning));
    assert!(kernel.is_ticking());
}

/// Test: wait_tick returns after the running clock moves
#[test]
fn test_wait_tick_with_running_clock() {
    let kernel = ticking_kernel(500);
    let now = kernel.ticks();
    assert!(kernel.wait_tick(now) > now);
}

/// Test: budgeted send on a full mailbox times out, then succeeds after drain
#[test]
fn test_budgeted_send_timeout_then_success() {
    let kernel = ticking_kernel(500);
    fill_mailbox(&kernel, Endpoint::Ping, Endpoint::Pong);

    let err = send_budgeted(&*kernel, Endpoint::Ping, Endpoint::Pong, 2, b"late", 4)
        .unwrap_err();
    match err {
        KernelError::Timeout { waited_ticks } => assert!(waited_ticks >= 4),
        other => panic!("expected timeout, got {:?}", other),
    }

    kernel.try_receive(Endpoint::Pong).unwrap();
    send_budgeted(&*kernel, Endpoint::Ping, Endpoint::Pong, 2, b"late", 4).unwrap();
}

/// Test: a budgeted receive picks up a message sent while it waits
#[test]
fn test_budgeted_receive_sees_late_message() {
    let kernel = ticking_kernel(500);
    let sender = {
        let kernel = Arc::clone(&kernel);
        thread::spawn(move || {
            let start = kernel.ticks();
            kernel.wait_tick(start + 2);
            kernel.send(Endpoint::Pong, Endpoint::Ping, 3, b"reply");
        })
    };

    let msg = receive_budgeted(&*kernel, Endpoint::Ping, 10_000).unwrap();
    assert_eq!(msg.payload(), b"reply");
    sender.join().unwrap();
}

/// Test: attempt-bounded send against a running clock
#[test]
fn test_send_with_attempts_gives_up() {
    let kernel = ticking_kernel(500);
    fill_mailbox(&kernel, Endpoint::Ping, Endpoint::Pong);

    let before = kernel.ticks();
    let err = send_with_attempts(&*kernel, Endpoint::Ping, Endpoint::Pong, 2, b"", 3).unwrap_err();
    assert_eq!(
        err,
        KernelError::MailboxFull {
            endpoint: Endpoint::Pong
        }
    );
    assert!(kernel.ticks() >= before + 2);

    assert!(send_with_attempts(&*kernel, Endpoint::Ping, Endpoint::Pong, 2, b"", 0).is_err());
}

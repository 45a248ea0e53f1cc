//! Interrupt handler tests.
//!
//! Signals are delivered to the whole process, so these run in their own test binary.
#![cfg(unix)]

use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use gimbal_lib::supervisor::install_interrupt_handler;

/// Send `signal` to this process with the `kill` utility.
fn raise(signal: &str) {
    let status = Command::new("kill")
        .arg(format!("-{}", signal))
        .arg(std::process::id().to_string())
        .status()
        .unwrap();
    assert!(status.success());
}

/// Wait up to a second for `flag` to be cleared.
fn cleared_within_a_second(flag: &AtomicBool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(1);

    while Instant::now() < deadline {
        if !flag.load(Ordering::SeqCst) {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }

    false
}

#[test]
fn test_sigterm_and_sigint_clear_running() {
    let running = Arc::new(AtomicBool::new(true));
    install_interrupt_handler(running.clone()).unwrap();

    raise("TERM");
    assert!(cleared_within_a_second(&running), "SIGTERM did not clear the running flag");

    running.store(true, Ordering::SeqCst);

    raise("INT");
    assert!(cleared_within_a_second(&running), "SIGINT did not clear the running flag");

    // Only one handler per process
    assert!(install_interrupt_handler(Arc::new(AtomicBool::new(true))).is_err());
}

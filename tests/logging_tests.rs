//! Unit tests for the logging functionality in the `emit-rs` crate.

use emit_rs::logging::{log_debug, log_error, log_info, log_warn, try_init_logger};
use emit_rs::util::logging::log_frame_hex;

/// Tests that the logging helpers do not panic, with or without a logger.
#[test]
fn test_logging() {
    let _ = try_init_logger();
    log_error("This is an error message");
    log_warn("This is a warning message");
    log_info("This is an info message");
    log_debug("This is a debug message");
    log_frame_hex("EMIT 250", &[0xFF; 217]);
}

/// A second initialisation is refused instead of panicking.
#[test]
fn test_try_init_logger_twice() {
    let _ = try_init_logger();
    assert!(!try_init_logger());
}

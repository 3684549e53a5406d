use log::{debug, error, info, log_enabled, warn, Level};

/// Initializes the logger with the `env_logger` crate.
///
/// Honors `RUST_LOG`; the CLI uses `emit_rs=debug` to see every emitted frame.
pub fn init_logger() {
    env_logger::init();
}

/// Initializes the logger, tolerating an already installed logger.
///
/// Useful from tests and from applications that embed the decoders.
pub fn try_init_logger() -> bool {
    env_logger::try_init().is_ok()
}

/// Logs an error message.
pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs a debug message.
pub fn log_debug(message: &str) {
    if log_enabled!(Level::Debug) {
        debug!("{message}");
    }
}

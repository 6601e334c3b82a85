//! Logging setup for the application.

use crate::config::LogLevel;
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `level` is the default filter. If RUST_LOG is set it is respected instead,
/// so individual modules (`shader_exec=trace`) can still be singled out.
/// Calling this more than once is harmless.
pub fn init_logger(level: LogLevel) {
    let env = Env::default().filter_or("RUST_LOG", level.as_str());
    let mut builder = Builder::from_env(env);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized, keeping the existing one");
        return;
    }

    log::debug!(
        "Logger initialized with default level {:?}",
        LevelFilter::from(level)
    );
}

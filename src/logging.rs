/// Logging setup.
///
/// The terminal is in raw alternate-screen mode while playing, so records go
/// to `pacvim.log` in the system temp directory instead of stderr.
/// `RUST_LOG` overrides the default `info` filter.

use std::fs::OpenOptions;
use std::path::PathBuf;

pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("pacvim.log")
}

/// Install the file logger. Safe to call more than once; a log file that
/// cannot be opened leaves logging disabled.
pub fn init() {
    let path = log_path();
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(_) => return,
    };

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis();
    if builder.try_init().is_ok() {
        log::info!("pacvim {} logging to {}", env!("CARGO_PKG_VERSION"), path.display());
    }
}

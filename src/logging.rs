// SPDX-License-Identifier: MIT
//
// Log setup.
//
// The editor owns the whole screen, so log lines can't go to stdout or
// stderr without scribbling over the frame. Logging is off unless
// `KILO_LOG` names a file; then everything at or above the `RUST_LOG`
// filter (default `info`) is appended there.

use std::env;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file.
pub const LOG_FILE_ENV: &str = "KILO_LOG";

/// Install the file logger if `KILO_LOG` is set.
///
/// Runs before the terminal enters raw mode, so a log file that can't be
/// opened, or a logger that can't be installed, is reported on stderr and
/// the editor starts without logging.
pub fn init() {
    let Some(path) = env::var_os(LOG_FILE_ENV) else {
        return;
    };
    if let Err(e) = init_file(Path::new(&path)) {
        eprintln!("{LOG_FILE_ENV}: {}: {e}", Path::new(&path).display());
    }
}

/// Open `path` for appending and install it as the global log sink.
fn init_file(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "kilo starting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_logger_install_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kilo.log");

        init_file(&path).unwrap();
        assert!(path.exists());

        // The global subscriber is already set; the failure must surface.
        assert!(init_file(&path).is_err());
    }

    #[test]
    fn unopenable_log_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("kilo.log");
        assert!(init_file(&path).is_err());
    }
}

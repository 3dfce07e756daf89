// SPDX-License-Identifier: MIT
//
// Error types for terminal operations.
//
// Every fatal condition carries the name of the operation that failed so
// the binary can print a `perror`-style diagnostic (`tcsetattr: Inappropriate
// ioctl for device`) before exiting. Geometry failures get their own enum:
// the fallback protocol has several ways to go wrong that aren't OS errors
// at all (a garbled cursor report, a terminal that never answers).

use std::io;

use thiserror::Error;

/// Terminal substrate error.
#[derive(Error, Debug)]
pub enum Error {
    /// An OS-level call failed. `op` names the call (`tcgetattr`, `read`, ...).
    #[error("{op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// The window size could not be determined by either path.
    #[error("getWindowSize: {0}")]
    Geometry(#[from] GeometryError),
}

impl Error {
    /// Wrap an I/O error with the name of the failing operation.
    #[must_use]
    pub const fn io(op: &'static str, source: io::Error) -> Self {
        Self::Io { op, source }
    }

    /// Wrap `errno` from the last libc call.
    #[must_use]
    pub fn last_os_error(op: &'static str) -> Self {
        Self::io(op, io::Error::last_os_error())
    }
}

/// Why the window geometry resolver gave up.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// Writing the clamp move or the cursor report request failed.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    /// Reading the terminal's reply failed.
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    /// The reply didn't start with `ESC [`.
    #[error("cursor report missing ESC [ prefix")]
    MissingPrefix,

    /// The reply wasn't `<rows>;<cols>`.
    #[error("malformed cursor report")]
    Malformed,

    /// The terminal reported a zero dimension.
    #[error("terminal reported a zero-sized window")]
    ZeroSize,

    /// The reply filled the scratch buffer without a terminating `R`.
    #[error("cursor report exceeded {0} bytes")]
    Overflow(usize),
}

/// Result type for terminal operations.
pub type Result<T> = std::result::Result<T, Error>;

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn io_error_names_operation() {
        let err = Error::io("tcgetattr", io::Error::from_raw_os_error(libc::ENOTTY));
        let msg = err.to_string();
        assert!(msg.starts_with("tcgetattr: "), "got {msg}");
    }

    #[test]
    fn geometry_error_is_prefixed() {
        let err = Error::from(GeometryError::MissingPrefix);
        assert_eq!(err.to_string(), "getWindowSize: cursor report missing ESC [ prefix");
    }

    #[test]
    fn overflow_reports_bound() {
        assert_eq!(
            GeometryError::Overflow(32).to_string(),
            "cursor report exceeded 32 bytes"
        );
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error as _;
        let err = Error::io("read", io::Error::other("boom"));
        assert!(err.source().is_some());
    }
}

// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Window geometry — how big is the screen?
//
// The fast path is ioctl(TIOCGWINSZ). Some environments can't answer it
// (serial consoles, a few emulators, odd pty setups) or answer with zero
// columns, so there's a fallback that asks the terminal itself:
//
//   1. Shove the cursor to the bottom-right corner with CUF/CUD 999. Both
//      clamp at the screen edge, so the cursor lands on the last cell.
//   2. Wait for one keypress and throw it away. Terminals this path was
//      built for need the pause before their reply pipeline settles.
//   3. Send DSR 6 and read the `ESC [ rows ; cols R` reply one byte at a
//      time into a 32-byte scratch buffer, stopping at `R`.
//   4. Parse the two numbers. The cursor's position is the screen size.
//
// Resolver failures are `GeometryError`s; the caller decides they're fatal.

use std::io::{self, Read, Write};

use crate::ansi;
use crate::error::{GeometryError, Result};
use crate::input::read_byte;

/// Capacity of the cursor report scratch buffer.
pub const REPORT_BUF_LEN: usize = 32;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── OS Query ───────────────────────────────────────────────────────────────

/// Query the terminal size via `ioctl(TIOCGWINSZ)` on stdout.
///
/// Returns `None` if the query fails or reports a zero dimension.
#[must_use]
pub fn query_os_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

// ─── Resolver ───────────────────────────────────────────────────────────────

/// Determine the terminal size, falling back to the cursor-report protocol.
///
/// `input` and `output` must be the terminal; the fallback talks to it.
///
/// # Errors
///
/// Returns `getWindowSize` if the fallback fails, or `read` if the throwaway
/// keypress can't be read.
pub fn resolve(input: &mut impl Read, output: &mut impl Write) -> Result<Size> {
    resolve_with(query_os_size(), input, output)
}

/// [`resolve`] with the OS query result supplied by the caller.
///
/// # Errors
///
/// See [`resolve`].
pub fn resolve_with(
    os_size: Option<Size>,
    input: &mut impl Read,
    output: &mut impl Write,
) -> Result<Size> {
    if let Some(size) = os_size {
        tracing::debug!(rows = size.rows, cols = size.cols, "window size from ioctl");
        return Ok(size);
    }

    tracing::debug!("ioctl(TIOCGWINSZ) unavailable, asking the terminal");
    ansi::cursor_to_far_corner(output)
        .and_then(|()| output.flush())
        .map_err(GeometryError::Write)?;
    read_byte(input)?;

    let size = cursor_position(input, output)?;
    tracing::debug!(rows = size.rows, cols = size.cols, "window size from cursor report");
    Ok(size)
}

/// Ask the terminal where the cursor is.
///
/// # Errors
///
/// Returns a [`GeometryError`] if the request can't be written, the reply
/// can't be read, or the reply isn't a well-formed cursor report.
pub fn cursor_position(
    input: &mut impl Read,
    output: &mut impl Write,
) -> std::result::Result<Size, GeometryError> {
    ansi::request_cursor_position(output)
        .and_then(|()| output.flush())
        .map_err(GeometryError::Write)?;

    let mut buf = [0u8; REPORT_BUF_LEN];
    let mut len = 0;
    let mut terminated = false;

    while len < buf.len() {
        let mut byte = [0u8; 1];
        match input.read(&mut byte) {
            Ok(1) => {}
            // Timed out mid-reply: parse what arrived.
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) => return Err(GeometryError::Read(e)),
        }
        if byte[0] == b'R' {
            terminated = true;
            break;
        }
        buf[len] = byte[0];
        len += 1;
    }

    if !terminated && len == buf.len() {
        return Err(GeometryError::Overflow(REPORT_BUF_LEN));
    }

    parse_cursor_report(&buf[..len])
}

/// Parse a cursor position report: `ESC [ <rows> ; <cols>`, with or without
/// the terminating `R`.
///
/// # Errors
///
/// [`GeometryError::MissingPrefix`] without the leading `ESC [`,
/// [`GeometryError::Malformed`] if the numbers aren't there, and
/// [`GeometryError::ZeroSize`] if either is zero.
pub fn parse_cursor_report(report: &[u8]) -> std::result::Result<Size, GeometryError> {
    let body = report
        .strip_prefix(b"\x1b[")
        .ok_or(GeometryError::MissingPrefix)?;
    let body = body.strip_suffix(b"R").unwrap_or(body);

    let mut parts = body.splitn(2, |&b| b == b';');
    let rows = parts.next().and_then(parse_number).ok_or(GeometryError::Malformed)?;
    let cols = parts.next().and_then(parse_number).ok_or(GeometryError::Malformed)?;

    if rows == 0 || cols == 0 {
        return Err(GeometryError::ZeroSize);
    }
    Ok(Size { cols, rows })
}

/// Parse a non-empty run of ASCII digits.
fn parse_number(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

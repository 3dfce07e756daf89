// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit — that's the render loop's job. This module
// just knows the byte-level encoding of every terminal command we need, and
// that's a short list: clear, home, hide/show the cursor, erase to end of
// line, and the two halves of the cursor-position dance used by the geometry
// fallback.
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `AppendBuffer` (backed by a Vec).

use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to row 1, column 1 (CUP with default parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Push the cursor as far right and down as the terminal allows.
///
/// CUF and CUD stop at the screen edge instead of wrapping or scrolling,
/// so a large enough count parks the cursor on the bottom-right cell
/// whatever the real size is. CUP is not used here: out-of-range values
/// are undefined for it.
#[inline]
pub fn cursor_to_far_corner(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999C\x1b[999B")
}

/// Ask the terminal to report the cursor position (DSR 6).
///
/// The reply arrives on stdin as `ESC [ <row> ; <col> R`.
#[inline]
pub fn request_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Erase from the cursor to the end of the line (EL 0).
#[inline]
pub fn erase_line_right(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Move to the start of the next line.
///
/// With output post-processing off, `\n` alone only moves down.
#[inline]
pub fn newline(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\r\n")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Helper: capture a sequence as a string.
    fn capture(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    // ── Cursor ────────────────────────────────────────────────────────

    #[test]
    fn home() {
        assert_eq!(capture(cursor_home), "\x1b[H");
    }

    #[test]
    fn hide_and_show_differ() {
        assert_eq!(capture(cursor_hide), "\x1b[?25l");
        assert_eq!(capture(cursor_show), "\x1b[?25h");
    }

    #[test]
    fn far_corner_moves_forward_then_down() {
        assert_eq!(capture(cursor_to_far_corner), "\x1b[999C\x1b[999B");
    }

    #[test]
    fn cursor_position_request() {
        assert_eq!(capture(request_cursor_position), "\x1b[6n");
    }

    // ── Screen ────────────────────────────────────────────────────────

    #[test]
    fn clear() {
        assert_eq!(capture(clear_screen), "\x1b[2J");
    }

    #[test]
    fn erase_line() {
        assert_eq!(capture(erase_line_right), "\x1b[K");
    }

    #[test]
    fn newline_is_crlf() {
        assert_eq!(capture(newline), "\r\n");
    }

    #[test]
    fn sequences_compose() {
        let s = capture(|w| {
            cursor_hide(w)?;
            cursor_home(w)?;
            erase_line_right(w)
        });
        assert_eq!(s, "\x1b[?25l\x1b[H\x1b[K");
    }
}

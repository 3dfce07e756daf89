// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Output batching.
//
// Two pieces work together so a frame reaches the terminal in one piece:
//
//   AppendBuffer — accumulates every escape sequence and content byte of a
//   frame in memory. The render loop builds the whole frame here, then hands
//   it to a writer exactly once. Issuing dozens of small writes instead lets
//   the terminal draw a half-finished frame between them (tearing).
//
//   TtyOutput — an unbuffered `Write` over fd 1. `io::stdout()` is line
//   buffered and would split a frame at its last newline into two write()
//   calls; this goes straight to write(2).

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

// ─── AppendBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates one frame of output for a single write.
///
/// Created fresh for each frame and consumed by [`flush_to`](Self::flush_to).
/// Growth is exact: each append reserves precisely the bytes it adds. If that
/// allocation fails the append is dropped and the buffer is left untouched;
/// a frame with missing bytes is a cosmetic glitch, an aborted editor is not.
#[derive(Debug, Default)]
pub struct AppendBuffer {
    buf: Vec<u8>,
}

impl AppendBuffer {
    /// Create an empty buffer. Does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append `bytes` to the end of the buffer.
    ///
    /// On allocation failure this is a no-op.
    pub fn append(&mut self, bytes: &[u8]) {
        if self.buf.try_reserve_exact(bytes.len()).is_err() {
            return;
        }
        self.buf.extend_from_slice(bytes);
    }

    /// Append a string's UTF-8 bytes.
    #[inline]
    pub fn append_str(&mut self, s: &str) {
        self.append(s.as_bytes());
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write the whole buffer with one `write_all` and release it.
    ///
    /// The buffer is consumed either way; on error its storage is freed
    /// as the error propagates.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing `w` fails.
    pub fn flush_to(self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
        }
        Ok(())
    }
}

impl Write for AppendBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

// ─── TtyOutput ───────────────────────────────────────────────────────────────

/// Unbuffered writer for stdout's file descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct TtyOutput;

impl Write for TtyOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                buf.as_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Width ───────────────────────────────────────────────────────────────────

/// Longest prefix of `text` that fits in `max_cols` terminal columns.
///
/// Cuts on character boundaries only. For ASCII text the result is simply
/// the first `max_cols` bytes. Zero-width and control characters count as
/// zero columns.
#[must_use]
pub fn truncate_to_width(text: &str, max_cols: usize) -> &str {
    let mut cols = 0;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if cols + w > max_cols {
            return &text[..idx];
        }
        cols += w;
    }
    text
}

/// Display width of `text` in terminal columns.
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.chars().map(|ch| ch.width().unwrap_or(0)).sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // ── AppendBuffer ─────────────────────────────────────────────────

    #[test]
    fn new_buffer_is_empty() {
        let ab = AppendBuffer::new();
        assert!(ab.is_empty());
        assert_eq!(ab.len(), 0);
    }

    #[test]
    fn appends_concatenate_in_order() {
        let pieces: [&[u8]; 4] = [b"\x1b[?25l", b"~", b"", b"\x1b[K\r\n"];
        let mut ab = AppendBuffer::new();
        for p in pieces {
            ab.append(p);
        }
        assert_eq!(ab.as_bytes(), b"\x1b[?25l~\x1b[K\r\n");
        assert_eq!(ab.len(), pieces.iter().map(|p| p.len()).sum::<usize>());
    }

    #[test]
    fn append_grows_exactly() {
        let mut ab = AppendBuffer::new();
        ab.append(b"abc");
        assert_eq!(ab.len(), 3);
        ab.append(b"de");
        assert_eq!(ab.len(), 5);
    }

    #[test]
    fn append_str_is_utf8() {
        let mut ab = AppendBuffer::new();
        ab.append_str("é~");
        assert_eq!(ab.as_bytes(), "é~".as_bytes());
    }

    #[test]
    fn write_trait_appends() {
        let mut ab = AppendBuffer::new();
        write!(ab, "{};{}", 24, 80).unwrap();
        assert_eq!(ab.as_bytes(), b"24;80");
    }

    #[test]
    fn flush_to_writes_everything_once() {
        /// Counts write() calls.
        struct Counting {
            calls: usize,
            out: Vec<u8>,
        }
        impl Write for Counting {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.calls += 1;
                self.out.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut ab = AppendBuffer::new();
        ab.append(b"\x1b[H");
        ab.append(b"~\x1b[K\r\n~\x1b[K");
        let mut sink = Counting { calls: 0, out: Vec::new() };
        ab.flush_to(&mut sink).unwrap();
        assert_eq!(sink.calls, 1);
        assert_eq!(sink.out, b"\x1b[H~\x1b[K\r\n~\x1b[K");
    }

    #[test]
    fn flush_empty_writes_nothing() {
        let mut out = Vec::new();
        AppendBuffer::new().flush_to(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn flush_error_propagates() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let mut ab = AppendBuffer::new();
        ab.append(b"x");
        assert!(ab.flush_to(&mut Broken).is_err());
    }

    // ── Width ────────────────────────────────────────────────────────

    #[test]
    fn truncate_ascii_is_bytewise() {
        assert_eq!(truncate_to_width("Kilo editor", 4), "Kilo");
    }

    #[test]
    fn truncate_shorter_text_is_unchanged() {
        assert_eq!(truncate_to_width("hi", 10), "hi");
    }

    #[test]
    fn truncate_to_zero() {
        assert_eq!(truncate_to_width("hi", 0), "");
    }

    #[test]
    fn truncate_never_splits_wide_char() {
        // Each CJK character is two columns wide.
        assert_eq!(truncate_to_width("漢字", 3), "漢");
    }

    #[test]
    fn width_of_mixed_text() {
        assert_eq!(display_width("a漢"), 3);
    }
}

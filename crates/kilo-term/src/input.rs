// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Key reader — one byte at a time from a raw-mode terminal.
//
// With VMIN=0 and VTIME=1, read() on the terminal returns after a tenth of a
// second whether or not a key arrived. A zero-byte read is therefore the
// normal "nothing yet" outcome, and so is EAGAIN on some platforms; both are
// retried. Anything else means stdin is gone and the editor can't continue.
//
// The byte is decoded into a `Key` using the legacy terminal encoding:
// Ctrl+letter arrives as the letter's value masked to its low five bits,
// so Ctrl-Q is 0x11. Multi-byte sequences (arrows, UTF-8) aren't assembled
// here; each byte is its own key.

use std::io::{self, Read};

use bitflags::bitflags;

use crate::error::{Error, Result};

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
    /// The raw byte as read from the terminal.
    pub byte: u8,
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable ASCII character, or the letter of a Ctrl chord.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    /// Anything else (high bytes, fragments of multi-byte input).
    Byte(u8),
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// A single legacy-encoded byte can only carry Ctrl.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const CTRL = 0b0000_0100;
    }
}

/// The byte a terminal sends for Ctrl + `c`.
///
/// ```
/// assert_eq!(kilo_term::input::ctrl(b'q'), 0x11);
/// ```
#[inline]
#[must_use]
pub const fn ctrl(c: u8) -> u8 {
    c & 0x1f
}

impl Key {
    /// Decode a single input byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        let (code, modifiers) = match byte {
            b'\r' => (KeyCode::Enter, Modifiers::empty()),
            b'\t' => (KeyCode::Tab, Modifiers::empty()),
            0x1B => (KeyCode::Escape, Modifiers::empty()),
            0x7F => (KeyCode::Backspace, Modifiers::empty()),
            0x00 => (KeyCode::Char('@'), Modifiers::CTRL),
            b @ 0x01..=0x1A => (KeyCode::Char((b + b'a' - 1) as char), Modifiers::CTRL),
            b @ 0x20..=0x7E => (KeyCode::Char(b as char), Modifiers::empty()),
            b => (KeyCode::Byte(b), Modifiers::empty()),
        };
        Self { code, modifiers, byte }
    }

    /// Whether this is Ctrl + `letter` (lowercase ASCII).
    #[must_use]
    pub const fn is_ctrl(&self, letter: u8) -> bool {
        self.byte == ctrl(letter) && self.modifiers.contains(Modifiers::CTRL)
    }
}

// ─── Reading ────────────────────────────────────────────────────────────────

/// Read exactly one byte, waiting through read timeouts.
///
/// Zero-byte reads and `WouldBlock` are retried; they're how a raw-mode
/// terminal says "no key yet".
///
/// # Errors
///
/// Returns `read` with the OS error for any other failure.
pub fn read_byte(input: &mut impl Read) -> Result<u8> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(1) => return Ok(byte[0]),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(Error::io("read", e)),
        }
    }
}

/// Read and decode one keypress.
///
/// # Errors
///
/// See [`read_byte`].
pub fn read_key(input: &mut impl Read) -> Result<Key> {
    read_byte(input).map(Key::from_byte)
}

// ─── TtyInput ───────────────────────────────────────────────────────────────

/// Unbuffered reader for stdin's file descriptor.
///
/// `io::stdin()` buffers, which would swallow the bytes of a cursor report
/// into a buffer the geometry resolver then reads from a different handle.
/// Every read here is one read(2).
#[derive(Debug, Default, Clone, Copy)]
pub struct TtyInput;

impl Read for TtyInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }
}

// ─── Test Support ───────────────────────────────────────────────────────────

/// Scripted reader: replays a list of read outcomes, then reports EOF
/// as an error so a runaway loop fails instead of spinning.
#[cfg(test)]
pub(crate) mod script {
    use std::collections::VecDeque;
    use std::io::{self, Read};

    pub enum Step {
        /// Deliver these bytes (one read call may take only part).
        Bytes(&'static [u8]),
        /// A read that times out with zero bytes.
        Timeout,
        /// A read that fails with this kind.
        Fail(io::ErrorKind),
    }

    pub struct Script {
        steps: VecDeque<Step>,
        pub reads: usize,
    }

    impl Script {
        pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
            Self {
                steps: steps.into_iter().collect(),
                reads: 0,
            }
        }
    }

    impl Read for Script {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            match self.steps.pop_front() {
                Some(Step::Bytes(bytes)) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    if n < bytes.len() {
                        self.steps.push_front(Step::Bytes(&bytes[n..]));
                    }
                    Ok(n)
                }
                Some(Step::Timeout) => Ok(0),
                Some(Step::Fail(kind)) => Err(io::Error::from(kind)),
                None => Err(io::Error::from(io::ErrorKind::UnexpectedEof)),
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::script::{Script, Step};
    use super::*;

    fn key(code: KeyCode, modifiers: Modifiers, byte: u8) -> Key {
        Key { code, modifiers, byte }
    }

    // ── Decoding ──────────────────────────────────────────────────────

    #[test]
    fn ctrl_q_is_0x11() {
        assert_eq!(ctrl(b'q'), 0x11);
        assert_eq!(
            Key::from_byte(0x11),
            key(KeyCode::Char('q'), Modifiers::CTRL, 0x11)
        );
    }

    #[test]
    fn ctrl_ignores_case() {
        assert_eq!(ctrl(b'Q'), ctrl(b'q'));
    }

    #[test]
    fn printable_ascii() {
        assert_eq!(Key::from_byte(b'q'), key(KeyCode::Char('q'), Modifiers::empty(), b'q'));
        assert_eq!(Key::from_byte(b'~'), key(KeyCode::Char('~'), Modifiers::empty(), b'~'));
    }

    #[test]
    fn named_keys() {
        assert_eq!(Key::from_byte(b'\r').code, KeyCode::Enter);
        assert_eq!(Key::from_byte(b'\t').code, KeyCode::Tab);
        assert_eq!(Key::from_byte(0x1B).code, KeyCode::Escape);
        assert_eq!(Key::from_byte(0x7F).code, KeyCode::Backspace);
    }

    #[test]
    fn ctrl_at_is_nul() {
        assert_eq!(Key::from_byte(0), key(KeyCode::Char('@'), Modifiers::CTRL, 0));
    }

    #[test]
    fn only_ctrl_is_ever_decoded() {
        assert_eq!(Modifiers::all(), Modifiers::CTRL);
        for byte in 0..=u8::MAX {
            let mods = Key::from_byte(byte).modifiers;
            assert!(mods.is_empty() || mods == Modifiers::CTRL, "byte {byte:#04x}");
        }
    }

    #[test]
    fn high_byte_is_raw() {
        assert_eq!(Key::from_byte(0xC3).code, KeyCode::Byte(0xC3));
    }

    #[test]
    fn is_ctrl_matches_only_the_chord() {
        assert!(Key::from_byte(0x11).is_ctrl(b'q'));
        assert!(!Key::from_byte(b'q').is_ctrl(b'q'));
        assert!(!Key::from_byte(0x13).is_ctrl(b'q'));
    }

    // ── Reading ───────────────────────────────────────────────────────

    #[test]
    fn reads_single_byte() {
        let mut input = Script::new([Step::Bytes(b"a")]);
        assert_eq!(read_byte(&mut input).unwrap(), b'a');
    }

    #[test]
    fn retries_through_timeouts() {
        let mut input = Script::new([Step::Timeout, Step::Timeout, Step::Bytes(b"x")]);
        assert_eq!(read_byte(&mut input).unwrap(), b'x');
        assert_eq!(input.reads, 3);
    }

    #[test]
    fn retries_through_would_block() {
        let mut input = Script::new([Step::Fail(io::ErrorKind::WouldBlock), Step::Bytes(b"x")]);
        assert_eq!(read_byte(&mut input).unwrap(), b'x');
    }

    #[test]
    fn other_errors_are_fatal() {
        let mut input = Script::new([Step::Fail(io::ErrorKind::BrokenPipe)]);
        let err = read_byte(&mut input).unwrap_err();
        assert!(err.to_string().starts_with("read: "));
    }

    #[test]
    fn takes_one_byte_per_call() {
        let mut input = Script::new([Step::Bytes(b"ab")]);
        assert_eq!(read_byte(&mut input).unwrap(), b'a');
        assert_eq!(read_byte(&mut input).unwrap(), b'b');
    }

    #[test]
    fn read_key_decodes() {
        let mut input = Script::new([Step::Timeout, Step::Bytes(b"\x11")]);
        assert!(read_key(&mut input).unwrap().is_ctrl(b'q'));
    }
}

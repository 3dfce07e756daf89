// SPDX-License-Identifier: MIT
//
// Raw mode session — termios capture, raw attributes, RAII restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr) and isatty. These are the standard POSIX interfaces for
// terminal control — there is no safe alternative. Each unsafe block is
// minimal.
#![allow(unsafe_code)]
//
// `RawMode::enable` captures the terminal's attributes once, derives the raw
// set from that snapshot, and installs it. The snapshot is never touched
// again; restoring means writing it back verbatim. Three paths lead back to
// cooked mode and each runs at most once:
//
//   - `disable()` — the normal quit path. Errors surface to the caller,
//     because a shell left in raw mode is worth an exit code of 1.
//   - `Drop` — early returns and propagated errors. Can't report, so it logs.
//   - the panic hook — reads a process-wide copy of the snapshot, since it
//     can't reach the `RawMode` value.
//
// The device is a trait so the whole lifecycle can be exercised in tests
// against an in-memory termios instead of a real TTY.

use std::sync::{Mutex, Once};

use crate::error::{Error, Result};

/// The terminal attribute record (`struct termios`).
pub type Termios = libc::termios;

// ─── Attribute Device ───────────────────────────────────────────────────────

/// Something with termios attributes that can be read and replaced.
pub trait AttrDevice {
    /// Read the current attributes (`tcgetattr`).
    ///
    /// # Errors
    ///
    /// Returns an error if the attributes cannot be read.
    fn get_attrs(&self) -> Result<Termios>;

    /// Replace the attributes, discarding unread input (`tcsetattr` with
    /// `TCSAFLUSH`).
    ///
    /// # Errors
    ///
    /// Returns an error if the attributes cannot be applied.
    fn set_attrs(&self, attrs: &Termios) -> Result<()>;
}

/// The controlling terminal, addressed through stdin's file descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinDevice;

impl AttrDevice for StdinDevice {
    fn get_attrs(&self) -> Result<Termios> {
        let mut termios: Termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) } != 0 {
            return Err(Error::last_os_error("tcgetattr"));
        }
        Ok(termios)
    }

    fn set_attrs(&self, attrs: &Termios) -> Result<()> {
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, attrs) } != 0 {
            return Err(Error::last_os_error("tcsetattr"));
        }
        Ok(())
    }
}

/// Check whether stdin is connected to a terminal (TTY).
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

// ─── Raw Attributes ─────────────────────────────────────────────────────────

/// Derive the raw-mode attribute set from `original`.
///
/// - input: no break signals, CR→NL translation, parity check, 8th-bit
///   stripping, or XON/XOFF flow control
/// - output: no post-processing (`\n` is not expanded to `\r\n`)
/// - control: 8-bit characters
/// - local: no echo, line buffering, Ctrl-C/Ctrl-Z signals, or Ctrl-V
/// - `VMIN = 0`, `VTIME = timeout_ds`: `read()` returns after at most
///   `timeout_ds` tenths of a second, with zero bytes if nothing arrived
#[must_use]
pub fn raw_attrs(original: &Termios, timeout_ds: u8) -> Termios {
    let mut raw = *original;
    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag &= !libc::CSIZE;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = timeout_ds;
    raw
}

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// Process-wide copy of the original termios for the panic hook.
///
/// Only the real terminal session registers here (see
/// [`install_panic_restore`]); test sessions over fake devices don't.
static TERMIOS_BACKUP: Mutex<Option<Termios>> = Mutex::new(None);

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Restore termios from the global backup. Best-effort, ignores errors.
fn restore_termios_from_backup() {
    if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
        if let Some(original) = guard.take() {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original);
            }
        }
    }
}

/// Register `original` for restoration if the process panics.
///
/// The hook restores the terminal, then delegates to the previous panic
/// handler so the message prints to a cooked terminal.
pub fn install_panic_restore(original: Termios) {
    if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
        *guard = Some(original);
    }

    PANIC_HOOK_INSTALLED.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_termios_from_backup();
            previous(info);
        }));
    });
}

/// Forget the panic backup once the terminal has been restored normally.
fn clear_panic_restore() {
    if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
        *guard = None;
    }
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// An active raw mode session.
///
/// Holding a `RawMode` means the device is in raw mode. Dropping it (or
/// calling [`disable`](Self::disable)) puts the original attributes back.
///
/// # Example
///
/// ```no_run
/// use kilo_term::terminal::{RawMode, StdinDevice};
///
/// let mut session = RawMode::enable(StdinDevice, 1)?;
/// // ... read keys, render frames ...
/// session.disable()?;
/// # Ok::<(), kilo_term::Error>(())
/// ```
pub struct RawMode<D: AttrDevice = StdinDevice> {
    device: D,
    /// Attributes captured before entering raw mode. Never modified.
    original: Termios,
    active: bool,
}

impl<D: AttrDevice> RawMode<D> {
    /// Capture the device's attributes and switch it to raw mode.
    ///
    /// `timeout_ds` is the read timeout in tenths of a second.
    ///
    /// # Errors
    ///
    /// Returns `tcgetattr` if the attributes can't be read and `tcsetattr`
    /// if the raw set can't be applied. In the latter case the device is
    /// left as it was.
    pub fn enable(device: D, timeout_ds: u8) -> Result<Self> {
        let original = device.get_attrs()?;

        // From here on, Drop restores `original`.
        let mut session = Self {
            device,
            original,
            active: true,
        };

        let raw = raw_attrs(&session.original, timeout_ds);
        if let Err(e) = session.device.set_attrs(&raw) {
            session.active = false;
            return Err(e);
        }

        tracing::debug!(timeout_ds, "terminal entered raw mode");
        Ok(session)
    }

    /// Restore the original attributes.
    ///
    /// Idempotent: calling `disable()` after a successful restore is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `tcsetattr` if the original attributes can't be applied. The
    /// session stays active so `Drop` gets one more try.
    pub fn disable(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.device.set_attrs(&self.original)?;
        self.active = false;
        clear_panic_restore();
        tracing::debug!("terminal restored to original mode");
        Ok(())
    }

    /// Whether raw mode is still in effect.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The attributes captured before raw mode was entered.
    #[inline]
    #[must_use]
    pub const fn original(&self) -> &Termios {
        &self.original
    }
}

impl<D: AttrDevice> Drop for RawMode<D> {
    fn drop(&mut self) {
        if let Err(e) = self.disable() {
            tracing::warn!(error = %e, "failed to restore terminal attributes on drop");
        }
    }
}

// ─── Test Support ───────────────────────────────────────────────────────────

/// In-memory termios for exercising sessions without a TTY.
///
/// Available to downstream tests through the `test-util` feature.
#[cfg(any(test, feature = "test-util"))]
pub mod fake {
    use std::cell::{Cell, RefCell};

    use super::{AttrDevice, Termios};
    use crate::error::{Error, Result};

    /// A device whose attributes live in memory.
    pub struct FakeDevice {
        pub attrs: RefCell<Termios>,
        pub fail_get: bool,
        /// Fail this many upcoming `set_attrs` calls.
        pub fail_sets: Cell<u32>,
        pub set_calls: Cell<u32>,
    }

    impl FakeDevice {
        /// A device in a typical cooked configuration.
        #[must_use]
        pub fn cooked() -> Self {
            let mut t: Termios = unsafe { std::mem::zeroed() };
            t.c_iflag = libc::BRKINT | libc::ICRNL | libc::IXON | libc::IXANY;
            t.c_oflag = libc::OPOST | libc::ONLCR;
            t.c_cflag = libc::CS7 | libc::CREAD | libc::PARENB;
            t.c_lflag = libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN | libc::ECHOE;
            t.c_cc[libc::VMIN] = 1;
            t.c_cc[libc::VTIME] = 0;
            Self {
                attrs: RefCell::new(t),
                fail_get: false,
                fail_sets: Cell::new(0),
                set_calls: Cell::new(0),
            }
        }

        /// The attributes currently applied.
        #[must_use]
        pub fn current(&self) -> Termios {
            *self.attrs.borrow()
        }
    }

    impl AttrDevice for &FakeDevice {
        fn get_attrs(&self) -> Result<Termios> {
            if self.fail_get {
                return Err(Error::io("tcgetattr", std::io::Error::from_raw_os_error(libc::ENOTTY)));
            }
            Ok(self.current())
        }

        fn set_attrs(&self, attrs: &Termios) -> Result<()> {
            self.set_calls.set(self.set_calls.get() + 1);
            if self.fail_sets.get() > 0 {
                self.fail_sets.set(self.fail_sets.get() - 1);
                return Err(Error::io("tcsetattr", std::io::Error::from_raw_os_error(libc::EIO)));
            }
            *self.attrs.borrow_mut() = *attrs;
            Ok(())
        }
    }

    /// Field-by-field termios equality (libc doesn't derive `PartialEq`
    /// without its `extra_traits` feature).
    #[must_use]
    pub fn same_attrs(a: &Termios, b: &Termios) -> bool {
        a.c_iflag == b.c_iflag
            && a.c_oflag == b.c_oflag
            && a.c_cflag == b.c_cflag
            && a.c_lflag == b.c_lflag
            && a.c_cc == b.c_cc
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

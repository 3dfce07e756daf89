// SPDX-License-Identifier: MIT
//
// Event loop — render, read, dispatch, repeat.
//
// This is the module that wires everything together. Each turn of the loop:
//
//   1. Builds a complete frame in a fresh AppendBuffer: hide the cursor,
//      home it, let the application paint its rows, home it again, show it.
//   2. Flushes the frame with one write and drops the buffer.
//   3. Blocks (a tenth of a second at a time) for one key.
//   4. Hands the key to the application, which says continue or quit.
//
// Quitting clears the screen, homes the cursor, and restores the terminal
// before `run` returns, so the caller only has to exit. Every error
// propagates out of `run`; the raw mode session inside the loop restores
// the terminal when the loop is dropped.
//
// The loop owns the whole editor environment (terminal session, geometry,
// and I/O handles), built once at startup and never shared.

use std::io::{Read, Write};

use crate::ansi;
use crate::error::{Error, Result};
use crate::geometry::{self, Size};
use crate::input::{Key, TtyInput, read_key};
use crate::output::{AppendBuffer, TtyOutput};
use crate::terminal::{self, AttrDevice, RawMode, StdinDevice};

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Only [`paint`](App::paint) is required.
pub trait App {
    /// Paint every screen row into `frame`.
    ///
    /// The cursor is already hidden and at the top-left corner. Paint
    /// `size.rows` rows separated by `\r\n`, with no newline after the last
    /// one (it would scroll the screen).
    fn paint(&mut self, frame: &mut AppendBuffer, size: Size);

    /// Handle one keypress.
    ///
    /// Return [`Action::Quit`] to exit the event loop.
    fn on_key(&mut self, _key: Key) -> Action {
        Action::Continue
    }
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

/// Configuration for the event loop timing.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// How long one read waits for a key, in tenths of a second.
    ///
    /// This bounds how long the loop sits in `read()` before trying
    /// again. Default: 1 (100 ms).
    pub read_timeout_ds: u8,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { read_timeout_ds: 1 }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the raw mode session, the screen geometry, and the terminal I/O
/// handles. Call [`run`](Self::run) to enter the loop; it returns when
/// the application signals [`Action::Quit`].
///
/// # Example
///
/// ```no_run
/// use kilo_term::event_loop::{Action, App, EventLoop};
/// use kilo_term::geometry::Size;
/// use kilo_term::input::Key;
/// use kilo_term::output::AppendBuffer;
///
/// struct Tildes;
///
/// impl App for Tildes {
///     fn paint(&mut self, frame: &mut AppendBuffer, size: Size) {
///         for y in 0..size.rows {
///             frame.append(b"~\x1b[K");
///             if y + 1 < size.rows {
///                 frame.append(b"\r\n");
///             }
///         }
///     }
///
///     fn on_key(&mut self, key: Key) -> Action {
///         if key.is_ctrl(b'q') { Action::Quit } else { Action::Continue }
///     }
/// }
///
/// let mut event_loop = EventLoop::new()?;
/// event_loop.run(&mut Tildes)?;
/// # Ok::<(), kilo_term::Error>(())
/// ```
pub struct EventLoop<D: AttrDevice = StdinDevice, I = TtyInput, O = TtyOutput> {
    session: RawMode<D>,
    input: I,
    output: O,
    size: Size,
}

impl EventLoop {
    /// Set up the controlling terminal with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode can't be entered or the window size
    /// can't be determined.
    pub fn new() -> Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// Set up the controlling terminal: enter raw mode, then resolve the
    /// window geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode can't be entered or the window size
    /// can't be determined. The terminal is restored before returning.
    pub fn with_config(config: LoopConfig) -> Result<Self> {
        if !terminal::is_tty() {
            tracing::warn!("stdin is not a terminal");
        }
        let session = RawMode::enable(StdinDevice, config.read_timeout_ds)?;
        terminal::install_panic_restore(*session.original());

        let mut input = TtyInput;
        let mut output = TtyOutput;
        let size = geometry::resolve(&mut input, &mut output)?;
        tracing::info!(rows = size.rows, cols = size.cols, "terminal ready");

        Ok(Self::from_parts(session, input, output, size))
    }
}

impl<D: AttrDevice, I: Read, O: Write> EventLoop<D, I, O> {
    /// Assemble a loop from an already-established session.
    #[must_use]
    pub const fn from_parts(session: RawMode<D>, input: I, output: O, size: Size) -> Self {
        Self {
            session,
            input,
            output,
            size,
        }
    }

    /// The screen geometry.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// The raw mode session.
    #[inline]
    #[must_use]
    pub const fn session(&self) -> &RawMode<D> {
        &self.session
    }

    /// The output handle.
    #[inline]
    #[must_use]
    pub const fn output(&self) -> &O {
        &self.output
    }

    /// Run the loop until the application returns [`Action::Quit`].
    ///
    /// # Errors
    ///
    /// Returns an error if a frame can't be written, a key can't be read,
    /// or the terminal can't be restored on quit.
    pub fn run(&mut self, app: &mut impl App) -> Result<()> {
        loop {
            self.render_frame(app)?;

            let key = read_key(&mut self.input)?;
            tracing::trace!(byte = key.byte, "key");

            if app.on_key(key) == Action::Quit {
                return self.quit();
            }
        }
    }

    /// Compose one full frame and write it in a single call.
    ///
    /// # Errors
    ///
    /// Returns `write` if the frame can't be written.
    pub fn render_frame(&mut self, app: &mut impl App) -> Result<()> {
        let frame = compose_frame(app, self.size);
        frame
            .flush_to(&mut self.output)
            .map_err(|e| Error::io("write", e))
    }

    /// Clear the screen and put the terminal back.
    fn quit(&mut self) -> Result<()> {
        tracing::debug!("quit requested");
        ansi::clear_screen(&mut self.output)
            .and_then(|()| ansi::cursor_home(&mut self.output))
            .and_then(|()| self.output.flush())
            .map_err(|e| Error::io("write", e))?;
        self.session.disable()
    }
}

/// Build a frame: hide, home, the application's rows, home, show.
///
/// The cursor is parked top-left and made visible again at the end of every
/// frame, so the terminal never shows it jumping through the rows.
pub fn compose_frame(app: &mut impl App, size: Size) -> AppendBuffer {
    let mut frame = AppendBuffer::new();
    // Writes into an AppendBuffer can't fail.
    let _ = ansi::cursor_hide(&mut frame).and_then(|()| ansi::cursor_home(&mut frame));
    app.paint(&mut frame, size);
    let _ = ansi::cursor_home(&mut frame).and_then(|()| ansi::cursor_show(&mut frame));
    frame
}

// ─── Tests ───────────────────────────────────────────────────────────────────

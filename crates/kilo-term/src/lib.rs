// SPDX-License-Identifier: MIT
//
// kilo-term — Terminal substrate for kilo.
//
// Everything the editor needs from the terminal and nothing more: a raw
// mode session that always puts the user's shell back the way it found it,
// window geometry discovery (with the cursor-report fallback for terminals
// that won't answer TIOCGWINSZ), a byte buffer that turns a whole frame into
// one write(), and a render/read/dispatch loop that ties them together.
//
// No TUI framework underneath. termios, ioctl, and a handful of VT100
// escape sequences are the whole stack.

#[cfg(not(unix))]
compile_error!("kilo-term needs a POSIX terminal (termios); only unix targets are supported");

pub mod ansi;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod input;
pub mod output;
pub mod terminal;

pub use error::{Error, GeometryError, Result};

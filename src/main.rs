// SPDX-License-Identifier: MIT
//
// kilo — a small terminal text editor.
//
// This is the main binary. kilo-term does the terminal work; this file
// wires it to the editor and owns the process-level policy:
//
//   setup   → log file (optional), raw mode, window size
//   loop    → render frame → read key → dispatch, until Ctrl-Q
//   exit    → 0 on quit; on any error, clear the screen, print
//             `<operation>: <reason>` to stderr, and exit 1
//
// The terminal is always restored before `process::exit` runs: the event
// loop (and the raw mode session inside it) is dropped when `run` returns.

mod config;
mod editor;
mod logging;

use std::process;

use kilo_term::ansi;
use kilo_term::event_loop::{EventLoop, LoopConfig};
use kilo_term::output::TtyOutput;

use crate::config::Config;
use crate::editor::Editor;

fn main() {
    logging::init();

    let result = run();
    if let Err(ref e) = result {
        die(e);
    }
    process::exit(exit_code(&result));
}

/// Set up the terminal and run the editor until it quits.
fn run() -> kilo_term::Result<()> {
    let mut event_loop = EventLoop::with_config(LoopConfig::default())?;
    let mut editor = Editor::new(Config::default());
    event_loop.run(&mut editor)
}

/// Process exit status for the editor's outcome.
const fn exit_code(result: &kilo_term::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Report a fatal error.
///
/// Clears the screen first (best effort) so the message isn't lost
/// under a half-drawn frame.
fn die(err: &kilo_term::Error) {
    let mut out = TtyOutput;
    let _ = ansi::clear_screen(&mut out).and_then(|()| ansi::cursor_home(&mut out));

    tracing::error!(error = %err, "fatal");
    eprintln!("{err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_exits_zero() {
        assert_eq!(exit_code(&Ok(())), 0);
    }

    #[test]
    fn errors_exit_one() {
        let err = kilo_term::Error::from(kilo_term::GeometryError::Malformed);
        assert_eq!(exit_code(&Err(err)), 1);
    }
}

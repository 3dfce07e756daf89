// SPDX-License-Identifier: MIT
//
// kilo-term demo — a live key viewer on top of the bare substrate.
//
// Raw mode, geometry, one write per frame, and the render/read/dispatch
// loop, with no editor on top. Every keypress is logged to the screen with
// its raw byte and decoded form. Ctrl-Q to quit.
//
// Usage:
//   cargo run -p kilo-term --example demo

use std::collections::VecDeque;
use std::process;

use kilo_term::ansi;
use kilo_term::event_loop::{Action, App, EventLoop};
use kilo_term::geometry::Size;
use kilo_term::input::{Key, KeyCode, Modifiers};
use kilo_term::output::{AppendBuffer, truncate_to_width};

/// Maximum number of keys to keep in the scrolling log.
const MAX_LOG_ENTRIES: usize = 100;

/// The demo application state.
struct Demo {
    /// Rolling log of key descriptions, newest last.
    log: VecDeque<String>,
    /// Total keys received.
    key_count: u64,
}

impl Demo {
    fn new() -> Self {
        Self {
            log: VecDeque::with_capacity(MAX_LOG_ENTRIES),
            key_count: 0,
        }
    }

    fn push_log(&mut self, msg: String) {
        if self.log.len() >= MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
        self.log.push_back(msg);
    }
}

/// Format a key as a readable string.
fn format_key(key: Key) -> String {
    let name = match key.code {
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Char(c) => format!("'{c}'"),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Backspace => "Backspace".into(),
        KeyCode::Escape => "Escape".into(),
        KeyCode::Byte(b) => format!("byte {b}"),
    };
    if key.modifiers.contains(Modifiers::CTRL) {
        format!("0x{:02x}  Ctrl+{name}", key.byte)
    } else {
        format!("0x{:02x}  {name}", key.byte)
    }
}

impl App for Demo {
    fn on_key(&mut self, key: Key) -> Action {
        if key.is_ctrl(b'q') {
            return Action::Quit;
        }
        self.key_count += 1;
        self.push_log(format_key(key));
        Action::Continue
    }

    fn paint(&mut self, frame: &mut AppendBuffer, size: Size) {
        let cols = usize::from(size.cols);
        let rows = usize::from(size.rows);

        let header = format!(
            "kilo-term demo  {}x{}  {} keys  (Ctrl-Q quits)",
            size.cols, size.rows, self.key_count
        );
        let visible = rows.saturating_sub(1);
        let skip = self.log.len().saturating_sub(visible);

        for y in 0..rows {
            let line = if y == 0 {
                header.as_str()
            } else {
                self.log.get(skip + y - 1).map_or("~", String::as_str)
            };
            frame.append_str(truncate_to_width(line, cols));
            let _ = ansi::erase_line_right(frame);
            if y + 1 < rows {
                let _ = ansi::newline(frame);
            }
        }
    }
}

fn main() {
    let result = EventLoop::new().and_then(|mut event_loop| event_loop.run(&mut Demo::new()));
    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1);
    }
}

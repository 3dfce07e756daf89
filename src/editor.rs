// SPDX-License-Identifier: MIT
//
// The editor application.
//
// For now the screen is an empty document: a column of `~` markers down
// the left edge, like vi past the end of a file, and a centered welcome
// banner a third of the way down. Ctrl-Q quits. Every other key is ignored;
// this is where editing commands will attach.

use kilo_term::ansi;
use kilo_term::event_loop::{Action, App};
use kilo_term::geometry::Size;
use kilo_term::input::{Key, ctrl};
use kilo_term::output::{AppendBuffer, display_width, truncate_to_width};

use crate::config::Config;

/// Editor state.
pub struct Editor {
    config: Config,
}

impl Editor {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Paint every row: tildes, with the banner on row `rows / 3`.
    fn draw_rows(&self, frame: &mut AppendBuffer, size: Size) {
        let banner_row = size.rows / 3;
        for y in 0..size.rows {
            if y == banner_row {
                self.draw_welcome(frame, usize::from(size.cols));
            } else {
                frame.append(b"~");
            }

            // Writes into an AppendBuffer can't fail.
            let _ = ansi::erase_line_right(frame);
            if y + 1 < size.rows {
                let _ = ansi::newline(frame);
            }
        }
    }

    /// The banner, clipped to the screen width and centered. When there's
    /// room to pad, the row keeps its `~` marker in the first column.
    fn draw_welcome(&self, frame: &mut AppendBuffer, cols: usize) {
        let banner = self.config.banner();
        let text = truncate_to_width(&banner, cols);

        let mut padding = (cols - display_width(text)) / 2;
        if padding > 0 {
            frame.append(b"~");
            padding -= 1;
        }
        frame.append_str(&" ".repeat(padding));
        frame.append_str(text);
    }
}

impl App for Editor {
    fn paint(&mut self, frame: &mut AppendBuffer, size: Size) {
        self.draw_rows(frame, size);
    }

    fn on_key(&mut self, key: Key) -> Action {
        if key.byte == ctrl(self.config.quit_key) {
            return Action::Quit;
        }
        Action::Continue
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: MIT
//
// Editor configuration.
//
// Compile-time defaults only; there are no flags or config files yet.

/// Editor-level settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Name shown in the welcome banner.
    pub name: &'static str,
    /// Version shown in the welcome banner.
    pub version: &'static str,
    /// Letter that, with Ctrl held, quits the editor.
    pub quit_key: u8,
}

impl Config {
    /// The welcome banner: `"<name> -- version <version>"`.
    #[must_use]
    pub fn banner(&self) -> String {
        format!("{} -- version {}", self.name, self.version)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "Kilo editor",
            version: env!("CARGO_PKG_VERSION"),
            quit_key: b'q',
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_banner() {
        assert_eq!(Config::default().banner(), "Kilo editor -- version 0.0.1");
    }

    #[test]
    fn default_quit_is_q() {
        assert_eq!(Config::default().quit_key, b'q');
    }
}

//! Process-wide settings for snapshot sessions.
//!
//! The environment is consulted once per process by [`Config::global`]; every [`Snapshot`]
//! carries its own copy so the comparison logic never reads global state.
//!
//! [`Snapshot`]: crate::Snapshot

use once_cell::sync::Lazy;

/// Environment variable whose presence turns on in-place snapshot updates.
pub const UPDATE_ENV: &str = "SNAP_UPDATE";

/// Environment variable whose presence disables coloured diffs.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

static GLOBAL: Lazy<Config> = Lazy::new(Config::from_env);

/// Settings threaded into each snapshot at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Rewrite mismatching literals in source.
    pub update: bool,
    /// Render diffs with ANSI colours.
    pub color: bool,
}

impl Config {
    /// Read the settings from the current environment.
    ///
    /// `SNAP_UPDATE` is a presence check: `SNAP_UPDATE=0` still enables updates.
    pub fn from_env() -> Self {
        Self {
            update: std::env::var_os(UPDATE_ENV).is_some(),
            color: std::env::var_os(NO_COLOR_ENV).is_none() && atty::is(atty::Stream::Stderr),
        }
    }

    /// The settings read the first time any snapshot in this process asked for them.
    pub fn global() -> Self {
        *GLOBAL
    }

    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

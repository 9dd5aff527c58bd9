//! Logging setup.
//!
//! Libraries log through the `log` facade; the binary installs
//! `env_logger` with a level picked from the `-v` count. `RUST_LOG`, when
//! set, overrides the flag.

use log::LevelFilter;

/// Verbosity level chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings and errors only
    Normal,
    /// Progress messages (-v flag)
    Verbose,
    /// Per-request detail (-vv flag)
    Debug,
}

impl Verbosity {
    /// Create verbosity from CLI flag count.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }

    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Normal => LevelFilter::Warn,
            Verbosity::Verbose => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
        }
    }
}

/// Install the global logger. Logs go to stderr so stdout stays pure data.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbosity: Verbosity) {
    let _ = env_logger::Builder::new()
        .filter_level(verbosity.level_filter())
        .parse_default_env()
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();
}

//! Logger initialisation for the binary
//!
//! Log records go to stderr so stdout stays reserved for command output
//! (including the secret channel in [`crate::output`]). Key material must
//! never be passed to a log macro.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Map the repeated `-v` flag onto a level
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialise the global logger. `RUST_LOG`, when set, wins over `verbosity`.
pub fn init(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = Builder::new();
    builder
        .filter_level(level_for_verbosity(verbosity))
        .parse_env(Env::default())
        .target(Target::Stderr)
        .format_timestamp_secs()
        .try_init()
}

//! Command line front end

pub mod args;
pub mod handlers;

pub use args::{Cli, Commands, NetworkArg};
pub use handlers::handle_command;

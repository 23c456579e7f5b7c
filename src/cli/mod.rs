/// CLI argument parsing and command handling - Gateway
mod args;
mod commands;

pub use args::{CacheCommand, Cli, Commands, FetchArgs, FilterArgs, OutputFormat};
pub use commands::handle_command;

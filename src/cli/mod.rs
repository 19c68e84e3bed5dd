mod args;
mod commands;
mod console;

pub use args::CliArgs;
pub use commands::{OperatorCommand, TRIGGERS};
pub use console::{run_console, shutdown_signal, spawn_stdin_reader, ConsoleExit};

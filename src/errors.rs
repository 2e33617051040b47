use thiserror::Error;

use pulsar_config::ConfigError;
use pulsar_core::CoreError;

/// Failures that stop the shell itself rather than a single command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

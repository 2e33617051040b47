use std::path::PathBuf;

use dialoguer::theme::ColorfulTheme;

use pulsar_config::{Config, ConfigManager};
use pulsar_core::{Clock, Forecast};
use pulsar_domain::Ledger;
use pulsar_storage_csv::CsvLedgerStorage;

use super::registry::CommandRegistry;

/// Set to any value to read commands from stdin without prompts.
pub const SCRIPT_ENV: &str = "PULSAR_CLI_SCRIPT";
/// Overrides the base directory holding `config/` and `data/`.
pub const HOME_ENV: &str = "PULSAR_HOME";
/// Pins "now" to a fixed timestamp.
pub const NOW_ENV: &str = "PULSAR_NOW";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub base_dir: PathBuf,
    pub storage: CsvLedgerStorage,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub ledger: Ledger,
    /// Latest rebuild; `None` when the last rebuild failed.
    pub forecast: Option<Forecast>,
    pub clock: Box<dyn Clock>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn status(&self) -> String {
        format!(
            "ShellContext {{ running: {}, last_command: {:?}, transactions: {}, rules: {} }}",
            self.running,
            self.last_command,
            self.ledger.transactions.len(),
            self.ledger.rules.len()
        )
    }
}

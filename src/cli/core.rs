//! Command dispatch, shared shell helpers and command-level errors.

use std::{env, io, path::PathBuf};

use chrono::NaiveDateTime;
use dialoguer::theme::ColorfulTheme;
use shell_words::split;
use tracing::{info, warn};

use pulsar_config::{default_base_dir, Config, ConfigError, ConfigManager};
use pulsar_core::{
    storage::LedgerStorage, Clock, CoreError, Forecast, ForecastService, ForecastSettings,
    FixedClock,
};
use pulsar_domain::{parse_timestamp, Ledger, DATE_FORMAT};
use pulsar_storage_csv::CsvLedgerStorage;

pub use crate::cli::shell_context::{CliMode, ShellContext};
use crate::cli::shell_context::{HOME_ENV, NOW_ENV};
use crate::cli::system_clock::SystemClock;
pub use crate::errors::CliError;

use super::commands;
use super::io as cli_io;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    /// Builds a shell from the environment: `PULSAR_HOME` (or the platform
    /// data directory) and `PULSAR_NOW` (or the system clock).
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base_dir = match env::var_os(HOME_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_base_dir()?,
        };
        let clock: Box<dyn Clock> = match env::var(NOW_ENV) {
            Ok(raw) => {
                let now = parse_timestamp(&raw).ok_or_else(|| {
                    CliError::Input(format!(
                        "{NOW_ENV} must be YYYY-MM-DD or YYYY-MM-DD HH:MM:SS, got `{raw}`"
                    ))
                })?;
                Box::new(FixedClock(now))
            }
            Err(_) => Box::new(SystemClock),
        };
        Self::with_paths(mode, base_dir, clock)
    }

    pub fn with_paths(
        mode: CliMode,
        base_dir: PathBuf,
        clock: Box<dyn Clock>,
    ) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(&base_dir)?;
        let config = match config_manager.load() {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "configuration unreadable, using defaults");
                Config::default()
            }
        };
        output::set_color_enabled(config.ui_color_enabled && mode == CliMode::Interactive);

        let storage = CsvLedgerStorage::new(config.resolve_data_root(&base_dir))?;
        let ledger = storage.load_or_empty();
        info!(
            dir = %storage.data_dir().display(),
            transactions = ledger.transactions.len(),
            rules = ledger.rules.len(),
            "ledger opened"
        );

        let mut context = ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            base_dir,
            storage,
            config_manager,
            config,
            ledger,
            forecast: None,
            clock,
            last_command: None,
            running: true,
        };
        if let Err(err) = context.rebuild(None) {
            context.report_error(err)?;
        }
        Ok(context)
    }

    pub(crate) fn can_prompt(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    pub(crate) fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub(crate) fn today_label(&self) -> String {
        self.clock.today().format(DATE_FORMAT).to_string()
    }

    pub(crate) fn prompt(&self) -> String {
        format!("pulsar [{}]> ", self.config.horizon)
    }

    pub(crate) fn command_entries(&self) -> Vec<CommandEntry> {
        self.registry.entries().to_vec()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    /// Tokenizes and runs one line. Blank lines and `#` comments are skipped.
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = split(line).map_err(|err| {
            CommandError::InvalidArguments(format!("cannot parse `{}`: {}", line.trim(), err))
        })?;
        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        if raw.starts_with('#') {
            return Ok(LoopControl::Continue);
        }

        self.last_command = Some(line.trim().to_string());
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        let control = self.dispatch(&raw.to_lowercase(), raw, &args)?;
        if control == LoopControl::Exit {
            self.running = false;
        }
        Ok(control)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        if let Some(best) = self.registry.suggest(input) {
            cli_io::print_info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        self.confirm("Exit shell?").map_err(CliError::from)
    }

    /// Asks for confirmation interactively; scripts are always confirmed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if !self.can_prompt() {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    /// Returns `args[index]`, prompting for it when interactive. `default`
    /// is offered in the prompt and used as-is in scripts.
    pub(crate) fn arg_or_prompt(
        &self,
        args: &[&str],
        index: usize,
        label: &str,
        default: Option<String>,
        usage: &str,
    ) -> Result<String, CommandError> {
        if let Some(value) = args.get(index) {
            return Ok((*value).to_string());
        }
        if self.can_prompt() {
            return cli_io::prompt_text(&self.theme, label, default);
        }
        default.ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::NoForecast => {
                self.print_error(&CommandError::NoForecast.to_string());
                self.print_hint("Fix or delete the offending rule; see `rules`.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }

    pub(crate) fn settings(&self) -> ForecastSettings {
        settings_for(&self.config)
    }

    /// Recomputes the whole forecast. `None` re-anchors the window on now.
    pub(crate) fn rebuild(&mut self, scroll: Option<f64>) -> CommandResult {
        match ForecastService::refresh(&self.ledger, self.settings(), scroll, self.now()) {
            Ok(forecast) => {
                self.forecast = Some(forecast);
                Ok(())
            }
            Err(err) => {
                self.forecast = None;
                Err(err.into())
            }
        }
    }

    /// Applies `change` to a copy of the ledger, rebuilds the forecast from
    /// it, and only then persists and adopts it. A change the engine cannot
    /// expand leaves the ledger untouched.
    pub(crate) fn update_ledger<T>(
        &mut self,
        change: impl FnOnce(&mut Ledger) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        let mut candidate = self.ledger.clone();
        let value = change(&mut candidate)?;
        let forecast = ForecastService::refresh(&candidate, self.settings(), None, self.now())?;
        self.storage.save(&candidate)?;
        self.ledger = candidate;
        self.forecast = Some(forecast);
        Ok(value)
    }

    /// Rebuilds the forecast under a changed config. The config is written
    /// and adopted only when the rebuild succeeds.
    pub(crate) fn update_config(&mut self, change: impl FnOnce(&mut Config)) -> CommandResult {
        let mut candidate = self.config.clone();
        change(&mut candidate);
        let forecast =
            ForecastService::refresh(&self.ledger, settings_for(&candidate), None, self.now())?;
        self.adopt_config(candidate, forecast)
    }

    /// Persists `config`, then makes it and `forecast` current.
    pub(crate) fn adopt_config(&mut self, config: Config, forecast: Forecast) -> CommandResult {
        self.config_manager.save(&config)?;
        self.config = config;
        self.forecast = Some(forecast);
        Ok(())
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn forecast(&self) -> Result<&Forecast, CommandError> {
        self.forecast.as_ref().ok_or(CommandError::NoForecast)
    }

    pub(crate) fn forecast_mut(&mut self) -> Result<&mut Forecast, CommandError> {
        self.forecast.as_mut().ok_or(CommandError::NoForecast)
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        self.config.format_amount(amount)
    }
}

fn settings_for(config: &Config) -> ForecastSettings {
    ForecastSettings {
        horizon: config.horizon,
        zoom: config.zoom,
    }
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    let cleaned: String = input.chars().filter(|ch| !matches!(ch, ',' | '_')).collect();
    cleaned
        .trim()
        .trim_start_matches('$')
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDateTime, CommandError> {
    parse_timestamp(input).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "invalid date `{}` (use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)",
            input
        ))
    })
}

/// Converts a 1-based list number into an index.
pub(crate) fn parse_number(input: &str, what: &str) -> Result<usize, CommandError> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid {} number `{}`", what, input)))
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("No forecast available; the last rebuild failed.")]
    NoForecast,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            CommandError::Config(inner) => CliError::Config(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    base_dir: PathBuf,
    now: &str,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let now = parse_timestamp(now).ok_or_else(|| CliError::Input(now.to_string()))?;
    let mut app = ShellContext::with_paths(CliMode::Script, base_dir, Box::new(FixedClock(now)))?;
    for line in lines {
        match app.process_line(line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsar_domain::{HorizonChoice, TimeUnit, ZoomChoice};
    use tempfile::tempdir;

    #[test]
    fn amounts_accept_grouping_and_symbol() {
        assert_eq!(parse_amount("1,250.50").unwrap(), 1250.5);
        assert_eq!(parse_amount("$40").unwrap(), 40.0);
        assert_eq!(parse_amount("-12").unwrap(), -12.0);
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("ten").is_err());
    }

    #[test]
    fn list_numbers_are_one_based() {
        assert_eq!(parse_number("1", "rule").unwrap(), 0);
        assert_eq!(parse_number(" 3 ", "rule").unwrap(), 2);
        assert!(parse_number("0", "rule").is_err());
        assert!(parse_number("x", "rule").is_err());
    }

    #[test]
    fn script_builds_forecast_and_persists() {
        let dir = tempdir().unwrap();
        let app = process_script(
            dir.path().to_path_buf(),
            "2024-01-01",
            &[
                "horizon 3 Months",
                "income 1000 Paycheck 2024-01-01",
                "add-rule -500 1 months Rent 2024-01-05",
            ],
        )
        .unwrap();

        assert_eq!(app.config.horizon, HorizonChoice::ThreeMonths);
        assert_eq!(app.ledger.rules[0].unit(), TimeUnit::Month);
        let forecast = app.forecast().unwrap();
        assert_eq!(forecast.table.len(), 4);
        assert_eq!(forecast.summary.projected_balance, -500.0);

        let reopened = process_script(dir.path().to_path_buf(), "2024-01-01", &[]).unwrap();
        assert_eq!(reopened.ledger, app.ledger);
        assert_eq!(reopened.config.horizon, HorizonChoice::ThreeMonths);
    }

    #[test]
    fn deleting_rule_archives_history() {
        let dir = tempdir().unwrap();
        let app = process_script(
            dir.path().to_path_buf(),
            "2024-03-10",
            &["add-rule -500 1 months Rent 2024-01-05", "delete-rule 1"],
        )
        .unwrap();

        assert!(app.ledger.rules.is_empty());
        assert_eq!(app.ledger.transactions.len(), 3);
        assert!(app.ledger.transactions.iter().all(|txn| txn.is_archived()));
    }

    #[test]
    fn zoom_and_scroll_keep_table() {
        let dir = tempdir().unwrap();
        let mut app = process_script(
            dir.path().to_path_buf(),
            "2024-01-01",
            &["income 100 Gift 2024-01-01", "add-rule 10 1 weeks Allowance 2024-01-01"],
        )
        .unwrap();
        let rows = app.forecast().unwrap().table.len();

        app.process_line("scroll pages 1").unwrap();
        let offset = app.forecast().unwrap().scroll_offset().unwrap();
        assert!(offset > 0.0);

        app.process_line("zoom All Time").unwrap();
        assert_eq!(app.config.zoom, ZoomChoice::AllTime);
        let forecast = app.forecast().unwrap();
        assert_eq!(forecast.table.len(), rows);
        assert_eq!(forecast.window.unwrap().visible_ratio, 1.0);
    }

    #[test]
    fn failed_horizon_change_keeps_previous_settings() {
        let dir = tempdir().unwrap();
        let mut app = process_script(
            dir.path().to_path_buf(),
            "2024-01-01",
            &["horizon 3 Months", "add-rule 1 0.0003 days Tick 2024-03-20"],
        )
        .unwrap();
        let rows = app.forecast().unwrap().table.len();
        assert_eq!(rows, 40_001);

        let err = app.process_line("horizon 10 Years").unwrap_err();
        assert!(matches!(err, CommandError::Core(CoreError::Expansion(_))));
        assert_eq!(app.config.horizon, HorizonChoice::ThreeMonths);
        assert_eq!(app.forecast().unwrap().table.len(), rows);

        let reopened = process_script(dir.path().to_path_buf(), "2024-01-01", &[]).unwrap();
        assert_eq!(reopened.config.horizon, HorizonChoice::ThreeMonths);
        assert_eq!(reopened.forecast().unwrap().table.len(), rows);
    }

    #[test]
    fn reset_failure_leaves_ledger_in_memory() {
        let dir = tempdir().unwrap();
        let mut app = process_script(
            dir.path().to_path_buf(),
            "2024-01-01",
            &["income 100 Gift 2024-01-01"],
        )
        .unwrap();
        let transactions = app.storage.transactions_path();
        std::fs::remove_file(&transactions).unwrap();
        std::fs::create_dir(&transactions).unwrap();

        assert!(app.process_line("reset").is_err());
        assert_eq!(app.ledger.transactions.len(), 1);
        assert!(app.forecast().is_ok());
    }

    #[test]
    fn comment_and_blank_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let mut app = process_script(dir.path().to_path_buf(), "2024-01-01", &[]).unwrap();
        assert_eq!(app.process_line("   ").unwrap(), LoopControl::Continue);
        assert_eq!(app.process_line("# income 5 Note").unwrap(), LoopControl::Continue);
        assert!(app.ledger.transactions.is_empty());
        assert!(app.last_command.is_none());

        let err = app.process_line("income 5 \"unterminated").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
    }

    #[test]
    fn invalid_rule_is_rejected_before_engine() {
        let dir = tempdir().unwrap();
        let mut app = process_script(dir.path().to_path_buf(), "2024-01-01", &[]).unwrap();

        let err = app
            .process_line("add-rule -5 0 days Broken 2024-01-01")
            .unwrap_err();
        assert!(matches!(err, CommandError::Core(CoreError::InvalidRule(_))));
        assert!(app.ledger.rules.is_empty());

        let err = app
            .process_line("add-rule -5 1 fortnights Broken 2024-01-01")
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
    }

    #[test]
    fn exit_stops_processing() {
        let dir = tempdir().unwrap();
        let app = process_script(
            dir.path().to_path_buf(),
            "2024-01-01",
            &["exit", "income 5 Ignored"],
        )
        .unwrap();
        assert!(app.ledger.transactions.is_empty());
    }
}

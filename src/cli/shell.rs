use std::{
    borrow::Cow,
    io::{self, BufRead},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::{Hint, Hinter},
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use tracing::debug;

use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::output::info as output_info;
use crate::cli::registry::{ArgKind, CommandEntry};
use crate::cli::shell_context::SCRIPT_ENV;

/// Runs the shell until `exit`, end of input, or a fatal error.
pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    let result = match mode {
        CliMode::Interactive => {
            output_info("Pulsar balance forecaster. Type `help` for commands.");
            run_interactive(&mut context)
        }
        CliMode::Script => run_script(&mut context),
    };
    debug!(status = %context.status(), "shell stopped");
    result
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<PulsarHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(PulsarHelper::new(context.command_entries())));
    editor.bind_sequence(KeyEvent::from('\t'), Cmd::Complete);

    while context.running {
        if let Some(helper) = editor.helper_mut() {
            helper.sync(context);
        }
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line).ok();
                if run_line(context, line)? == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        if !context.running || run_line(context, &line?)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Command failures are reported and the shell keeps going.
fn run_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    match context.process_line(line) {
        Ok(control) => Ok(control),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

/// Completion, hints and validation for the interactive editor.
///
/// Argument completion follows each command's declared [`ArgKind`]s: horizon
/// and zoom labels, time units, scroll modes, rule fields, and the list
/// numbers currently valid for `rules` and `transactions`.
struct PulsarHelper {
    commands: Vec<CommandEntry>,
    rule_count: usize,
    transaction_count: usize,
}

impl PulsarHelper {
    fn new(commands: Vec<CommandEntry>) -> Self {
        Self {
            commands,
            rule_count: 0,
            transaction_count: 0,
        }
    }

    /// Refreshes list sizes before each prompt.
    fn sync(&mut self, context: &ShellContext) {
        self.rule_count = context.ledger.rules.len();
        self.transaction_count = context.ledger.transactions.len();
    }

    fn entry(&self, name: &str) -> Option<&CommandEntry> {
        let name = name.to_ascii_lowercase();
        self.commands.iter().find(|entry| entry.name == name)
    }

    fn candidates(&self, kind: ArgKind) -> Vec<String> {
        let numbers = |count: usize| (1..=count).map(|number| number.to_string()).collect();
        match kind {
            ArgKind::RuleNumber => numbers(self.rule_count),
            ArgKind::TransactionNumber => numbers(self.transaction_count),
            ArgKind::CommandName => self
                .commands
                .iter()
                .map(|entry| entry.name.to_string())
                .collect(),
            other => other.choices(),
        }
    }

    fn matching(&self, kind: ArgKind, typed: &str) -> Vec<Pair> {
        let needle = typed.to_lowercase();
        self.candidates(kind)
            .into_iter()
            .filter(|candidate| candidate.to_lowercase().starts_with(&needle))
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect()
    }
}

/// Splits `typed` into the command word and whatever follows it.
fn split_command(typed: &str) -> Option<(&str, &str)> {
    let body = typed.trim_start();
    let end = body.find(char::is_whitespace)?;
    Some((&body[..end], body[end..].trim_start()))
}

impl Completer for PulsarHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = &line[..pos];
        let Some((name, rest)) = split_command(typed) else {
            let start = typed.len() - typed.trim_start().len();
            return Ok((start, self.matching(ArgKind::CommandName, &typed[start..])));
        };
        let Some(entry) = self.entry(name) else {
            return Ok((pos, Vec::new()));
        };

        let rest_start = pos - rest.len();
        if entry.arg_kind(0).takes_rest() {
            return Ok((rest_start, self.matching(entry.arg_kind(0), rest)));
        }
        let word_start = typed
            .rfind(char::is_whitespace)
            .map_or(0, |index| index + 1)
            .max(rest_start);
        let index = line[rest_start..word_start].split_whitespace().count();
        Ok((
            word_start,
            self.matching(entry.arg_kind(index), &typed[word_start..]),
        ))
    }
}

/// A hint that either finishes a command name or only shows usage.
struct PulsarHint {
    text: String,
    insertable: bool,
}

impl Hint for PulsarHint {
    fn display(&self) -> &str {
        &self.text
    }

    fn completion(&self) -> Option<&str> {
        self.insertable.then_some(self.text.as_str())
    }
}

impl Hinter for PulsarHelper {
    type Hint = PulsarHint;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<PulsarHint> {
        if pos < line.len() || line.trim().is_empty() {
            return None;
        }
        match split_command(line) {
            None => {
                let typed = line.trim_start().to_ascii_lowercase();
                self.commands
                    .iter()
                    .find(|entry| entry.name.starts_with(&typed) && entry.name.len() > typed.len())
                    .map(|entry| PulsarHint {
                        text: entry.name[typed.len()..].to_string(),
                        insertable: true,
                    })
            }
            // Right after the command word, show what it expects.
            Some((name, "")) => self
                .entry(name)
                .map(CommandEntry::synopsis)
                .filter(|synopsis| !synopsis.is_empty())
                .map(|synopsis| PulsarHint {
                    text: synopsis.to_string(),
                    insertable: false,
                }),
            Some(_) => None,
        }
    }
}

impl Highlighter for PulsarHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for PulsarHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        // An open quote continues on the next line.
        match shell_words::split(ctx.input()) {
            Ok(_) => Ok(ValidationResult::Valid(None)),
            Err(_) => Ok(ValidationResult::Incomplete),
        }
    }
}

impl Helper for PulsarHelper {}

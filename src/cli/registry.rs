//! The shell's command table. Besides the handler, each entry records what
//! its positional arguments accept so the line editor can complete them.

use pulsar_domain::{HorizonChoice, TimeUnit, ZoomChoice};
use strsim::levenshtein;

use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Unknown names further than this from every command get no suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

pub const RULE_FIELDS: [&str; 6] = ["amount", "description", "every", "unit", "start", "end"];
pub const SCROLL_MODES: [&str; 3] = ["units", "pages", "to"];

/// What a positional argument accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Amounts, descriptions, dates, paths.
    Text,
    /// A horizon label; may span several words.
    Horizon,
    /// A zoom label; may span several words.
    Zoom,
    Unit,
    /// 1-based position in the `rules` listing.
    RuleNumber,
    /// 1-based position in the `transactions` listing.
    TransactionNumber,
    ScrollMode,
    RuleField,
    CommandName,
}

impl ArgKind {
    /// Labels such as `3 Months` consume the rest of the line.
    pub fn takes_rest(self) -> bool {
        matches!(self, ArgKind::Horizon | ArgKind::Zoom)
    }

    /// Fixed vocabulary for this kind. List numbers and command names depend
    /// on shell state and are supplied by the caller.
    pub fn choices(self) -> Vec<String> {
        match self {
            ArgKind::Horizon => HorizonChoice::ALL
                .iter()
                .map(|choice| choice.label().to_string())
                .collect(),
            ArgKind::Zoom => ZoomChoice::ALL
                .iter()
                .map(|choice| choice.label().to_string())
                .collect(),
            ArgKind::Unit => [TimeUnit::Day, TimeUnit::Week, TimeUnit::Month, TimeUnit::Year]
                .iter()
                .map(|unit| unit.tag().to_ascii_lowercase())
                .collect(),
            ArgKind::ScrollMode => SCROLL_MODES.iter().map(|mode| mode.to_string()).collect(),
            ArgKind::RuleField => RULE_FIELDS.iter().map(|field| field.to_string()).collect(),
            ArgKind::Text
            | ArgKind::RuleNumber
            | ArgKind::TransactionNumber
            | ArgKind::CommandName => Vec::new(),
        }
    }
}

#[derive(Clone, Copy)]
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    /// Full usage line, starting with the command name.
    pub usage: &'static str,
    pub args: &'static [ArgKind],
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            args: &[],
            handler,
        }
    }

    /// Declares the kinds of the positional arguments, in order.
    pub fn with_args(mut self, args: &'static [ArgKind]) -> Self {
        self.args = args;
        self
    }

    /// The usage line without the command name, e.g. `<number> <field> <value>`.
    pub fn synopsis(&self) -> &'static str {
        self.usage
            .strip_prefix(self.name)
            .map(str::trim_start)
            .unwrap_or(self.usage)
    }

    /// Kind of the argument at `index`; trailing arguments are free text.
    pub fn arg_kind(&self, index: usize) -> ArgKind {
        self.args.get(index).copied().unwrap_or(ArgKind::Text)
    }
}

/// Commands in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry`, replacing any command registered under the same name.
    pub fn register(&mut self, entry: CommandEntry) {
        match self.entries.iter_mut().find(|existing| existing.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.get(name).map(|entry| entry.handler)
    }

    /// Closest command name to a mistyped `input`, if any is close enough.
    pub fn suggest(&self, input: &str) -> Option<&'static str> {
        let needle = input.to_lowercase();
        self.names()
            .map(|name| (levenshtein(name, &needle), name))
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name)
    }
}

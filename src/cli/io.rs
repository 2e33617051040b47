use std::fmt;

use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::cli::core::CommandError;
use crate::cli::output;

/// Print an informational message via the standard CLI output helpers.
pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

/// Print a warning message via the standard CLI output helpers.
pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

/// Print an error message via the standard CLI output helpers.
pub fn print_error(message: impl fmt::Display) {
    output::error(message);
}

/// Print a success message via the standard CLI output helpers.
pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

pub fn print_hint(message: impl fmt::Display) {
    output::hint(message);
}

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(
    theme: &ColorfulTheme,
    prompt: &str,
    default: bool,
) -> Result<bool, CommandError> {
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(CommandError::from)
}

/// Prompt the user for free-form text input. An empty `default` means the
/// field is required.
pub fn prompt_text(
    theme: &ColorfulTheme,
    prompt: &str,
    default: Option<String>,
) -> Result<String, CommandError> {
    let mut input = Input::<String>::with_theme(theme).with_prompt(prompt);
    if let Some(value) = default {
        input = input.default(value).allow_empty(true);
    }
    input.interact_text().map_err(CommandError::from)
}

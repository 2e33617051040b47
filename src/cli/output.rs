use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

/// Turns ANSI styling on or off for every subsequent message.
pub fn set_color_enabled(enabled: bool) {
    if enabled {
        colored::control::unset_override();
    } else {
        colored::control::set_override(false);
    }
}

fn icon(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[+]",
        MessageKind::Warning => "[!]",
        MessageKind::Error => "[x]",
        MessageKind::Hint => "[?]",
        MessageKind::Section => "",
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()).bold().to_string(),
        MessageKind::Info => text,
        _ => {
            let line = format!("{} {}", icon(kind), text);
            match kind {
                MessageKind::Success => line.bright_green().to_string(),
                MessageKind::Warning => line.bright_yellow().to_string(),
                MessageKind::Error => line.bright_red().to_string(),
                _ => line.bright_cyan().to_string(),
            }
        }
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

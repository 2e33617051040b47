use chrono::NaiveDateTime;

use pulsar_core::{CoreError, RuleService};
use pulsar_domain::{format_timestamp, RecurringRule, TimeInterval, TimeUnit};

use crate::cli::core::{
    parse_amount, parse_date, parse_number, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry, RULE_FIELDS};
use crate::cli::render;

const ADD_USAGE: &str =
    "add-rule <amount> <every> <days|weeks|months|years> <description> [start] [end]";
const EDIT_USAGE: &str =
    "edit-rule <number> <amount|description|every|unit|start|end> <value>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add-rule",
            "Add a recurring income (positive) or expense (negative)",
            ADD_USAGE,
            cmd_add_rule,
        )
        .with_args(&[ArgKind::Text, ArgKind::Text, ArgKind::Unit]),
        CommandEntry::new(
            "edit-rule",
            "Change one field of a recurring rule",
            EDIT_USAGE,
            cmd_edit_rule,
        )
        .with_args(&[ArgKind::RuleNumber, ArgKind::RuleField]),
        CommandEntry::new(
            "delete-rule",
            "Delete a recurring rule, archiving its past occurrences",
            "delete-rule <number>",
            cmd_delete_rule,
        )
        .with_args(&[ArgKind::RuleNumber]),
        CommandEntry::new("rules", "List recurring rules", "rules", cmd_rules),
    ]
}

fn cmd_add_rule(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ask = |index: usize, label: &str, default: Option<String>| {
        context.arg_or_prompt(args, index, label, default, ADD_USAGE)
    };
    let amount = parse_amount(&ask(0, "Amount (negative for expenses)", None)?)?;
    let every = parse_every(&ask(1, "Every", Some("1".into()))?)?;
    let unit = parse_unit(&ask(2, "Unit (days/weeks/months/years)", Some("months".into()))?)?;
    let description = ask(3, "Description", None)?;
    let start = parse_date(&ask(4, "Start date", Some(context.today_label()))?)?;
    let end = parse_optional_date(&ask(5, "End date (blank for none)", Some(String::new()))?)?;

    let rule = RecurringRule::new(
        start,
        description.trim(),
        amount,
        TimeInterval::new(every, unit),
        end,
    )
    .map_err(CoreError::from)?;
    let summary = describe(context, &rule);
    let index = context.update_ledger(|ledger| Ok(RuleService::add(ledger, rule)?))?;
    io::print_success(format!("Added rule #{}: {}.", index + 1, summary));
    Ok(())
}

fn cmd_edit_rule(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(CommandError::InvalidArguments(format!("usage: {EDIT_USAGE}")));
    }
    let index = parse_number(args[0], "rule")?;
    let mut rule = context
        .ledger
        .rule(index)
        .cloned()
        .ok_or(CoreError::RuleNotFound(index))?;
    let value = args[2..].join(" ");

    match args[1].to_ascii_lowercase().as_str() {
        "amount" => rule.amount = parse_amount(&value)?,
        "description" => rule.description = value.trim().to_string(),
        "every" => rule.interval.every = parse_every(&value)?,
        "unit" => rule.interval.unit = parse_unit(&value)?,
        "start" => rule.start = parse_date(&value)?,
        "end" => rule.end = parse_optional_date(&value)?,
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown rule field `{}` (use one of: {})",
                other,
                RULE_FIELDS.join(", ")
            )))
        }
    }

    let summary = describe(context, &rule);
    context.update_ledger(|ledger| Ok(RuleService::update(ledger, index, rule)?))?;
    io::print_success(format!("Updated rule #{}: {}.", index + 1, summary));
    Ok(())
}

fn cmd_delete_rule(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let index = parse_number(
        &context.arg_or_prompt(args, 0, "Rule number", None, "delete-rule <number>")?,
        "rule",
    )?;
    let description = context
        .ledger
        .rule(index)
        .map(|rule| rule.description.clone())
        .ok_or(CoreError::RuleNotFound(index))?;
    if !context.confirm(&format!("Delete rule `{description}` and archive its history?"))? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }

    let now = context.now();
    let archived = context.update_ledger(|ledger| Ok(RuleService::remove(ledger, index, now)?))?;
    io::print_success(format!(
        "Deleted rule `{}`; archived {} past occurrence{}.",
        description,
        archived,
        if archived == 1 { "" } else { "s" }
    ));
    Ok(())
}

fn cmd_rules(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("Recurring rules");
    if context.ledger.rules.is_empty() {
        io::print_info("No recurring rules.");
        return Ok(());
    }
    let now = context.now();
    let rows = context
        .ledger
        .rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let end = match rule.end {
                Some(end) if rule.has_ended(now) => format!("{} (ended)", format_timestamp(end)),
                Some(end) => format_timestamp(end),
                None => "-".to_string(),
            };
            vec![
                format!("{}", index + 1),
                rule.description.clone(),
                context.money(rule.amount),
                rule.interval.label(),
                format_timestamp(rule.start),
                end,
            ]
        })
        .collect();
    render::print_table(
        &["#", "Description", "Amount", "Repeats", "Start", "End"],
        rows,
    );
    Ok(())
}

fn describe(context: &ShellContext, rule: &RecurringRule) -> String {
    format!(
        "{} {} {}",
        rule.description,
        context.money(rule.amount),
        rule.interval.label().to_lowercase()
    )
}

fn parse_every(input: &str) -> Result<f64, CommandError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid interval `{}`", input)))
}

fn parse_unit(input: &str) -> Result<TimeUnit, CommandError> {
    input
        .parse::<TimeUnit>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

/// Blank or `none` clears the end date.
fn parse_optional_date(input: &str) -> Result<Option<NaiveDateTime>, CommandError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_date(trimmed).map(Some)
}

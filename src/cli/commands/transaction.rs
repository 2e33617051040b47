use pulsar_core::{storage::LedgerStorage, TransactionService};
use pulsar_domain::{format_timestamp, StaticTransaction};
use tracing::info;

use crate::cli::core::{
    parse_amount, parse_date, parse_number, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry};
use crate::cli::render;

const INCOME_USAGE: &str = "income <amount> <description> [date]";
const SPENDING_USAGE: &str = "spending <amount> <description> [date]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "income",
            "Record a one-time income",
            INCOME_USAGE,
            cmd_income,
        ),
        CommandEntry::new(
            "spending",
            "Record a one-time expense",
            SPENDING_USAGE,
            cmd_spending,
        ),
        CommandEntry::new(
            "transactions",
            "List one-time transactions",
            "transactions",
            cmd_transactions,
        ),
        CommandEntry::new(
            "remove-transaction",
            "Delete a one-time transaction by its list number",
            "remove-transaction <number>",
            cmd_remove_transaction,
        )
        .with_args(&[ArgKind::TransactionNumber]),
        CommandEntry::new(
            "reset",
            "Delete every transaction and recurring rule",
            "reset",
            cmd_reset,
        ),
    ]
}

fn cmd_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    record(context, args, 1.0, INCOME_USAGE)
}

fn cmd_spending(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    record(context, args, -1.0, SPENDING_USAGE)
}

/// Amounts are entered as magnitudes; `sign` decides the direction.
fn record(context: &mut ShellContext, args: &[&str], sign: f64, usage: &str) -> CommandResult {
    let amount = parse_amount(&context.arg_or_prompt(args, 0, "Amount", None, usage)?)?;
    if amount <= 0.0 {
        return Err(CommandError::InvalidArguments(
            "amount must be greater than zero".into(),
        ));
    }
    let description = context.arg_or_prompt(args, 1, "Description", None, usage)?;
    if description.trim().is_empty() {
        return Err(CommandError::InvalidArguments(
            "description must not be empty".into(),
        ));
    }
    let today = context.today_label();
    let timestamp = parse_date(&context.arg_or_prompt(args, 2, "Date", Some(today), usage)?)?;

    let transaction = StaticTransaction::new(timestamp, description.trim(), sign * amount);
    let label = format!(
        "{} {} on {}",
        transaction.description,
        context.money(transaction.amount),
        format_timestamp(transaction.timestamp)
    );
    context.update_ledger(|ledger| {
        TransactionService::add(ledger, transaction);
        Ok(())
    })?;
    io::print_success(format!("Recorded {label}."));
    Ok(())
}

fn cmd_transactions(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("One-time transactions");
    if context.ledger.transactions.is_empty() {
        io::print_info("No transactions recorded.");
        return Ok(());
    }
    let rows = context
        .ledger
        .transactions
        .iter()
        .enumerate()
        .map(|(index, txn)| {
            vec![
                format!("{}", index + 1),
                format_timestamp(txn.timestamp),
                txn.description.clone(),
                context.money(txn.amount),
            ]
        })
        .collect();
    render::print_table(&["#", "Date", "Description", "Amount"], rows);
    Ok(())
}

fn cmd_remove_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "remove-transaction <number>";
    let index = parse_number(
        &context.arg_or_prompt(args, 0, "Transaction number", None, usage)?,
        "transaction",
    )?;
    let removed =
        context.update_ledger(|ledger| Ok(TransactionService::remove(ledger, index)?))?;
    io::print_success(format!(
        "Removed {} ({}).",
        removed.description,
        context.money(removed.amount)
    ));
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if !context.confirm("Delete every transaction and recurring rule?")? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    context.storage.clear()?;
    TransactionService::reset(&mut context.ledger);
    info!("ledger reset");
    context.rebuild(None)?;
    io::print_success("Ledger cleared.");
    Ok(())
}

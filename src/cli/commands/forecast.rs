use std::path::Path;

use tracing::info;

use pulsar_core::{ScrollCommand, TrendService, DEFAULT_TREND_DAYS};
use pulsar_domain::{format_timestamp, HorizonChoice, ZoomChoice};
use pulsar_storage_csv::export_projection;

use crate::cli::core::{parse_amount, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry};
use crate::cli::render;

const SCROLL_USAGE: &str = "scroll <units|pages|to> <value>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "forecast",
            "Show the summary and the visible window",
            "forecast",
            cmd_forecast,
        ),
        CommandEntry::new(
            "summary",
            "Show current and projected balance",
            "summary",
            cmd_summary,
        ),
        CommandEntry::new(
            "view",
            "Show the rows inside the visible window",
            "view",
            cmd_view,
        ),
        CommandEntry::new(
            "horizon",
            "Show or set how far ahead to project",
            "horizon [3 Months|6 Months|1 Year|2 Years|5 Years|10 Years]",
            cmd_horizon,
        )
        .with_args(&[ArgKind::Horizon]),
        CommandEntry::new(
            "zoom",
            "Show or set the visible window width",
            "zoom [1 Month|6 Months|1 Year|2 Years|All Time]",
            cmd_zoom,
        )
        .with_args(&[ArgKind::Zoom]),
        CommandEntry::new(
            "scroll",
            "Move the visible window by units, pages or to a position (0-1)",
            SCROLL_USAGE,
            cmd_scroll,
        )
        .with_args(&[ArgKind::ScrollMode]),
        CommandEntry::new(
            "trend",
            "Extend the balance trend line past the last row",
            "trend [days]",
            cmd_trend,
        ),
        CommandEntry::new(
            "export",
            "Write the projection to a CSV file",
            "export <path>",
            cmd_export,
        ),
        CommandEntry::new(
            "currency",
            "Show or set the currency symbol",
            "currency [symbol]",
            cmd_currency,
        ),
    ]
}

fn cmd_forecast(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let forecast = context.forecast()?;
    output_section("Forecast");
    render::print_summary(context, forecast);
    render::print_window(context, forecast);
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let forecast = context.forecast()?;
    output_section("Summary");
    render::print_summary(context, forecast);
    Ok(())
}

fn cmd_view(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let forecast = context.forecast()?;
    output_section("Window");
    render::print_window(context, forecast);
    Ok(())
}

fn cmd_horizon(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        io::print_info(format!("Horizon: {}", context.config.horizon));
        return Ok(());
    }
    let horizon = args
        .join(" ")
        .parse::<HorizonChoice>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    context.update_config(|config| config.horizon = horizon)?;
    info!(%horizon, "horizon changed");
    io::print_success(format!("Horizon set to {}.", horizon));
    cmd_summary(context, &[])
}

fn cmd_zoom(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        io::print_info(format!("Zoom: {}", context.config.zoom));
        return Ok(());
    }
    let zoom = args
        .join(" ")
        .parse::<ZoomChoice>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    let now = context.now();
    let mut forecast = context.forecast()?.clone();
    forecast.set_zoom(zoom, now);
    let mut config = context.config.clone();
    config.zoom = zoom;
    context.adopt_config(config, forecast)?;
    io::print_success(format!("Zoom set to {}.", zoom));
    cmd_view(context, &[])
}

fn cmd_scroll(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [mode, value] = args else {
        return Err(CommandError::InvalidArguments(format!("usage: {SCROLL_USAGE}")));
    };
    let value = parse_amount(value)?;
    let command = match mode.to_ascii_lowercase().as_str() {
        "units" | "unit" => ScrollCommand::Units(value),
        "pages" | "page" => ScrollCommand::Pages(value),
        "to" => ScrollCommand::MoveTo(value),
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown scroll mode `{}`; usage: {SCROLL_USAGE}",
                other
            )))
        }
    };
    let now = context.now();
    context.forecast_mut()?.scroll(command, now);
    cmd_view(context, &[])
}

fn cmd_trend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let days = match args.first() {
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            CommandError::InvalidArguments(format!("invalid number of days `{}`", raw))
        })?,
        None => DEFAULT_TREND_DAYS,
    };
    let forecast = context.forecast()?;
    let trend = if days == DEFAULT_TREND_DAYS {
        forecast.trend.clone()
    } else {
        TrendService::extrapolate(&forecast.table, days)
    };
    let Some(trend) = trend else {
        io::print_info("Not enough data for a trend; need rows on two different dates.");
        return Ok(());
    };

    output_section("Trend");
    io::print_info(format!(
        "  Slope            : {} per day",
        context.money(trend.slope_per_day)
    ));
    if let Some(point) = trend.points.last() {
        io::print_info(format!(
            "  Balance on {}: {}",
            format_timestamp(point.timestamp),
            context.money(point.balance)
        ));
    }
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = context.arg_or_prompt(args, 0, "Export to", None, "export <path>")?;
    let forecast = context.forecast()?;
    export_projection(&forecast.table, Path::new(&path))?;
    info!(path = %path, rows = forecast.table.len(), "projection exported");
    io::print_success(format!(
        "Exported {} rows to {}.",
        forecast.table.len(),
        path
    ));
    Ok(())
}

fn cmd_currency(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(symbol) = args.first() else {
        io::print_info(format!("Currency symbol: {}", context.config.currency_symbol));
        return Ok(());
    };
    context.config.currency_symbol = symbol.to_string();
    context.persist_config()?;
    io::print_success(format!("Currency symbol set to {}.", symbol));
    Ok(())
}

//! Plain-text rendering of forecasts: tables, the summary block and the
//! scrollbar standing in for the chart.

use colored::Colorize;

use pulsar_core::{Forecast, ProjectionWindow};
use pulsar_domain::format_timestamp;

use crate::cli::core::ShellContext;
use crate::cli::io;

const SCROLLBAR_WIDTH: usize = 40;

/// Prints `rows` under `headers`, padding every column to its widest cell.
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    io::print_info(line(headers.to_vec()));
    io::print_info(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &rows {
        io::print_info(line(row.iter().map(String::as_str).collect()));
    }
}

pub fn print_summary(context: &ShellContext, forecast: &Forecast) {
    let summary = forecast.summary;
    let delta = context.money(summary.delta);
    let delta = if summary.is_favorable() {
        delta.green()
    } else {
        delta.red()
    };
    io::print_info(format!(
        "  Current balance            : {}",
        context.money(summary.current_balance)
    ));
    io::print_info(format!(
        "  Projected balance ({:<8}): {}",
        forecast.settings.horizon.label(),
        context.money(summary.projected_balance)
    ));
    io::print_info(format!("  Change                     : {}", delta));
}

pub fn print_window(context: &ShellContext, forecast: &Forecast) {
    let Some(window) = forecast.window else {
        io::print_info("No data to show.");
        return;
    };
    io::print_info(format!(
        "  {} to {} ({}, {:.0}% of {:.0} days)",
        format_timestamp(window.visible_start),
        format_timestamp(window.visible_end),
        forecast.settings.zoom,
        window.visible_ratio * 100.0,
        window.total_days
    ));
    io::print_info(format!("  {}", scrollbar(&window, SCROLLBAR_WIDTH)));

    let rows: Vec<Vec<String>> = forecast
        .table
        .rows_in(&window)
        .map(|row| {
            vec![
                format_timestamp(row.timestamp),
                row.description.clone(),
                context.money(row.amount),
                context.money(row.balance),
                row.origin.to_string(),
            ]
        })
        .collect();
    if rows.is_empty() {
        io::print_info("No transactions in this window.");
        return;
    }
    print_table(&["Date", "Description", "Amount", "Balance", "Origin"], rows);
}

/// Draws the window's position over the whole projection, e.g. `[--###---]`.
pub fn scrollbar(window: &ProjectionWindow, width: usize) -> String {
    if width == 0 {
        return "[]".to_string();
    }
    let (low, high) = window.thumb();
    let start = ((low * width as f64).round() as usize).min(width.saturating_sub(1));
    let end = ((high * width as f64).round() as usize).clamp(start + 1, width);
    let track: String = (0..width)
        .map(|cell| if cell >= start && cell < end { '#' } else { '-' })
        .collect();
    format!("[{}]", track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsar_domain::parse_timestamp;

    fn window(offset: f64, ratio: f64) -> ProjectionWindow {
        let at = parse_timestamp("2024-01-01").unwrap();
        ProjectionWindow {
            visible_start: at,
            visible_end: at,
            scroll_offset: offset,
            visible_ratio: ratio,
            total_days: 100.0,
            view_days: ratio * 100.0,
        }
    }

    #[test]
    fn scrollbar_marks_thumb() {
        assert_eq!(scrollbar(&window(0.0, 0.5), 10), "[#####-----]");
        assert_eq!(scrollbar(&window(0.5, 0.5), 10), "[-----#####]");
        assert_eq!(scrollbar(&window(0.0, 1.0), 4), "[####]");
    }

    #[test]
    fn tiny_thumb_stays_visible() {
        assert_eq!(scrollbar(&window(1.0, 0.0), 5), "[----#]");
        assert_eq!(scrollbar(&window(0.3, 0.01), 10), "[---#------]");
    }

    #[test]
    fn zero_width_scrollbar_is_empty() {
        assert_eq!(scrollbar(&window(0.0, 0.5), 0), "[]");
        assert_eq!(scrollbar(&window(1.0, 0.0), 0), "[]");
    }
}

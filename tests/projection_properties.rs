use chrono::{Duration, NaiveDateTime};
use pulsar_core::{ForecastService, ForecastSettings, ProjectionService, ScrollCommand};
use pulsar_domain::{
    parse_timestamp, HorizonChoice, Ledger, RecurringRule, StaticTransaction, TimeInterval,
    TimeUnit, ZoomChoice,
};

fn ts(input: &str) -> NaiveDateTime {
    parse_timestamp(input).unwrap()
}

fn mixed_ledger() -> Ledger {
    let mut ledger = Ledger::default();
    for day in 0..40 {
        ledger.transactions.push(StaticTransaction::new(
            ts("2023-12-01") + Duration::days(day * 3),
            format!("Coffee {day}"),
            -4.5,
        ));
    }
    let rules = [
        (2.0, TimeUnit::Week, 1500.0, "Salary"),
        (1.0, TimeUnit::Month, -900.0, "Rent"),
        (0.5, TimeUnit::Month, -35.0, "Phone"),
        (1.5, TimeUnit::Day, -2.0, "Snacks"),
    ];
    for (every, unit, amount, name) in rules {
        ledger.rules.push(
            RecurringRule::new(
                ts("2023-11-15"),
                name,
                amount,
                TimeInterval::new(every, unit),
                Some(ts("2025-06-30")),
            )
            .unwrap(),
        );
    }
    ledger
}

#[test]
fn every_horizon_yields_sorted_cumulative_rows() {
    let ledger = mixed_ledger();
    let now = ts("2024-02-10");
    for horizon in HorizonChoice::ALL {
        let table = ProjectionService::build(&ledger, horizon.years(), now).unwrap();
        let mut running = 0.0;
        let mut previous: Option<NaiveDateTime> = None;
        for row in table.rows() {
            running += row.amount;
            assert!((row.balance - running).abs() < 1e-6, "{horizon}");
            if let Some(previous) = previous {
                assert!(previous <= row.timestamp, "{horizon}");
            }
            previous = Some(row.timestamp);
        }
    }
}

#[test]
fn wide_zoom_runs_past_short_data() {
    let ledger = mixed_ledger();
    let now = ts("2024-02-10");
    let settings = ForecastSettings {
        horizon: HorizonChoice::OneYear,
        zoom: ZoomChoice::TwoYears,
    };
    let forecast = ForecastService::refresh(&ledger, settings, None, now).unwrap();
    let window = forecast.window.unwrap();
    let last = forecast.table.last_timestamp().unwrap();

    assert_eq!(window.visible_ratio, 1.0);
    assert_eq!(window.scroll_offset, 0.0);
    assert_eq!(window.view_days, 730.0);
    assert!(window.visible_end > last);
}

#[test]
fn longer_horizons_only_append_rows() {
    let ledger = mixed_ledger();
    let now = ts("2024-02-10");
    let short = ProjectionService::build(&ledger, 0.25, now).unwrap();
    let long = ProjectionService::build(&ledger, 1.0, now).unwrap();
    assert!(long.len() > short.len());
    assert_eq!(&long.rows()[..short.len()], short.rows());
}

#[test]
fn scrolling_keeps_window_inside_projection() {
    let ledger = mixed_ledger();
    let now = ts("2024-02-10");
    for zoom in ZoomChoice::ALL {
        let settings = ForecastSettings {
            horizon: HorizonChoice::TwoYears,
            zoom,
        };
        let mut forecast = ForecastService::refresh(&ledger, settings, None, now).unwrap();
        let commands = [
            ScrollCommand::Pages(25.0),
            ScrollCommand::Units(-3.0),
            ScrollCommand::MoveTo(-1.0),
            ScrollCommand::Pages(-2.0),
            ScrollCommand::MoveTo(0.6),
        ];
        for command in commands {
            forecast.scroll(command, now);
            let window = forecast.window.unwrap();
            let first = forecast.table.first_timestamp().unwrap();
            let last = forecast.table.last_timestamp().unwrap();
            assert!(window.scroll_offset >= 0.0, "{zoom}");
            assert!(
                window.scroll_offset <= 1.0 - window.visible_ratio + 1e-9,
                "{zoom}"
            );
            // The window keeps its full width, so it may run past the last row.
            let reach = Duration::milliseconds(
                ((window.total_days + window.view_days) * 86_400_000.0).round() as i64,
            );
            assert!(window.visible_start >= first, "{zoom}");
            assert!(window.visible_start <= last, "{zoom}");
            assert!(window.visible_end <= first + reach + Duration::seconds(1), "{zoom}");
        }
    }
}

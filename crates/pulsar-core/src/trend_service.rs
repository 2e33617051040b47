//! Straight-line extrapolation of the balance past the last projected row.

use chrono::{Duration, NaiveDateTime};

use pulsar_domain::days_between;

use crate::projection_service::ProjectionTable;

/// Number of days the trend is extended past the last row.
pub const DEFAULT_TREND_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    /// Fitted balance change per day.
    pub slope_per_day: f64,
    /// Fitted balance at the first row's timestamp.
    pub intercept: f64,
    /// Starts at the last actual row, then one point per extrapolated day.
    pub points: Vec<TrendPoint>,
}

impl TrendLine {
    pub fn end_balance(&self) -> Option<f64> {
        self.points.last().map(|point| point.balance)
    }
}

pub struct TrendService;

impl TrendService {
    /// Least-squares fit of balance against time, extended `days` past the
    /// last row. Needs two rows at distinct timestamps.
    pub fn extrapolate(table: &ProjectionTable, days: u32) -> Option<TrendLine> {
        let first = table.first_timestamp()?;
        let last = table.rows().last()?;
        if table.len() < 2 {
            return None;
        }
        let xs: Vec<f64> = table
            .rows()
            .iter()
            .map(|row| days_between(first, row.timestamp))
            .collect();
        let ys: Vec<f64> = table.rows().iter().map(|row| row.balance).collect();
        let n = xs.len() as f64;
        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;
        let (mut covariance, mut variance) = (0.0, 0.0);
        for (x, y) in xs.iter().zip(&ys) {
            covariance += (x - mean_x) * (y - mean_y);
            variance += (x - mean_x) * (x - mean_x);
        }
        if variance <= f64::EPSILON {
            return None;
        }
        let slope_per_day = covariance / variance;
        let intercept = mean_y - slope_per_day * mean_x;

        let last_x = days_between(first, last.timestamp);
        let mut points = vec![TrendPoint {
            timestamp: last.timestamp,
            balance: last.balance,
        }];
        for day in 1..=days {
            let timestamp = last
                .timestamp
                .checked_add_signed(Duration::days(i64::from(day)))?;
            points.push(TrendPoint {
                timestamp,
                balance: intercept + slope_per_day * (last_x + f64::from(day)),
            });
        }
        Some(TrendLine {
            slope_per_day,
            intercept,
            points,
        })
    }
}

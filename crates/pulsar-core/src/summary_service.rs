//! Current versus projected balance derived from a projection.

use chrono::NaiveDateTime;

use crate::{horizon::horizon_date, projection_service::ProjectionTable, CoreError};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForecastSummary {
    pub current_balance: f64,
    pub projected_balance: f64,
    pub delta: f64,
}

impl ForecastSummary {
    /// A non-negative delta is shown as favourable.
    pub fn is_favorable(&self) -> bool {
        self.delta >= 0.0
    }
}

pub struct SummaryService;

impl SummaryService {
    /// Balance now, balance at `now + horizon_years`, and their difference.
    pub fn summarize(
        table: &ProjectionTable,
        horizon_years: f64,
        now: NaiveDateTime,
    ) -> Result<ForecastSummary, CoreError> {
        let horizon = horizon_date(now, horizon_years)?;
        let current_balance = table.balance_at(now).unwrap_or(0.0);
        let projected_balance = table.balance_at(horizon).unwrap_or(current_balance);
        Ok(ForecastSummary {
            current_balance,
            projected_balance,
            delta: projected_balance - current_balance,
        })
    }
}

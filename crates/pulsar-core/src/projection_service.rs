//! Merges static transactions with expanded rules into a running-balance table.

use chrono::NaiveDateTime;
use tracing::debug;

use pulsar_domain::{expand, Ledger, Occurrence, Origin};

use crate::{horizon::horizon_date, window_service::ProjectionWindow, CoreError};

#[derive(Debug, Clone, PartialEq)]
/// One projected event and the balance after applying it.
pub struct ProjectionRow {
    pub timestamp: NaiveDateTime,
    pub description: String,
    pub amount: f64,
    pub balance: f64,
    pub origin: Origin,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Chronologically ordered projection. Empty means "no data", never an error.
pub struct ProjectionTable {
    rows: Vec<ProjectionRow>,
}

impl ProjectionTable {
    /// Orders `occurrences` by timestamp (stable) and accumulates the balance.
    pub fn from_occurrences(mut occurrences: Vec<Occurrence>) -> Self {
        occurrences.sort_by_key(|occurrence| occurrence.timestamp);
        let mut balance = 0.0;
        let rows = occurrences
            .into_iter()
            .map(|occurrence| {
                balance += occurrence.amount;
                ProjectionRow {
                    timestamp: occurrence.timestamp,
                    description: occurrence.description,
                    amount: occurrence.amount,
                    balance,
                    origin: occurrence.origin,
                }
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[ProjectionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.first().map(|row| row.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.last().map(|row| row.timestamp)
    }

    /// Balance of the last row at or before `at`.
    pub fn balance_at(&self, at: NaiveDateTime) -> Option<f64> {
        let idx = self.rows.partition_point(|row| row.timestamp <= at);
        idx.checked_sub(1).map(|last| self.rows[last].balance)
    }

    pub fn final_balance(&self) -> Option<f64> {
        self.rows.last().map(|row| row.balance)
    }

    /// Rows that fall inside the visible window.
    pub fn rows_in<'a>(
        &'a self,
        window: &'a ProjectionWindow,
    ) -> impl Iterator<Item = &'a ProjectionRow> + 'a {
        self.rows.iter().filter(move |row| window.contains(row.timestamp))
    }
}

pub struct ProjectionService;

impl ProjectionService {
    /// Rebuilds the full projection from `ledger` out to `now + horizon_years`.
    pub fn build(
        ledger: &Ledger,
        horizon_years: f64,
        now: NaiveDateTime,
    ) -> Result<ProjectionTable, CoreError> {
        let horizon = horizon_date(now, horizon_years)?;
        let mut occurrences: Vec<Occurrence> =
            ledger.transactions.iter().map(Occurrence::from).collect();
        for rule in &ledger.rules {
            occurrences.extend(expand(rule, horizon)?);
        }
        let table = ProjectionTable::from_occurrences(occurrences);
        debug!(
            rows = table.len(),
            rules = ledger.rules.len(),
            %horizon,
            "projection rebuilt"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsar_domain::parse_timestamp;

    fn occ(date: &str, description: &str, amount: f64, origin: Origin) -> Occurrence {
        Occurrence {
            timestamp: parse_timestamp(date).unwrap(),
            description: description.into(),
            amount,
            origin,
        }
    }

    #[test]
    fn balance_at_picks_last_row_not_after() {
        let table = ProjectionTable::from_occurrences(vec![
            occ("2024-01-01", "a", 10.0, Origin::Static),
            occ("2024-01-03", "b", 5.0, Origin::Static),
        ]);
        let at = |d: &str| table.balance_at(parse_timestamp(d).unwrap());
        assert_eq!(at("2023-12-31"), None);
        assert_eq!(at("2024-01-01"), Some(10.0));
        assert_eq!(at("2024-01-02"), Some(10.0));
        assert_eq!(at("2024-02-01"), Some(15.0));
        assert_eq!(table.final_balance(), Some(15.0));
    }

    #[test]
    fn empty_table_reports_no_data() {
        let table = ProjectionTable::from_occurrences(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.first_timestamp(), None);
        assert_eq!(table.final_balance(), None);
    }
}

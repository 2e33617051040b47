//! pulsar-storage-csv
//!
//! CSV persistence for the ledger (`transactions.csv`, `recurring.csv`) and
//! export of a computed projection.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pulsar_core::{storage::LedgerStorage, CoreError, ProjectionTable};
use pulsar_domain::{
    format_timestamp, parse_timestamp, Ledger, RecurringRule, StaticTransaction, TimeInterval,
    TimeUnit,
};

pub const TRANSACTIONS_FILE: &str = "transactions.csv";
pub const RECURRING_FILE: &str = "recurring.csv";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Serialize, Deserialize)]
struct TransactionRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Amount")]
    amount: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecurringRow {
    #[serde(rename = "Start")]
    start: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Interval")]
    interval: f64,
    #[serde(rename = "Unit")]
    unit: String,
    #[serde(rename = "End", default)]
    end: Option<String>,
}

#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Balance")]
    balance: f64,
    #[serde(rename = "Origin")]
    origin: String,
}

/// Stores the ledger as two CSV files inside one data directory.
#[derive(Debug, Clone)]
pub struct CsvLedgerStorage {
    data_dir: PathBuf,
}

impl CsvLedgerStorage {
    pub fn new(data_dir: PathBuf) -> Result<Self, CoreError> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.data_dir.join(TRANSACTIONS_FILE)
    }

    pub fn recurring_path(&self) -> PathBuf {
        self.data_dir.join(RECURRING_FILE)
    }
}

impl LedgerStorage for CsvLedgerStorage {
    fn load(&self) -> Result<Ledger, CoreError> {
        let transactions = load_transactions(&self.transactions_path())?;
        let rules = load_rules(&self.recurring_path())?;
        debug!(
            transactions = transactions.len(),
            rules = rules.len(),
            dir = %self.data_dir.display(),
            "ledger loaded"
        );
        Ok(Ledger::new(transactions, rules))
    }

    fn save(&self, ledger: &Ledger) -> Result<(), CoreError> {
        let transactions = ledger.transactions.iter().map(|txn| TransactionRow {
            date: format_timestamp(txn.timestamp),
            description: txn.description.clone(),
            amount: txn.amount,
        });
        write_rows(
            &self.transactions_path(),
            &["Date", "Description", "Amount"],
            transactions,
        )?;

        let rules = ledger.rules.iter().map(|rule| RecurringRow {
            start: format_timestamp(rule.start),
            description: rule.description.clone(),
            amount: rule.amount,
            interval: rule.interval.every,
            unit: rule.unit().tag().to_string(),
            end: rule.end.map(format_timestamp),
        });
        write_rows(
            &self.recurring_path(),
            &["Start", "Description", "Amount", "Interval", "Unit", "End"],
            rules,
        )?;
        debug!(dir = %self.data_dir.display(), "ledger saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        for path in [self.transactions_path(), self.recurring_path()] {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// Writes every projection row to `path` as `Date,Description,Amount,Balance,Origin`.
pub fn export_projection(table: &ProjectionTable, path: &Path) -> Result<(), CoreError> {
    let rows = table.rows().iter().map(|row| ExportRow {
        date: format_timestamp(row.timestamp),
        description: &row.description,
        amount: row.amount,
        balance: row.balance,
        origin: row.origin.to_string(),
    });
    write_rows(
        path,
        &["Date", "Description", "Amount", "Balance", "Origin"],
        rows,
    )
}

fn load_transactions(path: &Path) -> Result<Vec<StaticTransaction>, CoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;
    let mut transactions = Vec::new();
    for (index, record) in reader.deserialize::<TransactionRow>().enumerate() {
        let row = record.map_err(|err| row_error(TRANSACTIONS_FILE, index, err))?;
        let timestamp = parse_date(TRANSACTIONS_FILE, index, &row.date)?;
        transactions.push(StaticTransaction::new(timestamp, row.description, row.amount));
    }
    Ok(transactions)
}

fn load_rules(path: &Path) -> Result<Vec<RecurringRule>, CoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;
    let mut rules = Vec::new();
    for (index, record) in reader.deserialize::<RecurringRow>().enumerate() {
        let row = record.map_err(|err| row_error(RECURRING_FILE, index, err))?;
        let start = parse_date(RECURRING_FILE, index, &row.start)?;
        let end = match row.end.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_date(RECURRING_FILE, index, raw)?),
        };
        let unit: TimeUnit = row
            .unit
            .parse()
            .map_err(|err| row_error(RECURRING_FILE, index, err))?;
        let rule = RecurringRule::new(
            start,
            row.description,
            row.amount,
            TimeInterval::new(row.interval, unit),
            end,
        )
        .map_err(|err| row_error(RECURRING_FILE, index, err))?;
        rules.push(rule);
    }
    Ok(rules)
}

fn parse_date(file: &str, index: usize, raw: &str) -> Result<NaiveDateTime, CoreError> {
    parse_timestamp(raw)
        .ok_or_else(|| row_error(file, index, format!("unreadable date `{raw}`")))
}

// Row numbers are 1-based and count the header line.
fn row_error(file: &str, index: usize, err: impl std::fmt::Display) -> CoreError {
    CoreError::Storage(format!("{file} line {}: {err}", index + 2))
}

fn csv_error(err: csv::Error) -> CoreError {
    CoreError::Serde(err.to_string())
}

fn write_rows<T, I>(path: &Path, headers: &[&str], rows: I) -> Result<(), CoreError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(headers).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    let data = writer
        .into_inner()
        .map_err(|err| CoreError::Storage(err.to_string()))?;

    let tmp = tmp_path(path);
    write_atomic(&tmp, &data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.flush()?;
    Ok(())
}

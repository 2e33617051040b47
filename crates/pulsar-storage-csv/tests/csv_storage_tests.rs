use std::fs;

use pulsar_core::{storage::LedgerStorage, ProjectionService};
use pulsar_domain::{
    parse_timestamp, Ledger, RecurringRule, StaticTransaction, TimeInterval, TimeUnit,
};
use pulsar_storage_csv::{export_projection, CsvLedgerStorage};
use tempfile::tempdir;

fn sample_ledger() -> Ledger {
    let ts = |raw: &str| parse_timestamp(raw).expect("timestamp");
    Ledger::new(
        vec![
            StaticTransaction::new(ts("2024-01-01 09:15:00"), "Paycheck, January", 1000.0),
            StaticTransaction::archived(ts("2023-12-05"), "Rent", -500.0),
        ],
        vec![
            RecurringRule::new(
                ts("2024-01-05"),
                "Rent",
                -500.0,
                TimeInterval::new(1.0, TimeUnit::Month),
                None,
            )
            .expect("rule"),
            RecurringRule::new(
                ts("2024-01-15"),
                "Allowance",
                25.5,
                TimeInterval::new(1.5, TimeUnit::Week),
                Some(ts("2024-06-30")),
            )
            .expect("rule"),
        ],
    )
}

#[test]
fn save_and_load_preserves_ledger() {
    let dir = tempdir().expect("tempdir");
    let storage = CsvLedgerStorage::new(dir.path().join("data")).expect("storage");
    let ledger = sample_ledger();

    storage.save(&ledger).expect("save");
    let loaded = storage.load().expect("load");

    assert_eq!(loaded, ledger);
    assert!(!storage.transactions_path().with_extension("csv.tmp").exists());
}

#[test]
fn files_follow_documented_layout() {
    let dir = tempdir().expect("tempdir");
    let storage = CsvLedgerStorage::new(dir.path().to_path_buf()).expect("storage");
    storage.save(&sample_ledger()).expect("save");

    let transactions = fs::read_to_string(storage.transactions_path()).expect("read");
    let mut lines = transactions.lines();
    assert_eq!(lines.next(), Some("Date,Description,Amount"));
    assert_eq!(
        lines.next(),
        Some("2024-01-01 09:15:00,\"Paycheck, January\",1000.0")
    );

    let recurring = fs::read_to_string(storage.recurring_path()).expect("read");
    let rows: Vec<&str> = recurring.lines().collect();
    assert_eq!(rows[0], "Start,Description,Amount,Interval,Unit,End");
    assert_eq!(rows[1], "2024-01-05 00:00:00,Rent,-500.0,1.0,Months,");
    assert_eq!(
        rows[2],
        "2024-01-15 00:00:00,Allowance,25.5,1.5,Weeks,2024-06-30 00:00:00"
    );
}

#[test]
fn hand_written_files_are_accepted() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("recurring.csv"),
        "Start,Description,Amount,Interval,Unit,End\n2024-02-01 00:00:00,Gym,-30,1,months,\n",
    )
    .expect("write");
    let storage = CsvLedgerStorage::new(dir.path().to_path_buf()).expect("storage");

    let ledger = storage.load().expect("load");

    assert!(ledger.transactions.is_empty());
    assert_eq!(ledger.rules.len(), 1);
    assert_eq!(ledger.rules[0].unit(), TimeUnit::Month);
    assert_eq!(ledger.rules[0].end, None);
}

#[test]
fn malformed_rows_fail_strict_load_but_not_fallback() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("transactions.csv"),
        "Date,Description,Amount\nyesterday,Coffee,-3\n",
    )
    .expect("write");
    let storage = CsvLedgerStorage::new(dir.path().to_path_buf()).expect("storage");

    let err = storage.load().unwrap_err();
    assert!(err.to_string().contains("line 2"));
    assert!(storage.load_or_empty().is_empty());
}

#[test]
fn invalid_rule_rows_are_rejected() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("recurring.csv"),
        "Start,Description,Amount,Interval,Unit,End\n2024-02-01 00:00:00,Gym,-30,0,Months,\n",
    )
    .expect("write");
    let storage = CsvLedgerStorage::new(dir.path().to_path_buf()).expect("storage");

    assert!(storage.load().is_err());
}

#[test]
fn clear_removes_both_files() {
    let dir = tempdir().expect("tempdir");
    let storage = CsvLedgerStorage::new(dir.path().to_path_buf()).expect("storage");
    storage.save(&sample_ledger()).expect("save");

    storage.clear().expect("clear");

    assert!(!storage.transactions_path().exists());
    assert!(!storage.recurring_path().exists());
    assert!(storage.load().expect("load").is_empty());
}

#[test]
fn export_writes_running_balance() {
    let dir = tempdir().expect("tempdir");
    let now = parse_timestamp("2024-01-01").expect("timestamp");
    let table = ProjectionService::build(&sample_ledger(), 0.25, now).expect("build");
    let path = dir.path().join("forecast.csv");

    export_projection(&table, &path).expect("export");

    let data = fs::read_to_string(&path).expect("read");
    let lines: Vec<&str> = data.lines().collect();
    assert_eq!(lines[0], "Date,Description,Amount,Balance,Origin");
    assert_eq!(lines[1], "2023-12-05 00:00:00,Rent (Archived),-500.0,-500.0,Static");
    assert_eq!(lines.len(), table.len() + 1);
    assert!(lines.iter().any(|line| line.ends_with(",Recurring")));
}

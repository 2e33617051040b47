use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::tempdir;

fn pulsar(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("pulsar_cli").unwrap();
    cmd.env("PULSAR_CLI_SCRIPT", "1")
        .env("PULSAR_HOME", home)
        .env("PULSAR_NOW", "2024-01-01")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn script_mode_projects_paycheck_and_rent() {
    let home = tempdir().unwrap();
    let input = "\
# quarter-year forecast
horizon 3 Months
income 1000 Paycheck 2024-01-01
add-rule -500 1 months Rent 2024-01-05
summary
exit
";

    pulsar(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Horizon set to 3 Months."))
        .stdout(contains("Current balance            : $1000.00"))
        .stdout(contains("Projected balance (3 Months): -$500.00"))
        .stdout(contains("Change                     : -$1500.00"));

    let transactions =
        std::fs::read_to_string(home.path().join("data/transactions.csv")).unwrap();
    assert!(transactions.starts_with("Date,Description,Amount"));
    assert!(transactions.contains("2024-01-01 00:00:00,Paycheck,1000.0"));

    let rules = std::fs::read_to_string(home.path().join("data/recurring.csv")).unwrap();
    assert!(rules.contains("2024-01-05 00:00:00,Rent,-500.0,1.0,Months,"));

    let config = std::fs::read_to_string(home.path().join("config/config.json")).unwrap();
    assert!(config.contains("\"3 Months\""));
}

#[test]
fn ledger_survives_restart_and_archives_on_delete() {
    let home = tempdir().unwrap();
    pulsar(home.path())
        .write_stdin("add-rule -500 1 months Rent 2023-11-05\n")
        .assert()
        .success();

    pulsar(home.path())
        .write_stdin("rules\ndelete-rule 1\ntransactions\n")
        .assert()
        .success()
        .stdout(contains("Monthly"))
        .stdout(contains("archived 2 past occurrences"))
        .stdout(contains("Rent (Archived)"));
}

#[test]
fn unknown_command_suggests_closest() {
    let home = tempdir().unwrap();
    pulsar(home.path())
        .write_stdin("sumary\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `sumary`"))
        .stdout(contains("Suggestion: `summary`?"));
}

#[test]
fn invalid_input_is_reported_and_shell_continues() {
    let home = tempdir().unwrap();
    pulsar(home.path())
        .write_stdin("add-rule -5 0 days Broken\nzoom forever\nincome 5 Tip\ntransactions\n")
        .assert()
        .success()
        .stdout(contains("Invalid recurring rule"))
        .stdout(contains("unknown zoom `forever`"))
        .stdout(contains("Recorded Tip $5.00 on 2024-01-01 00:00:00."));
}

#[test]
fn export_writes_projection_csv() {
    let home = tempdir().unwrap();
    let out = home.path().join("forecast.csv");
    let input = format!(
        "income 250 Bonus 2024-01-10\nadd-rule -20 2 weeks Gym 2024-01-01\nexport {}\n",
        out.display()
    );

    pulsar(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Exported"));

    let csv = std::fs::read_to_string(&out).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Date,Description,Amount,Balance,Origin"));
    assert_eq!(
        lines.next(),
        Some("2024-01-01 00:00:00,Gym,-20.0,-20.0,Recurring")
    );
}

#[test]
fn malformed_ledger_file_starts_empty() {
    let home = tempdir().unwrap();
    std::fs::create_dir_all(home.path().join("data")).unwrap();
    std::fs::write(
        home.path().join("data/transactions.csv"),
        "Date,Description,Amount\nnot-a-date,Broken,abc\n",
    )
    .unwrap();

    pulsar(home.path())
        .write_stdin("transactions\n")
        .assert()
        .success()
        .stdout(contains("No transactions recorded."));
}

#[test]
fn version_reports_build_metadata() {
    let home = tempdir().unwrap();
    pulsar(home.path())
        .write_stdin("version\n")
        .assert()
        .success()
        .stdout(contains("Pulsar").and(contains("Build hash")));
}

#![expect(clippy::panic_in_result_fn)]

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;

fn cli_command() -> Result<Command> {
    Ok(Command::cargo_bin("oxsdate")?)
}

#[test]
fn cli_help() -> Result<()> {
    cli_command()?
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Usage: oxsdate"));
    Ok(())
}

#[test]
fn cli_parse_text() -> Result<()> {
    cli_command()?
        .arg("parse")
        .arg("2001-08-06T10:20:30.50+02:00")
        .assert()
        .success()
        .stdout(predicate::str::contains("type: dateTime\n"))
        .stdout(predicate::str::contains("natural: 2001-08-06T10:20:30.50+02:00\n"))
        .stdout(predicate::str::contains("canonical: 2001-08-06T08:20:30.5Z\n"))
        .stdout(predicate::str::contains("fraction: 0.50\n"))
        .stdout(predicate::str::contains("timezone: +02:00\n"));
    Ok(())
}

#[test]
fn cli_parse_json() -> Result<()> {
    let output = cli_command()?
        .arg("parse")
        .arg("--format")
        .arg("json")
        .arg("--08-06Z")
        .output()?;
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["type"], "gMonthDay");
    assert_eq!(report["canonical"], "--08-06Z");
    assert_eq!(report["month"], 8);
    assert_eq!(report["day"], 6);
    assert_eq!(report["timezone"], "Z");
    assert!(report.get("year").is_none());
    Ok(())
}

#[test]
fn cli_parse_invalid() -> Result<()> {
    cli_command()?
        .arg("parse")
        .arg("2001-02-29")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Invalid date/time value '2001-02-29'"));
    Ok(())
}

#[test]
fn cli_canonical() -> Result<()> {
    cli_command()?
        .arg("canonical")
        .arg("2000-02-28T20:00:00-05:00")
        .assert()
        .success()
        .stdout("2000-02-29T01:00:00Z\n");
    cli_command()?
        .arg("canonical")
        .arg("-0001-12-31T24:00:00")
        .assert()
        .success()
        .stdout("0001-01-01T00:00:00\n");
    Ok(())
}

#[test]
fn cli_compare() -> Result<()> {
    cli_command()?
        .arg("compare")
        .arg("2000-01-01T12:00:00+01:00")
        .arg("2000-01-01T11:00:00Z")
        .assert()
        .success()
        .stdout("equal\n");
    cli_command()?
        .arg("compare")
        .arg("--02-28")
        .arg("--03-01Z")
        .assert()
        .success()
        .stdout("less\n");
    cli_command()?
        .arg("compare")
        .arg("--02-28")
        .arg("--02-28Z")
        .assert()
        .success()
        .stdout("incomparable\n");
    Ok(())
}

#[test]
fn cli_add_and_subtract() -> Result<()> {
    cli_command()?
        .arg("add")
        .arg("2000-01-31")
        .arg("P1M")
        .assert()
        .success()
        .stdout("2000-02-29\n");
    cli_command()?
        .arg("subtract")
        .arg("2000-03-01T00:00:00Z")
        .arg("PT1S")
        .assert()
        .success()
        .stdout("2000-02-29T23:59:59Z\n");
    cli_command()?
        .arg("add")
        .arg("2000-01-01")
        .arg("-P1D")
        .assert()
        .success()
        .stdout("1999-12-31\n");
    Ok(())
}

#[test]
fn cli_adjust() -> Result<()> {
    cli_command()?
        .arg("adjust")
        .arg("2000-01-01T00:30:00Z")
        .arg("-05:00")
        .assert()
        .success()
        .stdout("1999-12-31T19:30:00-05:00\n");
    cli_command()?
        .arg("adjust")
        .arg("2000-01-01T00:30:00Z")
        .arg("+15:00")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time zone '+15:00'"));
    Ok(())
}

#[test]
fn cli_julian() -> Result<()> {
    cli_command()?
        .arg("julian")
        .arg("2000-01-01")
        .assert()
        .success()
        .stdout("2451545\n");
    cli_command()?
        .arg("julian")
        .arg("--01-01")
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no Julian day number"));
    Ok(())
}

#[test]
fn cli_duration() -> Result<()> {
    cli_command()?
        .arg("duration")
        .arg("P14MT3601.5S")
        .arg("--normalize")
        .assert()
        .success()
        .stdout(predicate::str::contains("canonical: P1Y2MT1H1.5S\n"))
        .stdout(predicate::str::contains("years: 1\n"))
        .stdout(predicate::str::contains("fraction: 0.5\n"));
    let output = cli_command()?
        .arg("duration")
        .arg("-P1DT2H")
        .arg("--format")
        .arg("json")
        .output()?;
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["canonical"], "-P1DT2H");
    assert_eq!(report["negative"], true);
    assert_eq!(report["days"], 1);
    assert_eq!(report["hours"], 2);
    Ok(())
}

#[test]
fn cli_compare_durations() -> Result<()> {
    cli_command()?
        .arg("compare-durations")
        .arg("P1M")
        .arg("P30D")
        .assert()
        .success()
        .stdout("incomparable\n");
    cli_command()?
        .arg("compare-durations")
        .arg("P1Y")
        .arg("P367D")
        .assert()
        .success()
        .stdout("less\n");
    cli_command()?
        .arg("compare-durations")
        .arg("PT24H")
        .arg("P1D")
        .assert()
        .success()
        .stdout("equal\n");
    Ok(())
}

#[test]
fn cli_json_logs() -> Result<()> {
    cli_command()?
        .arg("--log-format")
        .arg("json")
        .arg("canonical")
        .arg("2001-08-06")
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stdout("2001-08-06\n")
        .stderr(predicate::str::contains("\"canonical\":\"2001-08-06\""));
    Ok(())
}

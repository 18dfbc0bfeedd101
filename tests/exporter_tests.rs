// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashplan::commands::obligations::add_obligation;
use cashplan::commands::payments::{NewPayment, record_payment};
use cashplan::commands::timeline::{GenerateRequest, generate_timeline};
use cashplan::models::{Direction, Frequency, Obligation, ObligationKind, PaymentType};
use cashplan::{cli, commands::exporter, db};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Three-month subscription with January settled.
fn base_conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let id = add_obligation(
        &conn,
        &Obligation {
            id: 0,
            kind: ObligationKind::Subscription,
            name: "Accounting suite".into(),
            category: None,
            amount: Decimal::new(4900, 2),
            frequency: Frequency::Monthly,
            start_date: d("2025-01-03"),
            end_date: Some(d("2025-03-31")),
            off_months: vec![],
            custom_dates: vec![],
            first_payment_amount: None,
            total_amount: None,
            is_active: true,
            timeline_revision: 0,
        },
    )
    .unwrap();
    let entries = generate_timeline(&mut conn, id, &GenerateRequest::default(), d("2025-01-01"))
        .unwrap()
        .entries;
    record_payment(
        &mut conn,
        &NewPayment {
            direction: Direction::Output,
            payment_type: PaymentType::Subscription,
            reference_id: Some(id),
            schedule_entry_id: Some(entries[0].id),
            payment_date: d("2025-01-03"),
            amount: Decimal::new(5150, 2),
            notes: None,
        },
    )
    .unwrap();
    conn
}

fn run_export(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let argv: Vec<&str> = ["cashplan", "export", "timeline"]
        .into_iter()
        .chain(args.iter().copied())
        .collect();
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_timeline_writes_csv_with_status() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("timeline.csv");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&conn, &["--format", "csv", "--out", &out_str]).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines,
        [
            "Month,Name,Category/Type,Amount,Status",
            "2025-01,Accounting suite,subscription,51.50,Actual",
            "2025-02,Accounting suite,subscription,49.00,Projected",
            "2025-03,Accounting suite,subscription,49.00,Projected",
        ]
    );
}

#[test]
fn export_timeline_json_honours_window() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("timeline.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(
        &conn,
        &["--format", "JSON", "--out", &out_str, "--start", "2025-02", "--end", "2025-02"],
    )
    .unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "month": "2025-02",
                "name": "Accounting suite",
                "category": "subscription",
                "amount": "49.00",
                "status": "Projected"
            }
        ])
    );
}

#[test]
fn export_timeline_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("timeline.xml");
    let out_str = out_path.to_string_lossy().to_string();

    assert!(run_export(&conn, &["--format", "xml", "--out", &out_str]).is_err());
    assert!(!out_path.exists());
}

#[test]
fn export_timeline_unknown_obligation_is_an_error() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("timeline.csv");
    let out_str = out_path.to_string_lossy().to_string();

    assert!(run_export(&conn, &["--format", "csv", "--out", &out_str, "--obligation", "42"]).is_err());
    assert!(!out_path.exists());
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashplan::commands::cashflow::project_cash_flow;
use cashplan::commands::obligations::add_obligation;
use cashplan::commands::payments::{NewPayment, record_payment};
use cashplan::commands::records::{add_loan, add_personnel, add_sale};
use cashplan::db;
use cashplan::errors::EngineError;
use cashplan::models::{
    ChargesType, Direction, Frequency, Loan, MonthlyCashFlow, Obligation, ObligationKind,
    PaymentType, Personnel, Sale,
};
use cashplan::utils::set_setting;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn one_time_expense(conn: &Connection, date: &str, amount: &str) {
    let ob = Obligation {
        id: 0,
        kind: ObligationKind::Expense,
        name: format!("Expense {}", date),
        category: Some("Operations".into()),
        amount: dec(amount),
        frequency: Frequency::OneTime,
        start_date: d(date),
        end_date: None,
        off_months: vec![],
        custom_dates: vec![],
        first_payment_amount: None,
        total_amount: None,
        is_active: true,
        timeline_revision: 0,
    };
    add_obligation(conn, &ob).unwrap();
}

fn sale(conn: &Connection, date: &str, amount: &str) {
    add_sale(
        conn,
        &Sale {
            id: 0,
            date: d(date),
            kind: "product".into(),
            amount: dec(amount),
            description: None,
        },
    )
    .unwrap();
}

fn payment(conn: &mut Connection, direction: Direction, kind: PaymentType, date: &str, amount: &str) {
    record_payment(
        conn,
        &NewPayment {
            direction,
            payment_type: kind,
            reference_id: None,
            schedule_entry_id: None,
            payment_date: d(date),
            amount: dec(amount),
            notes: None,
        },
    )
    .unwrap();
}

fn quarter_setup() -> Connection {
    let conn = conn();
    for (date, amount) in [("2025-01-12", "1000"), ("2025-02-03", "1200"), ("2025-03-20", "900")] {
        sale(&conn, date, amount);
    }
    for (date, amount) in [("2025-01-05", "800"), ("2025-02-05", "1000"), ("2025-03-05", "1100")] {
        one_time_expense(&conn, date, amount);
    }
    conn
}

fn column(ledger: &[MonthlyCashFlow], f: impl Fn(&MonthlyCashFlow) -> Decimal) -> Vec<Decimal> {
    ledger.iter().map(f).collect()
}

#[test]
fn quarter_rolls_up_running_balance() {
    let mut conn = quarter_setup();
    let ledger = project_cash_flow(&mut conn, Some("2025-01"), Some("2025-03"), None, d("2025-01-01")).unwrap();

    assert_eq!(column(&ledger, |r| r.inflows), ["1000", "1200", "900"].map(dec));
    assert_eq!(column(&ledger, |r| r.outflows), ["800", "1000", "1100"].map(dec));
    assert_eq!(column(&ledger, |r| r.net), ["200", "200", "-200"].map(dec));
    assert_eq!(column(&ledger, |r| r.closing_balance), ["200", "400", "200"].map(dec));
    assert_eq!(ledger[1].opening_balance, ledger[0].closing_balance);
    assert!(ledger.iter().all(|r| r.inflow_source == "sales" && r.outflow_source == "projected"));
}

#[test]
fn recorded_payments_take_precedence() {
    let mut conn = quarter_setup();
    payment(&mut conn, Direction::Input, PaymentType::Sale, "2025-01-28", "1500");
    payment(&mut conn, Direction::Output, PaymentType::Expense, "2025-02-10", "500");
    payment(&mut conn, Direction::Output, PaymentType::Loan, "2025-03-10", "999");

    let ledger = project_cash_flow(&mut conn, Some("2025-01"), Some("2025-03"), None, d("2025-01-01")).unwrap();
    assert_eq!(column(&ledger, |r| r.inflows), ["1500", "1200", "900"].map(dec));
    assert_eq!(column(&ledger, |r| r.outflows), ["800", "500", "1100"].map(dec));
    assert_eq!(ledger[0].inflow_source, "recorded");
    assert_eq!(ledger[1].outflow_source, "recorded");
    assert_eq!(ledger[2].outflow_source, "projected");
}

#[test]
fn opening_balance_comes_from_argument_then_setting() {
    let mut conn = quarter_setup();
    set_setting(&conn, "opening_balance", "1000").unwrap();

    let ledger = project_cash_flow(&mut conn, Some("2025-01"), Some("2025-03"), None, d("2025-01-01")).unwrap();
    assert_eq!(ledger[0].opening_balance, dec("1000"));
    assert_eq!(ledger[2].closing_balance, dec("1200"));

    let ledger = project_cash_flow(
        &mut conn,
        Some("2025-01"),
        Some("2025-03"),
        Some(dec("-50")),
        d("2025-01-01"),
    )
    .unwrap();
    assert_eq!(ledger[0].opening_balance, dec("-50"));
}

#[test]
fn projection_is_persisted_once_per_month() {
    let mut conn = quarter_setup();
    project_cash_flow(&mut conn, Some("2025-01"), Some("2025-03"), None, d("2025-01-01")).unwrap();
    project_cash_flow(&mut conn, Some("2025-01"), Some("2025-03"), None, d("2025-01-01")).unwrap();

    let (count, notes): (i64, String) = conn
        .query_row(
            "SELECT COUNT(*), MIN(notes) FROM cash_flow_entries",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(count, 3);
    assert!(notes.starts_with("Auto-calculated projection"));

    let closing: String = conn
        .query_row(
            "SELECT closing_balance FROM cash_flow_entries WHERE month='2025-02'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(dec(&closing), dec("400"));
}

#[test]
fn payroll_and_loans_feed_projected_outflows() {
    let mut conn = conn();
    add_personnel(
        &conn,
        &Personnel {
            id: 0,
            name: "Ada".into(),
            base_salary: dec("1000"),
            employer_charges: dec("20"),
            charges_type: ChargesType::Percentage,
            start_date: d("2025-01-01"),
            end_date: Some(d("2025-02-28")),
            is_active: true,
        },
    )
    .unwrap();
    add_loan(
        &mut conn,
        &Loan {
            id: 0,
            name: "Equipment".into(),
            principal: dec("1200"),
            interest_rate: dec("0"),
            duration_months: 12,
            start_date: d("2025-01-15"),
            off_payment_months: vec![],
        },
    )
    .unwrap();

    let ledger = project_cash_flow(&mut conn, Some("2025-01"), Some("2025-03"), None, d("2025-01-01")).unwrap();
    assert_eq!(column(&ledger, |r| r.outflows), ["1300", "1300", "100"].map(dec));
    assert!(ledger.iter().all(|r| r.inflows.is_zero()));
}

#[test]
fn bounds_are_validated() {
    let mut conn = conn();
    let as_of = d("2025-01-01");
    for (start, end) in [
        (None, Some("2025-03")),
        (Some("2025-01"), None),
        (Some("2025-04"), Some("2025-01")),
        (Some("2025-1"), Some("2025-03")),
    ] {
        let err = project_cash_flow(&mut conn, start, end, None, as_of).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)), "{:?}..{:?}", start, end);
    }
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM cash_flow_entries", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

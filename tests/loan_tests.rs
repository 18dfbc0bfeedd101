// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashplan::commands::payments::{NewPayment, record_payment};
use cashplan::commands::records::add_loan;
use cashplan::db;
use cashplan::engine::amortization::{monthly_payment, schedule};
use cashplan::errors::EngineError;
use cashplan::models::{Direction, Loan, PaymentType};
use cashplan::store;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn loan(principal: i64, rate: &str, months: u32, off: Vec<u32>) -> Loan {
    Loan {
        id: 7,
        name: "Van".into(),
        principal: Decimal::from(principal),
        interest_rate: rate.parse().unwrap(),
        duration_months: months,
        start_date: d("2025-01-31"),
        off_payment_months: off,
    }
}

#[test]
fn zero_rate_loan_pays_equal_principal() {
    let rows = schedule(&loan(1200, "0", 12, vec![])).unwrap();
    assert_eq!(rows.len(), 12);
    assert!(rows.iter().all(|r| r.total_payment == Decimal::from(100)));
    assert!(rows.iter().all(|r| r.interest_payment.is_zero()));
    assert_eq!(rows.last().unwrap().remaining_balance, Decimal::ZERO);
    assert_eq!(rows[1].payment_date, d("2025-02-28"));
    assert!(rows.iter().all(|r| r.loan_id == 7));
}

#[test]
fn interest_bearing_loan_amortizes_to_zero() {
    let l = loan(10_000, "6", 24, vec![]);
    let rows = schedule(&l).unwrap();
    assert_eq!(rows.len(), 24);

    let payment = monthly_payment(&l).unwrap().round_dp(2);
    assert_eq!(payment, "443.21".parse::<Decimal>().unwrap());
    assert_eq!(rows[0].interest_payment, Decimal::from(50));

    let principal: Decimal = rows.iter().map(|r| r.principal_payment).sum();
    assert!((principal - Decimal::from(10_000)).abs() <= "0.05".parse::<Decimal>().unwrap());
    assert!(rows.last().unwrap().remaining_balance <= "0.01".parse::<Decimal>().unwrap());
    assert!(rows.windows(2).all(|w| w[1].remaining_balance <= w[0].remaining_balance));
}

#[test]
fn off_months_pay_interest_only_and_extend_the_term() {
    let rows = schedule(&loan(12_000, "12", 12, vec![3, 40])).unwrap();
    assert_eq!(rows.len(), 13);

    let third = &rows[2];
    assert!(third.principal_payment.is_zero());
    assert_eq!(third.total_payment, third.interest_payment);
    assert_eq!(third.remaining_balance, rows[1].remaining_balance);
    assert!(rows.last().unwrap().remaining_balance <= "0.01".parse::<Decimal>().unwrap());
}

#[test]
fn invalid_loans_are_rejected() {
    for l in [loan(0, "5", 12, vec![]), loan(1000, "5", 0, vec![]), loan(1000, "-1", 12, vec![])] {
        assert!(matches!(schedule(&l), Err(EngineError::Validation(_))));
    }
}

#[test]
fn oversized_rate_and_term_are_rejected_not_panicking() {
    let l = loan(1000, "600", 360, vec![]);
    assert!(matches!(monthly_payment(&l), Err(EngineError::Validation(_))));
    assert!(matches!(schedule(&l), Err(EngineError::Validation(_))));

    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    assert!(add_loan(&mut conn, &l).is_err());
    assert!(store::list_loans(&conn).unwrap().is_empty());
}

#[test]
fn stored_installment_is_marked_paid_once_covered() {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let (loan_id, rows) = add_loan(&mut conn, &loan(1200, "0", 12, vec![])).unwrap();
    assert_eq!(rows.len(), 12);
    assert!(rows.iter().all(|r| r.id > 0 && r.loan_id == loan_id));

    let pay = |amount: i64| NewPayment {
        direction: Direction::Output,
        payment_type: PaymentType::Loan,
        reference_id: Some(loan_id),
        schedule_entry_id: Some(rows[0].id),
        payment_date: rows[0].payment_date,
        amount: Decimal::from(amount),
        notes: None,
    };
    let first = record_payment(&mut conn, &pay(60)).unwrap();
    assert!(!first.fully_paid);
    let second = record_payment(&mut conn, &pay(40)).unwrap();
    assert!(second.fully_paid);
    assert_eq!(second.settled_amount, Some(Decimal::from(100)));

    let stored = store::loan_schedule(&conn, loan_id).unwrap();
    assert!(stored[0].is_paid);
    assert!(!stored[1].is_paid);

    let mut wrong_loan = pay(10);
    wrong_loan.reference_id = Some(loan_id + 1);
    assert!(record_payment(&mut conn, &wrong_loan).unwrap_err().is_not_found());
}

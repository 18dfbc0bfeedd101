// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashplan::engine::projector::project;
use cashplan::engine::{Month, MonthRange};
use cashplan::errors::EngineError;
use cashplan::models::{Frequency, Obligation, ObligationKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn m(s: &str) -> Month {
    s.parse().unwrap()
}

fn window(start: &str, end: &str) -> MonthRange {
    MonthRange::new(m(start), m(end))
}

fn monthly(start: &str, end: Option<&str>, amount: i64) -> Obligation {
    Obligation {
        id: 1,
        kind: ObligationKind::Leasing,
        name: "Van lease".into(),
        category: None,
        amount: Decimal::from(amount),
        frequency: Frequency::Monthly,
        start_date: d(start),
        end_date: end.map(d),
        off_months: vec![],
        custom_dates: vec![],
        first_payment_amount: None,
        total_amount: None,
        is_active: true,
        timeline_revision: 0,
    }
}

#[test]
fn projection_is_repeatable() {
    let ob = monthly("2024-01-10", Some("2024-12-10"), 100);
    let as_of = d("2024-05-01");
    let a = project(&ob, window("2024-01", "2024-12"), as_of).unwrap();
    let b = project(&ob, window("2024-01", "2024-12"), as_of).unwrap();
    assert_eq!(a.len(), 12);
    assert_eq!(a, b);
    assert!(a.iter().all(|o| o.amount == Decimal::from(100)));
}

#[test]
fn quarterly_from_march_lands_on_quarter_months() {
    let mut ob = monthly("2024-03-15", None, 300);
    ob.frequency = Frequency::Quarterly;
    let occ = project(&ob, window("2024-01", "2024-12"), d("2024-01-01")).unwrap();
    let months: Vec<String> = occ.iter().map(|o| o.month.to_string()).collect();
    assert_eq!(months, ["2024-03", "2024-06", "2024-09", "2024-12"]);
    assert_eq!(occ[1].payment_date, d("2024-06-15"));
}

#[test]
fn yearly_counts_from_the_start_month() {
    let mut ob = monthly("2023-07-01", None, 1200);
    ob.frequency = Frequency::Yearly;
    let occ = project(&ob, window("2024-01", "2025-12"), d("2024-01-01")).unwrap();
    let months: Vec<String> = occ.iter().map(|o| o.month.to_string()).collect();
    assert_eq!(months, ["2024-07", "2025-07"]);
}

#[test]
fn off_months_are_skipped() {
    let mut ob = monthly("2024-01-05", Some("2024-06-05"), 100);
    ob.off_months = vec![m("2024-03")];
    let occ = project(&ob, window("2024-01", "2024-06"), d("2024-01-01")).unwrap();
    assert_eq!(occ.len(), 5);
    assert!(occ.iter().all(|o| o.month != m("2024-03")));
}

#[test]
fn first_payment_amount_applies_to_lifetime_first_only() {
    let mut ob = monthly("2024-01-10", None, 100);
    ob.first_payment_amount = Some(Decimal::from(500));

    let from_start = project(&ob, window("2024-01", "2024-03"), d("2024-01-01")).unwrap();
    assert_eq!(from_start[0].amount, Decimal::from(500));
    assert_eq!(from_start[1].amount, Decimal::from(100));

    let later = project(&ob, window("2024-02", "2024-04"), d("2024-01-01")).unwrap();
    assert!(later.iter().all(|o| o.amount == Decimal::from(100)));
}

#[test]
fn payment_day_is_clamped_to_month_end() {
    let ob = monthly("2024-01-31", Some("2024-04-30"), 100);
    let occ = project(&ob, window("2024-01", "2024-04"), d("2024-01-01")).unwrap();
    let dates: Vec<NaiveDate> = occ.iter().map(|o| o.payment_date).collect();
    assert_eq!(
        dates,
        [d("2024-01-31"), d("2024-02-29"), d("2024-03-31"), d("2024-04-30")]
    );
}

#[test]
fn past_dates_are_not_projected() {
    let ob = monthly("2024-01-10", Some("2024-06-10"), 100);
    let occ = project(&ob, window("2024-01", "2024-06"), d("2024-03-10")).unwrap();
    let flags: Vec<bool> = occ.iter().map(|o| o.is_projected).collect();
    assert_eq!(flags, [false, false, false, true, true, true]);
}

#[test]
fn one_time_and_custom_use_explicit_dates() {
    let mut ob = monthly("2024-02-20", None, 900);
    ob.frequency = Frequency::OneTime;
    let occ = project(&ob, window("2024-01", "2024-12"), d("2024-01-01")).unwrap();
    assert_eq!(occ.len(), 1);
    assert_eq!(occ[0].payment_date, d("2024-02-20"));

    ob.frequency = Frequency::Custom;
    ob.custom_dates = vec![d("2024-05-01"), d("2024-02-20"), d("2025-01-01")];
    let occ = project(&ob, window("2024-01", "2024-12"), d("2024-01-01")).unwrap();
    let dates: Vec<NaiveDate> = occ.iter().map(|o| o.payment_date).collect();
    assert_eq!(dates, [d("2024-02-20"), d("2024-05-01")]);
}

#[test]
fn inactive_or_empty_window_yields_nothing() {
    let mut ob = monthly("2024-01-10", None, 100);
    assert!(project(&ob, window("2024-06", "2024-01"), d("2024-01-01")).unwrap().is_empty());
    ob.is_active = false;
    assert!(project(&ob, window("2024-01", "2024-06"), d("2024-01-01")).unwrap().is_empty());
}

#[test]
fn term_bounds_are_respected() {
    let ob = monthly("2024-03-10", Some("2024-05-09"), 100);
    let occ = project(&ob, window("2024-01", "2024-12"), d("2024-01-01")).unwrap();
    let months: Vec<String> = occ.iter().map(|o| o.month.to_string()).collect();
    assert_eq!(months, ["2024-03", "2024-04"]);
}

#[test]
fn invalid_definitions_are_rejected() {
    let mut ob = monthly("2024-03-10", Some("2024-01-10"), 100);
    let err = project(&ob, window("2024-01", "2024-12"), d("2024-01-01")).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    ob.end_date = None;
    ob.amount = Decimal::from(-5);
    let err = project(&ob, window("2024-01", "2024-12"), d("2024-01-01")).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::engine::month::{Month, MonthRange};
use crate::errors::{EngineError, EngineResult};
use crate::models::{ActualPayment, Direction, PaymentType};
use crate::store::{self, PaymentFilter, TimelineStore};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table};

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub direction: Direction,
    pub payment_type: PaymentType,
    pub reference_id: Option<i64>,
    pub schedule_entry_id: Option<i64>,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub payment_id: i64,
    pub month: Month,
    /// Set when the payment settles a timeline entry or loan installment.
    pub schedule_entry_id: Option<i64>,
    pub settled_amount: Option<Decimal>,
    pub fully_paid: bool,
}

/// Record an actual payment.
///
/// A payment linked to a timeline entry accumulates onto it: the entry keeps
/// the running actual amount and is marked paid once that covers the entry's
/// amount. Such a payment is booked in the entry's month against the entry's
/// obligation, whatever day it was made. A payment linked to a loan
/// installment marks it paid when it covers the installment.
pub fn record_payment(conn: &mut Connection, p: &NewPayment) -> EngineResult<PaymentOutcome> {
    if p.amount <= Decimal::ZERO {
        return Err(EngineError::validation(format!("Payment amount must be positive, got {}", p.amount)));
    }
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let entry = match (p.payment_type, p.schedule_entry_id) {
        (PaymentType::Expense | PaymentType::Subscription | PaymentType::Leasing, Some(entry_id)) => {
            let entry = tx
                .timeline_entry(entry_id)?
                .ok_or_else(|| EngineError::not_found("Timeline entry", entry_id))?;
            if p.reference_id.is_some_and(|r| r != entry.obligation_id) {
                return Err(EngineError::not_found("Timeline entry", entry_id));
            }
            Some(entry)
        }
        _ => None,
    };
    let month = entry.as_ref().map(|e| e.month).unwrap_or_else(|| Month::of(p.payment_date));
    let reference_id = entry.as_ref().map(|e| e.obligation_id).or(p.reference_id);

    let payment_id = store::insert_payment(
        &tx,
        &ActualPayment {
            id: 0,
            direction: p.direction,
            payment_type: p.payment_type,
            reference_id,
            schedule_entry_id: p.schedule_entry_id,
            month,
            payment_date: p.payment_date,
            amount: p.amount,
            notes: p.notes.clone(),
        },
    )?;

    let mut outcome = PaymentOutcome {
        payment_id,
        month,
        schedule_entry_id: p.schedule_entry_id,
        settled_amount: None,
        fully_paid: false,
    };

    match (entry, p.payment_type, p.schedule_entry_id) {
        (Some(entry), _, _) => {
            let settled = settled_so_far(&tx, p.payment_type, entry.id)?;
            outcome.settled_amount = Some(settled);
            outcome.fully_paid = settled >= entry.amount;
            store::mark_entry_paid(&tx, entry.id, p.payment_date, settled, outcome.fully_paid)?;
        }
        (None, PaymentType::Loan, Some(installment_id)) => {
            let (loan_id, due) = store::loan_installment(&tx, installment_id)?
                .ok_or_else(|| EngineError::not_found("Loan installment", installment_id))?;
            if p.reference_id.is_some_and(|r| r != loan_id) {
                return Err(EngineError::not_found("Loan installment", installment_id));
            }
            let settled = settled_so_far(&tx, p.payment_type, installment_id)?;
            outcome.settled_amount = Some(settled);
            outcome.fully_paid = settled >= due;
            if outcome.fully_paid {
                store::mark_installment_paid(&tx, installment_id)?;
            }
        }
        _ => {}
    }
    tx.commit()?;

    info!(
        payment_id,
        direction = %p.direction,
        payment_type = %p.payment_type,
        month = %month,
        amount = %p.amount,
        fully_paid = outcome.fully_paid,
        "payment recorded"
    );
    Ok(outcome)
}

fn settled_so_far(conn: &Connection, payment_type: PaymentType, schedule_entry_id: i64) -> EngineResult<Decimal> {
    Ok(conn
        .actual_payments(&PaymentFilter {
            payment_type: Some(payment_type),
            schedule_entry_id: Some(schedule_entry_id),
            ..PaymentFilter::default()
        })?
        .iter()
        .map(|p| p.amount)
        .sum())
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => {
            let text = |name: &str| sub.get_one::<String>(name);
            let req = NewPayment {
                direction: text("direction")
                    .map(|s| s.parse::<Direction>())
                    .transpose()?
                    .unwrap_or(Direction::Output),
                payment_type: text("type").context("--type is required")?.parse()?,
                reference_id: sub.get_one::<i64>("reference").copied(),
                schedule_entry_id: sub.get_one::<i64>("entry").copied(),
                payment_date: parse_date(text("date").context("--date is required")?)?,
                amount: parse_decimal(text("amount").context("--amount is required")?)?,
                notes: text("notes").map(|s| s.trim().to_string()),
            };
            let outcome = record_payment(conn, &req)?;
            if !maybe_print_json(sub.get_flag("json"), false, &outcome)? {
                println!(
                    "Recorded payment {} of {} for {}",
                    outcome.payment_id,
                    fmt_money(&req.amount),
                    outcome.month
                );
                if let (Some(entry), Some(settled)) = (outcome.schedule_entry_id, outcome.settled_amount) {
                    println!(
                        "Entry {}: {} settled{}",
                        entry,
                        fmt_money(&settled),
                        if outcome.fully_paid { " (paid)" } else { "" }
                    );
                }
            }
        }
        Some(("list", sub)) => {
            let text = |name: &str| sub.get_one::<String>(name);
            let range = match (text("start"), text("end")) {
                (Some(s), Some(e)) => Some(MonthRange::checked(parse_month(s)?, parse_month(e)?)?),
                (None, None) => None,
                _ => anyhow::bail!("--start and --end must be given together"),
            };
            let filter = PaymentFilter {
                direction: text("direction").map(|s| s.parse::<Direction>()).transpose()?,
                payment_type: text("type").map(|s| s.parse::<PaymentType>()).transpose()?,
                reference_id: sub.get_one::<i64>("reference").copied(),
                schedule_entry_id: None,
                range,
            };
            let payments = conn.actual_payments(&filter)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &payments)? {
                let rows = payments
                    .iter()
                    .map(|p| {
                        vec![
                            p.id.to_string(),
                            p.payment_date.to_string(),
                            p.direction.to_string(),
                            p.payment_type.to_string(),
                            p.reference_id.map(|r| r.to_string()).unwrap_or_default(),
                            fmt_money(&p.amount),
                            p.notes.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Date", "Direction", "Type", "Reference", "Amount", "Notes"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

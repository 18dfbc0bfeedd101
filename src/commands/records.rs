// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Sales, personnel and loans: the non-obligation inputs of the cash-flow
//! projection.

use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::engine::amortization;
use crate::errors::{EngineError, EngineResult};
use crate::models::{ChargesType, Loan, LoanScheduleEntry, Personnel, Sale};
use crate::store;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, parse_list, pretty_table};

pub fn add_sale(conn: &Connection, sale: &Sale) -> EngineResult<i64> {
    if sale.amount.is_sign_negative() {
        return Err(EngineError::validation(format!("Negative sale amount {}", sale.amount)));
    }
    store::insert_sale(conn, sale)
}

pub fn add_personnel(conn: &Connection, p: &Personnel) -> EngineResult<i64> {
    if p.base_salary.is_sign_negative() || p.employer_charges.is_sign_negative() {
        return Err(EngineError::validation(format!("Negative salary or charges for '{}'", p.name)));
    }
    if p.end_date.is_some_and(|end| end < p.start_date) {
        return Err(EngineError::validation(format!("'{}' leaves before starting", p.name)));
    }
    store::insert_personnel(conn, p)
}

/// Store a loan together with its amortization schedule.
pub fn add_loan(conn: &mut Connection, loan: &Loan) -> EngineResult<(i64, Vec<LoanScheduleEntry>)> {
    let schedule = amortization::schedule(loan)?;
    let id = store::insert_loan(conn, loan, &schedule)?;
    Ok((id, store::loan_schedule(conn, id)?))
}

pub fn handle_sale(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let sale = Sale {
                id: 0,
                date: parse_date(sub.get_one::<String>("date").context("--date is required")?)?,
                kind: sub
                    .get_one::<String>("kind")
                    .map(|s| s.trim().to_string())
                    .unwrap_or_else(|| "sale".to_string()),
                amount: parse_decimal(sub.get_one::<String>("amount").context("--amount is required")?)?,
                description: sub.get_one::<String>("description").cloned(),
            };
            let id = add_sale(conn, &sale)?;
            println!("Added sale {} of {} on {}", id, fmt_money(&sale.amount), sale.date);
        }
        Some(("list", sub)) => {
            let sales = store::list_sales(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &sales)? {
                let rows = sales
                    .iter()
                    .map(|s| {
                        vec![
                            s.id.to_string(),
                            s.date.to_string(),
                            s.kind.clone(),
                            fmt_money(&s.amount),
                            s.description.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Date", "Kind", "Amount", "Description"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_personnel(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let text = |name: &str| sub.get_one::<String>(name);
            let p = Personnel {
                id: 0,
                name: text("name").context("--name is required")?.trim().to_string(),
                base_salary: parse_decimal(text("salary").context("--salary is required")?)?,
                employer_charges: text("charges")
                    .map(|s| parse_decimal(s))
                    .transpose()?
                    .unwrap_or(Decimal::ZERO),
                charges_type: text("charges-type")
                    .map(|s| s.parse::<ChargesType>())
                    .transpose()?
                    .unwrap_or(ChargesType::Percentage),
                start_date: parse_date(text("start").context("--start is required")?)?,
                end_date: text("end").map(|s| parse_date(s)).transpose()?,
                is_active: true,
            };
            let id = add_personnel(conn, &p)?;
            println!(
                "Added '{}' (id {}), monthly cost {}",
                p.name,
                id,
                fmt_money(&p.monthly_cost())
            );
        }
        Some(("list", sub)) => {
            let people = store::active_personnel(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &people)? {
                let rows = people
                    .iter()
                    .map(|p| {
                        vec![
                            p.id.to_string(),
                            p.name.clone(),
                            fmt_money(&p.base_salary),
                            format!("{} ({})", p.employer_charges, p.charges_type),
                            fmt_money(&p.monthly_cost()),
                            p.start_date.to_string(),
                            p.end_date.map(|d| d.to_string()).unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Salary", "Charges", "Monthly cost", "Start", "End"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_loan(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let text = |name: &str| sub.get_one::<String>(name);
            let loan = Loan {
                id: 0,
                name: text("name").context("--name is required")?.trim().to_string(),
                principal: parse_decimal(text("principal").context("--principal is required")?)?,
                interest_rate: parse_decimal(text("rate").context("--rate is required")?)?,
                duration_months: *sub.get_one::<u32>("months").context("--months is required")?,
                start_date: parse_date(text("start").context("--start is required")?)?,
                off_payment_months: text("off")
                    .map(|s| {
                        parse_list(s, |p| {
                            p.parse::<u32>()
                                .with_context(|| format!("Invalid installment number '{}'", p))
                        })
                    })
                    .transpose()?
                    .unwrap_or_default(),
            };
            let (id, schedule) = add_loan(conn, &loan)?;
            let payment = amortization::monthly_payment(&loan)?;
            println!(
                "Added loan '{}' (id {}), {} installments of {}",
                loan.name,
                id,
                schedule.len(),
                fmt_money(&payment)
            );
        }
        Some(("list", sub)) => {
            let loans = store::list_loans(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &loans)? {
                let rows = loans
                    .iter()
                    .map(|l| {
                        vec![
                            l.id.to_string(),
                            l.name.clone(),
                            fmt_money(&l.principal),
                            format!("{}%", l.interest_rate),
                            l.duration_months.to_string(),
                            l.start_date.to_string(),
                            amortization::monthly_payment(l)
                                .map(|p| fmt_money(&p))
                                .unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Principal", "Rate", "Months", "Start", "Payment"], rows)
                );
            }
        }
        Some(("schedule", sub)) => {
            let id = *sub.get_one::<i64>("id").context("id is required")?;
            store::loan(conn, id)?.ok_or_else(|| EngineError::not_found("Loan", id))?;
            let schedule = store::loan_schedule(conn, id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &schedule)? {
                let rows = schedule
                    .iter()
                    .map(|s| {
                        vec![
                            s.installment.to_string(),
                            s.payment_date.to_string(),
                            fmt_money(&s.principal_payment),
                            fmt_money(&s.interest_payment),
                            fmt_money(&s.total_payment),
                            fmt_money(&s.remaining_balance),
                            if s.is_paid { "yes" } else { "" }.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["#", "Date", "Principal", "Interest", "Total", "Balance", "Paid"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

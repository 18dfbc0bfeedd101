// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::engine::projector::validate_obligation;
use crate::errors::EngineError;
use crate::models::{Frequency, Obligation, ObligationKind};
use crate::store::{self, TimelineStore};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, parse_list, parse_month, pretty_table};

/// Validate and store a new obligation, returning its id.
pub fn add_obligation(conn: &Connection, ob: &Obligation) -> Result<i64> {
    validate_obligation(ob)?;
    if ob.name.trim().is_empty() {
        return Err(EngineError::validation("Obligation name is required").into());
    }
    if ob.frequency == Frequency::Custom && ob.custom_dates.is_empty() {
        return Err(EngineError::validation("Custom frequency needs at least one date").into());
    }
    Ok(store::insert_obligation(conn, ob)?)
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let ob = obligation_from_args(sub)?;
            let id = add_obligation(conn, &ob)?;
            println!("Added {} '{}' (id {})", ob.kind, ob.name, id);
        }
        Some(("list", sub)) => {
            let obligations = store::list_obligations(conn, sub.get_flag("active"))?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &obligations)? {
                let rows = obligations
                    .iter()
                    .map(|o| {
                        vec![
                            o.id.to_string(),
                            o.kind.to_string(),
                            o.name.clone(),
                            o.label().to_string(),
                            fmt_money(&o.amount),
                            o.frequency.to_string(),
                            o.start_date.to_string(),
                            o.end_date.map(|d| d.to_string()).unwrap_or_default(),
                            o.total_amount.map(|t| fmt_money(&t)).unwrap_or_default(),
                            if o.is_active { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Kind", "Name", "Category", "Amount", "Frequency", "Start", "End", "Total", "Active"],
                        rows
                    )
                );
            }
        }
        Some(("show", sub)) => {
            let id = *sub.get_one::<i64>("id").context("id is required")?;
            let ob = conn
                .obligation(id)?
                .ok_or_else(|| EngineError::not_found("Obligation", id))?;
            println!("{}", serde_json::to_string_pretty(&ob)?);
        }
        _ => {}
    }
    Ok(())
}

fn obligation_from_args(sub: &clap::ArgMatches) -> Result<Obligation> {
    let text = |name: &str| sub.get_one::<String>(name);
    let kind: ObligationKind = text("kind").context("--kind is required")?.parse()?;
    let frequency: Frequency = text("frequency")
        .map(|s| s.parse::<Frequency>())
        .transpose()?
        .unwrap_or(Frequency::Monthly);
    Ok(Obligation {
        id: 0,
        kind,
        name: text("name").context("--name is required")?.trim().to_string(),
        category: text("category").map(|s| s.trim().to_string()),
        amount: parse_decimal(text("amount").context("--amount is required")?)?,
        frequency,
        start_date: parse_date(text("start").context("--start is required")?)?,
        end_date: text("end").map(|s| parse_date(s)).transpose()?,
        off_months: text("off-months")
            .map(|s| parse_list(s, parse_month))
            .transpose()?
            .unwrap_or_default(),
        custom_dates: text("dates")
            .map(|s| parse_list(s, parse_date))
            .transpose()?
            .unwrap_or_default(),
        first_payment_amount: text("first-amount").map(|s| parse_decimal(s)).transpose()?,
        total_amount: text("total").map(|s| parse_decimal(s)).transpose()?,
        is_active: !sub.get_flag("inactive"),
        timeline_revision: 0,
    })
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::{info, info_span};

use crate::engine::cashflow::{DeclaredSales, ProjectedOutflows, RecordedPayments, SourceResolver, aggregate};
use crate::engine::month::{Month, MonthRange};
use crate::errors::{EngineError, EngineResult};
use crate::models::MonthlyCashFlow;
use crate::store::{self, PaymentFilter, TimelineStore};
use crate::utils::{fmt_money, get_opening_balance, maybe_print_json, parse_decimal, pretty_table, today};

fn bound(raw: Option<&str>, which: &str) -> EngineResult<Month> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EngineError::validation(format!("{} month is required", which)))?;
    raw.parse()
}

/// Build, persist and return the monthly ledger for `start..=end` (YYYY-MM).
///
/// Recorded payments take precedence over sales and projections for the
/// same month and direction. The opening balance falls back to the
/// `opening_balance` setting.
pub fn project_cash_flow(
    conn: &mut Connection,
    start: Option<&str>,
    end: Option<&str>,
    opening_balance: Option<Decimal>,
    as_of: NaiveDate,
) -> EngineResult<Vec<MonthlyCashFlow>> {
    let range = MonthRange::checked(bound(start, "Start")?, bound(end, "End")?)?;
    let _span = info_span!("project_cash_flow", start = %range.start, end = %range.end).entered();

    let opening = match opening_balance {
        Some(o) => o,
        None => get_opening_balance(conn).map_err(|e| EngineError::Corrupt(e.to_string()))?,
    };

    let payments = conn.actual_payments(&PaymentFilter {
        range: Some(range),
        ..PaymentFilter::default()
    })?;
    let sales = store::sales_between(conn, range)?;
    let obligations = store::list_obligations(conn, true)?;
    let personnel = store::active_personnel(conn)?;
    let loan_payments = store::loan_payments_between(conn, range)?;

    let resolver = SourceResolver::new()
        .then(RecordedPayments::new(&payments))
        .then(DeclaredSales::new(&sales))
        .then(ProjectedOutflows::build(range, &obligations, &personnel, &loan_payments, as_of)?);
    let ledger = aggregate(range, &resolver, opening);

    store::save_cash_flow(conn, &ledger)?;
    info!(
        months = ledger.len(),
        closing = %ledger.last().map(|m| m.closing_balance).unwrap_or(opening),
        "cash flow projected"
    );
    Ok(ledger)
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("project", sub)) = m.subcommand() {
        let opening = sub
            .get_one::<String>("opening")
            .map(|s| parse_decimal(s))
            .transpose()?;
        let ledger = project_cash_flow(
            conn,
            sub.get_one::<String>("start").map(String::as_str),
            sub.get_one::<String>("end").map(String::as_str),
            opening,
            today(),
        )?;
        if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &ledger)? {
            let rows = ledger
                .iter()
                .map(|r| {
                    vec![
                        r.month.to_string(),
                        fmt_money(&r.opening_balance),
                        format!("{} ({})", fmt_money(&r.inflows), r.inflow_source),
                        format!("{} ({})", fmt_money(&r.outflows), r.outflow_source),
                        fmt_money(&r.net),
                        fmt_money(&r.closing_balance),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Month", "Opening", "Inflows", "Outflows", "Net", "Closing"], rows)
            );
        }
    }
    Ok(())
}

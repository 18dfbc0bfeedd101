// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::Serialize;

use crate::engine::month::MonthRange;
use crate::errors::EngineError;
use crate::store::{self, TimelineStore};
use crate::utils::{fmt_money, parse_month};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub month: String,
    pub name: String,
    pub category: String,
    pub amount: String,
    pub status: &'static str,
}

/// One row per timeline entry, obligations in id order. Settled entries
/// report their actual amount.
pub fn timeline_rows(conn: &Connection, obligation_id: Option<i64>, range: Option<MonthRange>) -> Result<Vec<ExportRow>> {
    let obligations = match obligation_id {
        Some(id) => vec![
            conn.obligation(id)?
                .ok_or_else(|| EngineError::not_found("Obligation", id))?,
        ],
        None => store::list_obligations(conn, false)?,
    };
    let mut rows = Vec::new();
    for ob in &obligations {
        for e in conn.timeline_entries(ob.id, range)? {
            let amount = if e.is_projected {
                e.amount
            } else {
                e.actual_amount.unwrap_or(e.amount)
            };
            rows.push(ExportRow {
                month: e.month.to_string(),
                name: ob.name.clone(),
                category: ob.label().to_string(),
                amount: fmt_money(&amount),
                status: if e.is_projected { "Projected" } else { "Actual" },
            });
        }
    }
    Ok(rows)
}

/// Write the timeline export to `out`. Unknown formats fail before anything
/// is written.
pub fn export_timeline(
    conn: &Connection,
    format: &str,
    out: &Path,
    obligation_id: Option<i64>,
    range: Option<MonthRange>,
) -> Result<usize> {
    let format = format.trim().to_lowercase();
    if format != "csv" && format != "json" {
        bail!("Unknown format: {} (use csv|json)", format);
    }
    let rows = timeline_rows(conn, obligation_id, range)?;
    match format.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            wtr.write_record(["Month", "Name", "Category/Type", "Amount", "Status"])?;
            for r in &rows {
                wtr.write_record([r.month.as_str(), r.name.as_str(), r.category.as_str(), r.amount.as_str(), r.status])?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
    }
    Ok(rows.len())
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("timeline", sub)) = m.subcommand() {
        let fmt = sub.get_one::<String>("format").context("--format is required")?;
        let out = sub.get_one::<String>("out").context("--out is required")?;
        let range = match (sub.get_one::<String>("start"), sub.get_one::<String>("end")) {
            (Some(s), Some(e)) => Some(MonthRange::checked(parse_month(s)?, parse_month(e)?)?),
            (None, None) => None,
            _ => bail!("--start and --end must be given together"),
        };
        let n = export_timeline(
            conn,
            fmt,
            Path::new(out),
            sub.get_one::<i64>("obligation").copied(),
            range,
        )?;
        println!("Exported {} timeline rows to {}", n, out);
    }
    Ok(())
}

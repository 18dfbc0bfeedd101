// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::sync::Once;

use crate::engine::month::Month;

static TRACING_INIT: Once = Once::new();

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default
/// `cashplan=info` directive.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("cashplan=info"));
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    });
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<Month> {
    Ok(s.parse::<Month>()?)
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Comma-separated list, blanks ignored.
pub fn parse_list<T>(s: &str, parse: impl Fn(&str) -> Result<T>) -> Result<Vec<T>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse)
        .collect()
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_base_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "base_currency")?.unwrap_or_else(|| "USD".to_string()))
}

/// Configured starting balance for cash-flow projections, zero when unset.
pub fn get_opening_balance(conn: &Connection) -> Result<Decimal> {
    match get_setting(conn, "opening_balance")? {
        Some(s) => s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid opening_balance setting '{}'", s)),
        None => Ok(Decimal::ZERO),
    }
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

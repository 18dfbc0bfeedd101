// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;

use crate::utils::{get_base_currency, get_opening_balance, get_setting, parse_decimal, set_setting};

const KNOWN: &[&str] = &["opening_balance", "base_currency"];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").context("key is required")?.trim();
            let value = sub.get_one::<String>("value").context("value is required")?.trim();
            let value = match key {
                "opening_balance" => parse_decimal(value)?.to_string(),
                "base_currency" => value.to_uppercase(),
                other => bail!("Unknown setting '{}' (known: {})", other, KNOWN.join(", ")),
            };
            set_setting(conn, key, &value)?;
            println!("{} = {}", key, value);
        }
        Some(("get", sub)) => match sub.get_one::<String>("key").map(|s| s.trim()) {
            Some("opening_balance") => println!("{}", get_opening_balance(conn)?),
            Some("base_currency") => println!("{}", get_base_currency(conn)?),
            Some(other) => match get_setting(conn, other)? {
                Some(v) => println!("{}", v),
                None => bail!("Setting '{}' is not set", other),
            },
            None => {
                println!("opening_balance = {}", get_opening_balance(conn)?);
                println!("base_currency = {}", get_base_currency(conn)?);
            }
        },
        _ => {}
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::Result;

use cashplan::{cli, commands, db, utils};

fn main() -> Result<()> {
    utils::init_tracing();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let path = match matches.get_one::<String>("db") {
        Some(p) => PathBuf::from(p),
        None => db::db_path()?,
    };
    let mut conn = db::open_at(&path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", path.display());
        }
        Some(("obligation", sub)) => commands::obligations::handle(&conn, sub)?,
        Some(("timeline", sub)) => commands::timeline::handle(&mut conn, sub)?,
        Some(("payment", sub)) => commands::payments::handle(&mut conn, sub)?,
        Some(("sale", sub)) => commands::records::handle_sale(&conn, sub)?,
        Some(("personnel", sub)) => commands::records::handle_personnel(&conn, sub)?,
        Some(("loan", sub)) => commands::records::handle_loan(&mut conn, sub)?,
        Some(("cashflow", sub)) => commands::cashflow::handle(&mut conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Cashplan", "cashplan"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("cashplan.sqlite"))
}

pub fn open_at(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS obligations(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL CHECK(kind IN ('leasing','subscription','expense')),
        name TEXT NOT NULL,
        category TEXT,
        amount TEXT NOT NULL,
        frequency TEXT NOT NULL CHECK(frequency IN ('one_time','monthly','quarterly','yearly','custom')),
        start_date TEXT NOT NULL,
        end_date TEXT,
        off_months TEXT NOT NULL DEFAULT '[]',     -- JSON array of YYYY-MM
        custom_dates TEXT NOT NULL DEFAULT '[]',   -- JSON array of YYYY-MM-DD
        first_payment_amount TEXT,
        total_amount TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        timeline_revision INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS timeline_entries(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        obligation_id INTEGER NOT NULL,
        month TEXT NOT NULL,
        payment_date TEXT NOT NULL,
        amount TEXT NOT NULL,
        is_projected INTEGER NOT NULL DEFAULT 1,
        is_fixed_amount INTEGER NOT NULL DEFAULT 0,
        is_paid INTEGER NOT NULL DEFAULT 0,
        paid_date TEXT,
        actual_amount TEXT,
        notes TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(obligation_id) REFERENCES obligations(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_timeline_obligation_month ON timeline_entries(obligation_id, month);

    CREATE TABLE IF NOT EXISTS actual_payments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        direction TEXT NOT NULL CHECK(direction IN ('input','output')),
        payment_type TEXT NOT NULL CHECK(payment_type IN ('sale','expense','subscription','leasing','loan')),
        reference_id INTEGER,
        schedule_entry_id INTEGER,
        month TEXT NOT NULL,
        payment_date TEXT NOT NULL,
        amount TEXT NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_actual_payments_month ON actual_payments(month);

    CREATE TABLE IF NOT EXISTS sales(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        kind TEXT NOT NULL,
        amount TEXT NOT NULL,
        description TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_sales_date ON sales(date);

    CREATE TABLE IF NOT EXISTS personnel(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        base_salary TEXT NOT NULL,
        employer_charges TEXT NOT NULL DEFAULT '0',
        charges_type TEXT NOT NULL CHECK(charges_type IN ('percentage','flat')),
        start_date TEXT NOT NULL,
        end_date TEXT,
        is_active INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS loans(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        principal TEXT NOT NULL,
        interest_rate TEXT NOT NULL,
        duration_months INTEGER NOT NULL,
        start_date TEXT NOT NULL,
        off_payment_months TEXT NOT NULL DEFAULT '[]'
    );

    CREATE TABLE IF NOT EXISTS loan_schedules(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        loan_id INTEGER NOT NULL,
        installment INTEGER NOT NULL,
        payment_date TEXT NOT NULL,
        principal_payment TEXT NOT NULL,
        interest_payment TEXT NOT NULL,
        total_payment TEXT NOT NULL,
        remaining_balance TEXT NOT NULL,
        is_paid INTEGER NOT NULL DEFAULT 0,
        UNIQUE(loan_id, installment),
        FOREIGN KEY(loan_id) REFERENCES loans(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_loan_schedules_date ON loan_schedules(payment_date);

    CREATE TABLE IF NOT EXISTS cash_flow_entries(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        month TEXT NOT NULL UNIQUE,
        opening_balance TEXT NOT NULL,
        cash_inflows TEXT NOT NULL,
        cash_outflows TEXT NOT NULL,
        net_cash_flow TEXT NOT NULL,
        closing_balance TEXT NOT NULL,
        notes TEXT,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

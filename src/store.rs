// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Row access for the engine. `TimelineStore` is the contract the timeline
//! operations run against; the free functions feed the cash-flow projection
//! and the CLI.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use rust_decimal::Decimal;
use tracing::info;

use crate::engine::month::{Month, MonthRange};
use crate::engine::synchronizer::TimelineBatch;
use crate::errors::{EngineError, EngineResult};
use crate::models::{
    ActualPayment, Direction, Loan, LoanScheduleEntry, MonthlyCashFlow, Obligation, PaymentType,
    Personnel, Sale, TimelineEntry,
};

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub direction: Option<Direction>,
    pub payment_type: Option<PaymentType>,
    pub reference_id: Option<i64>,
    pub schedule_entry_id: Option<i64>,
    pub range: Option<MonthRange>,
}

pub trait TimelineStore {
    fn obligation(&self, id: i64) -> EngineResult<Option<Obligation>>;

    /// Entries ordered by month, payment date, id.
    fn timeline_entries(&self, obligation_id: i64, range: Option<MonthRange>) -> EngineResult<Vec<TimelineEntry>>;

    fn timeline_entry(&self, id: i64) -> EngineResult<Option<TimelineEntry>>;

    fn actual_payments(&self, filter: &PaymentFilter) -> EngineResult<Vec<ActualPayment>>;

    /// Apply `batch` all-or-nothing. Fails with `Conflict` when the stored
    /// revision is not `expected_revision`; returns the new revision.
    fn apply_timeline_batch(
        &mut self,
        obligation_id: i64,
        expected_revision: i64,
        batch: &TimelineBatch,
    ) -> EngineResult<i64>;
}

pub(crate) fn decimal(raw: &str, what: &str) -> EngineResult<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| EngineError::Corrupt(format!("Invalid {} '{}'", what, raw)))
}

fn opt_decimal(raw: Option<String>, what: &str) -> EngineResult<Option<Decimal>> {
    raw.map(|s| decimal(&s, what)).transpose()
}

fn month(raw: &str) -> EngineResult<Month> {
    raw.parse::<Month>()
        .map_err(|_| EngineError::Corrupt(format!("Invalid month '{}'", raw)))
}

fn json_list<T: serde::de::DeserializeOwned>(raw: &str, what: &str) -> EngineResult<Vec<T>> {
    serde_json::from_str(raw).map_err(|e| EngineError::Corrupt(format!("Invalid {} '{}': {}", what, raw, e)))
}

fn text_enum<T: std::str::FromStr<Err = EngineError>>(raw: &str) -> EngineResult<T> {
    raw.parse::<T>()
        .map_err(|e| EngineError::Corrupt(e.to_string()))
}

const OBLIGATION_COLS: &str = "id, kind, name, category, amount, frequency, start_date, end_date, \
     off_months, custom_dates, first_payment_amount, total_amount, is_active, timeline_revision";

fn obligation_from_row(r: &Row<'_>) -> EngineResult<Obligation> {
    let amount: String = r.get(4)?;
    let off: String = r.get(8)?;
    let custom: String = r.get(9)?;
    Ok(Obligation {
        id: r.get(0)?,
        kind: text_enum(&r.get::<_, String>(1)?)?,
        name: r.get(2)?,
        category: r.get(3)?,
        amount: decimal(&amount, "obligation amount")?,
        frequency: text_enum(&r.get::<_, String>(5)?)?,
        start_date: r.get(6)?,
        end_date: r.get(7)?,
        off_months: json_list(&off, "off months")?,
        custom_dates: json_list(&custom, "custom dates")?,
        first_payment_amount: opt_decimal(r.get(10)?, "first payment amount")?,
        total_amount: opt_decimal(r.get(11)?, "total amount")?,
        is_active: r.get(12)?,
        timeline_revision: r.get(13)?,
    })
}

const ENTRY_COLS: &str = "id, obligation_id, month, payment_date, amount, is_projected, \
     is_fixed_amount, is_paid, paid_date, actual_amount, notes";

fn entry_from_row(r: &Row<'_>) -> EngineResult<TimelineEntry> {
    let amount: String = r.get(4)?;
    Ok(TimelineEntry {
        id: r.get(0)?,
        obligation_id: r.get(1)?,
        month: month(&r.get::<_, String>(2)?)?,
        payment_date: r.get(3)?,
        amount: decimal(&amount, "timeline amount")?,
        is_projected: r.get(5)?,
        is_fixed_amount: r.get(6)?,
        is_paid: r.get(7)?,
        paid_date: r.get(8)?,
        actual_amount: opt_decimal(r.get(9)?, "actual amount")?,
        notes: r.get(10)?,
    })
}

const PAYMENT_COLS: &str = "id, direction, payment_type, reference_id, schedule_entry_id, month, \
     payment_date, amount, notes";

fn payment_from_row(r: &Row<'_>) -> EngineResult<ActualPayment> {
    let amount: String = r.get(7)?;
    Ok(ActualPayment {
        id: r.get(0)?,
        direction: text_enum(&r.get::<_, String>(1)?)?,
        payment_type: text_enum(&r.get::<_, String>(2)?)?,
        reference_id: r.get(3)?,
        schedule_entry_id: r.get(4)?,
        month: month(&r.get::<_, String>(5)?)?,
        payment_date: r.get(6)?,
        amount: decimal(&amount, "payment amount")?,
        notes: r.get(8)?,
    })
}

impl TimelineStore for Connection {
    fn obligation(&self, id: i64) -> EngineResult<Option<Obligation>> {
        let mut stmt = self.prepare(&format!("SELECT {} FROM obligations WHERE id=?1", OBLIGATION_COLS))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(r) => Ok(Some(obligation_from_row(r)?)),
            None => Ok(None),
        }
    }

    fn timeline_entries(&self, obligation_id: i64, range: Option<MonthRange>) -> EngineResult<Vec<TimelineEntry>> {
        let (lo, hi) = match range {
            Some(r) => (r.start.to_string(), r.end.to_string()),
            None => ("0000-01".to_string(), "9999-12".to_string()),
        };
        let mut stmt = self.prepare(&format!(
            "SELECT {} FROM timeline_entries WHERE obligation_id=?1 AND month>=?2 AND month<=?3
             ORDER BY month, payment_date, id",
            ENTRY_COLS
        ))?;
        let mut rows = stmt.query(params![obligation_id, lo, hi])?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            out.push(entry_from_row(r)?);
        }
        Ok(out)
    }

    fn timeline_entry(&self, id: i64) -> EngineResult<Option<TimelineEntry>> {
        let mut stmt = self.prepare(&format!("SELECT {} FROM timeline_entries WHERE id=?1", ENTRY_COLS))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(r) => Ok(Some(entry_from_row(r)?)),
            None => Ok(None),
        }
    }

    fn actual_payments(&self, filter: &PaymentFilter) -> EngineResult<Vec<ActualPayment>> {
        let mut sql = format!("SELECT {} FROM actual_payments WHERE 1=1", PAYMENT_COLS);
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(d) = filter.direction {
            sql.push_str(" AND direction=?");
            args.push(Box::new(d.as_str()));
        }
        if let Some(t) = filter.payment_type {
            sql.push_str(" AND payment_type=?");
            args.push(Box::new(t.as_str()));
        }
        if let Some(id) = filter.reference_id {
            sql.push_str(" AND reference_id=?");
            args.push(Box::new(id));
        }
        if let Some(id) = filter.schedule_entry_id {
            sql.push_str(" AND schedule_entry_id=?");
            args.push(Box::new(id));
        }
        if let Some(r) = filter.range {
            sql.push_str(" AND month>=? AND month<=?");
            args.push(Box::new(r.start.to_string()));
            args.push(Box::new(r.end.to_string()));
        }
        sql.push_str(" ORDER BY payment_date, id");

        let mut stmt = self.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(args.iter()))?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            out.push(payment_from_row(r)?);
        }
        Ok(out)
    }

    fn apply_timeline_batch(
        &mut self,
        obligation_id: i64,
        expected_revision: i64,
        batch: &TimelineBatch,
    ) -> EngineResult<i64> {
        let tx = self.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let revision = write_timeline_batch(&tx, obligation_id, expected_revision, batch)?;
        tx.commit()?;
        Ok(revision)
    }
}

/// Check the revision, write `batch` and bump the revision, on a connection
/// that is already inside a transaction.
pub fn write_timeline_batch(
    tx: &Connection,
    obligation_id: i64,
    expected_revision: i64,
    batch: &TimelineBatch,
) -> EngineResult<i64> {
    let found: i64 = tx
        .query_row(
            "SELECT timeline_revision FROM obligations WHERE id=?1",
            params![obligation_id],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| EngineError::not_found("Obligation", obligation_id))?;
    if found != expected_revision {
        return Err(EngineError::Conflict {
            obligation_id,
            expected: expected_revision,
            found,
        });
    }

    for e in &batch.inserts {
        tx.execute(
            "INSERT INTO timeline_entries(obligation_id, month, payment_date, amount, is_projected)
             VALUES (?1,?2,?3,?4,?5)",
            params![
                obligation_id,
                e.month.to_string(),
                e.payment_date,
                e.amount.to_string(),
                e.is_projected
            ],
        )
        .map_err(|source| EngineError::PartialWrite {
            operation: "insert",
            entries: vec![format!("{} {}", e.month, e.payment_date)],
            source,
        })?;
    }

    // Payment history columns stay out of the SET list.
    for e in &batch.updates {
        tx.execute(
            "UPDATE timeline_entries
             SET month=?1, payment_date=?2, amount=?3, is_projected=?4, updated_at=datetime('now')
             WHERE id=?5 AND obligation_id=?6",
            params![
                e.month.to_string(),
                e.payment_date,
                e.amount.to_string(),
                e.is_projected,
                e.id,
                obligation_id
            ],
        )
        .map_err(|source| EngineError::PartialWrite {
            operation: "update",
            entries: vec![e.id.to_string()],
            source,
        })?;
    }

    for id in &batch.deletes {
        tx.execute(
            "DELETE FROM timeline_entries
             WHERE id=?1 AND obligation_id=?2 AND is_fixed_amount=0 AND is_paid=0 AND actual_amount IS NULL",
            params![id, obligation_id],
        )
        .map_err(|source| EngineError::PartialWrite {
            operation: "delete",
            entries: vec![id.to_string()],
            source,
        })?;
    }

    bump_revision(tx, obligation_id)?;

    info!(
        obligation_id,
        inserted = batch.inserts.len(),
        updated = batch.updates.len(),
        deleted = batch.deletes.len(),
        revision = found + 1,
        "timeline batch applied"
    );
    Ok(found + 1)
}

fn bump_revision(conn: &Connection, obligation_id: i64) -> EngineResult<()> {
    conn.execute(
        "UPDATE obligations SET timeline_revision=timeline_revision+1 WHERE id=?1",
        params![obligation_id],
    )?;
    Ok(())
}

fn bump_revision_of_entry(conn: &Connection, entry_id: i64) -> EngineResult<()> {
    conn.execute(
        "UPDATE obligations SET timeline_revision=timeline_revision+1
         WHERE id=(SELECT obligation_id FROM timeline_entries WHERE id=?1)",
        params![entry_id],
    )?;
    Ok(())
}

pub fn insert_obligation(conn: &Connection, ob: &Obligation) -> EngineResult<i64> {
    let off = serde_json::to_string(&ob.off_months).map_err(|e| EngineError::validation(e.to_string()))?;
    let custom = serde_json::to_string(&ob.custom_dates).map_err(|e| EngineError::validation(e.to_string()))?;
    conn.execute(
        "INSERT INTO obligations(kind, name, category, amount, frequency, start_date, end_date,
             off_months, custom_dates, first_payment_amount, total_amount, is_active)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
        params![
            ob.kind.as_str(),
            ob.name,
            ob.category,
            ob.amount.to_string(),
            ob.frequency.as_str(),
            ob.start_date,
            ob.end_date,
            off,
            custom,
            ob.first_payment_amount.map(|d| d.to_string()),
            ob.total_amount.map(|d| d.to_string()),
            ob.is_active
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_obligations(conn: &Connection, active_only: bool) -> EngineResult<Vec<Obligation>> {
    let mut sql = format!("SELECT {} FROM obligations", OBLIGATION_COLS);
    if active_only {
        sql.push_str(" WHERE is_active=1");
    }
    sql.push_str(" ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(obligation_from_row(r)?);
    }
    Ok(out)
}

/// Edit fields of one entry and bump its obligation's timeline revision.
/// Payment history is edited through `mark_entry_paid`.
pub fn update_entry_fields(
    conn: &Connection,
    entry_id: i64,
    amount: Option<Decimal>,
    is_fixed_amount: Option<bool>,
    payment_date: Option<NaiveDate>,
    notes: Option<&str>,
) -> EngineResult<()> {
    let changed = conn.execute(
        "UPDATE timeline_entries
         SET amount=COALESCE(?1, amount),
             is_fixed_amount=COALESCE(?2, is_fixed_amount),
             payment_date=COALESCE(?3, payment_date),
             notes=COALESCE(?4, notes),
             updated_at=datetime('now')
         WHERE id=?5",
        params![
            amount.map(|d| d.to_string()),
            is_fixed_amount,
            payment_date,
            notes,
            entry_id
        ],
    )?;
    if changed == 0 {
        return Err(EngineError::not_found("Timeline entry", entry_id));
    }
    bump_revision_of_entry(conn, entry_id)
}

pub fn mark_entry_paid(
    conn: &Connection,
    entry_id: i64,
    paid_date: NaiveDate,
    actual_amount: Decimal,
    fully_paid: bool,
) -> EngineResult<()> {
    conn.execute(
        "UPDATE timeline_entries
         SET is_paid=?1, paid_date=?2, actual_amount=?3, is_projected=0, updated_at=datetime('now')
         WHERE id=?4",
        params![fully_paid, paid_date, actual_amount.to_string(), entry_id],
    )?;
    bump_revision_of_entry(conn, entry_id)
}

pub fn insert_payment(conn: &Connection, p: &ActualPayment) -> EngineResult<i64> {
    conn.execute(
        "INSERT INTO actual_payments(direction, payment_type, reference_id, schedule_entry_id, month,
             payment_date, amount, notes)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
        params![
            p.direction.as_str(),
            p.payment_type.as_str(),
            p.reference_id,
            p.schedule_entry_id,
            p.month.to_string(),
            p.payment_date,
            p.amount.to_string(),
            p.notes
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn sales_between(conn: &Connection, range: MonthRange) -> EngineResult<Vec<Sale>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, kind, amount, description FROM sales WHERE date>=?1 AND date<=?2 ORDER BY date, id",
    )?;
    let mut rows = stmt.query(params![range.start.first_day(), range.end.last_day()])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(sale_from_row(r)?);
    }
    Ok(out)
}

pub fn list_sales(conn: &Connection) -> EngineResult<Vec<Sale>> {
    let mut stmt = conn.prepare("SELECT id, date, kind, amount, description FROM sales ORDER BY date, id")?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(sale_from_row(r)?);
    }
    Ok(out)
}

fn sale_from_row(r: &Row<'_>) -> EngineResult<Sale> {
    let amount: String = r.get(3)?;
    Ok(Sale {
        id: r.get(0)?,
        date: r.get(1)?,
        kind: r.get(2)?,
        amount: decimal(&amount, "sale amount")?,
        description: r.get(4)?,
    })
}

pub fn active_personnel(conn: &Connection) -> EngineResult<Vec<Personnel>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, base_salary, employer_charges, charges_type, start_date, end_date, is_active
         FROM personnel WHERE is_active=1 ORDER BY id",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let base: String = r.get(2)?;
        let charges: String = r.get(3)?;
        out.push(Personnel {
            id: r.get(0)?,
            name: r.get(1)?,
            base_salary: decimal(&base, "base salary")?,
            employer_charges: decimal(&charges, "employer charges")?,
            charges_type: text_enum(&r.get::<_, String>(4)?)?,
            start_date: r.get(5)?,
            end_date: r.get(6)?,
            is_active: r.get(7)?,
        });
    }
    Ok(out)
}

const LOAN_COLS: &str = "id, name, principal, interest_rate, duration_months, start_date, off_payment_months";

fn loan_from_row(r: &Row<'_>) -> EngineResult<Loan> {
    let principal: String = r.get(2)?;
    let rate: String = r.get(3)?;
    let off: String = r.get(6)?;
    Ok(Loan {
        id: r.get(0)?,
        name: r.get(1)?,
        principal: decimal(&principal, "loan principal")?,
        interest_rate: decimal(&rate, "interest rate")?,
        duration_months: r.get(4)?,
        start_date: r.get(5)?,
        off_payment_months: json_list(&off, "off payment months")?,
    })
}

pub fn loan(conn: &Connection, id: i64) -> EngineResult<Option<Loan>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM loans WHERE id=?1", LOAN_COLS))?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => Ok(Some(loan_from_row(r)?)),
        None => Ok(None),
    }
}

pub fn list_loans(conn: &Connection) -> EngineResult<Vec<Loan>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM loans ORDER BY id", LOAN_COLS))?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(loan_from_row(r)?);
    }
    Ok(out)
}

pub fn insert_loan(conn: &mut Connection, loan: &Loan, schedule: &[LoanScheduleEntry]) -> EngineResult<i64> {
    let off = serde_json::to_string(&loan.off_payment_months).map_err(|e| EngineError::validation(e.to_string()))?;
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO loans(name, principal, interest_rate, duration_months, start_date, off_payment_months)
         VALUES (?1,?2,?3,?4,?5,?6)",
        params![
            loan.name,
            loan.principal.to_string(),
            loan.interest_rate.to_string(),
            loan.duration_months,
            loan.start_date,
            off
        ],
    )?;
    let loan_id = tx.last_insert_rowid();
    for row in schedule {
        tx.execute(
            "INSERT INTO loan_schedules(loan_id, installment, payment_date, principal_payment,
                 interest_payment, total_payment, remaining_balance, is_paid)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            params![
                loan_id,
                row.installment,
                row.payment_date,
                row.principal_payment.to_string(),
                row.interest_payment.to_string(),
                row.total_payment.to_string(),
                row.remaining_balance.to_string(),
                row.is_paid
            ],
        )?;
    }
    tx.commit()?;
    Ok(loan_id)
}

pub fn loan_payments_between(conn: &Connection, range: MonthRange) -> EngineResult<Vec<LoanScheduleEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, loan_id, installment, payment_date, principal_payment, interest_payment,
             total_payment, remaining_balance, is_paid
         FROM loan_schedules WHERE payment_date>=?1 AND payment_date<=?2
         ORDER BY payment_date, loan_id, installment",
    )?;
    let mut rows = stmt.query(params![range.start.first_day(), range.end.last_day()])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(schedule_from_row(r)?);
    }
    Ok(out)
}

fn schedule_from_row(r: &Row<'_>) -> EngineResult<LoanScheduleEntry> {
    let principal: String = r.get(4)?;
    let interest: String = r.get(5)?;
    let total: String = r.get(6)?;
    let remaining: String = r.get(7)?;
    Ok(LoanScheduleEntry {
        id: r.get(0)?,
        loan_id: r.get(1)?,
        installment: r.get(2)?,
        payment_date: r.get(3)?,
        principal_payment: decimal(&principal, "principal payment")?,
        interest_payment: decimal(&interest, "interest payment")?,
        total_payment: decimal(&total, "total payment")?,
        remaining_balance: decimal(&remaining, "remaining balance")?,
        is_paid: r.get(8)?,
    })
}

/// Upsert derived monthly records, one transaction for the whole range.
pub fn save_cash_flow(conn: &mut Connection, rows: &[MonthlyCashFlow]) -> EngineResult<()> {
    let tx = conn.transaction()?;
    for row in rows {
        tx.execute(
            "INSERT INTO cash_flow_entries(month, opening_balance, cash_inflows, cash_outflows,
                 net_cash_flow, closing_balance, notes)
             VALUES (?1,?2,?3,?4,?5,?6,?7)
             ON CONFLICT(month) DO UPDATE SET
                 opening_balance=excluded.opening_balance,
                 cash_inflows=excluded.cash_inflows,
                 cash_outflows=excluded.cash_outflows,
                 net_cash_flow=excluded.net_cash_flow,
                 closing_balance=excluded.closing_balance,
                 notes=excluded.notes,
                 updated_at=datetime('now')",
            params![
                row.month.to_string(),
                row.opening_balance.to_string(),
                row.inflows.to_string(),
                row.outflows.to_string(),
                row.net.to_string(),
                row.closing_balance.to_string(),
                format!(
                    "Auto-calculated projection (inflows: {}, outflows: {})",
                    row.inflow_source, row.outflow_source
                )
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn loan_installment(conn: &Connection, id: i64) -> EngineResult<Option<(i64, Decimal)>> {
    let row = conn
        .query_row(
            "SELECT loan_id, total_payment FROM loan_schedules WHERE id=?1",
            params![id],
            |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)),
        )
        .optional()?;
    row.map(|(loan_id, total)| Ok((loan_id, decimal(&total, "total payment")?)))
        .transpose()
}

pub fn mark_installment_paid(conn: &Connection, id: i64) -> EngineResult<()> {
    conn.execute("UPDATE loan_schedules SET is_paid=1 WHERE id=?1", params![id])?;
    Ok(())
}

pub fn loan_schedule(conn: &Connection, loan_id: i64) -> EngineResult<Vec<LoanScheduleEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, loan_id, installment, payment_date, principal_payment, interest_payment,
             total_payment, remaining_balance, is_paid
         FROM loan_schedules WHERE loan_id=?1 ORDER BY installment",
    )?;
    let mut rows = stmt.query(params![loan_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(schedule_from_row(r)?);
    }
    Ok(out)
}

pub fn insert_sale(conn: &Connection, sale: &Sale) -> EngineResult<i64> {
    conn.execute(
        "INSERT INTO sales(date, kind, amount, description) VALUES (?1,?2,?3,?4)",
        params![sale.date, sale.kind, sale.amount.to_string(), sale.description],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_personnel(conn: &Connection, p: &Personnel) -> EngineResult<i64> {
    conn.execute(
        "INSERT INTO personnel(name, base_salary, employer_charges, charges_type, start_date, end_date, is_active)
         VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            p.name,
            p.base_salary.to_string(),
            p.employer_charges.to_string(),
            p.charges_type.as_str(),
            p.start_date,
            p.end_date,
            p.is_active
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

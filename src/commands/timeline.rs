// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, info_span};

use crate::engine::month::{Month, MonthRange};
use crate::engine::projector;
use crate::engine::reconciler::{ChangeTarget, Reconciliation, Slot, SlotKey, reconcile};
use crate::engine::redistribution::{RedistributionPlan, RedistributionWarning, redistribute};
use crate::engine::synchronizer::{TimelineBatch, synchronize};
use crate::errors::{EngineError, EngineResult};
use crate::models::{ActualPayment, Obligation, TimelineEntry};
use crate::store::{self, PaymentFilter, TimelineStore};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table, today};

/// Default window: the obligation's term, or twelve months past its start
/// when it is open-ended.
pub fn default_window(ob: &Obligation) -> MonthRange {
    let start = ob.start_month();
    let end = ob.end_month().unwrap_or_else(|| start.add_months(12));
    MonthRange::new(start, end)
}

#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub start: Option<Month>,
    pub end: Option<Month>,
    pub change: Option<ChangeTarget>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutcome {
    pub obligation_id: i64,
    pub window_start: Month,
    pub window_end: Month,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped_fixed: bool,
    pub redistribution: Option<RedistributionPlan>,
    pub revision: i64,
    pub entries: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecalcOutcome {
    pub obligation_id: i64,
    pub entry_id: i64,
    pub updated_count: usize,
    pub amount_per_entry: Option<Decimal>,
    pub allocated_sum: Decimal,
    pub remaining: Option<Decimal>,
    pub warning: Option<RedistributionWarning>,
    pub skipped_fixed: bool,
    pub revision: i64,
    /// (entry id, new amount)
    pub adjustments: Vec<(i64, Decimal)>,
}

fn load_obligation<S: TimelineStore>(store: &S, obligation_id: i64) -> EngineResult<Obligation> {
    store
        .obligation(obligation_id)?
        .ok_or_else(|| EngineError::not_found("Obligation", obligation_id))
}

fn obligation_payments<S: TimelineStore>(store: &S, ob: &Obligation) -> EngineResult<Vec<ActualPayment>> {
    store.actual_payments(&PaymentFilter {
        payment_type: Some(ob.kind.payment_type()),
        reference_id: Some(ob.id),
        ..PaymentFilter::default()
    })
}

/// Recompute and persist the timeline of one obligation for a window.
///
/// Projects the window, partitions the whole lifetime around the change
/// target (if any), redistributes, diffs and writes the result as one batch
/// guarded by the obligation's revision. Returns the window's entries.
pub fn generate_timeline<S: TimelineStore>(
    store: &mut S,
    obligation_id: i64,
    req: &GenerateRequest,
    as_of: NaiveDate,
) -> EngineResult<GenerateOutcome> {
    let _span = info_span!("generate_timeline", obligation_id).entered();

    let ob = load_obligation(store, obligation_id)?;
    let defaults = default_window(&ob);
    let window = MonthRange::checked(
        req.start.unwrap_or(defaults.start),
        req.end.unwrap_or(defaults.end),
    )?;

    let occurrences = projector::project(&ob, window, as_of)?;
    let persisted = store.timeline_entries(ob.id, None)?;
    let payments = obligation_payments(store, &ob)?;

    // The structural diff does not depend on amounts; it tells which stored
    // entries survive and which occurrences are new.
    let shape = synchronize(ob.id, &occurrences, &persisted, window, &BTreeMap::new());
    let doomed: HashSet<i64> = shape.deletes.iter().copied().collect();
    let mut slots: Vec<Slot> = persisted
        .iter()
        .filter(|e| !doomed.contains(&e.id))
        .map(Slot::from_entry)
        .collect();
    slots.extend(occurrences.iter().filter(|o| {
        shape
            .inserts
            .iter()
            .any(|n| n.month == o.month && n.payment_date == o.payment_date)
    }).map(Slot::pending));

    let (partition, skipped_fixed) = match reconcile(&slots, &payments, req.change, ob.end_month())? {
        Reconciliation::Ready(part) => (part, false),
        Reconciliation::SkippedFixed { .. } => {
            match reconcile(&slots, &payments, None, ob.end_month())? {
                Reconciliation::Ready(part) => (part, true),
                Reconciliation::SkippedFixed { key } => {
                    return Err(EngineError::Corrupt(format!("unexpected skip for {:?}", key)));
                }
            }
        }
    };

    let plan = if skipped_fixed {
        None
    } else if ob.total_amount.is_some() || partition.changed.is_some() {
        Some(redistribute(&partition, ob.total_amount))
    } else {
        None
    };

    let mut amounts = partition.retained_amounts();
    if let Some(p) = &plan {
        amounts.extend(p.adjustments.iter().map(|(k, v)| (*k, *v)));
    }

    let batch = synchronize(ob.id, &occurrences, &persisted, window, &amounts);
    let revision = if batch.is_empty() {
        ob.timeline_revision
    } else {
        store.apply_timeline_batch(ob.id, ob.timeline_revision, &batch)?
    };

    info!(
        window_start = %window.start,
        window_end = %window.end,
        occurrences = occurrences.len(),
        skipped_fixed,
        "timeline generated"
    );

    Ok(GenerateOutcome {
        obligation_id: ob.id,
        window_start: window.start,
        window_end: window.end,
        inserted: batch.inserts.len(),
        updated: batch.updates.len(),
        deleted: batch.deletes.len(),
        skipped_fixed,
        redistribution: plan,
        revision,
        entries: store.timeline_entries(ob.id, Some(window))?,
    })
}

/// Redistribute after one entry was edited, without regenerating the timeline.
///
/// `expected_revision`, when given, must match the obligation's current
/// timeline revision.
pub fn recalculate_timeline<S: TimelineStore>(
    store: &mut S,
    obligation_id: i64,
    entry_id: Option<i64>,
    expected_revision: Option<i64>,
) -> EngineResult<RecalcOutcome> {
    let entry_id = entry_id.ok_or_else(|| EngineError::validation("entry id is required"))?;
    let _span = info_span!("recalculate_timeline", obligation_id, entry_id).entered();

    let ob = load_obligation(store, obligation_id)?;
    if let Some(expected) = expected_revision {
        if expected != ob.timeline_revision {
            return Err(EngineError::Conflict {
                obligation_id,
                expected,
                found: ob.timeline_revision,
            });
        }
    }
    match store.timeline_entry(entry_id)? {
        Some(e) if e.obligation_id == ob.id => {}
        _ => return Err(EngineError::not_found("Timeline entry", entry_id)),
    }

    let (mut outcome, batch) = plan_recalculation(store, &ob, entry_id)?;
    if !batch.is_empty() {
        outcome.revision = store.apply_timeline_batch(ob.id, ob.timeline_revision, &batch)?;
    }
    Ok(outcome)
}

/// Redistribute around `entry_id` and return the outcome (at the current
/// revision) with the updates still to be written.
fn plan_recalculation<S: TimelineStore>(
    store: &S,
    ob: &Obligation,
    entry_id: i64,
) -> EngineResult<(RecalcOutcome, TimelineBatch)> {
    let entries = store.timeline_entries(ob.id, None)?;
    let payments = obligation_payments(store, ob)?;
    let slots: Vec<Slot> = entries.iter().map(Slot::from_entry).collect();

    let mut outcome = RecalcOutcome {
        obligation_id: ob.id,
        entry_id,
        updated_count: 0,
        amount_per_entry: None,
        allocated_sum: Decimal::ZERO,
        remaining: None,
        warning: None,
        skipped_fixed: false,
        revision: ob.timeline_revision,
        adjustments: Vec::new(),
    };
    let part = match reconcile(&slots, &payments, Some(ChangeTarget::Entry(entry_id)), ob.end_month())? {
        Reconciliation::Ready(part) => part,
        Reconciliation::SkippedFixed { .. } => {
            info!("changed entry is fixed; nothing to redistribute");
            outcome.skipped_fixed = true;
            return Ok((outcome, TimelineBatch::default()));
        }
    };
    let plan = redistribute(&part, ob.total_amount);

    let mut batch = TimelineBatch::default();
    for (key, amount) in &plan.adjustments {
        let SlotKey::Entry(id) = key else { continue };
        if let Some(e) = entries.iter().find(|e| e.id == *id) {
            if e.amount != *amount {
                let mut next = e.clone();
                next.amount = *amount;
                batch.updates.push(next);
            }
        }
    }

    outcome.updated_count = batch.updates.len();
    outcome.amount_per_entry = plan.amount_per_entry;
    outcome.allocated_sum = plan.allocated_sum;
    outcome.remaining = plan.remaining;
    outcome.warning = plan.warning;
    outcome.adjustments = batch.updates.iter().map(|e| (e.id, e.amount)).collect();
    Ok((outcome, batch))
}

#[derive(Debug, Clone, Default)]
pub struct EntryChanges {
    pub amount: Option<Decimal>,
    pub is_fixed_amount: Option<bool>,
    pub payment_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Edit one entry; when `recalc` is set and the amount changed, redistribute
/// around it. The edit and the redistribution commit together.
pub fn update_entry(
    conn: &mut Connection,
    obligation_id: i64,
    entry_id: i64,
    changes: &EntryChanges,
    recalc: bool,
) -> EngineResult<Option<RecalcOutcome>> {
    if let Some(amount) = changes.amount {
        if amount.is_sign_negative() {
            return Err(EngineError::validation(format!("Negative amount {}", amount)));
        }
    }
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    match tx.timeline_entry(entry_id)? {
        Some(e) if e.obligation_id == obligation_id => {}
        _ => return Err(EngineError::not_found("Timeline entry", entry_id)),
    }
    store::update_entry_fields(
        &tx,
        entry_id,
        changes.amount,
        changes.is_fixed_amount,
        changes.payment_date,
        changes.notes.as_deref(),
    )?;

    let outcome = if recalc && changes.amount.is_some() {
        let ob = load_obligation(&*tx, obligation_id)?;
        let (mut outcome, batch) = plan_recalculation(&*tx, &ob, entry_id)?;
        if !batch.is_empty() {
            outcome.revision = store::write_timeline_batch(&tx, ob.id, ob.timeline_revision, &batch)?;
        }
        Some(outcome)
    } else {
        None
    };
    tx.commit()?;
    Ok(outcome)
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("generate", sub)) => generate(conn, sub)?,
        Some(("recalc", sub)) => recalc(conn, sub)?,
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn obligation_arg(sub: &clap::ArgMatches) -> Result<i64> {
    sub.get_one::<i64>("obligation")
        .copied()
        .context("--obligation is required")
}

fn month_arg(sub: &clap::ArgMatches, name: &str) -> Result<Option<Month>> {
    sub.get_one::<String>(name).map(|s| parse_month(s)).transpose()
}

fn generate(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let obligation_id = obligation_arg(sub)?;
    let change = match (sub.get_one::<i64>("changed-entry"), month_arg(sub, "changed-month")?) {
        (Some(id), _) => Some(ChangeTarget::Entry(*id)),
        (None, Some(month)) => Some(ChangeTarget::Month(month)),
        (None, None) => None,
    };
    let req = GenerateRequest {
        start: month_arg(sub, "start")?,
        end: month_arg(sub, "end")?,
        change,
    };
    let outcome = generate_timeline(conn, obligation_id, &req, today())?;
    if !maybe_print_json(sub.get_flag("json"), false, &outcome)? {
        println!(
            "Timeline {}..{} for obligation {}: {} inserted, {} updated, {} deleted (revision {})",
            outcome.window_start,
            outcome.window_end,
            obligation_id,
            outcome.inserted,
            outcome.updated,
            outcome.deleted,
            outcome.revision
        );
        if let Some(w) = outcome.redistribution.as_ref().and_then(|p| p.warning) {
            println!("Warning: {}", describe_warning(&w));
        }
        println!("{}", entries_table(&outcome.entries));
    }
    Ok(())
}

fn recalc(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let obligation_id = obligation_arg(sub)?;
    let entry_id = sub.get_one::<i64>("entry").copied();
    let revision = sub.get_one::<i64>("revision").copied();
    let outcome = recalculate_timeline(conn, obligation_id, entry_id, revision)?;
    if !maybe_print_json(sub.get_flag("json"), false, &outcome)? {
        print_recalc(&outcome);
    }
    Ok(())
}

fn set(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let obligation_id = obligation_arg(sub)?;
    let entry_id = *sub.get_one::<i64>("entry").context("--entry is required")?;
    let changes = EntryChanges {
        amount: sub.get_one::<String>("amount").map(|s| parse_decimal(s)).transpose()?,
        is_fixed_amount: sub.get_one::<bool>("fixed").copied(),
        payment_date: sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?,
        notes: sub.get_one::<String>("notes").map(|s| s.trim().to_string()),
    };
    let outcome = update_entry(conn, obligation_id, entry_id, &changes, !sub.get_flag("no-recalc"))?;
    println!("Updated entry {}", entry_id);
    if let Some(o) = outcome {
        print_recalc(&o);
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let obligation_id = obligation_arg(sub)?;
    let range = match (month_arg(sub, "start")?, month_arg(sub, "end")?) {
        (Some(s), Some(e)) => Some(MonthRange::checked(s, e)?),
        (None, None) => None,
        _ => anyhow::bail!("--start and --end must be given together"),
    };
    let entries = conn.timeline_entries(obligation_id, range)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entries)? {
        println!("{}", entries_table(&entries));
    }
    Ok(())
}

fn print_recalc(o: &RecalcOutcome) {
    if o.skipped_fixed {
        println!("Entry {} is fixed; no recalculation", o.entry_id);
        return;
    }
    println!(
        "Updated {} entries (allocated {}, remaining {}, per entry {})",
        o.updated_count,
        fmt_money(&o.allocated_sum),
        o.remaining.map(|r| fmt_money(&r)).unwrap_or_else(|| "-".into()),
        o.amount_per_entry.map(|a| fmt_money(&a)).unwrap_or_else(|| "-".into()),
    );
    if let Some(w) = &o.warning {
        println!("Warning: {}", describe_warning(w));
    }
}

fn describe_warning(w: &RedistributionWarning) -> String {
    match w {
        RedistributionWarning::UnallocatedRemainder { remaining } => format!(
            "{} of the total could not be allocated: every remaining entry is fixed or paid",
            fmt_money(remaining)
        ),
        RedistributionWarning::OverAllocated { excess } => format!(
            "fixed and paid entries exceed the total amount by {}",
            fmt_money(excess)
        ),
    }
}

fn entries_table(entries: &[TimelineEntry]) -> comfy_table::Table {
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.month.to_string(),
                e.payment_date.to_string(),
                fmt_money(&e.amount),
                if e.is_fixed_amount { "fixed" } else { "" }.to_string(),
                if e.is_paid { "paid" } else if e.is_projected { "projected" } else { "due" }.to_string(),
                e.actual_amount.map(|a| fmt_money(&a)).unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(
        &["ID", "Month", "Payment date", "Amount", "Fixed", "Status", "Actual"],
        rows,
    )
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Splits an obligation's timeline into locked and adjustable entries around
//! the entry whose edit triggers a recalculation.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::engine::month::Month;
use crate::engine::projector::Occurrence;
use crate::errors::{EngineError, EngineResult};
use crate::models::{ActualPayment, TimelineEntry};

/// Identity of a timeline position: a stored entry, or an occurrence that
/// has not been written yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKey {
    Entry(i64),
    Pending { month: Month, payment_date: NaiveDate },
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKey::Entry(id) => write!(f, "entry:{}", id),
            SlotKey::Pending { payment_date, .. } => write!(f, "pending:{}", payment_date),
        }
    }
}

// Plain strings so that maps keyed by slot stay valid JSON objects.
impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub key: SlotKey,
    pub month: Month,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub is_fixed: bool,
    pub is_paid: bool,
    /// Amount already settled against this entry.
    pub settled: Decimal,
}

impl Slot {
    pub fn from_entry(e: &TimelineEntry) -> Self {
        Slot {
            key: SlotKey::Entry(e.id),
            month: e.month,
            payment_date: e.payment_date,
            amount: e.amount,
            is_fixed: e.is_fixed_amount,
            is_paid: e.is_paid,
            settled: e.actual_amount.unwrap_or_default(),
        }
    }

    pub fn pending(o: &Occurrence) -> Self {
        Slot {
            key: SlotKey::Pending {
                month: o.month,
                payment_date: o.payment_date,
            },
            month: o.month,
            payment_date: o.payment_date,
            amount: o.amount,
            is_fixed: false,
            is_paid: false,
            settled: Decimal::ZERO,
        }
    }
}

/// Which entry was edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTarget {
    Entry(i64),
    /// Latest entry (highest id) of the month.
    Month(Month),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockReason {
    Fixed,
    FullyPaid,
    PartiallyPaid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockedSlot {
    pub slot: Slot,
    pub reason: LockReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Partition {
    pub changed: Option<Slot>,
    /// Locked amounts + the changed entry's new amount + same-month entries.
    pub allocated_sum: Decimal,
    pub locked: Vec<LockedSlot>,
    /// Unlocked entries sharing the changed entry's month.
    pub pinned: Vec<Slot>,
    /// Month ascending.
    pub adjustable: Vec<Slot>,
    /// Unlocked entries past the obligation's end month.
    pub out_of_term: Vec<Slot>,
}

impl Partition {
    /// Amounts that stay as they are: the changed entry, pinned and locked slots.
    pub fn retained_amounts(&self) -> BTreeMap<SlotKey, Decimal> {
        let mut out = BTreeMap::new();
        if let Some(c) = &self.changed {
            out.insert(c.key, c.amount);
        }
        for s in &self.pinned {
            out.insert(s.key, s.amount);
        }
        for l in &self.locked {
            out.insert(l.slot.key, l.slot.amount);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Reconciliation {
    Ready(Partition),
    /// The edited entry is fixed; nothing is recalculated.
    SkippedFixed { key: SlotKey },
}

/// Sum of actual payments per month.
pub fn paid_by_month(payments: &[ActualPayment]) -> HashMap<Month, Decimal> {
    let mut out: HashMap<Month, Decimal> = HashMap::new();
    for p in payments {
        *out.entry(p.month).or_default() += p.amount;
    }
    out
}

/// `paid` is what the month received; the entry's own settled amount counts
/// even when the payment landed in a later month.
pub fn lock_reason(slot: &Slot, paid: Decimal) -> Option<LockReason> {
    let paid = paid.max(slot.settled);
    if slot.is_fixed {
        Some(LockReason::Fixed)
    } else if slot.is_paid || (paid > Decimal::ZERO && paid >= slot.amount) {
        Some(LockReason::FullyPaid)
    } else if paid > Decimal::ZERO {
        Some(LockReason::PartiallyPaid)
    } else {
        None
    }
}

fn locate(slots: &[Slot], target: ChangeTarget) -> EngineResult<&Slot> {
    match target {
        ChangeTarget::Entry(id) => slots
            .iter()
            .find(|s| s.key == SlotKey::Entry(id))
            .ok_or_else(|| EngineError::not_found("Timeline entry", id)),
        ChangeTarget::Month(month) => {
            let at_month = || slots.iter().filter(move |s| s.month == month);
            at_month()
                .filter_map(|s| match s.key {
                    SlotKey::Entry(id) => Some((id, s)),
                    SlotKey::Pending { .. } => None,
                })
                .max_by_key(|(id, _)| *id)
                .map(|(_, s)| s)
                .or_else(|| at_month().next())
                .ok_or_else(|| EngineError::not_found("Timeline entry for month", month))
        }
    }
}

/// Partition `slots` (the obligation's whole lifetime) for redistribution.
///
/// `payments` must already be restricted to this obligation.
pub fn reconcile(
    slots: &[Slot],
    payments: &[ActualPayment],
    target: Option<ChangeTarget>,
    term_end: Option<Month>,
) -> EngineResult<Reconciliation> {
    let paid = paid_by_month(payments);
    let changed = match target {
        Some(t) => {
            let slot = locate(slots, t)?;
            if slot.is_fixed {
                debug!(key = ?slot.key, month = %slot.month, "changed entry is fixed; skipping recalculation");
                return Ok(Reconciliation::SkippedFixed { key: slot.key });
            }
            Some(slot.clone())
        }
        None => None,
    };

    let mut part = Partition {
        allocated_sum: changed.as_ref().map(|c| c.amount).unwrap_or_default(),
        changed: changed.clone(),
        ..Partition::default()
    };

    for slot in slots {
        if changed.as_ref().is_some_and(|c| c.key == slot.key) {
            continue;
        }
        let paid_for_month = paid.get(&slot.month).copied().unwrap_or_default();
        if let Some(reason) = lock_reason(slot, paid_for_month) {
            part.allocated_sum += slot.amount;
            part.locked.push(LockedSlot {
                slot: slot.clone(),
                reason,
            });
        } else if changed.as_ref().is_some_and(|c| c.month == slot.month) {
            part.allocated_sum += slot.amount;
            part.pinned.push(slot.clone());
        } else if term_end.is_some_and(|end| slot.month > end) {
            part.out_of_term.push(slot.clone());
        } else {
            part.adjustable.push(slot.clone());
        }
    }
    part.adjustable
        .sort_by(|a, b| (a.month, a.payment_date, a.key).cmp(&(b.month, b.payment_date, b.key)));

    debug!(
        changed = ?part.changed.as_ref().map(|c| c.key),
        allocated_sum = %part.allocated_sum,
        locked = part.locked.len(),
        pinned = part.pinned.len(),
        adjustable = part.adjustable.len(),
        out_of_term = part.out_of_term.len(),
        "timeline partitioned"
    );
    Ok(Reconciliation::Ready(part))
}

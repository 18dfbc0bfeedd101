// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Diffs freshly projected occurrences against stored timeline entries.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::engine::month::MonthRange;
use crate::engine::projector::Occurrence;
use crate::engine::reconciler::SlotKey;
use crate::models::{NewTimelineEntry, TimelineEntry};

/// Write set for one timeline; the three parts are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineBatch {
    pub inserts: Vec<NewTimelineEntry>,
    /// Full rows with their identity; payment history is carried unchanged.
    pub updates: Vec<TimelineEntry>,
    pub deletes: Vec<i64>,
}

impl TimelineBatch {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deletes.len()
    }
}

/// Build the write set that makes the stored timeline match `occurrences`
/// inside `window`.
///
/// `amounts` holds resolved amounts per slot (redistribution results and
/// retained amounts); anything absent takes the occurrence amount. Entries
/// outside the window are only touched when `amounts` names them.
pub fn synchronize(
    obligation_id: i64,
    occurrences: &[Occurrence],
    persisted: &[TimelineEntry],
    window: MonthRange,
    amounts: &BTreeMap<SlotKey, Decimal>,
) -> TimelineBatch {
    let mut batch = TimelineBatch::default();

    let mut in_window: Vec<&TimelineEntry> = persisted
        .iter()
        .filter(|e| window.contains(e.month))
        .collect();
    in_window.sort_by_key(|e| e.id);

    // Exact (month, payment date) matches first, then the same month.
    let mut claimed: HashSet<i64> = HashSet::new();
    let mut matches: Vec<Option<&TimelineEntry>> = occurrences
        .iter()
        .map(|occ| {
            let hit = in_window.iter().copied().find(|e| {
                !claimed.contains(&e.id) && e.month == occ.month && e.payment_date == occ.payment_date
            });
            if let Some(e) = hit {
                claimed.insert(e.id);
            }
            hit
        })
        .collect();
    for (occ, slot) in occurrences.iter().zip(matches.iter_mut()) {
        if slot.is_some() {
            continue;
        }
        if let Some(e) = in_window
            .iter()
            .copied()
            .find(|e| !claimed.contains(&e.id) && e.month == occ.month)
        {
            claimed.insert(e.id);
            *slot = Some(e);
        }
    }

    for (occ, matched) in occurrences.iter().zip(matches) {
        match matched {
            Some(entry) => {
                let mut next = entry.clone();
                if !entry.is_fixed_amount {
                    next.amount = amounts
                        .get(&SlotKey::Entry(entry.id))
                        .copied()
                        .unwrap_or(occ.amount);
                    next.payment_date = occ.payment_date;
                }
                next.is_projected = !entry.has_payment_history() && occ.is_projected;
                if next != *entry {
                    batch.updates.push(next);
                }
            }
            None => {
                let key = SlotKey::Pending {
                    month: occ.month,
                    payment_date: occ.payment_date,
                };
                batch.inserts.push(NewTimelineEntry {
                    obligation_id,
                    month: occ.month,
                    payment_date: occ.payment_date,
                    amount: amounts.get(&key).copied().unwrap_or(occ.amount),
                    is_projected: occ.is_projected,
                });
            }
        }
    }

    for entry in in_window.iter().filter(|e| !claimed.contains(&e.id)) {
        if entry.is_fixed_amount || entry.has_payment_history() {
            continue;
        }
        batch.deletes.push(entry.id);
    }

    for entry in persisted.iter().filter(|e| !window.contains(e.month)) {
        if entry.is_fixed_amount {
            continue;
        }
        if let Some(amount) = amounts.get(&SlotKey::Entry(entry.id)) {
            if *amount != entry.amount {
                let mut next = entry.clone();
                next.amount = *amount;
                batch.updates.push(next);
            }
        }
    }

    debug!(
        obligation_id,
        inserts = batch.inserts.len(),
        updates = batch.updates.len(),
        deletes = batch.deletes.len(),
        "timeline diff computed"
    );
    batch
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::Connection;
use serde::Serialize;

use crate::engine::month::Month;
use crate::store::{self, TimelineStore};
use crate::utils::{fmt_money, pretty_table};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub obligation_id: i64,
    pub detail: String,
}

/// Audit stored timelines: capped obligations whose entries do not sum to
/// the cap, months holding more than one entry, and entries past the end of
/// the obligation's term.
pub fn diagnose(conn: &Connection) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();
    for ob in store::list_obligations(conn, false)? {
        let entries = conn.timeline_entries(ob.id, None)?;
        if entries.is_empty() {
            continue;
        }

        if let Some(total) = ob.total_amount {
            let sum: Decimal = entries.iter().map(|e| e.amount).sum();
            if sum != total {
                issues.push(Issue {
                    kind: "cap_mismatch",
                    obligation_id: ob.id,
                    detail: format!("entries sum to {}, total is {}", fmt_money(&sum), fmt_money(&total)),
                });
            }
        }

        let mut per_month: BTreeMap<Month, usize> = BTreeMap::new();
        for e in &entries {
            *per_month.entry(e.month).or_default() += 1;
        }
        for (month, n) in per_month.into_iter().filter(|(_, n)| *n > 1) {
            issues.push(Issue {
                kind: "duplicate_month",
                obligation_id: ob.id,
                detail: format!("{} entries in {}", n, month),
            });
        }

        if let Some(end) = ob.end_month() {
            for e in entries.iter().filter(|e| e.month > end) {
                issues.push(Issue {
                    kind: "out_of_term",
                    obligation_id: ob.id,
                    detail: format!("entry {} in {} after end {}", e.id, e.month, end),
                });
            }
        }
    }
    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = diagnose(conn)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.obligation_id.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Obligation", "Detail"], rows));
    }
    Ok(())
}

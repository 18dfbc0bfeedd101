// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Turns an obligation definition into the payments it implies for a window.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::month::{Month, MonthRange};
use crate::errors::{EngineError, EngineResult};
use crate::models::{Frequency, Obligation};

/// One payment implied by an obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub month: Month,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub is_projected: bool,
}

pub fn validate_obligation(ob: &Obligation) -> EngineResult<()> {
    if ob.amount.is_sign_negative() {
        return Err(EngineError::validation(format!(
            "Obligation {} has a negative amount {}",
            ob.id, ob.amount
        )));
    }
    if let Some(first) = ob.first_payment_amount {
        if first.is_sign_negative() {
            return Err(EngineError::validation(format!(
                "Obligation {} has a negative first payment amount {}",
                ob.id, first
            )));
        }
    }
    if let Some(total) = ob.total_amount {
        if total <= Decimal::ZERO {
            return Err(EngineError::validation(format!(
                "Obligation {} has a non-positive total amount {}",
                ob.id, total
            )));
        }
    }
    if let Some(end) = ob.end_date {
        if end < ob.start_date {
            return Err(EngineError::validation(format!(
                "Obligation {} ends ({}) before it starts ({})",
                ob.id, end, ob.start_date
            )));
        }
    }
    Ok(())
}

/// Project `ob` over `range`. Occurrences are ordered by month, then date.
///
/// Pure: `as_of` only decides the `is_projected` flag. An empty or inverted
/// range, or an inactive obligation, yields no occurrences.
pub fn project(ob: &Obligation, range: MonthRange, as_of: NaiveDate) -> EngineResult<Vec<Occurrence>> {
    validate_obligation(ob)?;
    if !ob.is_active || range.is_empty() {
        return Ok(Vec::new());
    }

    // Walk from the obligation's start so that "first occurrence" means the
    // first of its lifetime, not of the window.
    let dates = payment_dates(ob, range.end);
    let mut out = Vec::new();
    for (i, date) in dates.into_iter().enumerate() {
        let month = Month::of(date);
        if !range.contains(month) {
            continue;
        }
        let amount = match (i, ob.first_payment_amount) {
            (0, Some(first)) => first,
            _ => ob.amount,
        };
        out.push(Occurrence {
            month,
            payment_date: date,
            amount,
            is_projected: date > as_of,
        });
    }
    Ok(out)
}

/// Every payment date of `ob` from its start up to `until` (inclusive),
/// after term and off-month filtering.
fn payment_dates(ob: &Obligation, until: Month) -> Vec<NaiveDate> {
    let start = ob.start_month();
    let last = match ob.end_month() {
        Some(end) if end < until => end,
        _ => until,
    };
    let in_term = |d: NaiveDate| d >= ob.start_date && ob.end_date.is_none_or(|end| d <= end);
    let is_off = |m: Month| ob.off_months.contains(&m);

    let mut dates: Vec<NaiveDate> = match ob.frequency {
        Frequency::OneTime | Frequency::Custom => {
            let mut explicit = if ob.custom_dates.is_empty() && ob.frequency == Frequency::OneTime {
                vec![ob.start_date]
            } else {
                ob.custom_dates.clone()
            };
            explicit.sort();
            explicit.dedup();
            explicit
                .into_iter()
                .filter(|d| in_term(*d) && Month::of(*d) <= last)
                .collect()
        }
        Frequency::Monthly | Frequency::Quarterly | Frequency::Yearly => {
            let step = match ob.frequency {
                Frequency::Quarterly => 3,
                Frequency::Yearly => 12,
                _ => 1,
            };
            start
                .through(last)
                .filter(|m| m.months_since(start) % step == 0)
                .map(|m| m.day(ob.start_date.day()))
                .filter(|d| in_term(*d))
                .collect()
        }
    };
    dates.retain(|d| !is_off(Month::of(*d)));
    dates
}

/// Projections of several obligations merged into month order.
pub fn project_all<'a, I>(obligations: I, range: MonthRange, as_of: NaiveDate) -> EngineResult<Vec<(i64, Occurrence)>>
where
    I: IntoIterator<Item = &'a Obligation>,
{
    let mut all = Vec::new();
    for ob in obligations {
        for occ in project(ob, range, as_of)? {
            all.push((ob.id, occ));
        }
    }
    all.sort_by(|a, b| a.1.month.cmp(&b.1.month).then(a.1.payment_date.cmp(&b.1.payment_date)));
    Ok(all)
}

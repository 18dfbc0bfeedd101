// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::reconciler::{Partition, SlotKey};

/// Amounts are stored with cent precision.
pub const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RedistributionWarning {
    /// A positive remainder with no adjustable entry left to carry it.
    UnallocatedRemainder { remaining: Decimal },
    /// Locked and changed amounts already exceed the cap.
    OverAllocated { excess: Decimal },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RedistributionPlan {
    /// New amount per adjustable slot. Only slots that get a value appear.
    pub adjustments: BTreeMap<SlotKey, Decimal>,
    pub allocated_sum: Decimal,
    pub total_amount: Option<Decimal>,
    pub remaining: Option<Decimal>,
    pub amount_per_entry: Option<Decimal>,
    pub warning: Option<RedistributionWarning>,
}

/// Compute new amounts for the adjustable slots of `part`.
///
/// With a cap the remainder is split equally (rounded to cents, the rounding
/// residue goes to the latest slot). Without one, slots after the changed
/// month take the changed amount.
pub fn redistribute(part: &Partition, total_amount: Option<Decimal>) -> RedistributionPlan {
    let mut plan = RedistributionPlan {
        allocated_sum: part.allocated_sum,
        total_amount,
        ..RedistributionPlan::default()
    };

    match total_amount {
        Some(total) => {
            let remaining = total - part.allocated_sum;
            plan.remaining = Some(remaining);
            let n = part.adjustable.len();

            if n == 0 {
                if remaining > Decimal::ZERO {
                    plan.warning = Some(RedistributionWarning::UnallocatedRemainder { remaining });
                } else if remaining < Decimal::ZERO {
                    plan.warning = Some(RedistributionWarning::OverAllocated { excess: -remaining });
                }
            } else if remaining <= Decimal::ZERO {
                for slot in &part.adjustable {
                    plan.adjustments.insert(slot.key, Decimal::ZERO);
                }
                plan.amount_per_entry = Some(Decimal::ZERO);
                if remaining < Decimal::ZERO {
                    plan.warning = Some(RedistributionWarning::OverAllocated { excess: -remaining });
                }
            } else {
                let per = (remaining / Decimal::from(n as u64)).round_dp(MONEY_SCALE);
                let residue_holder = n - 1;
                let last = remaining - per * Decimal::from(residue_holder as u64);
                for (i, slot) in part.adjustable.iter().enumerate() {
                    let amount = if i == residue_holder { last } else { per };
                    plan.adjustments.insert(slot.key, amount);
                }
                plan.amount_per_entry = Some(per);
            }
        }
        None => {
            if let Some(changed) = &part.changed {
                for slot in part.adjustable.iter().filter(|s| s.month > changed.month) {
                    plan.adjustments.insert(slot.key, changed.amount);
                }
                if !plan.adjustments.is_empty() {
                    plan.amount_per_entry = Some(changed.amount);
                }
            }
        }
    }

    match plan.warning {
        Some(RedistributionWarning::UnallocatedRemainder { remaining }) => {
            warn!(%remaining, allocated_sum = %plan.allocated_sum, "no adjustable entries left; remainder unallocated")
        }
        Some(RedistributionWarning::OverAllocated { excess }) => {
            warn!(%excess, allocated_sum = %plan.allocated_sum, "locked entries exceed the total amount")
        }
        None => {}
    }
    debug!(
        adjusted = plan.adjustments.len(),
        remaining = ?plan.remaining,
        per_entry = ?plan.amount_per_entry,
        "redistribution planned"
    );
    plan
}

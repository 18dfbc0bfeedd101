// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashplan::engine::Month;
use cashplan::engine::reconciler::{
    ChangeTarget, LockReason, Partition, Reconciliation, Slot, SlotKey, reconcile,
};
use cashplan::engine::redistribution::{RedistributionWarning, redistribute};
use cashplan::models::{ActualPayment, Direction, PaymentType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn month(n: u32) -> Month {
    Month::new(2024, n).unwrap()
}

/// One stored entry per month of 2024, ids equal to the month number.
fn year_of(amount: &str) -> Vec<Slot> {
    (1..=12)
        .map(|n| Slot {
            key: SlotKey::Entry(n as i64),
            month: month(n),
            payment_date: NaiveDate::from_ymd_opt(2024, n, 10).unwrap(),
            amount: dec(amount),
            is_fixed: false,
            is_paid: false,
            settled: Decimal::ZERO,
        })
        .collect()
}

fn ready(r: Reconciliation) -> Partition {
    match r {
        Reconciliation::Ready(p) => p,
        other => panic!("expected a partition, got {:?}", other),
    }
}

fn payment(n: u32, amount: &str) -> ActualPayment {
    ActualPayment {
        id: 0,
        direction: Direction::Output,
        payment_type: PaymentType::Leasing,
        reference_id: Some(1),
        schedule_entry_id: Some(n as i64),
        month: month(n),
        payment_date: NaiveDate::from_ymd_opt(2024, n, 10).unwrap(),
        amount: dec(amount),
        notes: None,
    }
}

#[test]
fn leasing_scenario_spreads_remainder_over_ten_months() {
    let mut slots = year_of("1000");
    slots[5].amount = dec("1500");
    slots[5].is_fixed = true;
    slots[2].amount = dec("2000");

    let part = ready(reconcile(&slots, &[], Some(ChangeTarget::Entry(3)), Some(month(12))).unwrap());
    assert_eq!(part.allocated_sum, dec("3500"));
    assert_eq!(part.locked.len(), 1);
    assert_eq!(part.locked[0].reason, LockReason::Fixed);
    assert_eq!(part.adjustable.len(), 10);

    let plan = redistribute(&part, Some(dec("12000")));
    assert_eq!(plan.remaining, Some(dec("8500")));
    assert_eq!(plan.amount_per_entry, Some(dec("850")));
    assert_eq!(plan.adjustments.len(), 10);
    assert!(plan.adjustments.values().all(|a| *a == dec("850")));
    assert!(plan.warning.is_none());
}

#[test]
fn cap_holds_after_rounding() {
    let slots: Vec<Slot> = year_of("0").into_iter().take(3).collect();
    let part = ready(reconcile(&slots, &[], None, None).unwrap());
    let plan = redistribute(&part, Some(dec("1000")));

    let amounts: Vec<Decimal> = plan.adjustments.values().copied().collect();
    assert_eq!(amounts, [dec("333.33"), dec("333.33"), dec("333.34")]);
    assert_eq!(amounts.iter().copied().sum::<Decimal>(), dec("1000"));
}

#[test]
fn paid_entries_keep_their_amounts() {
    let mut slots = year_of("100");
    slots[0].is_paid = true;
    let payments = [payment(2, "100"), payment(4, "40")];

    let part = ready(reconcile(&slots, &payments, Some(ChangeTarget::Entry(12)), None).unwrap());
    let reasons: Vec<(SlotKey, LockReason)> = part.locked.iter().map(|l| (l.slot.key, l.reason)).collect();
    assert_eq!(
        reasons,
        [
            (SlotKey::Entry(1), LockReason::FullyPaid),
            (SlotKey::Entry(2), LockReason::FullyPaid),
            (SlotKey::Entry(4), LockReason::PartiallyPaid),
        ]
    );

    let plan = redistribute(&part, Some(dec("1200")));
    for key in [SlotKey::Entry(1), SlotKey::Entry(2), SlotKey::Entry(4)] {
        assert!(!plan.adjustments.contains_key(&key));
    }
    // 1200 - (100 changed + 300 locked) over 8 entries
    assert_eq!(plan.amount_per_entry, Some(dec("100")));
}

#[test]
fn settled_amount_locks_entry_whatever_the_payment_month() {
    let mut slots = year_of("100");
    slots[2].settled = dec("30");
    // Paid in April against March's entry.
    let mut late = payment(3, "30");
    late.payment_date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();

    for payments in [vec![], vec![late]] {
        let part = ready(reconcile(&slots, &payments, Some(ChangeTarget::Entry(1)), None).unwrap());
        let locked: Vec<(SlotKey, LockReason)> = part.locked.iter().map(|l| (l.slot.key, l.reason)).collect();
        assert_eq!(locked, [(SlotKey::Entry(3), LockReason::PartiallyPaid)]);
        assert!(part.adjustable.iter().all(|s| s.key != SlotKey::Entry(3)));
        assert!(part.adjustable.iter().any(|s| s.key == SlotKey::Entry(4)));
    }
}

#[test]
fn same_month_entries_are_pinned_not_adjusted() {
    let mut slots = year_of("100");
    slots.push(Slot {
        key: SlotKey::Entry(20),
        month: month(3),
        payment_date: NaiveDate::from_ymd_opt(2024, 3, 25).unwrap(),
        amount: dec("50"),
        is_fixed: false,
        is_paid: false,
        settled: Decimal::ZERO,
    });

    let part = ready(reconcile(&slots, &[], Some(ChangeTarget::Month(month(3))), None).unwrap());
    assert_eq!(part.changed.as_ref().map(|c| c.key), Some(SlotKey::Entry(20)));
    assert_eq!(part.pinned.len(), 1);
    assert_eq!(part.pinned[0].key, SlotKey::Entry(3));
    assert_eq!(part.allocated_sum, dec("150"));
    assert_eq!(part.adjustable.len(), 11);
}

#[test]
fn no_adjustable_entries_reports_unallocated_remainder() {
    let mut slots = year_of("100");
    for s in slots.iter_mut().skip(1) {
        s.is_fixed = true;
    }
    let part = ready(reconcile(&slots, &[], Some(ChangeTarget::Entry(1)), None).unwrap());
    assert!(part.adjustable.is_empty());

    let plan = redistribute(&part, Some(dec("1500")));
    assert!(plan.adjustments.is_empty());
    assert_eq!(
        plan.warning,
        Some(RedistributionWarning::UnallocatedRemainder { remaining: dec("300") })
    );
}

#[test]
fn over_allocation_zeroes_adjustable_entries() {
    let mut slots = year_of("100");
    slots[0].amount = dec("1500");
    let part = ready(reconcile(&slots, &[], Some(ChangeTarget::Entry(1)), None).unwrap());
    let plan = redistribute(&part, Some(dec("1200")));

    assert_eq!(plan.adjustments.len(), 11);
    assert!(plan.adjustments.values().all(|a| a.is_zero()));
    assert_eq!(
        plan.warning,
        Some(RedistributionWarning::OverAllocated { excess: dec("300") })
    );
}

#[test]
fn uncapped_change_propagates_forward_only() {
    let mut slots = year_of("100");
    slots[5].amount = dec("120");
    let part = ready(reconcile(&slots, &[], Some(ChangeTarget::Entry(6)), None).unwrap());
    let plan = redistribute(&part, None);

    assert_eq!(plan.adjustments.len(), 6);
    assert!(plan.adjustments.keys().all(|k| matches!(k, SlotKey::Entry(id) if *id > 6)));
    assert!(plan.adjustments.values().all(|a| *a == dec("120")));
    assert_eq!(plan.remaining, None);
}

#[test]
fn fixed_change_target_skips_recalculation() {
    let mut slots = year_of("100");
    slots[3].is_fixed = true;
    let r = reconcile(&slots, &[], Some(ChangeTarget::Entry(4)), None).unwrap();
    assert_eq!(r, Reconciliation::SkippedFixed { key: SlotKey::Entry(4) });
}

#[test]
fn entries_past_the_term_are_left_alone() {
    let slots = year_of("100");
    let part = ready(reconcile(&slots, &[], Some(ChangeTarget::Entry(1)), Some(month(6))).unwrap());
    assert_eq!(part.adjustable.len(), 5);
    assert_eq!(part.out_of_term.len(), 6);

    let plan = redistribute(&part, Some(dec("600")));
    assert_eq!(plan.amount_per_entry, Some(dec("100")));
    assert!(!plan.adjustments.contains_key(&SlotKey::Entry(7)));
}

#[test]
fn unknown_change_target_is_not_found() {
    let slots = year_of("100");
    let err = reconcile(&slots, &[], Some(ChangeTarget::Entry(99)), None).unwrap_err();
    assert!(err.is_not_found());
}

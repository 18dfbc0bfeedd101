// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly cash-flow ledger built from prioritized data sources.
//!
//! For every (month, direction) the resolver asks its sources in order and
//! takes the first answer. Recorded payments come first, so an actual figure
//! always wins over a projection for the same month and direction.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::engine::month::{Month, MonthRange};
use crate::engine::projector;
use crate::errors::EngineResult;
use crate::models::{
    ActualPayment, Direction, LoanScheduleEntry, MonthlyCashFlow, Obligation, PaymentType,
    Personnel, Sale,
};

pub trait FlowSource {
    fn name(&self) -> &'static str;

    /// `None` when this source has nothing to say for the key.
    fn amount(&self, month: Month, direction: Direction) -> Option<Decimal>;
}

/// Actually recorded payments. Outflows only count expense, subscription and
/// leasing payments.
#[derive(Debug, Default)]
pub struct RecordedPayments {
    totals: BTreeMap<(Month, Direction), Decimal>,
}

impl RecordedPayments {
    pub fn new(payments: &[ActualPayment]) -> Self {
        let mut totals: BTreeMap<(Month, Direction), Decimal> = BTreeMap::new();
        for p in payments {
            let counted = match p.direction {
                Direction::Input => true,
                Direction::Output => matches!(
                    p.payment_type,
                    PaymentType::Expense | PaymentType::Subscription | PaymentType::Leasing
                ),
            };
            if counted {
                *totals.entry((p.month, p.direction)).or_default() += p.amount;
            }
        }
        RecordedPayments { totals }
    }
}

impl FlowSource for RecordedPayments {
    fn name(&self) -> &'static str {
        "recorded"
    }

    fn amount(&self, month: Month, direction: Direction) -> Option<Decimal> {
        self.totals.get(&(month, direction)).copied()
    }
}

/// Declared sales, the inflow fallback. Always answers for inflows.
#[derive(Debug, Default)]
pub struct DeclaredSales {
    by_month: BTreeMap<Month, Decimal>,
}

impl DeclaredSales {
    pub fn new(sales: &[Sale]) -> Self {
        let mut by_month: BTreeMap<Month, Decimal> = BTreeMap::new();
        for s in sales {
            *by_month.entry(Month::of(s.date)).or_default() += s.amount;
        }
        DeclaredSales { by_month }
    }
}

impl FlowSource for DeclaredSales {
    fn name(&self) -> &'static str {
        "sales"
    }

    fn amount(&self, month: Month, direction: Direction) -> Option<Decimal> {
        match direction {
            Direction::Input => Some(self.by_month.get(&month).copied().unwrap_or_default()),
            Direction::Output => None,
        }
    }
}

/// Projected outflows: obligations (one-time expenses included), payroll and
/// loan installments. Always answers for outflows.
#[derive(Debug, Default)]
pub struct ProjectedOutflows {
    by_month: BTreeMap<Month, Decimal>,
}

impl ProjectedOutflows {
    pub fn build(
        range: MonthRange,
        obligations: &[Obligation],
        personnel: &[Personnel],
        loan_payments: &[LoanScheduleEntry],
        as_of: NaiveDate,
    ) -> EngineResult<Self> {
        let mut by_month: BTreeMap<Month, Decimal> = BTreeMap::new();

        for (_, occ) in projector::project_all(obligations, range, as_of)? {
            *by_month.entry(occ.month).or_default() += occ.amount;
        }
        for month in range.months() {
            for person in personnel.iter().filter(|p| p.is_employed_in(month)) {
                *by_month.entry(month).or_default() += person.monthly_cost();
            }
        }
        for payment in loan_payments {
            let month = Month::of(payment.payment_date);
            if range.contains(month) {
                *by_month.entry(month).or_default() += payment.total_payment;
            }
        }
        Ok(ProjectedOutflows { by_month })
    }
}

impl FlowSource for ProjectedOutflows {
    fn name(&self) -> &'static str {
        "projected"
    }

    fn amount(&self, month: Month, direction: Direction) -> Option<Decimal> {
        match direction {
            Direction::Output => Some(self.by_month.get(&month).copied().unwrap_or_default()),
            Direction::Input => None,
        }
    }
}

/// Ordered source list; earlier sources take precedence.
#[derive(Default)]
pub struct SourceResolver<'a> {
    sources: Vec<Box<dyn FlowSource + 'a>>,
}

impl<'a> SourceResolver<'a> {
    pub fn new() -> Self {
        SourceResolver { sources: Vec::new() }
    }

    pub fn then(mut self, source: impl FlowSource + 'a) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// First answer for the key, with the name of the source that gave it.
    pub fn resolve(&self, month: Month, direction: Direction) -> (Decimal, &'static str) {
        self.sources
            .iter()
            .find_map(|s| s.amount(month, direction).map(|a| (a, s.name())))
            .unwrap_or((Decimal::ZERO, "none"))
    }
}

/// Month-ascending ledger with running balances.
pub fn aggregate(range: MonthRange, resolver: &SourceResolver<'_>, opening_balance: Decimal) -> Vec<MonthlyCashFlow> {
    let mut opening = opening_balance;
    let mut out = Vec::new();
    for month in range.months() {
        let (inflows, inflow_source) = resolver.resolve(month, Direction::Input);
        let (outflows, outflow_source) = resolver.resolve(month, Direction::Output);
        let net = inflows - outflows;
        let closing = opening + net;
        debug!(%month, %inflows, inflow_source, %outflows, outflow_source, %closing, "cash flow month");
        out.push(MonthlyCashFlow {
            month,
            opening_balance: opening,
            inflows,
            outflows,
            net,
            closing_balance: closing,
            inflow_source: inflow_source.to_string(),
            outflow_source: outflow_source.to_string(),
        });
        opening = closing;
    }
    out
}

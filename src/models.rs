// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::month::Month;
use crate::errors::EngineError;

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = EngineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(EngineError::validation(format!(
                        "Invalid {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

text_enum!(ObligationKind {
    Leasing => "leasing",
    Subscription => "subscription",
    Expense => "expense",
});

text_enum!(Frequency {
    OneTime => "one_time",
    Monthly => "monthly",
    Quarterly => "quarterly",
    Yearly => "yearly",
    Custom => "custom",
});

text_enum!(Direction {
    Input => "input",
    Output => "output",
});

text_enum!(PaymentType {
    Sale => "sale",
    Expense => "expense",
    Subscription => "subscription",
    Leasing => "leasing",
    Loan => "loan",
});

text_enum!(ChargesType {
    Percentage => "percentage",
    Flat => "flat",
});

impl ObligationKind {
    /// Payment type used when an actual payment settles this kind of obligation.
    pub fn payment_type(&self) -> PaymentType {
        match self {
            ObligationKind::Leasing => PaymentType::Leasing,
            ObligationKind::Subscription => PaymentType::Subscription,
            ObligationKind::Expense => PaymentType::Expense,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: i64,
    pub kind: ObligationKind,
    pub name: String,
    pub category: Option<String>,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub off_months: Vec<Month>,
    #[serde(default)]
    pub custom_dates: Vec<NaiveDate>,
    pub first_payment_amount: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub is_active: bool,
    #[serde(default)]
    pub timeline_revision: i64,
}

impl Obligation {
    pub fn start_month(&self) -> Month {
        Month::of(self.start_date)
    }

    pub fn end_month(&self) -> Option<Month> {
        self.end_date.map(Month::of)
    }

    /// Category label used in exports: the category if set, else the kind.
    pub fn label(&self) -> &str {
        self.category.as_deref().unwrap_or(self.kind.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: i64,
    pub obligation_id: i64,
    pub month: Month,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub is_projected: bool,
    pub is_fixed_amount: bool,
    pub is_paid: bool,
    pub paid_date: Option<NaiveDate>,
    pub actual_amount: Option<Decimal>,
    pub notes: Option<String>,
}

impl TimelineEntry {
    /// Entries with any recorded payment history are never deleted.
    pub fn has_payment_history(&self) -> bool {
        self.is_paid || self.actual_amount.is_some()
    }
}

/// A timeline row that does not exist in the store yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTimelineEntry {
    pub obligation_id: i64,
    pub month: Month,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub is_projected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualPayment {
    pub id: i64,
    pub direction: Direction,
    pub payment_type: PaymentType,
    pub reference_id: Option<i64>,
    pub schedule_entry_id: Option<i64>,
    pub month: Month,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub date: NaiveDate,
    pub kind: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personnel {
    pub id: i64,
    pub name: String,
    pub base_salary: Decimal,
    pub employer_charges: Decimal,
    pub charges_type: ChargesType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl Personnel {
    /// Monthly employer cost: base pay plus charges.
    pub fn monthly_cost(&self) -> Decimal {
        let charges = match self.charges_type {
            ChargesType::Percentage => self.base_salary * self.employer_charges / Decimal::ONE_HUNDRED,
            ChargesType::Flat => self.employer_charges,
        };
        self.base_salary + charges
    }

    pub fn is_employed_in(&self, month: Month) -> bool {
        if !self.is_active || month < Month::of(self.start_date) {
            return false;
        }
        match self.end_date {
            Some(end) => month <= Month::of(end),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub name: String,
    pub principal: Decimal,
    /// Annual rate in percent.
    pub interest_rate: Decimal,
    pub duration_months: u32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub off_payment_months: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanScheduleEntry {
    pub id: i64,
    pub loan_id: i64,
    pub installment: u32,
    pub payment_date: NaiveDate,
    pub principal_payment: Decimal,
    pub interest_payment: Decimal,
    pub total_payment: Decimal,
    pub remaining_balance: Decimal,
    pub is_paid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCashFlow {
    pub month: Month,
    pub opening_balance: Decimal,
    pub inflows: Decimal,
    pub outflows: Decimal,
    pub net: Decimal,
    pub closing_balance: Decimal,
    pub inflow_source: String,
    pub outflow_source: String,
}

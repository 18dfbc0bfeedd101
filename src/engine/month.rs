// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::EngineError;

/// A calendar month (`YYYY-MM`). Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, EngineError> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::validation(format!(
                "Invalid month number {}",
                month
            )));
        }
        Ok(Month { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Month {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_index(idx: i64) -> Self {
        Month {
            year: idx.div_euclid(12) as i32,
            month: (idx.rem_euclid(12) + 1) as u32,
        }
    }

    pub fn add_months(&self, n: i64) -> Self {
        Month::from_index(self.index() + n)
    }

    pub fn succ(&self) -> Self {
        self.add_months(1)
    }

    /// Signed number of months from `earlier` to `self`.
    pub fn months_since(&self, earlier: Month) -> i64 {
        self.index() - earlier.index()
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.succ()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    /// The given day of this month, clamped to the month's last day.
    pub fn day(&self, day: u32) -> NaiveDate {
        let last = self.last_day().day();
        NaiveDate::from_ymd_opt(self.year, self.month, day.clamp(1, last))
            .unwrap_or_else(|| self.last_day())
    }

    /// Inclusive iterator `self..=end`; empty when `end < self`.
    pub fn through(self, end: Month) -> impl Iterator<Item = Month> {
        let count = (end.months_since(self) + 1).max(0);
        (0..count).map(move |i| self.add_months(i))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || EngineError::validation(format!("Invalid month '{}', expected YYYY-MM", s));
        let (y, m) = s.split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Month::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive month window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: Month,
    pub end: Month,
}

impl MonthRange {
    pub fn new(start: Month, end: Month) -> Self {
        MonthRange { start, end }
    }

    /// Like `new`, but an inverted window is rejected.
    pub fn checked(start: Month, end: Month) -> Result<Self, EngineError> {
        if end < start {
            return Err(EngineError::validation(format!(
                "Invalid range: end month {} is before start month {}",
                end, start
            )));
        }
        Ok(MonthRange { start, end })
    }

    pub fn contains(&self, month: Month) -> bool {
        self.start <= month && month <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn months(&self) -> impl Iterator<Item = Month> {
        self.start.through(self.end)
    }
}

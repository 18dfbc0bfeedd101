// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;

use chrono::Months;
use rust_decimal::Decimal;

use crate::engine::redistribution::MONEY_SCALE;
use crate::errors::{EngineError, EngineResult};
use crate::models::{Loan, LoanScheduleEntry};

fn out_of_range(loan: &Loan) -> EngineError {
    EngineError::validation(format!(
        "Loan '{}' is out of range: rate or duration too large",
        loan.name
    ))
}

fn checked_pow(base: Decimal, exp: u32) -> Option<Decimal> {
    (0..exp).try_fold(Decimal::ONE, |acc, _| acc.checked_mul(base))
}

fn monthly_rate(loan: &Loan) -> Decimal {
    loan.interest_rate / Decimal::from(12) / Decimal::ONE_HUNDRED
}

/// Level payment for the base term of `loan`.
pub fn monthly_payment(loan: &Loan) -> EngineResult<Decimal> {
    let n = loan.duration_months;
    if n == 0 {
        return Err(EngineError::validation(format!(
            "Loan '{}' needs a positive duration",
            loan.name
        )));
    }
    let rate = monthly_rate(loan);
    if rate.is_zero() {
        return Ok(loan.principal / Decimal::from(n));
    }
    let growth = checked_pow(Decimal::ONE + rate, n).ok_or_else(|| out_of_range(loan))?;
    loan.principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(growth - Decimal::ONE))
        .ok_or_else(|| out_of_range(loan))
}

/// Amortization schedule for `loan`.
///
/// Installments listed in `off_payment_months` (within the base term) pay
/// interest only, and the term grows by one month for each of them.
/// Returned rows carry `id = 0` until stored.
pub fn schedule(loan: &Loan) -> EngineResult<Vec<LoanScheduleEntry>> {
    if loan.duration_months == 0 {
        return Err(EngineError::validation(format!(
            "Loan '{}' needs a positive duration",
            loan.name
        )));
    }
    if loan.principal <= Decimal::ZERO {
        return Err(EngineError::validation(format!(
            "Loan '{}' needs a positive principal",
            loan.name
        )));
    }
    if loan.interest_rate.is_sign_negative() {
        return Err(EngineError::validation(format!(
            "Loan '{}' has a negative interest rate",
            loan.name
        )));
    }

    let off: HashSet<u32> = loan
        .off_payment_months
        .iter()
        .copied()
        .filter(|m| (1..=loan.duration_months).contains(m))
        .collect();
    let total_months = loan.duration_months + off.len() as u32;
    let rate = monthly_rate(loan);
    let payment = monthly_payment(loan)?;

    let mut balance = loan.principal;
    let mut rows = Vec::with_capacity(total_months as usize);
    for k in 1..=total_months {
        let interest = balance.checked_mul(rate).ok_or_else(|| out_of_range(loan))?;
        let (principal_part, total) = if off.contains(&k) {
            (Decimal::ZERO, interest)
        } else {
            (payment.checked_sub(interest).ok_or_else(|| out_of_range(loan))?, payment)
        };
        balance = balance.checked_sub(principal_part).ok_or_else(|| out_of_range(loan))?;

        let payment_date = loan
            .start_date
            .checked_add_months(Months::new(k - 1))
            .ok_or_else(|| EngineError::validation(format!("Loan '{}' runs past the calendar", loan.name)))?;

        rows.push(LoanScheduleEntry {
            id: 0,
            loan_id: loan.id,
            installment: k,
            payment_date,
            principal_payment: principal_part.round_dp(MONEY_SCALE),
            interest_payment: interest.round_dp(MONEY_SCALE),
            total_payment: total.round_dp(MONEY_SCALE),
            remaining_balance: balance.round_dp(MONEY_SCALE).max(Decimal::ZERO),
            is_paid: false,
        });
    }
    Ok(rows)
}

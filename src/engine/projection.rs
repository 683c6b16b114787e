// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Year-by-year FIRE projection.
//!
//! Savings compound at the real (inflation-net) return while the target
//! itself grows with inflation, so both sides of the milestone comparison
//! are expressed in nominal terms for the year they describe.

use chrono::{Datelike, Local};
use rust_decimal::Decimal;

use super::money::{decimal_from_f64, div_ctx, growth_factor, mul_ctx, round_money};
use crate::error::FinanceError;
use crate::models::{FinancialProfile, ProjectionResult, YearlyPoint};

pub const MAX_PROJECTION_YEARS: u32 = 60;
pub const MAX_AGE: i32 = 100;

const MONTHS_PER_YEAR: i64 = 12;

#[derive(Debug, Clone, Copy)]
enum ContributionSchedule {
    Fixed(Decimal),
    Growing { base: Decimal, rate: f64 },
}

impl ContributionSchedule {
    fn from_profile(profile: &FinancialProfile, base: Decimal) -> Self {
        match profile.annual_contribution_increase_rate {
            Some(rate) if rate > 0.0 => ContributionSchedule::Growing { base, rate },
            _ => ContributionSchedule::Fixed(base),
        }
    }

    fn for_year(&self, year: u32) -> Result<Decimal, FinanceError> {
        match *self {
            ContributionSchedule::Fixed(amount) => Ok(amount),
            ContributionSchedule::Growing { base, rate } => mul_ctx(
                base,
                growth_factor(rate, year, "contribution growth factor")?,
                "annual contribution",
            ),
        }
    }
}

/// Projects `profile` starting in the current calendar year.
pub fn project(profile: &FinancialProfile) -> Result<ProjectionResult, FinanceError> {
    project_from(profile, Local::now().year())
}

/// Projects `profile` with year 0 labelled `start_year`.
pub fn project_from(
    profile: &FinancialProfile,
    start_year: i32,
) -> Result<ProjectionResult, FinanceError> {
    validate(profile)?;

    let twelve = Decimal::from(MONTHS_PER_YEAR);
    let base_annual_contribution = profile
        .monthly_contribution
        .checked_mul(twelve)
        .ok_or(FinanceError::Overflow("annual contribution"))?;
    let annual_expenses = profile
        .monthly_expenses
        .checked_mul(twelve)
        .ok_or(FinanceError::Overflow("annual expenses"))?;

    let withdrawal_rate = decimal_from_f64(profile.safe_withdrawal_rate, "safe withdrawal rate")?;
    let fire_number = div_ctx(annual_expenses, withdrawal_rate, "fire number")?;

    let real_return_rate = decimal_from_f64(
        (1.0 + profile.expected_return_rate) / (1.0 + profile.inflation_rate) - 1.0,
        "real return rate",
    )?;
    let contributions = ContributionSchedule::from_profile(profile, base_annual_contribution);

    let mut savings = profile.current_savings;
    let mut total_contributions = profile.current_savings;
    let mut fire_age: Option<i32> = None;
    let mut savings_at_fire = Decimal::ZERO;
    let mut points = Vec::with_capacity(MAX_PROJECTION_YEARS as usize + 1);

    for year in 0..=MAX_PROJECTION_YEARS {
        let offset = year as i32;
        let age = profile.current_age + offset;
        let inflated_target = mul_ctx(
            fire_number,
            growth_factor(profile.inflation_rate, year, "inflation factor")?,
            "inflation-adjusted fire number",
        )?;
        let year_contribution = contributions.for_year(year)?;

        // Checked against the balance at the start of the year.
        let is_milestone = fire_age.is_none() && savings >= inflated_target;
        if is_milestone {
            fire_age = Some(age);
            savings_at_fire = savings;
        }

        points.push(YearlyPoint {
            age,
            calendar_year: start_year + offset,
            total_savings: round_money(savings),
            total_contributions: round_money(total_contributions),
            total_growth: round_money(savings - total_contributions),
            inflation_adjusted_fire_number: round_money(inflated_target),
            annual_contribution: round_money(year_contribution),
            is_milestone,
        });

        if age >= MAX_AGE {
            break;
        }

        let growth = mul_ctx(savings, real_return_rate, "annual growth")?;
        savings = savings
            .checked_add(growth)
            .and_then(|s| s.checked_add(year_contribution))
            .ok_or(FinanceError::Overflow("savings"))?;
        total_contributions = total_contributions
            .checked_add(year_contribution)
            .ok_or(FinanceError::Overflow("total contributions"))?;
    }

    log::debug!(
        "Projected {} years from age {}; fire age {:?}",
        points.len(),
        profile.current_age,
        fire_age
    );

    Ok(ProjectionResult {
        current_age: profile.current_age,
        fire_age,
        years_to_fire: fire_age.map(|age| age - profile.current_age),
        fire_number: round_money(fire_number),
        current_savings: profile.current_savings,
        projected_savings_at_fire: round_money(savings_at_fire),
        yearly_points: points,
        fire_achievable: fire_age.is_some(),
    })
}

/// Annual expenses divided by the withdrawal rate, in cents.
pub fn fire_number(profile: &FinancialProfile) -> Result<Decimal, FinanceError> {
    validate(profile)?;
    let annual_expenses = profile
        .monthly_expenses
        .checked_mul(Decimal::from(MONTHS_PER_YEAR))
        .ok_or(FinanceError::Overflow("annual expenses"))?;
    let withdrawal_rate = decimal_from_f64(profile.safe_withdrawal_rate, "safe withdrawal rate")?;
    annual_expenses
        .checked_div(withdrawal_rate)
        .map(round_money)
        .ok_or(FinanceError::Overflow("fire number"))
}

pub fn validate(profile: &FinancialProfile) -> Result<(), FinanceError> {
    let swr = profile.safe_withdrawal_rate;
    if !swr.is_finite() || swr <= 0.0 {
        return Err(FinanceError::InvalidRate {
            name: "safe_withdrawal_rate",
            value: swr,
            reason: "must be greater than zero",
        });
    }

    let mut rates = vec![
        ("expected_return_rate", profile.expected_return_rate),
        ("inflation_rate", profile.inflation_rate),
    ];
    if let Some(rate) = profile.annual_contribution_increase_rate {
        rates.push(("annual_contribution_increase_rate", rate));
    }
    for (name, value) in rates {
        if !value.is_finite() || value <= -1.0 {
            return Err(FinanceError::InvalidRate {
                name,
                value,
                reason: "must be a finite fraction above -1",
            });
        }
    }

    if profile.current_age < 0 {
        return Err(FinanceError::InvalidProfile(format!(
            "current age {} is negative",
            profile.current_age
        )));
    }

    let amounts = [
        ("current savings", profile.current_savings),
        ("monthly contribution", profile.monthly_contribution),
        ("monthly expenses", profile.monthly_expenses),
    ];
    for (name, amount) in amounts {
        if amount < Decimal::ZERO {
            return Err(FinanceError::InvalidProfile(format!(
                "{} {} is negative",
                name, amount
            )));
        }
    }
    Ok(())
}

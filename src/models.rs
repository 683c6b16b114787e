// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "INCOME",
            TxKind::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INCOME" => Ok(TxKind::Income),
            "EXPENSE" => Ok(TxKind::Expense),
            _ => Err(FinanceError::UnknownKind(s.trim().to_string())),
        }
    }
}

/// How often a recurring obligation falls due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(FinanceError::UnsupportedFrequency(s.trim().to_string())),
        }
    }
}

/// A realized ledger entry. `id` is `None` until storage assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<i64>,
    pub owner_id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub kind: TxKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringObligation {
    pub id: i64,
    pub owner_id: i64,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub kind: TxKind,
    pub frequency: Frequency,
    pub next_due_date: NaiveDate,
    pub active: bool,
}

/// Inputs to a FIRE projection. Rates are fractions (0.07 for 7%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub current_age: i32,
    pub current_savings: Decimal,
    pub monthly_contribution: Decimal,
    pub monthly_expenses: Decimal,
    pub expected_return_rate: f64,
    pub inflation_rate: f64,
    pub safe_withdrawal_rate: f64,
    #[serde(default)]
    pub target_retirement_age: Option<i32>,
    #[serde(default)]
    pub annual_contribution_increase_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyPoint {
    pub age: i32,
    pub calendar_year: i32,
    pub total_savings: Decimal,
    pub total_contributions: Decimal,
    pub total_growth: Decimal,
    pub inflation_adjusted_fire_number: Decimal,
    pub annual_contribution: Decimal,
    pub is_milestone: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub current_age: i32,
    pub fire_age: Option<i32>,
    pub years_to_fire: Option<i32>,
    pub fire_number: Decimal,
    pub current_savings: Decimal,
    pub projected_savings_at_fire: Decimal,
    pub yearly_points: Vec<YearlyPoint>,
    pub fire_achievable: bool,
}

/// A named profile kept in the `fire_profiles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFireProfile {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub profile: FinancialProfile,
    pub fire_number: Decimal,
}

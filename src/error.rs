// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the projection and recurrence engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FinanceError {
    #[error("Invalid rate {name}={value}: {reason}")]
    InvalidRate {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Unsupported frequency '{0}' (use DAILY|WEEKLY|MONTHLY|YEARLY)")]
    UnsupportedFrequency(String),

    #[error("Unknown transaction kind '{0}' (use INCOME|EXPENSE)")]
    UnknownKind(String),

    #[error("Next occurrence after {0} is outside the supported date range")]
    DateOutOfRange(NaiveDate),

    #[error("Decimal overflow while computing {0}")]
    Overflow(&'static str),
}

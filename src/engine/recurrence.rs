// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Days, Months, NaiveDate};

use crate::error::FinanceError;
use crate::models::Frequency;

/// Next occurrence of `current` under `frequency`.
///
/// Month and year steps clamp the day to the destination month, so Jan 31
/// becomes Feb 28 (or 29) and Feb 29 becomes Feb 28 in a common year.
pub fn next_date(current: NaiveDate, frequency: Frequency) -> Result<NaiveDate, FinanceError> {
    let next = match frequency {
        Frequency::Daily => current.checked_add_days(Days::new(1)),
        Frequency::Weekly => current.checked_add_days(Days::new(7)),
        Frequency::Monthly => current.checked_add_months(Months::new(1)),
        Frequency::Yearly => current.checked_add_months(Months::new(12)),
    };
    next.ok_or(FinanceError::DateOutOfRange(current))
}

/// Number of due dates from `due` through `as_of`, counting `due` itself,
/// stopping at `limit`. Zero means not yet due.
///
/// Day and week steps are counted directly. Month and year steps walk the
/// clamped sequence, so `limit` bounds the work for rows far in the past.
pub fn periods_elapsed(
    due: NaiveDate,
    as_of: NaiveDate,
    frequency: Frequency,
    limit: u32,
) -> Result<u32, FinanceError> {
    if due > as_of {
        return Ok(0);
    }
    let step_days = match frequency {
        Frequency::Daily => Some(1),
        Frequency::Weekly => Some(7),
        Frequency::Monthly | Frequency::Yearly => None,
    };
    if let Some(step) = step_days {
        let whole = as_of.signed_duration_since(due).num_days() / step + 1;
        return Ok(u32::try_from(whole).unwrap_or(u32::MAX).min(limit));
    }

    let mut count = 0;
    let mut cursor = due;
    while cursor <= as_of && count < limit {
        count += 1;
        cursor = next_date(cursor, frequency)?;
    }
    Ok(count)
}

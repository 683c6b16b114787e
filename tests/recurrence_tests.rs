// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Months, NaiveDate};
use firetrack::engine::next_date;
use firetrack::error::FinanceError;
use firetrack::models::Frequency;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap();
    let next = first.checked_add_months(Months::new(1)).unwrap();
    next.signed_duration_since(first).num_days() as u32
}

#[test]
fn month_end_clamps_in_common_and_leap_years() {
    assert_eq!(next_date(ymd(2026, 1, 31), Frequency::Monthly).unwrap(), ymd(2026, 2, 28));
    assert_eq!(next_date(ymd(2024, 1, 31), Frequency::Monthly).unwrap(), ymd(2024, 2, 29));
}

#[test]
fn each_frequency_advances_one_period() {
    let start = ymd(2026, 2, 10);
    assert_eq!(next_date(start, Frequency::Daily).unwrap(), ymd(2026, 2, 11));
    assert_eq!(next_date(start, Frequency::Weekly).unwrap(), ymd(2026, 2, 17));
    assert_eq!(next_date(start, Frequency::Monthly).unwrap(), ymd(2026, 3, 10));
    assert_eq!(next_date(start, Frequency::Yearly).unwrap(), ymd(2027, 2, 10));
}

#[test]
fn leap_day_yearly_lands_on_feb_28() {
    assert_eq!(next_date(ymd(2028, 2, 29), Frequency::Yearly).unwrap(), ymd(2029, 2, 28));
}

#[test]
fn next_date_always_moves_forward() {
    let mut date = ymd(2023, 12, 31);
    for frequency in [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ] {
        for _ in 0..50 {
            let next = next_date(date, frequency).unwrap();
            assert!(next > date);
            date = next;
        }
    }
}

#[test]
fn repeated_monthly_steps_from_month_end() {
    for start in [ymd(2024, 1, 31), ymd(2025, 1, 31), ymd(2025, 8, 31), ymd(2025, 4, 30)] {
        let mut date = start;
        let mut expected_day = start.day();
        for n in 1..=24u32 {
            date = next_date(date, Frequency::Monthly).unwrap();
            let target_month = start.checked_add_months(Months::new(n)).unwrap();
            // Once clamped, the day never grows back.
            expected_day = expected_day.min(days_in_month(target_month));
            assert_eq!(date.year(), target_month.year(), "n={}", n);
            assert_eq!(date.month(), target_month.month(), "n={}", n);
            assert_eq!(date.day(), expected_day, "n={}", n);
        }
    }
}

#[test]
fn unknown_frequency_names_are_rejected() {
    assert_eq!("monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
    assert_eq!(" WEEKLY ".parse::<Frequency>().unwrap(), Frequency::Weekly);
    assert_eq!(
        "FORTNIGHTLY".parse::<Frequency>(),
        Err(FinanceError::UnsupportedFrequency("FORTNIGHTLY".into()))
    );
}

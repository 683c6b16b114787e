// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use firetrack::commands::{doctor, recurring};
use firetrack::models::{FinancialProfile, Frequency, RecurringObligation, Transaction, TxKind};
use firetrack::{db, settings, store};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::str::FromStr;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn add_obligation(conn: &Connection, description: &str, frequency: Frequency, due: NaiveDate) -> i64 {
    store::insert_obligation(
        conn,
        &RecurringObligation {
            id: 0,
            owner_id: 1,
            amount: Decimal::from_str("1200.50").unwrap(),
            description: description.into(),
            category: "Housing".into(),
            kind: TxKind::Expense,
            frequency,
            next_due_date: due,
            active: true,
        },
    )
    .unwrap()
}

fn add_tx(conn: &Connection, date: NaiveDate, amount: &str, kind: TxKind) {
    store::insert_transaction(
        conn,
        &Transaction {
            id: None,
            owner_id: 1,
            date,
            amount: Decimal::from_str(amount).unwrap(),
            description: "Manual".into(),
            category: "General".into(),
            kind,
        },
    )
    .unwrap();
}

#[test]
fn run_due_materializes_and_advances() {
    let mut conn = setup();
    let id = add_obligation(&conn, "Rent", Frequency::Monthly, ymd(2026, 1, 31));

    let summary = recurring::run_due(&mut conn, ymd(2026, 2, 1)).unwrap().unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 0);

    let txs = store::list_transactions(&conn, None, None, None).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].description, "[AUTO] Rent");
    assert_eq!(txs[0].date, ymd(2026, 1, 31));
    assert_eq!(txs[0].amount, Decimal::from_str("1200.50").unwrap());
    assert_eq!(txs[0].kind, TxKind::Expense);

    let obligation = store::get_obligation(&conn, id).unwrap();
    assert_eq!(obligation.next_due_date, ymd(2026, 2, 28));
    assert!(obligation.active);

    // Nothing further due by Feb 1.
    let again = recurring::run_due(&mut conn, ymd(2026, 2, 1)).unwrap().unwrap();
    assert_eq!(again.processed, 0);
    assert_eq!(store::list_transactions(&conn, None, None, None).unwrap().len(), 1);
}

#[test]
fn failed_advance_leaves_no_transaction_behind() {
    let mut conn = setup();
    let id = add_obligation(&conn, "Rent", Frequency::Monthly, ymd(2026, 2, 10));
    conn.execute_batch(
        "CREATE TRIGGER block_advance BEFORE UPDATE OF next_due_date ON recurring_obligations
         BEGIN SELECT RAISE(ABORT, 'advance blocked'); END;",
    )
    .unwrap();

    for _ in 0..2 {
        let summary = recurring::run_due(&mut conn, ymd(2026, 2, 10)).unwrap().unwrap();
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.failed, 1);
        assert!(summary.failures[0].reason.contains("advance blocked"));
    }
    assert!(store::list_transactions(&conn, None, None, None).unwrap().is_empty());
    assert_eq!(store::get_obligation(&conn, id).unwrap().next_due_date, ymd(2026, 2, 10));

    conn.execute_batch("DROP TRIGGER block_advance").unwrap();
    let summary = recurring::run_due(&mut conn, ymd(2026, 2, 10)).unwrap().unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(store::list_transactions(&conn, None, None, None).unwrap().len(), 1);
    assert_eq!(store::get_obligation(&conn, id).unwrap().next_due_date, ymd(2026, 3, 10));
}

#[test]
fn doctor_handles_rows_far_in_the_past() {
    let conn = setup();
    add_obligation(&conn, "Ancient", Frequency::Daily, ymd(1, 1, 1));

    let issues = doctor::find_issues(&conn, ymd(2026, 10, 18)).unwrap();
    let backlog: Vec<_> = issues.iter().filter(|r| r[0] == "backlog").collect();
    assert_eq!(backlog.len(), 1);
    assert!(backlog[0][1].contains("1000+"));
}

#[test]
fn paused_obligations_do_not_fire_until_resumed() {
    let mut conn = setup();
    let id = add_obligation(&conn, "Gym", Frequency::Weekly, ymd(2026, 3, 2));
    store::set_obligation_active(&conn, id, false).unwrap();

    let summary = recurring::run_due(&mut conn, ymd(2026, 3, 10)).unwrap().unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(store::get_obligation(&conn, id).unwrap().next_due_date, ymd(2026, 3, 2));

    store::set_obligation_active(&conn, id, true).unwrap();
    let summary = recurring::run_due(&mut conn, ymd(2026, 3, 10)).unwrap().unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(store::get_obligation(&conn, id).unwrap().next_due_date, ymd(2026, 3, 9));
}

#[test]
fn pausing_unknown_obligation_errors() {
    let conn = setup();
    assert!(store::set_obligation_active(&conn, 42, false).is_err());
}

#[test]
fn disabled_setting_skips_the_run() {
    let mut conn = setup();
    add_obligation(&conn, "Rent", Frequency::Monthly, ymd(2026, 1, 1));
    settings::set(&conn, settings::RECURRING_ENABLED, "off").unwrap();

    assert!(recurring::run_due(&mut conn, ymd(2026, 2, 1)).unwrap().is_none());
    assert!(store::list_transactions(&conn, None, None, None).unwrap().is_empty());
}

#[test]
fn unreadable_row_is_skipped_and_reported() {
    let mut conn = setup();
    let good = add_obligation(&conn, "Rent", Frequency::Monthly, ymd(2026, 1, 15));
    conn.execute(
        "INSERT INTO recurring_obligations(owner_id, amount, description, category, kind, frequency, next_due_date)
         VALUES (1, '10', 'Odd', 'Misc', 'EXPENSE', 'FORTNIGHTLY', '2026-01-01')",
        [],
    )
    .unwrap();
    let bad = conn.last_insert_rowid();

    let summary = recurring::run_due(&mut conn, ymd(2026, 1, 20)).unwrap().unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].obligation_id, bad);
    assert_eq!(store::get_obligation(&conn, good).unwrap().next_due_date, ymd(2026, 2, 15));

    let (readable, unreadable) = store::scan_obligations(&conn).unwrap();
    assert_eq!(readable.len(), 1);
    assert_eq!(unreadable.len(), 1);
    assert_eq!(unreadable[0].0, bad);
    assert!(unreadable[0].1.contains("FORTNIGHTLY"));

    let issues = doctor::find_issues(&conn, ymd(2026, 1, 20)).unwrap();
    assert!(issues.iter().any(|r| r[0] == "unreadable_obligation"));
}

#[test]
fn doctor_flags_backlog() {
    let conn = setup();
    add_obligation(&conn, "Coffee", Frequency::Daily, ymd(2026, 1, 1));
    add_obligation(&conn, "Rent", Frequency::Monthly, ymd(2026, 1, 5));

    let issues = doctor::find_issues(&conn, ymd(2026, 1, 5)).unwrap();
    let backlog: Vec<_> = issues.iter().filter(|r| r[0] == "backlog").collect();
    assert_eq!(backlog.len(), 1);
    assert!(backlog[0][1].contains("Coffee"));
}

#[test]
fn net_cash_flow_subtracts_expenses() {
    let conn = setup();
    add_tx(&conn, ymd(2026, 3, 1), "4000", TxKind::Income);
    add_tx(&conn, ymd(2026, 3, 2), "1200.50", TxKind::Expense);
    add_tx(&conn, ymd(2026, 3, 31), "99.50", TxKind::Expense);
    add_tx(&conn, ymd(2026, 4, 1), "500", TxKind::Expense);

    let net = store::net_cash_flow(&conn, ymd(2026, 3, 1), ymd(2026, 3, 31)).unwrap();
    assert_eq!(net, Decimal::from_str("2700.00").unwrap());
    let empty = store::net_cash_flow(&conn, ymd(2025, 1, 1), ymd(2025, 12, 31)).unwrap();
    assert_eq!(empty, Decimal::ZERO);
}

#[test]
fn saved_profile_carries_fire_number() {
    let conn = setup();
    let mut profile = FinancialProfile {
        current_age: 30,
        current_savings: Decimal::from_str("24900").unwrap(),
        monthly_contribution: Decimal::from_str("600").unwrap(),
        monthly_expenses: Decimal::from_str("1500").unwrap(),
        expected_return_rate: 0.07,
        inflation_rate: 0.025,
        safe_withdrawal_rate: 0.04,
        target_retirement_age: Some(45),
        annual_contribution_increase_rate: None,
    };
    let stored = store::save_fire_profile(&conn, "baseline", &profile).unwrap();
    assert_eq!(stored.fire_number.to_string(), "450000.00");
    assert_eq!(stored.profile, profile);

    profile.monthly_expenses = Decimal::from_str("2000").unwrap();
    profile.annual_contribution_increase_rate = Some(0.03);
    store::save_fire_profile(&conn, "baseline", &profile).unwrap();

    let loaded = store::get_fire_profile(&conn, "baseline").unwrap();
    assert_eq!(loaded.fire_number.to_string(), "600000.00");
    assert_eq!(loaded.profile.annual_contribution_increase_rate, Some(0.03));
    assert_eq!(store::list_fire_profiles(&conn).unwrap().len(), 1);
    assert!(store::get_fire_profile(&conn, "missing").is_err());
}

#[test]
fn invalid_profile_is_not_saved() {
    let conn = setup();
    let profile = FinancialProfile {
        current_age: 30,
        current_savings: Decimal::ZERO,
        monthly_contribution: Decimal::ZERO,
        monthly_expenses: Decimal::from_str("1500").unwrap(),
        expected_return_rate: 0.07,
        inflation_rate: 0.025,
        safe_withdrawal_rate: 0.0,
        target_retirement_age: None,
        annual_contribution_increase_rate: None,
    };
    assert!(store::save_fire_profile(&conn, "broken", &profile).is_err());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM fire_profiles WHERE name=?1", params!["broken"], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn settings_defaults_and_validation() {
    let conn = setup();
    assert!(settings::recurring_enabled(&conn).unwrap());
    assert_eq!(settings::recurring_interval_minutes(&conn).unwrap(), 25);

    settings::set(&conn, settings::RECURRING_INTERVAL_MINUTES, " 5 ").unwrap();
    assert_eq!(settings::recurring_interval_minutes(&conn).unwrap(), 5);

    assert!(settings::set(&conn, settings::RECURRING_INTERVAL_MINUTES, "0").is_err());
    assert!(settings::set(&conn, settings::RECURRING_ENABLED, "maybe").is_err());
    assert!(settings::set(&conn, "base_currency", "USD").is_err());
    assert!(settings::get(&conn, "base_currency").is_err());

    let all = settings::all(&conn).unwrap();
    assert_eq!(
        all,
        vec![
            ("recurring.enabled".to_string(), "true".to_string()),
            ("recurring.interval_minutes".to_string(), "5".to_string()),
        ]
    );
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed storage for transactions, recurring obligations and
//! saved FIRE profiles.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::engine::processor::{
    DueBatch, ObligationSource, ObligationWriteFailure, TransactionSink,
};
use crate::engine::projection;
use crate::models::{
    FinancialProfile, Frequency, RecurringObligation, StoredFireProfile, Transaction, TxKind,
};
use crate::utils::parse_date;

const OBLIGATION_COLUMNS: &str =
    "id, owner_id, amount, description, category, kind, frequency, next_due_date, active";

struct ObligationRow {
    id: i64,
    owner_id: i64,
    amount: String,
    description: String,
    category: String,
    kind: String,
    frequency: String,
    next_due_date: String,
    active: bool,
}

impl ObligationRow {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            owner_id: r.get(1)?,
            amount: r.get(2)?,
            description: r.get(3)?,
            category: r.get(4)?,
            kind: r.get(5)?,
            frequency: r.get(6)?,
            next_due_date: r.get(7)?,
            active: r.get(8)?,
        })
    }

    fn parse(self) -> Result<RecurringObligation> {
        let id = self.id;
        Ok(RecurringObligation {
            id,
            owner_id: self.owner_id,
            amount: self
                .amount
                .parse::<Decimal>()
                .with_context(|| format!("Invalid amount '{}' for obligation {}", self.amount, id))?,
            description: self.description,
            category: self.category,
            kind: self
                .kind
                .parse::<TxKind>()
                .with_context(|| format!("Obligation {}", id))?,
            frequency: self
                .frequency
                .parse::<Frequency>()
                .with_context(|| format!("Obligation {}", id))?,
            next_due_date: parse_date(&self.next_due_date)
                .with_context(|| format!("Obligation {}", id))?,
            active: self.active,
        })
    }
}

pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(owner_id, date, amount, description, category, kind)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            tx.owner_id,
            tx.date.to_string(),
            tx.amount.to_string(),
            tx.description,
            tx.category,
            tx.kind.as_str()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Transactions between `from` and `to` inclusive, newest first.
pub fn list_transactions(
    conn: &Connection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    limit: Option<usize>,
) -> Result<Vec<Transaction>> {
    let mut sql = String::from(
        "SELECT id, owner_id, date, amount, description, category, kind FROM transactions WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(from) = from {
        sql.push_str(" AND date>=?");
        params_vec.push(from.to_string());
    }
    if let Some(to) = to {
        sql.push_str(" AND date<=?");
        params_vec.push(to.to_string());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let owner_id: i64 = r.get(1)?;
        let date: String = r.get(2)?;
        let amount: String = r.get(3)?;
        let description: String = r.get(4)?;
        let category: String = r.get(5)?;
        let kind: String = r.get(6)?;
        data.push(Transaction {
            id: Some(id),
            owner_id,
            date: parse_date(&date).with_context(|| format!("Transaction {}", id))?,
            amount: amount
                .parse::<Decimal>()
                .with_context(|| format!("Invalid amount '{}' in transaction {}", amount, id))?,
            description,
            category,
            kind: kind
                .parse::<TxKind>()
                .with_context(|| format!("Transaction {}", id))?,
        });
    }
    Ok(data)
}

/// Income minus expenses dated between `from` and `to` inclusive.
pub fn net_cash_flow(conn: &Connection, from: NaiveDate, to: NaiveDate) -> Result<Decimal> {
    let mut stmt = conn
        .prepare_cached("SELECT amount, kind FROM transactions WHERE date>=?1 AND date<=?2")?;
    let mut rows = stmt.query(params![from.to_string(), to.to_string()])?;
    let mut total = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        let amount: String = r.get(0)?;
        let kind: String = r.get(1)?;
        let value = amount
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in transactions", amount))?;
        match kind.parse::<TxKind>()? {
            TxKind::Income => total += value,
            TxKind::Expense => total -= value,
        }
    }
    Ok(total)
}

/// Stores a new obligation; the `id` field of `obligation` is ignored.
pub fn insert_obligation(conn: &Connection, obligation: &RecurringObligation) -> Result<i64> {
    conn.execute(
        "INSERT INTO recurring_obligations(owner_id, amount, description, category, kind, frequency, next_due_date, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            obligation.owner_id,
            obligation.amount.to_string(),
            obligation.description,
            obligation.category,
            obligation.kind.as_str(),
            obligation.frequency.as_str(),
            obligation.next_due_date.to_string(),
            obligation.active
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_obligations(conn: &Connection) -> Result<Vec<RecurringObligation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM recurring_obligations ORDER BY next_due_date, id",
        OBLIGATION_COLUMNS
    ))?;
    let rows = stmt.query_map([], ObligationRow::from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?.parse()?);
    }
    Ok(data)
}

pub fn get_obligation(conn: &Connection, id: i64) -> Result<RecurringObligation> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {} FROM recurring_obligations WHERE id=?1",
                OBLIGATION_COLUMNS
            ),
            params![id],
            ObligationRow::from_row,
        )
        .optional()?
        .ok_or_else(|| anyhow!("Obligation {} not found", id))?;
    row.parse()
}

pub fn set_obligation_active(conn: &Connection, id: i64, active: bool) -> Result<()> {
    let changed = conn.execute(
        "UPDATE recurring_obligations SET active=?1 WHERE id=?2",
        params![active, id],
    )?;
    if changed == 0 {
        return Err(anyhow!("Obligation {} not found", id));
    }
    Ok(())
}

/// Every stored obligation, split into readable ones and rows that cannot be
/// parsed (with the reason).
pub fn scan_obligations(
    conn: &Connection,
) -> Result<(Vec<RecurringObligation>, Vec<(i64, String)>)> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM recurring_obligations ORDER BY next_due_date, id",
        OBLIGATION_COLUMNS
    ))?;
    let rows = stmt.query_map([], ObligationRow::from_row)?;
    let mut good = Vec::new();
    let mut bad = Vec::new();
    for row in rows {
        let row = row?;
        let id = row.id;
        match row.parse() {
            Ok(obligation) => good.push(obligation),
            Err(err) => bad.push((id, format!("{:#}", err))),
        }
    }
    Ok((good, bad))
}

/// Inserts or replaces the profile called `name`, recomputing its FIRE number.
pub fn save_fire_profile(
    conn: &Connection,
    name: &str,
    profile: &FinancialProfile,
) -> Result<StoredFireProfile> {
    let fire_number = projection::fire_number(profile)?;
    conn.execute(
        "INSERT INTO fire_profiles(name, current_age, current_savings, monthly_contribution, monthly_expenses,
            expected_return_rate, inflation_rate, safe_withdrawal_rate, target_retirement_age,
            annual_contribution_increase_rate, fire_number)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)
         ON CONFLICT(name) DO UPDATE SET
            current_age=excluded.current_age,
            current_savings=excluded.current_savings,
            monthly_contribution=excluded.monthly_contribution,
            monthly_expenses=excluded.monthly_expenses,
            expected_return_rate=excluded.expected_return_rate,
            inflation_rate=excluded.inflation_rate,
            safe_withdrawal_rate=excluded.safe_withdrawal_rate,
            target_retirement_age=excluded.target_retirement_age,
            annual_contribution_increase_rate=excluded.annual_contribution_increase_rate,
            fire_number=excluded.fire_number,
            updated_at=datetime('now')",
        params![
            name,
            profile.current_age,
            profile.current_savings.to_string(),
            profile.monthly_contribution.to_string(),
            profile.monthly_expenses.to_string(),
            profile.expected_return_rate,
            profile.inflation_rate,
            profile.safe_withdrawal_rate,
            profile.target_retirement_age,
            profile.annual_contribution_increase_rate,
            fire_number.to_string()
        ],
    )?;
    get_fire_profile(conn, name)
}

const PROFILE_COLUMNS: &str = "id, name, current_age, current_savings, monthly_contribution, monthly_expenses,
    expected_return_rate, inflation_rate, safe_withdrawal_rate, target_retirement_age,
    annual_contribution_increase_rate, fire_number";

type ProfileRow = (
    i64,
    String,
    i32,
    String,
    String,
    String,
    f64,
    f64,
    f64,
    Option<i32>,
    Option<f64>,
    String,
);

fn profile_row(r: &Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
        r.get(7)?,
        r.get(8)?,
        r.get(9)?,
        r.get(10)?,
        r.get(11)?,
    ))
}

fn parse_profile(row: ProfileRow) -> Result<StoredFireProfile> {
    let (id, name, age, savings, contribution, expenses, ret, infl, swr, target, increase, fire) =
        row;
    let dec = |field: &str, s: &str| -> Result<Decimal> {
        s.parse::<Decimal>()
            .with_context(|| format!("Invalid {} '{}' in profile '{}'", field, s, name))
    };
    Ok(StoredFireProfile {
        id,
        profile: FinancialProfile {
            current_age: age,
            current_savings: dec("current savings", &savings)?,
            monthly_contribution: dec("monthly contribution", &contribution)?,
            monthly_expenses: dec("monthly expenses", &expenses)?,
            expected_return_rate: ret,
            inflation_rate: infl,
            safe_withdrawal_rate: swr,
            target_retirement_age: target,
            annual_contribution_increase_rate: increase,
        },
        fire_number: dec("fire number", &fire)?,
        name,
    })
}

pub fn get_fire_profile(conn: &Connection, name: &str) -> Result<StoredFireProfile> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM fire_profiles WHERE name=?1", PROFILE_COLUMNS),
            params![name],
            profile_row,
        )
        .optional()?
        .ok_or_else(|| anyhow!("FIRE profile '{}' not found", name))?;
    parse_profile(row)
}

pub fn list_fire_profiles(conn: &Connection) -> Result<Vec<StoredFireProfile>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM fire_profiles ORDER BY name",
        PROFILE_COLUMNS
    ))?;
    let rows = stmt.query_map([], profile_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(parse_profile(row?)?);
    }
    Ok(data)
}

/// The storage collaborator handed to [`crate::engine::process_due`].
#[derive(Clone, Copy)]
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl ObligationSource for SqliteStore<'_> {
    fn due_obligations(&self, as_of: NaiveDate) -> Result<DueBatch> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM recurring_obligations WHERE active=1 AND next_due_date<=?1 ORDER BY next_due_date, id",
            OBLIGATION_COLUMNS
        ))?;
        let rows = stmt.query_map(params![as_of.to_string()], ObligationRow::from_row)?;
        let mut batch = DueBatch::default();
        for row in rows {
            let row = row?;
            let id = row.id;
            match row.parse() {
                Ok(obligation) => batch.obligations.push(obligation),
                Err(err) => batch.unreadable.push(ObligationWriteFailure {
                    obligation_id: id,
                    reason: format!("{:#}", err),
                }),
            }
        }
        Ok(batch)
    }
}

const OBLIGATION_SAVEPOINT: &str = "fire_obligation";

impl TransactionSink for SqliteStore<'_> {
    fn save_transaction(&mut self, tx: &Transaction) -> Result<i64> {
        insert_transaction(self.conn, tx)
    }

    fn save_obligation(&mut self, obligation: &RecurringObligation) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE recurring_obligations SET next_due_date=?1, active=?2 WHERE id=?3",
            params![
                obligation.next_due_date.to_string(),
                obligation.active,
                obligation.id
            ],
        )?;
        if changed == 0 {
            return Err(anyhow!("Obligation {} not found", obligation.id));
        }
        Ok(())
    }

    fn begin_obligation(&mut self) -> Result<()> {
        self.conn
            .execute_batch(&format!("SAVEPOINT {}", OBLIGATION_SAVEPOINT))
            .context("Open obligation savepoint")
    }

    fn commit_obligation(&mut self) -> Result<()> {
        self.conn
            .execute_batch(&format!("RELEASE {}", OBLIGATION_SAVEPOINT))
            .context("Release obligation savepoint")
    }

    fn rollback_obligation(&mut self) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                "ROLLBACK TO {0}; RELEASE {0}",
                OBLIGATION_SAVEPOINT
            ))
            .context("Roll back obligation savepoint")
    }
}

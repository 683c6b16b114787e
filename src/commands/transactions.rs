// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use chrono::{Datelike, Local, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::models::{Transaction, TxKind};
use crate::store;
use crate::utils::{
    fmt_money, maybe_print_json, optional_arg, parse_date, parse_decimal, pretty_table,
    required_arg,
};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("cashflow", sub)) => cashflow(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Amount, description, category, kind and owner shared by `tx add` and
/// `recurring add`.
pub struct EntryFields {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub kind: TxKind,
    pub owner_id: i64,
}

pub fn entry_fields(sub: &clap::ArgMatches) -> Result<EntryFields> {
    let amount = parse_decimal(required_arg(sub, "amount")?)?;
    if amount <= Decimal::ZERO {
        return Err(anyhow!(
            "Amount must be positive, got {}; use --kind EXPENSE for outflows",
            amount
        ));
    }
    let description = required_arg(sub, "description")?;
    if description.is_empty() {
        return Err(anyhow!("Description must not be empty"));
    }
    Ok(EntryFields {
        amount,
        description: description.to_string(),
        category: required_arg(sub, "category")?.to_string(),
        kind: required_arg(sub, "kind")?.parse::<TxKind>()?,
        owner_id: sub.get_one::<i64>("owner").copied().unwrap_or(1),
    })
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(required_arg(sub, "date")?)?;
    let fields = entry_fields(sub)?;
    let tx = Transaction {
        id: None,
        owner_id: fields.owner_id,
        date,
        amount: fields.amount,
        description: fields.description,
        category: fields.category,
        kind: fields.kind,
    };
    let id = store::insert_transaction(conn, &tx)?;
    println!(
        "Recorded {} {} on {} '{}' (id {})",
        tx.kind, tx.amount, tx.date, tx.description, id
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.map(|id| id.to_string()).unwrap_or_default(),
                    t.date.to_string(),
                    t.description.clone(),
                    t.category.clone(),
                    t.kind.to_string(),
                    fmt_money(&t.amount),
                    t.owner_id.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Description", "Category", "Kind", "Amount", "Owner"],
                rows,
            )
        );
    }
    Ok(())
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let from = optional_arg(sub, "from").map(parse_date).transpose()?;
    let to = optional_arg(sub, "to").map(parse_date).transpose()?;
    let limit = sub.get_one::<usize>("limit").copied();
    store::list_transactions(conn, from, to, limit)
}

/// The range `tx cashflow` covers when no bounds are given: the first of
/// `today`'s month through `today`.
pub fn default_cashflow_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today.with_day(1).unwrap_or(today), today)
}

fn cashflow(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (default_from, default_to) = default_cashflow_range(Local::now().date_naive());
    let from = match optional_arg(sub, "from") {
        Some(raw) => parse_date(raw)?,
        None => default_from,
    };
    let to = match optional_arg(sub, "to") {
        Some(raw) => parse_date(raw)?,
        None => default_to,
    };
    if from > to {
        return Err(anyhow!("--from {} is after --to {}", from, to));
    }
    let net = store::net_cash_flow(conn, from, to)?;
    println!("Net cash flow {} to {}: {}", from, to, fmt_money(&net));
    Ok(())
}

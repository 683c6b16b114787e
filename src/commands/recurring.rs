// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, TransactionBehavior};

use crate::commands::transactions::entry_fields;
use crate::engine::{ProcessingSummary, process_due};
use crate::models::{Frequency, RecurringObligation};
use crate::settings;
use crate::store::{self, SqliteStore};
use crate::utils::{
    fmt_money, maybe_print_json, optional_arg, parse_date, pretty_table, required_arg,
};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("pause", sub)) => set_active(conn, sub, false)?,
        Some(("resume", sub)) => set_active(conn, sub, true)?,
        Some(("run", sub)) => run(conn, sub)?,
        Some(("watch", sub)) => watch(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fields = entry_fields(sub)?;
    let obligation = RecurringObligation {
        id: 0,
        owner_id: fields.owner_id,
        amount: fields.amount,
        description: fields.description,
        category: fields.category,
        kind: fields.kind,
        frequency: required_arg(sub, "frequency")?.parse::<Frequency>()?,
        next_due_date: parse_date(required_arg(sub, "next_due")?)?,
        active: true,
    };
    let id = store::insert_obligation(conn, &obligation)?;
    println!(
        "Added {} obligation {} '{}' first due {}",
        obligation.frequency, id, obligation.description, obligation.next_due_date
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = store::list_obligations(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|o| {
                vec![
                    o.id.to_string(),
                    o.description.clone(),
                    o.category.clone(),
                    o.kind.to_string(),
                    fmt_money(&o.amount),
                    o.frequency.to_string(),
                    o.next_due_date.to_string(),
                    if o.active { "yes".into() } else { "paused".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Description", "Category", "Kind", "Amount", "Every", "Next Due", "Active"],
                rows
            )
        );
    }
    Ok(())
}

fn set_active(conn: &Connection, sub: &clap::ArgMatches, active: bool) -> Result<()> {
    let raw = required_arg(sub, "id")?;
    let id = raw
        .parse::<i64>()
        .with_context(|| format!("Invalid obligation id '{}'", raw))?;
    store::set_obligation_active(conn, id, active)?;
    println!("{} obligation {}", if active { "Resumed" } else { "Paused" }, id);
    Ok(())
}

/// Runs one processing pass as of `as_of`, or returns `None` when recurring
/// processing is switched off in settings.
///
/// The pass holds an immediate write transaction, so a second process
/// running against the same database waits instead of double-firing. Each
/// obligation's two writes sit in their own savepoint and are undone
/// together when either fails.
pub fn run_due(conn: &mut Connection, as_of: NaiveDate) -> Result<Option<ProcessingSummary>> {
    if !settings::recurring_enabled(conn)? {
        log::info!("Recurring processing disabled; skipping run for {}", as_of);
        return Ok(None);
    }
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let summary = {
        let source = SqliteStore::new(&tx);
        let mut sink = source;
        process_due(as_of, &source, &mut sink)?
    };
    tx.commit().context("Commit recurring run")?;
    Ok(Some(summary))
}

fn print_summary(summary: &ProcessingSummary, as_of: NaiveDate) {
    println!(
        "Processed {} obligation(s) due by {}, {} failed",
        summary.processed, as_of, summary.failed
    );
    for failure in &summary.failures {
        println!("  obligation {}: {}", failure.obligation_id, failure.reason);
    }
}

fn run(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = match optional_arg(sub, "as_of") {
        Some(raw) => parse_date(raw)?,
        None => Local::now().date_naive(),
    };
    match run_due(conn, as_of)? {
        Some(summary) => {
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
                print_summary(&summary, as_of);
            }
        }
        None => println!("Recurring processing is disabled (recurring.enabled=false)"),
    }
    Ok(())
}

fn watch(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let minutes = match sub.get_one::<u64>("interval_minutes") {
        Some(v) => *v,
        None => settings::recurring_interval_minutes(conn)?,
    };
    let max_runs = sub.get_one::<u64>("max_runs").copied();
    let pause = Duration::from_secs(minutes.saturating_mul(60));
    log::info!("Watching recurring obligations every {} minute(s)", minutes);

    let mut runs = 0u64;
    loop {
        let as_of = Local::now().date_naive();
        match run_due(conn, as_of) {
            Ok(Some(summary)) => print_summary(&summary, as_of),
            Ok(None) => log::info!("Recurring processing disabled"),
            // A failed pass is retried on the next tick.
            Err(err) => log::error!("Recurring run for {} failed: {:#}", as_of, err),
        }
        runs += 1;
        if max_runs.is_some_and(|max| runs >= max) {
            break;
        }
        thread::sleep(pause);
    }
    Ok(())
}

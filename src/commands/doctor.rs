// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::engine::recurrence::{next_date, periods_elapsed};
use crate::store;
use crate::utils::{optional_arg, parse_date, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let as_of = match optional_arg(m, "as_of") {
        Some(raw) => parse_date(raw)?,
        None => Local::now().date_naive(),
    };
    let rows = find_issues(conn, as_of)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Backlogs longer than this are reported as "at least".
const BACKLOG_LIMIT: u32 = 1000;

pub fn find_issues(conn: &Connection, as_of: NaiveDate) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let (obligations, unreadable) = store::scan_obligations(conn)?;

    // 1) Rows the processor skips
    for (id, reason) in unreadable {
        rows.push(vec!["unreadable_obligation".into(), format!("{}: {}", id, reason)]);
    }

    // 2) Backlog: a run fires once, so n periods behind needs n runs
    for o in obligations.iter().filter(|o| o.active) {
        let backlog = next_date(o.next_due_date, o.frequency)
            .and_then(|_| periods_elapsed(o.next_due_date, as_of, o.frequency, BACKLOG_LIMIT));
        match backlog {
            Ok(n) if n > 1 => {
                let shown = if n >= BACKLOG_LIMIT {
                    format!("{}+", BACKLOG_LIMIT)
                } else {
                    n.to_string()
                };
                rows.push(vec![
                    "backlog".into(),
                    format!(
                        "{} '{}': {} {} periods due since {}, needs {} runs",
                        o.id, o.description, shown, o.frequency, o.next_due_date, shown
                    ),
                ]);
            }
            Ok(_) => {}
            Err(err) => rows.push(vec!["date_range".into(), format!("{}: {}", o.id, err)]),
        }
        if o.amount <= Decimal::ZERO {
            rows.push(vec![
                "non_positive_amount".into(),
                format!("{} '{}': {}", o.id, o.description, o.amount),
            ]);
        }
    }
    Ok(rows)
}

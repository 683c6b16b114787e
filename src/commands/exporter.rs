// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

use crate::store;
use crate::utils::required_arg;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required_arg(sub, "format")?.to_lowercase();
    let out = required_arg(sub, "out")?;
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }

    let mut rows = store::list_transactions(conn, None, None, None)?;
    rows.reverse();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record([
            "id",
            "date",
            "owner_id",
            "kind",
            "amount",
            "category",
            "description",
        ])?;
        for t in &rows {
            wtr.write_record([
                t.id.map(|id| id.to_string()).unwrap_or_default(),
                t.date.to_string(),
                t.owner_id.to_string(),
                t.kind.to_string(),
                t.amount.to_string(),
                t.category.clone(),
                t.description.clone(),
            ])?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<_> = rows
            .iter()
            .map(|t| {
                json!({
                    "id": t.id, "date": t.date.to_string(), "owner_id": t.owner_id, "kind": t.kind,
                    "amount": t.amount.to_string(), "category": t.category, "description": t.description
                })
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}

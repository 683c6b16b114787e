// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::settings;
use crate::utils::{pretty_table, required_arg};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = required_arg(sub, "key")?;
            println!("{}", settings::get(conn, key)?);
        }
        Some(("set", sub)) => {
            let key = required_arg(sub, "key")?;
            let value = required_arg(sub, "value")?;
            settings::set(conn, key, value)?;
            println!("{} = {}", key, value);
        }
        Some(("list", _)) => {
            let rows = settings::all(conn)?
                .into_iter()
                .map(|(k, v)| vec![k, v])
                .collect();
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}
